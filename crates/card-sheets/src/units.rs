//! Parsing of crop amounts such as `3mm`, `0.125in` or `6.5`

use crate::types::*;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?\d*\.?\d+)\s*([a-z%]*)$").expect("crop amount pattern is valid")
});

/// Unit attached to a crop amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropUnit {
    Percent,
    Millimeters,
    Inches,
    Pixels,
}

impl CropUnit {
    pub const SYMBOLS: [&'static str; 4] = ["%", "mm", "in", "px"];

    pub fn symbol(self) -> &'static str {
        match self {
            CropUnit::Percent => "%",
            CropUnit::Millimeters => "mm",
            CropUnit::Inches => "in",
            CropUnit::Pixels => "px",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "%" => Some(CropUnit::Percent),
            "mm" => Some(CropUnit::Millimeters),
            "in" => Some(CropUnit::Inches),
            "px" => Some(CropUnit::Pixels),
            _ => None,
        }
    }
}

/// A parsed crop amount. A bare number (`unit == None`) means percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    pub amount: f32,
    pub unit: Option<CropUnit>,
}

impl Crop {
    pub fn new(amount: f32, unit: Option<CropUnit>) -> Self {
        Self { amount, unit }
    }

    /// Unit the amount is interpreted in
    pub fn effective_unit(&self) -> CropUnit {
        self.unit.unwrap_or(CropUnit::Percent)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0.0
    }

    /// Reject negative amounts
    pub fn ensure_non_negative(&self) -> Result<()> {
        if self.amount < 0.0 {
            return Err(SheetError::NegativeCrop(self.amount));
        }
        Ok(())
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{}{}", self.amount, unit.symbol()),
            None => write!(f, "{}", self.amount),
        }
    }
}

/// Split a crop string into amount and unit.
///
/// Input is trimmed and lowercased first. Fails with [`SheetError::Format`] if the text is
/// not a number with optional unit, and [`SheetError::UnsupportedUnit`] if the unit is not
/// one of `%`, `mm`, `in`, `px`.
pub fn parse_crop(text: &str) -> Result<Crop> {
    let normalized = text.trim().to_lowercase();
    let captures = AMOUNT_PATTERN
        .captures(&normalized)
        .ok_or_else(|| SheetError::Format(text.to_string()))?;

    let amount: f32 = captures[1]
        .parse()
        .map_err(|_| SheetError::Format(text.to_string()))?;

    let unit = match &captures[2] {
        "" => None,
        symbol => Some(CropUnit::from_symbol(symbol).ok_or_else(|| {
            SheetError::UnsupportedUnit {
                unit: symbol.to_string(),
                valid: join_keys(CropUnit::SYMBOLS),
            }
        })?),
    };

    Ok(Crop { amount, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(
            parse_crop("3mm").unwrap(),
            Crop::new(3.0, Some(CropUnit::Millimeters))
        );
        assert_eq!(
            parse_crop("0.125in").unwrap(),
            Crop::new(0.125, Some(CropUnit::Inches))
        );
        assert_eq!(
            parse_crop("12px").unwrap(),
            Crop::new(12.0, Some(CropUnit::Pixels))
        );
        assert_eq!(
            parse_crop("5%").unwrap(),
            Crop::new(5.0, Some(CropUnit::Percent))
        );
    }

    #[test]
    fn test_bare_number_is_percent() {
        let crop = parse_crop("6.5").unwrap();
        assert_eq!(crop.unit, None);
        assert_eq!(crop.effective_unit(), CropUnit::Percent);
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(
            parse_crop("  2 MM ").unwrap(),
            Crop::new(2.0, Some(CropUnit::Millimeters))
        );
        assert_eq!(parse_crop(".5in").unwrap().amount, 0.5);
    }

    #[test]
    fn test_sign_is_parsed_not_rejected() {
        let crop = parse_crop("-3mm").unwrap();
        assert_eq!(crop.amount, -3.0);
        assert!(matches!(
            crop.ensure_non_negative(),
            Err(SheetError::NegativeCrop(_))
        ));
    }

    #[test]
    fn test_invalid_format() {
        for text in ["", "mm", "1.2.3", "3 m m", "abc5"] {
            assert!(
                matches!(parse_crop(text), Err(SheetError::Format(_))),
                "expected format error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_unsupported_unit() {
        match parse_crop("3cm") {
            Err(SheetError::UnsupportedUnit { unit, valid }) => {
                assert_eq!(unit, "cm");
                assert!(valid.contains("mm"));
            }
            other => panic!("Expected UnsupportedUnit, got {:?}", other),
        }
    }
}
