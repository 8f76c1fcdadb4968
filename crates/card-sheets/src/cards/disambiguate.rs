//! Choosing between several candidate back images

use crate::types::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Picks one back image when a folder offers several.
pub trait Disambiguator {
    /// Return the index of the chosen candidate, or `None` for no back.
    ///
    /// `directory` is the folder the candidates were found in.
    fn select(&mut self, directory: &Path, candidates: &[PathBuf]) -> Result<Option<usize>>;
}

impl<D: Disambiguator + ?Sized> Disambiguator for Box<D> {
    fn select(&mut self, directory: &Path, candidates: &[PathBuf]) -> Result<Option<usize>> {
        (**self).select(directory, candidates)
    }
}

/// Always take the first candidate (candidates are sorted by path)
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl Disambiguator for FirstCandidate {
    fn select(&mut self, _directory: &Path, candidates: &[PathBuf]) -> Result<Option<usize>> {
        Ok(if candidates.is_empty() { None } else { Some(0) })
    }
}

/// Never pick a back when the choice is ambiguous
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBack;

impl Disambiguator for NoBack {
    fn select(&mut self, _directory: &Path, _candidates: &[PathBuf]) -> Result<Option<usize>> {
        Ok(None)
    }
}

/// Numbered menu on a terminal.
///
/// Candidates are listed as `[1]..[n]` with `[0] None`; the prompt repeats until a valid
/// number is entered. End of input counts as `None`.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Disambiguator for ConsolePrompt<R, W> {
    fn select(&mut self, directory: &Path, candidates: &[PathBuf]) -> Result<Option<usize>> {
        writeln!(self.output, "Back images available for {}", directory.display())?;
        for (i, candidate) in candidates.iter().enumerate() {
            writeln!(self.output, "[{}] {}", i + 1, candidate.display())?;
        }
        writeln!(self.output, "[0] None")?;

        loop {
            write!(self.output, "Select #: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                log::warn!(
                    "No selection made for {}; using no back",
                    directory.display()
                );
                return Ok(None);
            }

            match line.trim().parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(choice) if choice <= candidates.len() => return Ok(Some(choice - 1)),
                _ => continue,
            }
        }
    }
}
