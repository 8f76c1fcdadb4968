//! Writing finished sheets to disk

use crate::constants::POINTS_PER_INCH;
use crate::types::*;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// Pixels to PDF points at the given PPI
pub fn px_to_pt(px: u32, ppi: u32) -> f32 {
    px as f32 / ppi.max(1) as f32 * POINTS_PER_INCH
}

/// Build a PDF with one full-page JPEG image per sheet
pub fn build_pdf(pages: &[RgbImage], ppi: u32, quality: u8) -> Result<Document> {
    if pages.is_empty() {
        return Err(SheetError::NoPages);
    }

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut page_refs = Vec::new();

    for page in pages {
        let (width, height) = page.dimensions();

        let mut jpeg = Vec::new();
        page.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)))?;

        let image_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width as i64)),
            ("Height", Object::Integer(height as i64)),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"DCTDecode".to_vec())),
        ]);
        let image_id = output.add_object(Stream::new(image_dict, jpeg).with_compression(false));

        let width_pt = px_to_pt(width, ppi);
        let height_pt = px_to_pt(height, ppi);

        // Scale the unit image square to the full page
        let content = format!("q\n{:.4} 0 0 {:.4} 0 0 cm\n/Im0 Do\nQ\n", width_pt, height_pt);
        let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let xobjects = Dictionary::from_iter(vec![("Im0", Object::Reference(image_id))]);
        let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_tree_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width_pt),
                    Object::Real(height_pt),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_refs.push(Object::Reference(output.add_object(page_dict)));
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    Ok(output)
}

/// Save the sheets as one PDF file
pub async fn save_pdf(
    pages: Vec<RgbImage>,
    path: impl AsRef<Path>,
    ppi: u32,
    quality: u8,
) -> Result<()> {
    let path = path.as_ref().to_owned();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = tokio::task::spawn_blocking(move || {
        let mut doc = build_pdf(&pages, ppi, quality)?;
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, SheetError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;

    log::info!("Generated PDF: {}", path.display());
    Ok(())
}

/// Save the sheets as `page1.png`, `page2.png`, … inside `dir`
pub async fn save_images(pages: Vec<RgbImage>, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    if pages.is_empty() {
        return Err(SheetError::NoPages);
    }

    let dir = dir.as_ref().to_owned();
    tokio::fs::create_dir_all(&dir).await?;

    let mut written = Vec::new();
    for (index, page) in pages.into_iter().enumerate() {
        let bytes = tokio::task::spawn_blocking(move || {
            let mut bytes = Vec::new();
            page.write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )?;
            Ok::<_, SheetError>(bytes)
        })
        .await??;

        let path = dir.join(format!("page{}.png", index + 1));
        tokio::fs::write(&path, bytes).await?;
        written.push(path);
    }

    log::info!("Generated images: {}", dir.display());
    Ok(written)
}
