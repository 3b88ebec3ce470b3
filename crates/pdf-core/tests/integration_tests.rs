//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use image::{DynamicImage, ImageBuffer, Rgb};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_core::{
    merge_documents, Color, FontFamily, ImageFormat, ImageXObject, PdfDocument, PdfError,
    StandardFont,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::io::Cursor;

/// Create a minimal valid PDF with the given number of pages
///
/// The MediaBox lives on the Pages node so every page inherits it.
fn create_test_pdf_with_pages(page_count: usize, content: &[u8]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for _ in 0..page_count {
        let contents_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
            "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
            "Resources" => dictionary! {},
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let image = ImageBuffer::from_pixel(width, height, Rgb([200u8, 180, 40]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&page];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// Page font resources as resource name -> BaseFont
fn page_fonts(bytes: &[u8], page: u32) -> BTreeMap<Vec<u8>, Vec<u8>> {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&page];
    let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();

    fonts
        .iter()
        .map(|(name, font_ref)| {
            let font = doc
                .get_object(font_ref.as_reference().unwrap())
                .unwrap()
                .as_dict()
                .unwrap();
            let base = font.get(b"BaseFont").unwrap().as_name().unwrap().to_vec();
            (name.clone(), base)
        })
        .collect()
}

#[test]
fn test_open_from_bytes() {
    let pdf_bytes = create_test_pdf_with_pages(1, b"");
    let doc = PdfDocument::open_from_bytes(&pdf_bytes).unwrap();
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn test_open_and_save_file() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.pdf");
    let output_path = dir.path().join("output.pdf");
    std::fs::write(&template_path, create_test_pdf_with_pages(2, b"")).unwrap();

    let mut doc = PdfDocument::open(&template_path).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.inner().get_pages().len(), 2);

    doc.insert_text("Saved", 2, 20.0, 30.0).unwrap();
    doc.save(&output_path).unwrap();

    let reopened = PdfDocument::open(&output_path).unwrap();
    assert_eq!(reopened.page_count(), 2);
    let saved = std::fs::read(&output_path).unwrap();
    assert!(page_content(&saved, 2).contains("<5361766564> Tj"));
    assert!(!page_content(&saved, 1).contains("Tj"));
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = PdfDocument::open(dir.path().join("missing.pdf"));
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_open_invalid_bytes() {
    let result = PdfDocument::open_from_bytes(b"not a pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_inherited_page_size() {
    let pdf_bytes = create_test_pdf_with_pages(2, b"");
    let doc = PdfDocument::open_from_bytes(&pdf_bytes).unwrap();
    assert_eq!(doc.page_size(2).unwrap(), (600.0, 800.0));
}

#[test]
fn test_page_from_png_template() {
    let png = create_test_png(600, 800);
    let xobject = ImageXObject::decode(&png, ImageFormat::Png).unwrap();
    let mut doc = PdfDocument::from_image(&xobject).unwrap();

    assert_eq!(doc.page_size(1).unwrap(), (600.0, 800.0));

    let bytes = doc.to_bytes().unwrap();
    let content = page_content(&bytes, 1);
    assert!(content.contains("600 0 0 800 0 0 cm"));
    assert!(content.contains("/Im1 Do"));
}

#[test]
fn test_insert_text_on_template() {
    let pdf_bytes = create_test_pdf_with_pages(1, b"0 0 1 rg");
    let mut doc = PdfDocument::open_from_bytes(&pdf_bytes).unwrap();

    doc.set_font(
        StandardFont::from_flags(FontFamily::Times, true, false),
        96.0,
    );
    doc.set_text_color(Color::rgb(0.7, 0.7, 0.7));
    let replaced = doc.insert_text("John Doe", 1, 300.0, 400.0).unwrap();
    assert_eq!(replaced, 0);

    let bytes = doc.to_bytes().unwrap();
    let content = page_content(&bytes, 1);

    // Existing content is isolated before the overlay
    assert!(content.starts_with("q\n0 0 1 rg"));
    assert!(content.contains("\nQ\nBT\n"));
    assert!(content.contains("0.7 0.7 0.7 rg"));
    assert!(content.contains("/SF1 96 Tf"));
    assert!(content.contains("300 400 Td"));
    assert!(content.contains("<4A6F686E20446F65> Tj"));

    let fonts = page_fonts(&bytes, 1);
    assert_eq!(fonts.len(), 1);
    assert_eq!(fonts[b"SF1".as_slice()], b"Times-Bold".to_vec());
}

#[test]
fn test_two_fonts_on_one_page() {
    let pdf_bytes = create_test_pdf_with_pages(1, b"");
    let mut doc = PdfDocument::open_from_bytes(&pdf_bytes).unwrap();

    doc.set_font(StandardFont::default(), 20.0);
    doc.insert_text("Name", 1, 10.0, 10.0).unwrap();
    doc.set_font(
        StandardFont::from_flags(FontFamily::Courier, false, true),
        10.0,
    );
    doc.insert_text("Date", 1, 10.0, 40.0).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let fonts = page_fonts(&bytes, 1);
    assert_eq!(fonts.len(), 2);
    assert_eq!(fonts[b"SF2".as_slice()], b"Courier-Oblique".to_vec());
}

#[test]
fn test_retain_first_page() {
    let pdf_bytes = create_test_pdf_with_pages(3, b"");
    let mut doc = PdfDocument::open_from_bytes(&pdf_bytes).unwrap();

    doc.retain_first_page().unwrap();
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.page_size(1).unwrap(), (600.0, 800.0));

    let bytes = doc.to_bytes().unwrap();
    let reopened = PdfDocument::open_from_bytes(&bytes).unwrap();
    assert_eq!(reopened.page_count(), 1);
    assert_eq!(reopened.page_size(1).unwrap(), (600.0, 800.0));
}

#[test]
fn test_retain_first_page_on_empty_document() {
    let mut doc = PdfDocument::empty();
    let result = doc.retain_first_page();
    assert!(matches!(result, Err(PdfError::InvalidPage(1, 0))));
}

#[test]
fn test_merge_preserves_order() {
    let inputs: Vec<Vec<u8>> = ["Alice", "Bob", "Carol"]
        .iter()
        .map(|name| {
            let mut doc =
                PdfDocument::open_from_bytes(&create_test_pdf_with_pages(1, b"")).unwrap();
            doc.insert_text(name, 1, 50.0, 50.0).unwrap();
            doc.to_bytes().unwrap()
        })
        .collect();

    let merged = merge_documents(&inputs).unwrap();
    let doc = PdfDocument::open_from_bytes(&merged).unwrap();
    assert_eq!(doc.page_count(), 3);

    assert!(page_content(&merged, 1).contains("<416C696365> Tj"));
    assert!(page_content(&merged, 2).contains("<426F62> Tj"));
    assert!(page_content(&merged, 3).contains("<4361726F6C> Tj"));

    // Inherited boxes survive the move into the new page tree
    assert_eq!(doc.page_size(3).unwrap(), (600.0, 800.0));
}

#[test]
fn test_merge_rejects_invalid_input() {
    let valid = create_test_pdf_with_pages(1, b"");
    let result = merge_documents(&[valid, b"garbage".to_vec()]);
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}
