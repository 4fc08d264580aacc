//! End-to-end conversions against real image files, with every output read
//! back from disk: OOXML packages through `zip`, PDFs through `lopdf`.

use folder2doc::config::ConvertConfig;
use folder2doc::convert::{ConvertReport, OutputFormat, RunContext, convert_folder};
use folder2doc::extract::{ExtractError, extract};
use lopdf::Document;
use lopdf::content::Content;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixtures
// =========================================================================

fn write_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 90])
    })
    .save(path)
    .unwrap();
}

fn write_corrupt(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"\x89PNG\r\n\x1a\ntruncated").unwrap();
}

/// `Photos/` with three sections given out of order on disk, a folder
/// without images, a nested folder and a loose file in the root.
fn photo_folder(tmp: &TempDir) -> std::path::PathBuf {
    let root = tmp.path().join("Photos");
    write_image(&root.join("Zoo/lion.png"), 120, 80);
    write_image(&root.join("Beach/waves.jpg"), 1200, 600);
    write_image(&root.join("Beach/sand.png"), 60, 90);
    write_image(&root.join("City/night.bmp"), 40, 40);
    write_image(&root.join("City/deep/ignored.png"), 10, 10);
    std::fs::create_dir_all(root.join("Notes")).unwrap();
    std::fs::write(root.join("Notes/todo.txt"), "none").unwrap();
    write_image(&root.join("cover.png"), 10, 10);
    root
}

fn run(format: OutputFormat, source: &Path, output: &Path) -> ConvertReport {
    convert_folder(
        format,
        source,
        output,
        &ConvertConfig::default(),
        &RunContext::default(),
    )
    .unwrap()
}

fn zip_entry(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn zip_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Sheet names in workbook order.
fn sheet_names(xlsx: &Path) -> Vec<String> {
    let workbook = zip_entry(xlsx, "xl/workbook.xml");
    workbook
        .split("<sheet ")
        .skip(1)
        .filter_map(|chunk| {
            let start = chunk.find("name=\"")? + 6;
            let end = start + chunk[start..].find('"')?;
            Some(chunk[start..end].to_string())
        })
        .collect()
}

/// Text drawn on each PDF page.
fn pdf_texts(pdf: &Path) -> Vec<Vec<String>> {
    let doc = Document::load(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            Content::decode(&doc.get_page_content(id).unwrap())
                .unwrap()
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(lopdf::Object::String(bytes, _)) => {
                        Some(String::from_utf8_lossy(bytes).into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

// =========================================================================
// Excel
// =========================================================================

#[test]
fn excel_one_sheet_per_section_in_name_order() {
    let tmp = TempDir::new().unwrap();
    let source = photo_folder(&tmp);
    let out = tmp.path().join("images.xlsx");

    let report = run(OutputFormat::Excel, &source, &out);

    assert_eq!(report.sections, 3);
    assert_eq!(report.images, 4);
    assert_eq!(sheet_names(&out), vec!["Beach", "City", "Zoo"]);
    let media = zip_names(&out)
        .into_iter()
        .filter(|n| n.starts_with("xl/media/"))
        .count();
    assert_eq!(media, 4);
}

#[test]
fn excel_sheet_names_sanitized_and_unique() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src");
    let long = "a".repeat(40);
    write_image(&root.join(format!("{long}1")).join("x.png"), 10, 10);
    write_image(&root.join(format!("{long}2")).join("x.png"), 10, 10);
    write_image(&root.join("q?[1]").join("x.png"), 10, 10);
    let out = tmp.path().join("out.xlsx");

    run(OutputFormat::Excel, &root, &out);
    let names = sheet_names(&out);

    assert_eq!(
        names,
        vec!["a".repeat(31), format!("{}_2", "a".repeat(29)), "q__1_".to_string()]
    );
    // Titles keep the raw directory names
    let strings = zip_entry(&out, "xl/sharedStrings.xml");
    assert!(strings.contains("q?[1]"));
}

#[test]
fn excel_corrupt_image_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src");
    write_image(&root.join("a/1.png"), 20, 20);
    write_corrupt(&root.join("a/2.png"));
    write_image(&root.join("a/3.jpg"), 20, 20);
    let out = tmp.path().join("out.xlsx");

    let report = run(OutputFormat::Excel, &root, &out);

    assert_eq!(report.images, 2);
    assert_eq!(report.failed.len(), 1);
    let media = zip_names(&out)
        .into_iter()
        .filter(|n| n.starts_with("xl/media/"))
        .count();
    assert_eq!(media, 2);
}

#[test]
fn excel_no_subdirectories_placeholder() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("flat");
    write_image(&root.join("only.png"), 10, 10);
    let out = tmp.path().join("out.xlsx");

    let report = run(OutputFormat::Excel, &root, &out);

    assert_eq!(report.sections, 0);
    assert_eq!(sheet_names(&out), vec!["No Content"]);
    assert!(zip_entry(&out, "xl/sharedStrings.xml").contains("no subdirectories found"));
}

// =========================================================================
// Word
// =========================================================================

#[test]
fn word_headings_in_order() {
    let tmp = TempDir::new().unwrap();
    let source = photo_folder(&tmp);
    let out = tmp.path().join("images.docx");

    let report = run(OutputFormat::Word, &source, &out);
    let xml = zip_entry(&out, "word/document.xml");

    assert_eq!(report.images, 4);
    assert!(xml.contains("Photos - Image Document"));
    let positions: Vec<usize> = [">Beach<", ">City<", ">Zoo<"]
        .iter()
        .map(|h| xml.find(h).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!xml.contains("Notes"));
    let media = zip_names(&out)
        .into_iter()
        .filter(|n| n.starts_with("word/media/"))
        .count();
    assert_eq!(media, 4);
}

#[test]
fn word_empty_subdirectory_excluded() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src");
    std::fs::create_dir_all(root.join("empty")).unwrap();
    let out = tmp.path().join("out.docx");

    let report = run(OutputFormat::Word, &root, &out);

    assert_eq!(report.sections, 0);
    assert!(zip_entry(&out, "word/document.xml").contains("no subdirectories with images found"));
}

// =========================================================================
// PDF
// =========================================================================

#[test]
fn pdf_cover_then_sections() {
    let tmp = TempDir::new().unwrap();
    let source = photo_folder(&tmp);
    let out = tmp.path().join("images.pdf");

    run(OutputFormat::Pdf, &source, &out);
    let texts = pdf_texts(&out);

    assert_eq!(
        texts[0],
        vec![
            "Photos - Image Document",
            "Contents",
            "1. Beach (2 images)",
            "2. City (1 images)",
            "3. Zoo (1 images)",
        ]
    );
    let titles: Vec<&str> = texts[1..].iter().map(|p| p[0].as_str()).collect();
    assert_eq!(titles, vec!["Beach", "City", "Zoo"]);
}

#[test]
fn pdf_corrupt_image_annotated_run_succeeds() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src");
    write_image(&root.join("a/1.png"), 30, 30);
    write_corrupt(&root.join("a/2.png"));
    write_image(&root.join("a/3.png"), 30, 30);
    let out = tmp.path().join("out.pdf");

    let report = run(OutputFormat::Pdf, &root, &out);
    let texts = pdf_texts(&out);

    assert_eq!(report.images, 2);
    assert_eq!(
        texts[1],
        vec![
            "a",
            "Image 1: 1.png",
            "Failed to load image: 2.png",
            "Image 3: 3.png",
        ]
    );
}

#[test]
fn pdf_extract_round_trip_names() {
    let tmp = TempDir::new().unwrap();
    let source = photo_folder(&tmp);
    let pdf = tmp.path().join("images.pdf");
    run(OutputFormat::Pdf, &source, &pdf);

    let report = extract(&pdf, &tmp.path().join("extracted")).unwrap();
    let mut names: Vec<String> = report
        .images
        .iter()
        .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();

    // Page 1 is the cover; Beach holds two images on page 2.
    assert_eq!(
        names,
        vec![
            "page_2_img_1.png",
            "page_2_img_2.png",
            "page_3_img_1.png",
            "page_4_img_1.png",
        ]
    );
}

#[test]
fn extract_from_placeholder_pdf_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("empty");
    std::fs::create_dir_all(&root).unwrap();
    let pdf = tmp.path().join("empty.pdf");
    run(OutputFormat::Pdf, &root, &pdf);

    let result = extract(&pdf, &tmp.path().join("out"));
    assert!(matches!(result, Err(ExtractError::NoImages(_))));
}
