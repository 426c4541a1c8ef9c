//! DOCX text extraction.
//!
//! A .docx file is a ZIP container; the document body lives in
//! `word/document.xml`. Paragraph boundaries become newlines and the
//! remaining markup is stripped, which is enough for downstream word
//! chunking (layout is irrelevant to the pipeline).

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::ExtractionError;

static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("xml tag pattern should compile"));

/// Extract the body text of a DOCX document.
pub fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        ExtractionError::ExtractionFailed(format!("not a DOCX container: {}", e))
    })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| {
            ExtractionError::ExtractionFailed(format!("no word/document.xml in container: {}", e))
        })?
        .read_to_string(&mut xml)?;

    Ok(strip_document_xml(&xml))
}

/// Reduce WordprocessingML to plain text.
fn strip_document_xml(xml: &str) -> String {
    // Paragraph and line-break tags become newlines before tags are dropped
    let with_breaks = xml
        .replace("</w:p>", "\n")
        .replace("<w:br/>", "\n")
        .replace("<w:tab/>", "\t");
    let stripped = XML_TAG.replace_all(&with_breaks, "");

    decode_xml_entities(&stripped)
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    #[test]
    fn test_strip_document_xml() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>WHEREAS, the parties agree;</w:t></w:r></w:p><w:p><w:r><w:t>NOW &amp; THEREFORE</w:t></w:r></w:p></w:body></w:document>"#;
        let text = strip_document_xml(xml);
        assert_eq!(text, "WHEREAS, the parties agree;\nNOW & THEREFORE");
    }

    #[test]
    fn test_extract_docx_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agreement.docx");

        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"<w:document><w:body><w:p><w:t>Master Services Agreement</w:t></w:p></w:body></w:document>")
            .unwrap();
        writer.finish().unwrap();

        let text = extract_docx(&path).unwrap();
        assert_eq!(text, "Master Services Agreement");
    }

    #[test]
    fn test_not_a_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "plain text pretending").unwrap();

        let err = extract_docx(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }
}
