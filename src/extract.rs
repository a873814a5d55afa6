use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Declared format of an uploaded notes file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    Txt,
}

impl SourceFormat {
    /// Unknown extensions are treated as plain text.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            SourceFormat::Pdf
        } else if lower.ends_with(".docx") {
            SourceFormat::Docx
        } else {
            SourceFormat::Txt
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction is not available here; paste the text instead")]
    PdfUnsupported,
    #[error("could not read the docx archive: {0}")]
    DocxArchive(#[from] zip::result::ZipError),
    #[error("could not parse the docx document: {0}")]
    DocxXml(#[from] quick_xml::Error),
    #[error("reading the archived document: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns the plain text of an uploaded file, or a reportable error the
/// surface turns into a "please upload or paste notes" prompt.
pub fn extract_text(format: SourceFormat, bytes: &[u8]) -> Result<String, ExtractError> {
    match format {
        SourceFormat::Txt => Ok(String::from_utf8_lossy(bytes).into_owned()),
        SourceFormat::Docx => extract_docx(bytes),
        SourceFormat::Pdf => Err(ExtractError::PdfUnsupported),
    }
}

/// Pulls the text runs out of `word/document.xml`, one line per paragraph.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut document = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut document)?;

    let mut reader = Reader::from_str(&document);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    loop {
        match reader.read_event()? {
            Event::End(end) if end.name().as_ref() == b"w:p" => {
                if !current.trim().is_empty() {
                    paragraphs.push(current.trim().to_string());
                }
                current.clear();
            }
            Event::Text(text) => current.push_str(&text.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current.trim().to_string());
    }
    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_file_name("Notes.PDF"), SourceFormat::Pdf);
        assert_eq!(
            SourceFormat::from_file_name("lecture.docx"),
            SourceFormat::Docx
        );
        assert_eq!(SourceFormat::from_file_name("notes.txt"), SourceFormat::Txt);
        assert_eq!(SourceFormat::from_file_name("mystery.bin"), SourceFormat::Txt);
        assert_eq!(SourceFormat::from_file_name("no_extension"), SourceFormat::Txt);
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = extract_text(SourceFormat::Txt, "some notes".as_bytes()).unwrap();
        assert_eq!(text, "some notes");
    }

    #[test]
    fn test_pdf_reports_an_error_instead_of_crashing() {
        assert!(matches!(
            extract_text(SourceFormat::Pdf, b"%PDF-1.4"),
            Err(ExtractError::PdfUnsupported)
        ));
    }

    #[test]
    fn test_corrupt_docx_reports_an_error() {
        assert!(extract_text(SourceFormat::Docx, b"not a zip archive").is_err());
    }

    fn fake_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_text_extraction() {
        let bytes = fake_docx(
            "<w:document><w:body>\
             <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>\
             <w:p></w:p>\
             </w:body></w:document>",
        );
        let text = extract_text(SourceFormat::Docx, &bytes).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }
}
