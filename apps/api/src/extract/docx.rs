//! DOCX text extraction.
//!
//! A .docx file is a zip archive; the document body lives in
//! `word/document.xml`. Text content sits inside `<w:t>` runs, grouped into
//! `<w:p>` paragraphs.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::ExtractError;

fn malformed(message: impl ToString) -> ExtractError {
    ExtractError::Malformed {
        kind: "DOCX",
        message: message.to_string(),
    }
}

/// Extracts the raw text content of a DOCX document, one line per paragraph.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let cursor = Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor).map_err(malformed)?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(malformed)?
        .read_to_string(&mut document_xml)
        .map_err(malformed)?;

    let mut reader = Reader::from_str(&document_xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text_run {
                    text.push_str(&unescape_xml(&String::from_utf8_lossy(e.as_ref())));
                }
            }
            // Predefined entities arrive as separate reference events.
            Ok(Event::GeneralRef(e)) => {
                if in_text_run {
                    match e.as_ref() {
                        b"amp" => text.push('&'),
                        b"lt" => text.push('<'),
                        b"gt" => text.push('>'),
                        b"quot" => text.push('"'),
                        b"apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Resolves the five predefined XML entities; `&amp;` last so it does not
/// re-expand the others.
fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
