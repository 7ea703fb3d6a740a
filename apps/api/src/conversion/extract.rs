//! Local plain-text extraction, used when the converter runs in
//! `ATTACHMENT_MODE=extracted-text` instead of sending raw bytes.
//!
//! Both extractors are CPU-bound; callers run them under `spawn_blocking`.

use std::io::{Cursor, Read};

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::intake::MediaKind;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Extracts plain text from a PDF or DOCX held in memory.
pub fn extract_text(kind: MediaKind, bytes: &[u8]) -> Result<String> {
    let text = match kind {
        MediaKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .context("failed to extract text from PDF bytes")?,
        MediaKind::Docx => extract_docx_text(bytes)?,
    };

    let text = text.trim();
    if text.is_empty() {
        bail!("document contains no extractable text");
    }
    Ok(text.to_string())
}

/// Walks `word/document.xml`, keeping `<w:t>` runs and turning paragraph ends,
/// breaks and tabs into their plain-text equivalents.
fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("DOCX is not a valid zip archive")?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .with_context(|| format!("DOCX archive has no {DOCX_BODY_PART}"))?
        .read_to_string(&mut xml)
        .with_context(|| format!("failed to read {DOCX_BODY_PART}"))?;

    let mut reader = Reader::from_str(&xml);
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_text_run = false;
    // `<w:tabs>` holds tab-stop definitions, not tab characters.
    let mut in_tab_stops = false;

    loop {
        match reader
            .read_event()
            .with_context(|| format!("malformed XML in {DOCX_BODY_PART}"))?
        {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"tabs" => in_tab_stops = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"tabs" => in_tab_stops = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                out.push_str(&t.unescape().context("invalid text escape in DOCX")?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
