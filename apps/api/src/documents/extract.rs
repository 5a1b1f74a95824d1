//! Text extraction — uploaded document bytes → plain text.
//!
//! The keyword core only ever sees the resulting string. A document that yields
//! no text (e.g. a scanned PDF) comes back as `""`, not as an error; only
//! unreadable files are errors.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

static DOCX_PARAGRAPH_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").unwrap());
static DOCX_TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").unwrap());
static XML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Picks the format from the file extension, falling back to the content type.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let by_extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
                "pdf" => Some(DocumentFormat::Pdf),
                "docx" => Some(DocumentFormat::Docx),
                "txt" | "text" | "md" => Some(DocumentFormat::Txt),
                _ => None,
            });

        by_extension.or_else(|| {
            let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
            match mime.as_str() {
                "application/pdf" => Some(DocumentFormat::Pdf),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    Some(DocumentFormat::Docx)
                }
                "text/plain" | "text/markdown" => Some(DocumentFormat::Txt),
                _ => None,
            }
        })
    }
}

/// A file received from a client, before extraction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn format(&self) -> Result<DocumentFormat, AppError> {
        DocumentFormat::detect(self.file_name.as_deref(), self.content_type.as_deref()).ok_or_else(
            || {
                AppError::UnsupportedFormat(format!(
                    "'{}' is not a PDF, DOCX or TXT document",
                    self.file_name.as_deref().unwrap_or("upload")
                ))
            },
        )
    }
}

/// Converts an uploaded document to plain text.
///
/// Carried in `AppState` as `Arc<dyn TextExtractor>` so tests and alternative
/// backends (OCR, remote services) can stand in for the default.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, AppError>;
}

/// Default extractor: PDF via `pdf-extract`, DOCX via its XML body, TXT as UTF-8.
pub struct FileTextExtractor;

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, AppError> {
        let format = document.format()?;
        let text = match format {
            DocumentFormat::Pdf => {
                let bytes = document.bytes.clone();
                // pdf-extract is CPU-bound and may panic on malformed input; keep it off the executor.
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .map_err(|e| AppError::Extraction(format!("PDF extraction aborted: {e}")))?
                    .map_err(|e| AppError::Extraction(format!("Failed to read PDF: {e}")))?
            }
            DocumentFormat::Docx => extract_docx(&document.bytes)?,
            DocumentFormat::Txt => extract_txt(&document.bytes),
        };

        debug!(
            "Extracted {} chars from {:?} ({:?})",
            text.chars().count(),
            document.file_name,
            format
        );
        Ok(text)
    }
}

fn extract_txt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(text.as_ref()).to_string()
}

fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Extraction(format!("Not a valid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Extraction(format!("DOCX has no document body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Extraction(format!("Failed to read DOCX body: {e}")))?;

    Ok(docx_xml_to_text(&xml))
}

/// Paragraph and line-break elements become newlines; all other markup is dropped.
fn docx_xml_to_text(xml: &str) -> String {
    let text = DOCX_PARAGRAPH_END.replace_all(xml, "\n");
    let text = DOCX_TAB.replace_all(&text, "\t");
    let text = XML_TAG.replace_all(&text, "");
    let text = decode_xml_entities(&text);
    text.trim_end_matches('\n').to_string()
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
