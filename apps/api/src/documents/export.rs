//! Document export — highlighted resume text → downloadable file.
//!
//! PDF output is a plain single-column layout: A4, Helvetica 12pt, greedy word
//! wrap measured with the standard Helvetica glyph widths, highlighted spans set
//! in Helvetica-Bold. Characters outside Latin-1 are replaced with `?`.

use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::keywords::EmphasisMarker;

const EXPORT_BASENAME: &str = "optimized_resume";

// A4 in points, 50pt margins.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 12;
const LEADING: i64 = 14;
/// Usable line width in 1/1000 em at `FONT_SIZE`.
const TEXT_WIDTH: u32 = ((PAGE_WIDTH - 2 * MARGIN) * 1000 / FONT_SIZE) as u32;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    #[serde(alias = "md")]
    Markdown,
    #[serde(alias = "txt")]
    Text,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Renders `text` (with emphasis markers) into the requested format.
/// CPU-bound for PDF; callers on the async executor should use `spawn_blocking`.
pub fn export_document(
    text: &str,
    format: ExportFormat,
    marker: &EmphasisMarker,
) -> Result<ExportedDocument, AppError> {
    let bytes = match format {
        ExportFormat::Pdf => render_pdf(text, marker)?,
        ExportFormat::Markdown => text.as_bytes().to_vec(),
        ExportFormat::Text => marker.strip(text).into_bytes(),
    };

    Ok(ExportedDocument {
        bytes: Bytes::from(bytes),
        content_type: format.content_type(),
        file_name: format!("{EXPORT_BASENAME}.{}", format.extension()),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Line layout
// ────────────────────────────────────────────────────────────────────────────

/// A character tagged with whether it sits inside a highlighted span.
type StyledChar = (char, bool);

/// Splits one line into styled characters, consuming the markers.
/// An unclosed opening marker is kept as literal text; an empty marker styles nothing.
fn style_line(line: &str, marker: &EmphasisMarker) -> Vec<StyledChar> {
    let mut out = Vec::new();
    let mut rest = line;
    if !marker.is_usable() {
        out.extend(rest.chars().map(|c| (c, false)));
        return out;
    }

    while let Some(start) = rest.find(&marker.open) {
        let after_open = &rest[start + marker.open.len()..];
        let Some(end) = after_open.find(&marker.close) else {
            break;
        };
        out.extend(rest[..start].chars().map(|c| (c, false)));
        out.extend(after_open[..end].chars().map(|c| (c, true)));
        rest = &after_open[end + marker.close.len()..];
    }
    out.extend(rest.chars().map(|c| (c, false)));
    out
}

// Helvetica and Helvetica-Bold advance widths (AFM, 1/1000 em) for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
/// Upper bound for the Latin-1 supplement (the widest glyph there is Æ).
const LATIN1_UPPER_WIDTH: u32 = 1000;

/// Advance width of one rendered glyph in 1/1000 em.
fn glyph_width(c: char, bold: bool) -> u32 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let code = u32::from(c);
    match code {
        0x20..=0x7E => u32::from(table[(code - 0x20) as usize]),
        0x80..=0xFF => LATIN1_UPPER_WIDTH,
        // rendered as '?'
        _ => u32::from(table[usize::from(b'?' - 0x20)]),
    }
}

fn line_width(line: &[StyledChar]) -> u32 {
    line.iter().map(|&(c, bold)| glyph_width(c, bold)).sum()
}

/// Number of leading characters that fit within `max_width`.
fn fitting_prefix(chars: &[StyledChar], max_width: u32) -> usize {
    let mut used = 0;
    for (i, &(c, bold)) in chars.iter().enumerate() {
        used += glyph_width(c, bold);
        if used > max_width {
            return i;
        }
    }
    chars.len()
}

/// Greedy wrap at the last space that keeps the line within `max_width`,
/// hard break when a word is wider than the line.
fn wrap_styled(chars: &[StyledChar], max_width: u32) -> Vec<Vec<StyledChar>> {
    let mut lines = Vec::new();
    let mut rest = chars;

    loop {
        let fit = fitting_prefix(rest, max_width);
        if fit == rest.len() {
            break;
        }
        let split = rest[..=fit]
            .iter()
            .rposition(|(c, _)| *c == ' ')
            .filter(|&i| i > 0)
            .unwrap_or(fit.max(1));
        lines.push(rest[..split].to_vec());
        rest = &rest[split..];
        while let Some((&(' ', _), tail)) = rest.split_first() {
            rest = tail;
        }
    }
    if !rest.is_empty() || lines.is_empty() {
        lines.push(rest.to_vec());
    }
    lines
}

/// Full text → wrapped, styled output lines.
fn layout_lines(text: &str, marker: &EmphasisMarker) -> Vec<Vec<StyledChar>> {
    let tab = " ".repeat(TAB_WIDTH);
    text.lines()
        .flat_map(|line| {
            let line = line.replace('\t', &tab);
            wrap_styled(&style_line(&line, marker), TEXT_WIDTH)
        })
        .collect()
}

/// Latin-1 bytes, unsupported characters replaced with `?`.
fn to_latin1(text: impl Iterator<Item = char>) -> Vec<u8> {
    text.map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Groups consecutive characters of the same style into runs.
fn runs(line: &[StyledChar]) -> Vec<(bool, Vec<u8>)> {
    let mut out: Vec<(bool, Vec<u8>)> = Vec::new();
    for chunk in line.chunk_by(|a, b| a.1 == b.1) {
        let bold = chunk[0].1;
        out.push((bold, to_latin1(chunk.iter().map(|(c, _)| *c))));
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// PDF assembly
// ────────────────────────────────────────────────────────────────────────────

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::Export(format!("PDF generation failed: {e}"))
}

fn page_operations(lines: &[Vec<StyledChar>]) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()]),
    ];

    for line in lines {
        for (bold, bytes) in runs(line) {
            let font = if bold { "F2" } else { "F1" };
            operations.push(Operation::new("Tf", vec![font.into(), FONT_SIZE.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(bytes)]));
        }
        operations.push(Operation::new("T*", vec![]));
    }

    operations.push(Operation::new("ET", vec![]));
    operations
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn render_pdf(text: &str, marker: &EmphasisMarker) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = add_font(&mut doc, "Helvetica");
    let bold = add_font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let lines = layout_lines(text, marker);
    let mut pages: Vec<&[Vec<StyledChar>]> = lines.chunks(LINES_PER_PAGE).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in pages {
        let content = Content {
            operations: page_operations(page_lines),
        };
        let encoded = content.encode().map_err(pdf_err)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(PAGE_WIDTH),
        Object::Integer(PAGE_HEIGHT),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(pdf_err)?;
    Ok(buf)
}
