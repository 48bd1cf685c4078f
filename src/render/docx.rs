/*!
 * DOCX assembly for generated lesson notes.
 *
 * Walks the normalized line sequence, classifies each line (activity
 * headers, markdown headings, bullets, table rows, blanks, prose), and
 * serializes the result as WordprocessingML inside a ZIP container,
 * which is all a `.docx` file is.
 */

use std::io::Write;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::errors::RenderError;
use crate::render::markdown::{parse_line, TextToken};
use crate::render::normalize::{split_logical_lines, strip_trailing_orphan_bold};

/// Activity-style heading: Activity/Step/Part/Phase/Group + number at line start
static ACTIVITY_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Activity|Step|Part|Phase|Group)\s+\d+").unwrap()
});

/// Markdown heading marker at line start
static MD_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#{1,6}\s+").unwrap()
});

/// Bullet marker at line start
static BULLET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-*]\s+").unwrap()
});

/// Table separator row content: only dashes, colons, pipes and whitespace
static SEPARATOR_ROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s|:\-]+$").unwrap()
});

/// Metadata attached to the rendered document header.
///
/// Immutable once generation completes; the assembler only reads it.
#[derive(Debug, Clone, Default)]
pub struct NoteMetadata {
    /// Subject name, e.g. "Science"
    pub subject: String,
    /// Level / class, e.g. "Basic 4"
    pub level: String,
    /// Curriculum strand
    pub strand: String,
    /// Curriculum sub-strand
    pub sub_strand: String,
    /// Content standard identifier
    pub content_standard: String,
    /// Name of the note template used for generation
    pub template_name: String,
}

/// One structural element of the assembled document
#[derive(Debug, Clone, PartialEq)]
pub enum DocxBlock {
    /// A paragraph of styled runs; `heading` forces bold on every run
    Paragraph {
        /// Inline runs of the paragraph
        tokens: Vec<TextToken>,
        /// Whether the whole paragraph renders bold
        heading: bool,
    },
    /// A table of cell strings, rows in input order
    Table {
        /// Table rows; each row is an ordered list of cell strings
        rows: Vec<Vec<String>>,
    },
    /// An empty paragraph preserving vertical spacing
    Spacer,
}

/// An assembled document, ready for serialization
#[derive(Debug, Clone)]
pub struct DocxDocument {
    /// Header metadata
    pub metadata: NoteMetadata,
    /// Body blocks in order
    pub blocks: Vec<DocxBlock>,
}

/// Assemble a document from lesson metadata and the raw completion text.
pub fn assemble(metadata: &NoteMetadata, raw_text: &str) -> DocxDocument {
    let lines = split_logical_lines(raw_text);

    let mut blocks = Vec::new();
    let mut pending_rows: Vec<Vec<String>> = Vec::new();

    for line in &lines {
        let line = strip_trailing_orphan_bold(line);
        let trimmed = line.trim();

        if let Some(cells) = parse_table_row(trimmed) {
            if !is_separator_row(&cells) {
                pending_rows.push(cells);
            }
            continue;
        }

        // Non-table line ends any accumulation
        flush_table(&mut blocks, &mut pending_rows);

        if trimmed.is_empty() {
            blocks.push(DocxBlock::Spacer);
        } else if ACTIVITY_HEADING_REGEX.is_match(trimmed) {
            blocks.push(DocxBlock::Paragraph {
                tokens: parse_line(trimmed),
                heading: true,
            });
        } else if let Some(m) = MD_HEADING_REGEX.find(trimmed) {
            blocks.push(DocxBlock::Paragraph {
                tokens: parse_line(&trimmed[m.end()..]),
                heading: true,
            });
        } else if let Some(m) = BULLET_REGEX.find(trimmed) {
            let bulleted = format!("\u{2022} {}", &trimmed[m.end()..]);
            blocks.push(DocxBlock::Paragraph {
                tokens: parse_line(&bulleted),
                heading: false,
            });
        } else {
            blocks.push(DocxBlock::Paragraph {
                tokens: parse_line(trimmed),
                heading: false,
            });
        }
    }

    // End of input flushes too
    flush_table(&mut blocks, &mut pending_rows);

    DocxDocument {
        metadata: metadata.clone(),
        blocks,
    }
}

/// Parse a `|...|` framed line into trimmed cell strings.
fn parse_table_row(trimmed: &str) -> Option<Vec<String>> {
    if trimmed.len() < 2 || !trimmed.starts_with('|') || !trimmed.ends_with('|') {
        return None;
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    Some(inner.split('|').map(|cell| cell.trim().to_string()).collect())
}

/// A row of only separator punctuation is layout, not data.
fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|cell| cell.is_empty() || SEPARATOR_ROW_REGEX.is_match(cell))
}

fn flush_table(blocks: &mut Vec<DocxBlock>, pending_rows: &mut Vec<Vec<String>>) {
    if !pending_rows.is_empty() {
        blocks.push(DocxBlock::Table {
            rows: std::mem::take(pending_rows),
        });
    }
}

impl DocxDocument {
    /// Serialize the document to a `.docx` binary blob.
    ///
    /// Any failure surfaces as one generic render error; there is no
    /// partial output.
    pub fn to_bytes(&self) -> Result<Bytes, RenderError> {
        let document_xml = self.document_xml();
        build_package(&document_xml)
            .map(Bytes::from)
            .map_err(|e| RenderError::Serialization(e.to_string()))
    }

    /// Render the main document part.
    fn document_xml(&self) -> String {
        let mut body = String::new();

        write_header(&mut body, &self.metadata);

        for block in &self.blocks {
            match block {
                DocxBlock::Paragraph { tokens, heading } => {
                    write_paragraph(&mut body, tokens, *heading);
                }
                DocxBlock::Table { rows } => {
                    write_table(&mut body, rows);
                }
                DocxBlock::Spacer => body.push_str("<w:p/>"),
            }
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    {body}
    <w:sectPr>
      <w:pgSz w:w="12240" w:h="15840"/>
      <w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>
      <w:cols w:space="708"/>
      <w:docGrid w:linePitch="360"/>
    </w:sectPr>
  </w:body>
</w:document>"#
        )
    }
}

/// Title paragraph plus a two-column metadata table.
fn write_header(body: &mut String, metadata: &NoteMetadata) {
    let title = if metadata.template_name.is_empty() {
        "Lesson Note".to_string()
    } else {
        metadata.template_name.clone()
    };
    write_paragraph(body, &[TextToken::bold(title)], true);

    let fields = [
        ("Subject", &metadata.subject),
        ("Class", &metadata.level),
        ("Strand", &metadata.strand),
        ("Sub-strand", &metadata.sub_strand),
        ("Content standard", &metadata.content_standard),
    ];

    let rows: Vec<Vec<String>> = fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| vec![label.to_string(), value.to_string()])
        .collect();

    if !rows.is_empty() {
        write_table(body, &rows);
        body.push_str("<w:p/>");
    }
}

fn write_paragraph(body: &mut String, tokens: &[TextToken], heading: bool) {
    if tokens.is_empty() {
        body.push_str("<w:p/>");
        return;
    }

    body.push_str("<w:p>");
    for token in tokens {
        write_run(body, token, heading);
    }
    body.push_str("</w:p>");
}

fn write_run(body: &mut String, token: &TextToken, force_bold: bool) {
    let bold = token.bold || force_bold;
    let italic = token.italic;

    body.push_str("<w:r>");
    if bold || italic {
        body.push_str("<w:rPr>");
        if bold {
            body.push_str("<w:b/>");
        }
        if italic {
            body.push_str("<w:i/>");
        }
        body.push_str("</w:rPr>");
    }
    body.push_str(r#"<w:t xml:space="preserve">"#);
    body.push_str(&xml_escape_text(&token.text));
    body.push_str("</w:t></w:r>");
}

fn write_table(body: &mut String, rows: &[Vec<String>]) {
    body.push_str(
        r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr>"#,
    );

    for row in rows {
        body.push_str("<w:tr>");
        for cell in row {
            body.push_str("<w:tc>");
            // Cell text goes through the same inline tokenizer as prose
            write_paragraph(body, &parse_line(cell), false);
            body.push_str("</w:tc>");
        }
        body.push_str("</w:tr>");
    }

    body.push_str("</w:tbl>");
}

/// Escape the five XML metacharacters; everything else passes through.
pub fn xml_escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Write the OPC package parts around the document part.
fn build_package(document_xml: &str) -> anyhow::Result<Vec<u8>> {
    let cursor = std::io::Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(cursor);
    let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", opt)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.add_directory("_rels/", opt)?;
    zip.start_file("_rels/.rels", opt)?;
    zip.write_all(RELS_XML.as_bytes())?;

    zip.add_directory("word/", opt)?;
    zip.add_directory("word/_rels/", opt)?;

    zip.start_file("word/document.xml", opt)?;
    zip.write_all(document_xml.as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", opt)?;
    zip.write_all(WORD_RELS_XML.as_bytes())?;

    zip.start_file("word/styles.xml", opt)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const WORD_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
</w:styles>"#;
