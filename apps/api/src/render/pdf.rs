//! Plain-text to PDF export.
//!
//! Writes one text block per laid-out line in Helvetica (WinAnsiEncoding), so no
//! font embedding is needed. Layout lives in `crate::layout`; this file only
//! turns pages of lines into PDF objects.

use anyhow::{Context, Result};
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::layout::{encoding, layout_lines, paginate, FontMetricTable, PageConfig};

pub const PDF_FILE_NAME: &str = "Optimized_Resume.pdf";
pub const PDF_MIME: &str = "application/pdf";

const FONT_RESOURCE: &str = "F1";

/// Renders `text` as a paginated PDF. Never fails on content: unencodable
/// characters are stripped line by line. Errors only come from serialization.
pub fn text_to_pdf(text: &str, metrics: &FontMetricTable, config: &PageConfig) -> Result<Bytes> {
    let pages = paginate(layout_lines(text, metrics, config), config);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => metrics.base_font,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let page_id = add_page(&mut doc, pages_id, resources_id, lines, config)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                (config.page_width_pt.round() as i64).into(),
                (config.page_height_pt.round() as i64).into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Optimized Resume"),
        "Producer" => Object::string_literal(concat!("optimizer ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).context("failed to serialize PDF")?;
    Ok(Bytes::from(buffer))
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    lines: &[String],
    config: &PageConfig,
) -> Result<ObjectId> {
    let x = config.margin_left_pt.round() as i64;
    // Baseline sits in the middle of the line box, nudged down by 0.3 em.
    let first_baseline =
        config.page_height_pt - config.margin_top_pt - config.line_height_pt / 2.0 - 0.3 * config.font_size_pt;

    let mut operations = Vec::with_capacity(lines.len() * 5);
    for (idx, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = (first_baseline - idx as f32 * config.line_height_pt).round() as i64;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), (config.font_size_pt.round() as i64).into()],
        ));
        operations.push(Operation::new("Td", vec![x.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encoding::encode(line))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().context("failed to encode page content")?,
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
        "Contents" => content_id,
    }))
}
