use encoding_rs::WINDOWS_1252;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use super::layout::{Align, Element, PageLayout, Rgb};
use super::ExportError;

const PT_PER_MM: f32 = 72.0 / 25.4;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

fn mm(value: f32) -> f32 {
    value * PT_PER_MM
}

/// Approximate rendered width in millimetres, used for centre/right alignment.
fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => u32::from(HELVETICA_WIDTHS[(code - 32) as usize]),
            _ => 556,
        })
        .sum();
    let factor = if bold { 1.05 } else { 1.0 };
    units as f32 / 1000.0 * size * factor / PT_PER_MM
}

/// Encodes text for the standard fonts' WinAnsiEncoding; unmappable
/// characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let (encoded, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if had_errors {
            bytes.push(b'?');
        } else {
            bytes.extend_from_slice(&encoded);
        }
    }
    bytes
}

fn color_operands(color: Rgb) -> Vec<Object> {
    [color.0, color.1, color.2]
        .iter()
        .map(|channel| Object::Real(f32::from(*channel) / 255.0))
        .collect()
}

/// Renders the layout to a single-page PDF.
pub fn render(layout: &PageLayout) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let page_height = layout.height;
    let mut xobjects = Dictionary::new();
    let mut operations = Vec::new();

    for (index, element) in layout.elements.iter().enumerate() {
        match element {
            Element::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new(
                    "re",
                    vec![
                        mm(*x).into(),
                        mm(page_height - y - height).into(),
                        mm(*width).into(),
                        mm(*height).into(),
                    ],
                ));
                operations.push(Operation::new("f", vec![]));
            }
            Element::Text {
                text,
                x,
                y,
                size,
                bold,
                color,
                align,
            } => {
                let width = text_width(text, *size, *bold);
                let left = match align {
                    Align::Left => *x,
                    Align::Center => x - width / 2.0,
                    Align::Right => x - width,
                };
                let font = if *bold { BOLD_FONT } else { REGULAR_FONT };

                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![font.into(), (*size).into()]));
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new(
                    "Td",
                    vec![mm(left).into(), mm(page_height - y).into()],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            Element::Image { x, y, size, image } => {
                let name = format!("Im{index}");
                let image_id = doc.add_object(image.clone());
                xobjects.set(name.as_bytes().to_vec(), image_id);

                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        mm(*size).into(),
                        0.into(),
                        0.into(),
                        mm(*size).into(),
                        mm(*x).into(),
                        mm(page_height - y - size).into(),
                    ],
                ));
                operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::Render(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
        "XObject" => xobjects,
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            mm(layout.width).into(),
            mm(layout.height).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Render(e.to_string()))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::{build_layout, DocumentInfo};
    use shared_types::ContactRecord;

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(win_ansi("Endereço"), b"Endere\xe7o".to_vec());
        assert_eq!(win_ansi("São"), b"S\xe3o".to_vec());
        assert_eq!(win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = text_width("Document ID", 8.0, false);
        let large = text_width("Document ID", 16.0, false);
        assert!((large - small * 2.0).abs() < 0.001);
        assert!(text_width("W", 10.0, false) > text_width("i", 10.0, false));
        assert_eq!(text_width("", 10.0, true), 0.0);
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let record = ContactRecord {
            name: "João da Silva".to_string(),
            email: "joao@example.com".to_string(),
            phone: "(11) 99999-8888".to_string(),
            postal_code: "01310-100".to_string(),
            address: "Avenida Paulista, Bela Vista, São Paulo, SP".to_string(),
            ..Default::default()
        };
        let info = DocumentInfo {
            generated_at: "18/10/2026, 14:30:00".to_string(),
            document_id: 42,
        };

        let bytes = render(&build_layout(&record, &info, None)).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
