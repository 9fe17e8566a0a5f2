//! Fixed single-page layout for an exported contact record.
//!
//! Coordinates are millimetres on an A4 page with the origin at the top-left
//! corner; text `y` is the baseline. The PDF renderer converts to points.

use lopdf::Stream;
use shared_types::ContactRecord;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
pub const PHOTO_SIZE: f32 = 40.0;

pub const TITLE: &str = "REGISTRATION FORM";
pub const PHOTO_CAPTION: &str = "PROFILE PHOTO";
pub const SECTION_TITLE: &str = "PERSONAL DATA";
pub const NOT_INFORMED: &str = "(not informed)";
pub const FOOTER_CAPTION: &str = "regform - Contact registration form";
pub const REQUIRED_LEGEND: &str = "* Required fields";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(0, 133, 66);
    pub const YELLOW: Rgb = Rgb(253, 200, 47);
    pub const GREY: Rgb = Rgb(117, 120, 123);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone)]
pub enum Element {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        align: Align,
    },
    Image {
        x: f32,
        y: f32,
        size: f32,
        image: Stream,
    },
}

/// Values stamped on the page at generation time
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub generated_at: String,
    pub document_id: i64,
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_image(&self) -> bool {
        self.elements
            .iter()
            .any(|element| matches!(element, Element::Image { .. }))
    }
}

struct LayoutBuilder {
    elements: Vec<Element>,
    y: f32,
}

impl LayoutBuilder {
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.elements.push(Element::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, bold: bool, color: Rgb, align: Align) {
        self.elements.push(Element::Text {
            text: text.into(),
            x,
            y,
            size,
            bold,
            color,
            align,
        });
    }

    fn field(&mut self, label: &str, value: &str, required: bool) {
        let label = if required {
            format!("{label} *")
        } else {
            label.to_string()
        };
        let value = if value.is_empty() { NOT_INFORMED } else { value };

        self.text(label, MARGIN, self.y, 11.0, true, Rgb::GREY, Align::Left);
        self.text(value, MARGIN, self.y + 8.0, 12.0, false, Rgb::BLACK, Align::Left);
        self.y += 20.0;
    }
}

/// Lays out `record` on one page. `photo` is the already decoded image; when it
/// is `None` the photo block is left out and nothing below it moves down.
pub fn build_layout(record: &ContactRecord, info: &DocumentInfo, photo: Option<Stream>) -> PageLayout {
    let mut page = LayoutBuilder {
        elements: Vec::new(),
        y: 0.0,
    };

    // Header
    page.rect(0.0, 0.0, PAGE_WIDTH, 25.0, Rgb::GREEN);
    page.text(TITLE, PAGE_WIDTH / 2.0, 15.0, 18.0, true, Rgb::WHITE, Align::Center);

    page.y = 40.0;
    page.text(
        format!("Generated at: {}", info.generated_at),
        PAGE_WIDTH - MARGIN,
        page.y,
        10.0,
        false,
        Rgb::BLACK,
        Align::Right,
    );
    page.y += 20.0;

    if let Some(image) = photo {
        page.elements.push(Element::Image {
            x: MARGIN,
            y: page.y,
            size: PHOTO_SIZE,
            image,
        });
        page.text(
            PHOTO_CAPTION,
            MARGIN + PHOTO_SIZE + 10.0,
            page.y + 10.0,
            12.0,
            true,
            Rgb::BLACK,
            Align::Left,
        );
        page.y += PHOTO_SIZE + 15.0;
    }

    // Personal data section
    page.rect(
        MARGIN - 5.0,
        page.y - 5.0,
        PAGE_WIDTH - MARGIN * 2.0 + 10.0,
        15.0,
        Rgb::YELLOW,
    );
    page.text(SECTION_TITLE, MARGIN, page.y + 5.0, 14.0, true, Rgb::BLACK, Align::Left);
    page.y += 25.0;

    page.field("Name", &record.name, true);
    page.field("Email", &record.email, true);
    page.field("Phone", &record.phone, true);
    page.field("Postal code", &record.postal_code, false);
    page.field("Address", &record.address, false);

    // Footer
    page.y += 20.0;
    page.rect(0.0, page.y, PAGE_WIDTH, 15.0, Rgb::GREEN);
    page.text(
        FOOTER_CAPTION,
        PAGE_WIDTH / 2.0,
        page.y + 8.0,
        10.0,
        false,
        Rgb::WHITE,
        Align::Center,
    );

    page.y += 25.0;
    page.text(REQUIRED_LEGEND, MARGIN, page.y, 8.0, false, Rgb::GREY, Align::Left);
    page.text(
        format!("Document ID: {}", info.document_id),
        PAGE_WIDTH - MARGIN,
        page.y,
        8.0,
        false,
        Rgb::GREY,
        Align::Right,
    );

    PageLayout {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        elements: page.elements,
    }
}
