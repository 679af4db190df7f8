//! Ticket Assembly
//!
//! Lays the QR code and the purchase metadata out on a fixed SVG template.

use crate::domain::value_objects::TicketNumber;
use chrono::{DateTime, NaiveDate, Utc};
use platform::qr::EncodedCode;

const TICKET_WIDTH: u32 = 320;
const TICKET_HEIGHT: u32 = 620;
/// Top-left corner of the embedded code
const CODE_ORIGIN: (u32, u32) = (40, 280);
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Metadata printed on the ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetails {
    pub ticket_number: TicketNumber,
    pub holder_name: String,
    pub band_name: String,
    pub venue: String,
    pub city: String,
    pub event_date: NaiveDate,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// A rendered ticket document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub ticket_number: TicketNumber,
    pub svg: String,
}

impl Ticket {
    pub const CONTENT_TYPE: &'static str = "image/svg+xml";
}

/// Assemble the ticket document. Deterministic for equal inputs.
pub fn assemble(code: &EncodedCode, details: &TicketDetails) -> Ticket {
    let mut svg = String::with_capacity(code.svg().len() + 1024);

    svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    svg.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" "#);
    svg.push_str(&format!(
        r#"width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = TICKET_WIDTH,
        h = TICKET_HEIGHT,
    ));

    // Frame
    svg.push_str(r#"<rect x="10" y="10" width="300" height="600" fill="gray"/>"#);
    svg.push_str(r#"<rect x="12" y="12" width="296" height="596" fill="white"/>"#);
    text_line(&mut svg, 100, 80, 25, "Ticketless");

    let lines = [
        (130, details.band_name.clone()),
        (155, format!("{}, {}", details.venue, details.city)),
        (180, details.event_date.format("%Y-%m-%d").to_string()),
        (215, details.holder_name.clone()),
        (240, format!("Ticket #{}", details.ticket_number)),
    ];
    for (y, text) in &lines {
        text_line(&mut svg, 30, *y, 14, text);
    }

    svg.push_str(&format!(
        r#"<g transform="translate({} {})">{}</g>"#,
        CODE_ORIGIN.0,
        CODE_ORIGIN.1,
        code.svg_element()
    ));

    text_line(
        &mut svg,
        30,
        560,
        10,
        &format!("Valid from {}", details.valid_from.format("%Y-%m-%d %H:%M UTC")),
    );
    text_line(
        &mut svg,
        30,
        575,
        10,
        &format!("Valid until {}", details.valid_until.format("%Y-%m-%d %H:%M UTC")),
    );

    svg.push_str("</svg>");

    Ticket {
        ticket_number: details.ticket_number,
        svg,
    }
}

fn text_line(svg: &mut String, x: u32, y: u32, size: u32, text: &str) {
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="{size}">{}</text>"#,
        escape_xml(text)
    ));
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
