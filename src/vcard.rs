//! Contact-card payload encoding (vCard 3.0 line grammar).
//!
//! The payload is what a phone's camera app hands to its contacts importer,
//! so it has to stay parseable by stock readers while staying as short as
//! possible: every extra byte can push the symbol up a version.
//!
//! ## Line order
//!
//! ```text
//! BEGIN:VCARD
//! VERSION:3.0
//! N:Doe;John;;;
//! FN:John Doe
//! PHOTO;VALUE=URI:https://…      (http/https only)
//! TEL;CELL:+919876543210
//! TEL;WORK:+912240001234
//! EMAIL:john@x.com
//! ORG:…
//! TITLE:…
//! URL:…
//! ADR:;;street;city;state;zip;country
//! NOTE:line one\nline two
//! END:VCARD
//! ```
//!
//! Lines are CRLF-separated with no trailing break. Output depends only on
//! the record, so the same record always yields byte-identical text.

use crate::contact::{ContactRecord, present};
use crate::error::{EncodingError, Result, ValidationError};
use crate::phone;

const LINE_BREAK: &str = "\r\n";

/// Encode a record into vCard text.
pub fn encode(record: &ContactRecord) -> Result<String> {
    let first = required(&record.first_name, "first_name")?;
    let last = required(&record.last_name, "last_name")?;

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", escape_text(last), escape_text(first)),
        format!("FN:{}", escape_text(&format!("{first} {last}"))),
    ];

    if let Some(photo) = present(&record.profile_picture) {
        if is_web_url(photo) {
            lines.push(format!(
                "PHOTO;VALUE=URI:{}",
                single_line(photo, "profile_picture")?
            ));
        } else {
            log::debug!("skipping inline profile picture for {first} {last}");
        }
    }

    if let Some(mobile) = present(&record.mobile_number) {
        let number = phone::normalize(mobile).map_err(|e| e.in_field("mobile_number"))?;
        lines.push(format!("TEL;CELL:{number}"));
    }
    if let Some(work) = present(&record.work_number) {
        let number = phone::normalize(work).map_err(|e| e.in_field("work_number"))?;
        lines.push(format!("TEL;WORK:{number}"));
    }

    if let Some(email) = present(&record.email) {
        lines.push(format!("EMAIL:{}", single_line(email, "email")?));
    }
    if let Some(company) = present(&record.company) {
        lines.push(format!("ORG:{}", escape_text(company)));
    }
    if let Some(title) = present(&record.title) {
        lines.push(format!("TITLE:{}", escape_text(title)));
    }
    if let Some(website) = present(&record.website) {
        lines.push(format!("URL:{}", single_line(website, "website")?));
    }

    if let Some(address) = record.address.as_ref().filter(|a| !a.is_empty()) {
        // Post office box and extended address are never collected.
        let parts = [
            "",
            "",
            address.street.trim(),
            address.city.trim(),
            address.state.trim(),
            address.zip_code.trim(),
            address.country.trim(),
        ];
        let segments: Vec<String> = parts.iter().map(|p| escape_text(p)).collect();
        lines.push(format!("ADR:{}", segments.join(";")));
    }

    if let Some(notes) = present(&record.notes) {
        lines.push(format!("NOTE:{}", escape_text(notes)));
    }

    lines.push("END:VCARD".to_string());
    Ok(lines.join(LINE_BREAK))
}

/// Build the tracked short URL `{base}/r/{tracking_id}`.
///
/// Scanning it lands on the calling service, which records the scan and
/// serves the card. Fails when the record has no tracking id.
pub fn redirect_url(base_url: &str, record: &ContactRecord) -> Result<String> {
    let id = present(&record.tracking_id).ok_or(EncodingError::MissingField("tracking_id"))?;
    Ok(format!("{}/r/{}", base_url.trim().trim_end_matches('/'), id))
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EncodingError::MissingField(field).into());
    }
    Ok(value)
}

/// URI and address values are written unescaped, so a line break in one
/// would start a new property.
fn single_line<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.contains(['\r', '\n']) {
        return Err(ValidationError::LineBreak {
            field,
            value: value.to_string(),
        }
        .into());
    }
    Ok(value)
}

fn is_web_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Escape a TEXT value: backslash, comma and semicolon are backslash-escaped,
/// newlines become a literal `\n`, carriage returns are dropped.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
