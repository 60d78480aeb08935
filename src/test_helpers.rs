//! Shared test utilities for the vcard-qr test suite.
//!
//! Provides sample records, synthetic logo images, and a small vCard line
//! reader used for round-trip checks.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let payload = vcard::encode(&full_record()).unwrap();
//! let props = parse_vcard(&payload);
//! assert_eq!(property(&props, "ORG").value, "Acme, Inc.");
//! ```

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage, RgbImage};

use crate::contact::{Address, ContactRecord};

// =========================================================================
// Sample records
// =========================================================================

/// The minimal end-to-end record: name, email and a 10-digit mobile.
pub fn john_doe() -> ContactRecord {
    let mut record = ContactRecord::new("John", "Doe");
    record.email = Some("john@x.com".into());
    record.mobile_number = Some("9876543210".into());
    record
}

/// A record with every optional field populated.
pub fn full_record() -> ContactRecord {
    ContactRecord {
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: Some("john@x.com".into()),
        mobile_number: Some("9876543210".into()),
        work_number: Some("022 4000 1234".into()),
        company: Some("Acme, Inc.".into()),
        title: Some("Engineer".into()),
        website: Some("https://john.example.com".into()),
        address: Some(Address {
            street: "1 Main St".into(),
            city: "Mumbai".into(),
            state: "MH".into(),
            zip_code: "400001".into(),
            country: "India".into(),
        }),
        notes: Some("Met at expo\r\nCall back".into()),
        profile_picture: Some("https://cdn.example.com/p/john.jpg".into()),
        tracking_id: None,
    }
}

// =========================================================================
// vCard reader
// =========================================================================

/// One content line of a vCard.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub name: String,
    /// Everything between the name and the colon, e.g. `CELL`.
    pub params: String,
    /// Value with text escapes undone.
    pub value: String,
}

/// Split a CRLF-separated vCard into properties, the way a contacts importer
/// reads it. Panics on a line without a colon.
pub fn parse_vcard(text: &str) -> Vec<Prop> {
    text.split("\r\n")
        .map(|line| {
            let (head, raw) = line
                .split_once(':')
                .unwrap_or_else(|| panic!("vCard line without ':': {line:?}"));
            let (name, params) = head.split_once(';').unwrap_or((head, ""));
            Prop {
                name: name.to_string(),
                params: params.to_string(),
                value: unescape(raw),
            }
        })
        .collect()
}

/// First property named `name`. Panics if absent.
pub fn property<'a>(props: &'a [Prop], name: &str) -> &'a Prop {
    props.iter().find(|p| p.name == name).unwrap_or_else(|| {
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        panic!("property '{name}' not found. Available: {names:?}")
    })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

// =========================================================================
// Images
// =========================================================================

/// Encode a solid `width × height` RGBA image as PNG bytes.
pub fn logo_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Write an opaque test logo to `path`.
pub fn write_test_logo(path: &Path, width: u32, height: u32) {
    std::fs::write(path, logo_png(width, height, [200, 30, 30, 255])).unwrap();
}

/// Decode PNG bytes produced by the pipeline.
pub fn decode_png(bytes: &[u8]) -> RgbImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .unwrap()
        .to_rgb8()
}
