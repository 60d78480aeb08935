//! The synthesis pipeline: contact record in, PNG bytes out.
//!
//! ```text
//! DesignOptions ──validate──▶ Design
//! ContactRecord ──vcard::encode──▶ payload
//!     payload ──matrix::encode──▶ QrMatrix (version, used ECC)
//!     QrMatrix ──render──▶ canvas
//!     canvas ──composite (optional)──▶ canvas
//!     canvas ──PNG──▶ bytes
//! ```
//!
//! Validation runs before anything else, so a malformed design costs nothing.
//! Validation, encoding and capacity failures abort the call. A logo failure
//! never does: the compositor's error is logged and the unbranded canvas is
//! used instead.
//!
//! Every call owns its inputs and intermediates outright, so calls can run on
//! as many threads as the host likes. [`synthesize_all`] does exactly that for
//! batches.

use crate::config::{Design, DesignOptions};
use crate::contact::ContactRecord;
use crate::error::{Result, SynthesisError};
use crate::imaging::{self, DefaultLogoSource, LogoSource};
use crate::matrix::{self, EcLevel};
use crate::vcard;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use rayon::prelude::*;

/// A finished code.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// PNG-encoded image.
    pub png: Vec<u8>,
    /// Side of the square image, in pixels.
    pub width: u32,
    /// QR version (1–40) chosen for the payload.
    pub version: u8,
    pub requested_ecc: EcLevel,
    /// Level the symbol was actually built at; weaker than requested when the
    /// payload did not fit.
    pub used_ecc: EcLevel,
    /// Whether a logo was composited. `false` both when none was configured
    /// and when it could not be loaded.
    pub logo_applied: bool,
}

impl Synthesis {
    pub fn ecc_degraded(&self) -> bool {
        self.used_ecc != self.requested_ecc
    }
}

/// Synthesize a contact QR code, fetching any logo with the default source.
pub fn synthesize(record: &ContactRecord, options: &DesignOptions) -> Result<Synthesis> {
    synthesize_with(record, options, &DefaultLogoSource::default())
}

/// Synthesize a contact QR code, fetching any logo through `source`.
pub fn synthesize_with(
    record: &ContactRecord,
    options: &DesignOptions,
    source: &impl LogoSource,
) -> Result<Synthesis> {
    let design = options.validate()?;
    let payload = vcard::encode(record)?;
    log::debug!(
        "encoded contact {} as {} byte payload",
        record.display_name(),
        payload.len()
    );
    synthesize_payload(&payload, &design, source)
}

/// Synthesize a tracked code that encodes `{base_url}/r/{tracking_id}`
/// instead of the full card.
pub fn synthesize_redirect(
    base_url: &str,
    record: &ContactRecord,
    options: &DesignOptions,
    source: &impl LogoSource,
) -> Result<Synthesis> {
    let design = options.validate()?;
    let url = vcard::redirect_url(base_url, record)?;
    log::debug!("encoding redirect {url} for {}", record.display_name());
    synthesize_payload(&url, &design, source)
}

/// Synthesize every record in parallel.
///
/// Results are returned in input order; one failing record does not affect
/// the others.
pub fn synthesize_all(
    records: &[ContactRecord],
    options: &DesignOptions,
    source: &impl LogoSource,
) -> Vec<Result<Synthesis>> {
    records
        .par_iter()
        .map(|record| synthesize_with(record, options, source))
        .collect()
}

fn synthesize_payload(
    payload: &str,
    design: &Design,
    source: &impl LogoSource,
) -> Result<Synthesis> {
    let matrix = matrix::encode(payload, design.error_correction)?;
    let canvas = imaging::render(&matrix, design)?;

    let (canvas, logo_applied) = match &design.logo {
        None => (canvas, false),
        Some(logo) => match imaging::composite(&canvas, logo, source) {
            Ok(branded) => (branded, true),
            Err(err) => {
                log::warn!("continuing without logo {}: {err}", logo.location);
                (canvas, false)
            }
        },
    };

    Ok(Synthesis {
        png: encode_png(&canvas)?,
        width: canvas.width(),
        version: matrix.version(),
        requested_ecc: design.error_correction,
        used_ecc: matrix.ecc(),
        logo_applied,
    })
}

fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| SynthesisError::Png(e.to_string()))?;
    Ok(png)
}
