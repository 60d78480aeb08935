//! # vcard-qr
//!
//! Styled QR codes for contact cards. A contact record goes in, a PNG comes
//! out: the record is encoded as vCard text, the text as a QR symbol, and the
//! symbol is drawn with brand colors, shaped modules, colored finder "eyes"
//! and an optional center logo.
//!
//! # Architecture: One Pipeline, Five Stages
//!
//! ```text
//! 1. Payload   ContactRecord  →  vCard text     (phone numbers normalized)
//! 2. Matrix    vCard text     →  QrMatrix       (ECC ladder H → Q → M → L)
//! 3. Render    QrMatrix       →  RGB canvas     (pattern style + eyes)
//! 4. Logo      canvas         →  RGB canvas     (optional, never fatal)
//! 5. Encode    canvas         →  PNG bytes
//! ```
//!
//! Every stage is a plain function of its inputs. Nothing is cached or shared
//! between calls, so the pipeline can be driven from any number of threads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`contact`] | Input record (`ContactRecord`, `Address`), JSON (de)serializable |
//! | [`phone`] | Phone normalization to `+<digits>` with a default country code |
//! | [`vcard`] | Payload encoding and tracked redirect URLs |
//! | [`matrix`] | QR symbol construction with error-correction fallback |
//! | [`imaging`] | Pure-Rust rendering: module shapes, finder eyes, logo compositing |
//! | [`config`] | `DesignOptions` validation and `vcard-qr.toml` loading |
//! | [`synthesis`] | The pipeline and its failure contract |
//! | [`error`] | Error taxonomy shared by all stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Weaker Error Correction Beats Failure
//!
//! Branded codes are usually requested at a high error-correction level so a
//! center logo can occlude modules safely. Long records (notes, addresses)
//! may not fit at that level. Rather than fail, [`matrix::encode`] walks down
//! the ladder and reports the level it actually used; only a payload that
//! overflows version 40 at `L` is an error.
//!
//! ## Logos Are Cosmetic
//!
//! Any logo failure (unreachable host, timeout, undecodable bytes) is logged
//! and the code is produced without it. The logo fetch is the only network
//! I/O in the crate and is bounded by a short timeout.
//!
//! ## Finder Eyes Are Drawn, Not Read
//!
//! The three corner finder patterns are identical in every QR symbol. The
//! renderer paints them from a fixed template in their own color instead of
//! styling their modules, which keeps them crisp whatever the pattern style.
//!
//! ## Photos By Reference
//!
//! Profile pictures are embedded as `PHOTO;VALUE=URI:` only. Inline image
//! data would multiply the payload size and force much denser symbols.

pub mod config;
pub mod contact;
pub mod error;
pub mod imaging;
pub mod matrix;
pub mod output;
pub mod phone;
pub mod synthesis;
pub mod vcard;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::DesignOptions;
pub use contact::{Address, ContactRecord};
pub use error::SynthesisError;
pub use synthesis::{Synthesis, synthesize, synthesize_with};
