//! QR matrix construction with an error-correction fallback ladder.
//!
//! Symbol construction itself (segment optimisation, Reed-Solomon, mask
//! selection, smallest-version search) is delegated to the `qrcode` crate.
//! This module decides *which level* to build at:
//!
//! ```text
//! requested H → try H → try Q → try M → try L → CapacityError
//! requested M →                 try M → try L → CapacityError
//! ```
//!
//! Walking down the ladder trades robustness for capacity. The level that
//! finally worked is reported as [`QrMatrix::ecc`] so callers can see when a
//! branded code ended up weaker than requested.

use crate::error::CapacityError;
use qrcode::types::QrError;
use qrcode::{Color, QrCode, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// Error-correction level, declared weakest to strongest so that `Ord`
/// follows robustness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    /// All levels, strongest first.
    pub const LADDER: [EcLevel; 4] = [EcLevel::H, EcLevel::Q, EcLevel::M, EcLevel::L];

    /// This level followed by every weaker one.
    pub fn fallbacks(self) -> &'static [EcLevel] {
        let start = Self::LADDER
            .iter()
            .position(|&level| level == self)
            .unwrap_or(0);
        &Self::LADDER[start..]
    }

    fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for EcLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(EcLevel::L),
            "M" => Ok(EcLevel::M),
            "Q" => Ok(EcLevel::Q),
            "H" => Ok(EcLevel::H),
            _ => Err(s.to_string()),
        }
    }
}

/// Square module grid, `true` = dark, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
    version: u8,
    ecc: EcLevel,
}

impl QrMatrix {
    /// Build a matrix from raw modules.
    ///
    /// Returns `None` unless `version` is 1..=40 and `modules` holds exactly
    /// `(4·version + 17)²` entries.
    pub fn from_modules(version: u8, ecc: EcLevel, modules: Vec<bool>) -> Option<Self> {
        if !(1..=40).contains(&version) {
            return None;
        }
        let width = side_for_version(version);
        if modules.len() != width * width {
            return None;
        }
        Some(Self {
            width,
            modules,
            version,
            ecc,
        })
    }

    /// Modules per side (`4·version + 17`).
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The level the symbol was actually built at.
    pub fn ecc(&self) -> EcLevel {
        self.ecc
    }

    /// Whether the module at column `x`, row `y` is dark. Out of range is light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Top-left module coordinates of the three finder patterns:
    /// top-left, top-right, bottom-left.
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.width - FINDER_SIZE;
        [(0, 0), (far, 0), (0, far)]
    }

    /// Whether a module lies inside one of the three finder zones.
    pub fn in_finder_zone(&self, x: usize, y: usize) -> bool {
        self.finder_origins().iter().any(|&(fx, fy)| {
            (fx..fx + FINDER_SIZE).contains(&x) && (fy..fy + FINDER_SIZE).contains(&y)
        })
    }
}

pub fn side_for_version(version: u8) -> usize {
    4 * version as usize + 17
}

/// Encode `payload` at `requested` or the first weaker level that fits.
pub fn encode(payload: &str, requested: EcLevel) -> Result<QrMatrix, CapacityError> {
    let mut tried = Vec::new();
    let mut last_error: Option<QrError> = None;

    for &level in requested.fallbacks() {
        tried.push(level);
        match QrCode::with_error_correction_level(payload.as_bytes(), level.to_qrcode()) {
            Ok(code) => {
                let matrix = from_code(&code, level);
                if level != requested {
                    log::warn!(
                        "payload of {} bytes does not fit at ECC {requested}, using {level}",
                        payload.len()
                    );
                }
                log::debug!(
                    "encoded {} bytes as version {} at ECC {level}",
                    payload.len(),
                    matrix.version
                );
                return Ok(matrix);
            }
            Err(err) => {
                log::debug!("ECC {level} rejected payload: {err}");
                last_error = Some(err);
            }
        }
    }

    Err(CapacityError {
        payload_bytes: payload.len(),
        tried,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no level attempted".to_string()),
    })
}

fn from_code(code: &QrCode, ecc: EcLevel) -> QrMatrix {
    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v as u8,
    };
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    QrMatrix {
        width: code.width(),
        modules,
        version,
        ecc,
    }
}
