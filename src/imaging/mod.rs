//! Rasterization and branding in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Canvas** | `image::RgbImage` filled with the background color |
//! | **Module shapes** | supersampled coverage, blended per pixel |
//! | **Logo decode** | `image::load_from_memory` (JPEG, PNG, WebP) |
//! | **Logo resize** | `image::imageops::resize` with `Lanczos3` |
//! | **Logo fetch** | `reqwest` blocking client with a bounded timeout |
//!
//! The module is split into:
//! - **Parameters**: colors, pattern styles, logo settings
//! - **Calculations**: pure geometry and coverage math (unit testable)
//! - **Render**: matrix → styled canvas
//! - **Logo**: [`LogoSource`] trait + [`DefaultLogoSource`], and compositing

pub mod calculations;
pub mod logo;
mod params;
pub mod render;

pub use logo::{DefaultLogoSource, LogoError, LogoSource, composite};
pub use params::{Color, LogoParams, PatternStyle};
pub use render::render;
