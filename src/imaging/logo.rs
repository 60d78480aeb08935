//! Logo fetching and compositing.
//!
//! ## Preparation steps
//!
//! | Step | When | Implementation |
//! |---|---|---|
//! | Fetch | always | [`LogoSource::fetch`] (disk or blocking HTTP with timeout) |
//! | Decode → RGBA | always | `image::load_from_memory` |
//! | Circular mask | `round` | supersampled coverage multiplied into alpha |
//! | White backing | `background` | alpha-blend onto an opaque white square |
//! | Resize | always | `image::imageops::resize` with `Lanczos3` |
//! | Place | always | centered, alpha-composited onto the canvas |
//!
//! Every step returns [`LogoError`] on failure. The pipeline treats any such
//! error as "no logo" and keeps the unbranded image, so nothing here is ever
//! surfaced to the caller of [`synthesize`](crate::synthesis::synthesize).

use super::calculations::{circle_mask_coverage, logo_placement};
use super::params::LogoParams;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage, RgbImage};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default upper bound on a remote logo fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum LogoError {
    #[error("cannot read logo file: {0}")]
    Io(#[from] std::io::Error),
    #[error("logo request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("logo host returned HTTP {0}")]
    HttpStatus(u16),
    #[error("cannot decode logo: {0}")]
    Decode(#[from] image::ImageError),
    #[error("logo is empty")]
    Empty,
    #[error("logo would be smaller than one pixel at size {0}")]
    TooSmall(f32),
}

/// Resolves a logo location to raw image bytes.
///
/// `Sync` so one source can be shared across a rayon batch.
pub trait LogoSource: Sync {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LogoError>;
}

/// Reads local paths from disk and `http(s)` URLs over the network.
#[derive(Debug, Clone)]
pub struct DefaultLogoSource {
    timeout: Duration,
}

impl DefaultLogoSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, LogoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LogoError::HttpStatus(status.as_u16()));
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl Default for DefaultLogoSource {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl LogoSource for DefaultLogoSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LogoError> {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            log::debug!("fetching logo {location} (timeout {:?})", self.timeout);
            self.fetch_remote(location)
        } else {
            Ok(std::fs::read(Path::new(location))?)
        }
    }
}

/// Composite the logo described by `params` onto a copy of `canvas`.
///
/// The input canvas is never modified; on error the caller still holds the
/// unbranded image.
pub fn composite(
    canvas: &RgbImage,
    params: &LogoParams,
    source: &impl LogoSource,
) -> Result<RgbImage, LogoError> {
    let placement = logo_placement(canvas.width(), canvas.height(), params.size)
        .ok_or(LogoError::TooSmall(params.size))?;

    let bytes = source.fetch(&params.location)?;
    if bytes.is_empty() {
        return Err(LogoError::Empty);
    }
    let mut logo = image::load_from_memory(&bytes)?.to_rgba8();
    if logo.width() == 0 || logo.height() == 0 {
        return Err(LogoError::Empty);
    }

    if params.round {
        apply_circle_mask(&mut logo);
    }
    if params.background {
        flatten_onto_white(&mut logo);
    }
    let logo = image::imageops::resize(
        &logo,
        placement.side,
        placement.side,
        FilterType::Lanczos3,
    );

    let mut out = canvas.clone();
    overlay_alpha(&mut out, &logo, placement.x, placement.y);
    log::debug!(
        "placed {0}x{0} logo at ({1}, {2})",
        placement.side,
        placement.x,
        placement.y
    );
    Ok(out)
}

fn apply_circle_mask(logo: &mut RgbaImage) {
    let (w, h) = logo.dimensions();
    for (x, y, pixel) in logo.enumerate_pixels_mut() {
        let coverage = circle_mask_coverage(x, y, w, h);
        pixel.0[3] = (pixel.0[3] as f32 * coverage).round() as u8;
    }
}

fn flatten_onto_white(logo: &mut RgbaImage) {
    for pixel in logo.pixels_mut() {
        let a = pixel.0[3] as f32 / 255.0;
        for channel in &mut pixel.0[..3] {
            *channel = (*channel as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        }
        pixel.0[3] = 255;
    }
}

fn overlay_alpha(base: &mut RgbImage, over: &RgbaImage, x: u32, y: u32) {
    for (ox, oy, &Rgba([r, g, b, alpha])) in over.enumerate_pixels() {
        if alpha == 0 {
            continue;
        }
        let (bx, by) = (x + ox, y + oy);
        if bx >= base.width() || by >= base.height() {
            continue;
        }
        let a = alpha as f32 / 255.0;
        let dst = base.get_pixel_mut(bx, by);
        for (d, s) in dst.0.iter_mut().zip([r, g, b]) {
            *d = (s as f32 * a + *d as f32 * (1.0 - a)).round() as u8;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_helpers::{logo_png, write_test_logo};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Instant;
    use tempfile::TempDir;

    /// In-memory logo source that records every requested location.
    /// Uses Mutex so it is Sync and can be shared with rayon.
    #[derive(Default)]
    pub struct MockLogoSource {
        pub bytes: Option<Vec<u8>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockLogoSource {
        pub fn serving(bytes: Vec<u8>) -> Self {
            Self {
                bytes: Some(bytes),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// A source for which every fetch fails like an unreachable host.
        pub fn unreachable() -> Self {
            Self::default()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl LogoSource for MockLogoSource {
        fn fetch(&self, location: &str) -> Result<Vec<u8>, LogoError> {
            self.requests.lock().unwrap().push(location.to_string());
            self.bytes.clone().ok_or(LogoError::HttpStatus(503))
        }
    }

    fn params(round: bool, background: bool) -> LogoParams {
        LogoParams {
            location: "logo.png".into(),
            size: 0.25,
            background,
            round,
        }
    }

    /// Resampling may shift a solid color by a unit or so.
    fn assert_close(actual: [u8; 3], expected: [u8; 3]) {
        let near = actual
            .iter()
            .zip(expected)
            .all(|(&a, e)| (a as i16 - e as i16).abs() <= 2);
        assert!(near, "{actual:?} is not close to {expected:?}");
    }

    fn blank_canvas(side: u32) -> RgbImage {
        RgbImage::from_pixel(side, side, image::Rgb([10, 20, 30]))
    }

    // =========================================================================
    // compositing
    // =========================================================================

    #[test]
    fn opaque_logo_covers_center() {
        let source = MockLogoSource::serving(logo_png(40, 40, [255, 0, 0, 255]));
        let canvas = blank_canvas(200);
        let out = composite(&canvas, &params(false, false), &source).unwrap();
        // side 50 at (75, 75)
        assert_close(out.get_pixel(100, 100).0, [255, 0, 0]);
        assert_close(out.get_pixel(76, 76).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(70, 70).0, [10, 20, 30]);
        assert_eq!(out.get_pixel(130, 130).0, [10, 20, 30]);
    }

    #[test]
    fn input_canvas_is_untouched() {
        let source = MockLogoSource::serving(logo_png(40, 40, [255, 0, 0, 255]));
        let canvas = blank_canvas(200);
        let _ = composite(&canvas, &params(true, true), &source).unwrap();
        assert_eq!(canvas, blank_canvas(200));
    }

    #[test]
    fn round_logo_leaves_corners_visible() {
        let source = MockLogoSource::serving(logo_png(40, 40, [255, 0, 0, 255]));
        let canvas = blank_canvas(200);
        let out = composite(&canvas, &params(true, false), &source).unwrap();
        assert_eq!(out.get_pixel(75, 75).0, [10, 20, 30]);
        assert_close(out.get_pixel(100, 100).0, [255, 0, 0]);
    }

    #[test]
    fn background_hides_pattern_behind_transparent_logo() {
        let source = MockLogoSource::serving(logo_png(40, 40, [0, 0, 0, 0]));
        let canvas = blank_canvas(200);
        let out = composite(&canvas, &params(false, true), &source).unwrap();
        assert_close(out.get_pixel(100, 100).0, [255, 255, 255]);
        assert_close(out.get_pixel(75, 75).0, [255, 255, 255]);
    }

    #[test]
    fn round_with_background_backs_whole_square_in_white() {
        let source = MockLogoSource::serving(logo_png(40, 40, [0, 0, 0, 0]));
        let canvas = blank_canvas(200);
        let out = composite(&canvas, &params(true, true), &source).unwrap();
        assert_close(out.get_pixel(100, 100).0, [255, 255, 255]);
        // The mask clears the corners, then the backing fills them white.
        assert_close(out.get_pixel(75, 75).0, [255, 255, 255]);
        assert_close(out.get_pixel(124, 124).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(74, 74).0, [10, 20, 30]);
    }

    #[test]
    fn transparent_logo_without_background_is_invisible() {
        let source = MockLogoSource::serving(logo_png(40, 40, [0, 0, 0, 0]));
        let canvas = blank_canvas(200);
        let out = composite(&canvas, &params(false, false), &source).unwrap();
        assert_eq!(out, canvas);
    }

    #[test]
    fn requests_configured_location() {
        let source = MockLogoSource::serving(logo_png(8, 8, [0, 0, 255, 255]));
        composite(&blank_canvas(100), &params(false, false), &source).unwrap();
        assert_eq!(*source.requests.lock().unwrap(), vec!["logo.png".to_string()]);
    }

    // =========================================================================
    // failures
    // =========================================================================

    #[test]
    fn unreachable_source_is_error() {
        let source = MockLogoSource::unreachable();
        let err = composite(&blank_canvas(100), &params(true, true), &source).unwrap_err();
        assert!(matches!(err, LogoError::HttpStatus(503)));
    }

    #[test]
    fn garbage_bytes_are_decode_error() {
        let source = MockLogoSource::serving(b"definitely not an image".to_vec());
        let err = composite(&blank_canvas(100), &params(false, false), &source).unwrap_err();
        assert!(matches!(err, LogoError::Decode(_)));
    }

    #[test]
    fn empty_body_is_error() {
        let source = MockLogoSource::serving(Vec::new());
        let err = composite(&blank_canvas(100), &params(false, false), &source).unwrap_err();
        assert!(matches!(err, LogoError::Empty));
    }

    #[test]
    fn tiny_size_is_skipped_before_fetching() {
        let source = MockLogoSource::serving(logo_png(8, 8, [0, 0, 255, 255]));
        let mut p = params(false, false);
        p.size = 0.001;
        let err = composite(&blank_canvas(100), &p, &source).unwrap_err();
        assert!(matches!(err, LogoError::TooSmall(_)));
        assert_eq!(source.request_count(), 0);
    }

    // =========================================================================
    // default source
    // =========================================================================

    #[test]
    fn default_source_reads_local_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logo.png");
        write_test_logo(&path, 16, 16);
        let bytes = DefaultLogoSource::default()
            .fetch(path.to_str().unwrap())
            .unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn default_source_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.png");
        let err = DefaultLogoSource::default()
            .fetch(path.to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, LogoError::Io(_)));
    }

    /// Serve one HTTP response on a loopback port and return its URL.
    fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
        });
        format!("http://{addr}/logo.png")
    }

    #[test]
    fn default_source_downloads_over_http() {
        let png = logo_png(8, 8, [0, 0, 255, 255]);
        let url = serve_once("200 OK", png.clone());
        let bytes = DefaultLogoSource::default().fetch(&url).unwrap();
        assert_eq!(bytes, png);
    }

    #[test]
    fn default_source_reports_http_status() {
        let url = serve_once("404 Not Found", Vec::new());
        let err = DefaultLogoSource::default().fetch(&url).unwrap_err();
        assert!(matches!(err, LogoError::HttpStatus(404)), "{err}");
    }

    #[test]
    fn default_source_refused_connection_is_request_error() {
        let started = Instant::now();
        let err = DefaultLogoSource::new(Duration::from_secs(2))
            .fetch("http://127.0.0.1:9/logo.png")
            .unwrap_err();
        assert!(matches!(err, LogoError::Request(_)), "{err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn default_timeout_is_a_few_seconds() {
        assert_eq!(DefaultLogoSource::default().timeout(), Duration::from_secs(3));
    }
}
