//! CLI output formatting.
//!
//! Every command prints through a pure `format_*` function returning display
//! lines, with a thin `print_*` wrapper. Tests assert on the lines directly.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! John Doe → john.png
//!     Version: 4 (33×33 modules)
//!     Size: 410×410 px
//!     ECC: Q
//!     Logo: applied
//! ```
//!
//! A weakened level is called out on the ECC line:
//!
//! ```text
//!     ECC: M (requested H; payload too long for H)
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 John Doe → cards/001-john-doe.png
//!     ECC: Q
//! 002 (unnamed)
//!     Error: cannot encode contact: contact record is missing required field first_name
//!
//! 1 written, 1 failed
//! ```

use crate::contact::ContactRecord;
use crate::matrix::side_for_version;
use crate::synthesis::Synthesis;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn ecc_line(result: &Synthesis) -> String {
    if result.ecc_degraded() {
        format!(
            "ECC: {} (requested {}; payload too long for {})",
            result.used_ecc, result.requested_ecc, result.requested_ecc
        )
    } else {
        format!("ECC: {}", result.used_ecc)
    }
}

fn logo_line(result: &Synthesis, logo_configured: bool) -> String {
    match (logo_configured, result.logo_applied) {
        (_, true) => "Logo: applied".to_string(),
        (true, false) => "Logo: skipped (could not be loaded)".to_string(),
        (false, false) => "Logo: none".to_string(),
    }
}

fn display_name(record: &ContactRecord) -> String {
    let name = record.display_name();
    if name.is_empty() {
        "(unnamed)".to_string()
    } else {
        name
    }
}

// ============================================================================
// File naming
// ============================================================================

/// Lowercase ASCII slug: runs of anything but letters and digits become one
/// `-`, with none at either end.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// File name for the `index`-th (1-based) record of a batch:
/// `NNN-first-last.png`, or `NNN.png` when the name has no usable characters.
pub fn batch_file_name(index: usize, record: &ContactRecord) -> String {
    let name = slug(&record.display_name());
    if name.is_empty() {
        format!("{}.png", format_index(index))
    } else {
        format!("{}-{}.png", format_index(index), name)
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the result of a single synthesis written to `target`.
pub fn format_synthesis(
    record: &ContactRecord,
    target: &Path,
    result: &Synthesis,
    logo_configured: bool,
) -> Vec<String> {
    let modules = side_for_version(result.version);
    vec![
        format!("{} → {}", display_name(record), target.display()),
        format!(
            "{}Version: {} ({modules}×{modules} modules)",
            indent(1),
            result.version
        ),
        format!("{}Size: {}×{} px", indent(1), result.width, result.width),
        format!("{}{}", indent(1), ecc_line(result)),
        format!("{}{}", indent(1), logo_line(result, logo_configured)),
    ]
}

pub fn print_synthesis(
    record: &ContactRecord,
    target: &Path,
    result: &Synthesis,
    logo_configured: bool,
) {
    for line in format_synthesis(record, target, result, logo_configured) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Outcome of one batch entry, as reported to the user.
pub enum BatchOutcome<'a> {
    Written {
        target: &'a Path,
        result: &'a Synthesis,
    },
    Failed(String),
}

/// Format one batch entry with its 1-based position.
pub fn format_batch_entry(
    index: usize,
    record: &ContactRecord,
    outcome: &BatchOutcome<'_>,
) -> Vec<String> {
    match outcome {
        BatchOutcome::Written { target, result } => vec![
            format!(
                "{} {} → {}",
                format_index(index),
                display_name(record),
                target.display()
            ),
            format!("{}{}", indent(1), ecc_line(result)),
        ],
        BatchOutcome::Failed(message) => vec![
            format!("{} {}", format_index(index), display_name(record)),
            format!("{}Error: {message}", indent(1)),
        ],
    }
}

pub fn format_batch_summary(written: usize, failed: usize) -> String {
    format!("{written} written, {failed} failed")
}

pub fn print_batch_entry(index: usize, record: &ContactRecord, outcome: &BatchOutcome<'_>) {
    for line in format_batch_entry(index, record, outcome) {
        println!("{}", line);
    }
}
