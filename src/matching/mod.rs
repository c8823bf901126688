//! Memoria template matching.
//!
//! This module provides:
//! - Template loading with configurable point values
//! - Normalized cross-correlation matching with multi-factor scoring
//! - Account extraction from screenshot filenames
//! - Batch scanning of the screenshot corpus

pub mod account;
pub mod histogram;
pub mod matcher;
pub mod scanner;
pub mod templates;

pub use account::account_from_filename;
pub use matcher::{MatchRecord, match_templates};
pub use scanner::{ScanOutcome, ScreenshotResult, scan_screenshots};
pub use templates::{Template, load_templates};
