//! pdfpress
//!
//! A library and web service for stamping content onto existing PDFs.
//! This library provides functionality to:
//! - Add text or image watermarks to selected pages
//! - Rotate pages by adjusting their rotation metadata
//! - Draw page numbers in several numbering styles
//! - Pack uploaded images into a fresh PDF
//! - Parse page-range expressions and resolve overlay placement
//!
//! # Example
//!
//! ```no_run
//! use pdfpress::pdf::{add_watermark, Overlay, Rgb, WatermarkOptions};
//! use pdfpress::layout::Anchor;
//! use pdfpress::range::PageSelection;
//!
//! let input = std::fs::read("report.pdf").expect("read input");
//!
//! let options = WatermarkOptions {
//!     overlay: Overlay::Text {
//!         text: "CONFIDENTIAL".to_string(),
//!         font_size: 36.0,
//!         color: Rgb::BLACK,
//!         opacity: 0.3,
//!     },
//!     anchor: Anchor::Center,
//!     rotation: 45.0,
//!     selection: PageSelection::parse("").expect("valid range"),
//! };
//!
//! let output = add_watermark(&input, &options).expect("failed to watermark");
//! std::fs::write("report-stamped.pdf", output).expect("write output");
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod numbering;
pub mod pdf;
pub mod range;
pub mod server;

// Re-export commonly used items
pub use error::{Error, Result};
