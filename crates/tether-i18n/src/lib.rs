#![forbid(unsafe_code)]

//! Locale support for Tether converters.
//!
//! - [`number`]: locale-aware number parsing and fixed-point formatting.
//! - [`template`]: positional `{0:.2}` format templates.
//! - [`calendar`]: default date/time display patterns.

pub mod calendar;
pub mod number;
pub mod template;

pub use number::NumberFormat;
pub use template::{FormatSpec, Template};

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"de-AT"`).
pub type Locale = String;
