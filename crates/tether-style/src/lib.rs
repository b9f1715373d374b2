#![forbid(unsafe_code)]

//! Color primitives for Tether.
//!
//! This crate provides [`Rgba`], a packed RGBA color with HTML color-string
//! parsing and hex formatting, used by the color converters in
//! `tether-runtime`.

pub mod color;

pub use color::Rgba;
