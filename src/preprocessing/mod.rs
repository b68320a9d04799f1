//! Image preprocessing for OCR
//!
//! Binarizes report images so glyphs stand out from unevenly lit paper.

pub mod pipeline;
pub mod steps;

pub use pipeline::Pipeline;
