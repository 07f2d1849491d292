//! Compositor for Mode Design.
//!
//! Turns a [`design_core::Document`] into a flat raster: layers are painted
//! back to front into an SVG intermediate, then rasterized with resvg and
//! tiny-skia and encoded as PNG. Image sources are resolved to embedded
//! `data:` URIs up front so the output never depends on the network.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod compose;
pub mod error;

pub use assets::{load_image_source, LoadedImage};
pub use compose::{ComposeConfig, Compositor, EXPORT_FILE_NAME};
pub use error::{RenderError, RenderResult};
