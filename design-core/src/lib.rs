//! Editor core for Mode Design.
//!
//! The document model is a flat, z-ordered layer list; grouping and masking
//! are relationships recorded on the layers and resolved into a tree for
//! display. Everything user-visible flows through [`Document`] mutators,
//! which snap geometry to the grid and record undo checkpoints.
//!
//! # Architecture
//!
//! - [`layer`]: layer types, ids, and geometry primitives
//! - [`snap`]: grid snapping for points, rectangles, and sizes
//! - [`history`]: generic linear undo/redo
//! - [`document`]: the editable document and all mutators
//! - [`hierarchy`]: flat list to display tree resolution
//! - [`gesture`]: drag, resize, and rotate sessions
//! - [`command`]: serializable commands and keyboard shortcuts
//! - [`generate`]: asset generation seam and session gate
//! - [`schema`]: the persisted project format

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod document;
pub mod error;
pub mod generate;
pub mod gesture;
pub mod hierarchy;
pub mod history;
pub mod layer;
pub mod schema;
pub mod snap;

pub use command::{dispatch, shortcut_for, Command, KeyModifiers};
pub use document::{
    Alignment, Axis, CanvasPreset, Document, GridConfig, LayerPatch, CANVAS_PRESETS,
};
pub use error::{DesignError, DesignResult};
pub use generate::{
    generate_layer, AssetGenerator, AuthSession, GeneratedAsset, GenerationRequest, ImageModel,
    MockGenerator, IMAGE_MODELS,
};
pub use gesture::{ResizeHandle, TransformSession, MIN_LAYER_HEIGHT, MIN_LAYER_WIDTH};
pub use hierarchy::{build_forest, flatten, HierarchyNode};
pub use history::History;
pub use layer::{
    FontStyle, FontWeight, Layer, LayerId, LayerKind, Rect, TextAlign, TextDecoration, TextStyle,
};
pub use schema::{CanvasSettings, ProjectDocument, SCHEMA_VERSION};
pub use snap::{GridSnapper, SnappedPoint, DEFAULT_SNAP_THRESHOLD};
