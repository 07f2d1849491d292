//! Persisted project format.
//!
//! A [`ProjectDocument`] is the JSON shape written to disk. It carries
//! everything needed to reopen a composition; transient state (selection,
//! undo history) is deliberately not persisted.

use serde::{Deserialize, Serialize};

use crate::document::{Document, GridConfig};
use crate::error::DesignResult;
use crate::layer::Layer;

/// Current project format version.
pub const SCHEMA_VERSION: u32 = 1;

/// Canvas geometry as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Active preset name.
    pub preset: String,
}

/// A saved project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Format version for forward compatibility.
    pub version: u32,
    /// Project display name.
    pub name: String,
    /// Canvas geometry.
    pub canvas: CanvasSettings,
    /// Grid configuration.
    pub grid: GridConfig,
    /// Layers, front-most first.
    pub layers: Vec<Layer>,
}

impl ProjectDocument {
    /// Snapshot a live document for saving.
    #[must_use]
    pub fn from_document(doc: &Document, name: &str) -> Self {
        Self {
            version: SCHEMA_VERSION,
            name: name.to_string(),
            canvas: CanvasSettings {
                width: doc.width(),
                height: doc.height(),
                preset: doc.preset().to_string(),
            },
            grid: doc.grid,
            layers: doc.layers().to_vec(),
        }
    }

    /// Rebuild a live document from a saved project. The loaded state
    /// becomes the initial history checkpoint.
    #[must_use]
    pub fn into_document(self) -> Document {
        Document::from_parts(
            self.layers,
            self.canvas.width,
            self.canvas.height,
            self.grid,
            self.canvas.preset,
        )
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_json(&self) -> DesignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a saved project from JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed input.
    pub fn from_json(json: &str) -> DesignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
