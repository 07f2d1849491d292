//! Serializable editor commands and keyboard shortcut mapping.
//!
//! Every toolbar button and shortcut reduces to a [`Command`] dispatched
//! against the document, so front-ends and automation share one entry point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{Alignment, Axis, Document, LayerPatch};
use crate::error::DesignResult;
use crate::layer::LayerId;

/// A single editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Command {
    /// Add a text layer with the given content.
    AddText {
        /// Initial text content.
        content: String,
    },
    /// Add an image layer.
    AddImage {
        /// Image source, if already known.
        src: Option<String>,
    },
    /// Duplicate the selected layers.
    DuplicateSelected,
    /// Delete the selected layers.
    DeleteSelected,
    /// Group the selected layers.
    GroupSelected,
    /// Dissolve the selected groups.
    UngroupSelected,
    /// Turn the two selected layers into a mask pair.
    CreateMask,
    /// Release a mask relationship.
    ReleaseMask {
        /// The mask layer.
        id: LayerId,
    },
    /// Toggle a layer's visibility.
    ToggleVisibility {
        /// Target layer.
        id: LayerId,
    },
    /// Toggle a layer's locked flag.
    ToggleLock {
        /// Target layer.
        id: LayerId,
    },
    /// Expand or collapse a group in the layers panel.
    ToggleGroupExpanded {
        /// Target group.
        id: LayerId,
    },
    /// Apply a partial update to a layer.
    UpdateLayer {
        /// Target layer.
        id: LayerId,
        /// Fields to change.
        patch: LayerPatch,
        /// Whether to record a history checkpoint.
        record: bool,
    },
    /// Move a layer before another in the stack.
    Reorder {
        /// Layer being moved.
        dragged: LayerId,
        /// Layer it lands in front of.
        target: LayerId,
    },
    /// Align the selected layers.
    Align {
        /// Edge or axis to align against.
        alignment: Alignment,
    },
    /// Distribute the selected layers evenly.
    Distribute {
        /// Axis to distribute along.
        axis: Axis,
    },
    /// Select a layer.
    Select {
        /// Target layer.
        id: LayerId,
        /// Toggle membership instead of replacing the selection.
        multi: bool,
    },
    /// Select all unlocked layers.
    SelectAll,
    /// Clear the selection.
    ClearSelection,
    /// Undo one step.
    Undo,
    /// Redo one step.
    Redo,
    /// Toggle the grid overlay.
    ToggleGrid,
    /// Toggle grid snapping.
    ToggleSnap,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key.
    pub shift: bool,
    /// Control key.
    pub ctrl: bool,
    /// Alt/Option key.
    pub alt: bool,
    /// Command/Windows key.
    pub meta: bool,
}

impl KeyModifiers {
    const fn ctrl_or_meta(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Execute a command against the document.
///
/// # Errors
///
/// Propagates errors from fallible operations such as mask creation.
pub fn dispatch(doc: &mut Document, command: Command) -> DesignResult<()> {
    debug!(?command, "dispatch");
    match command {
        Command::AddText { content } => {
            doc.add_text(&content);
        }
        Command::AddImage { src } => {
            doc.add_image(src);
        }
        Command::DuplicateSelected => doc.duplicate_selected(),
        Command::DeleteSelected => doc.delete_selected(),
        Command::GroupSelected => doc.group_selected(),
        Command::UngroupSelected => doc.ungroup_selected(),
        Command::CreateMask => doc.create_mask()?,
        Command::ReleaseMask { id } => doc.release_mask(id),
        Command::ToggleVisibility { id } => doc.toggle_visibility(id),
        Command::ToggleLock { id } => doc.toggle_lock(id),
        Command::ToggleGroupExpanded { id } => doc.toggle_group_expanded(id),
        Command::UpdateLayer { id, patch, record } => doc.update_layer(id, &patch, record),
        Command::Reorder { dragged, target } => doc.reorder(dragged, target),
        Command::Align { alignment } => doc.align_selected(alignment),
        Command::Distribute { axis } => doc.distribute_selected(axis),
        Command::Select { id, multi } => doc.select(id, multi),
        Command::SelectAll => doc.select_all(),
        Command::ClearSelection => doc.clear_selection(),
        Command::Undo => doc.undo(),
        Command::Redo => doc.redo(),
        Command::ToggleGrid => doc.toggle_grid(),
        Command::ToggleSnap => doc.toggle_snap(),
    }
    Ok(())
}

/// Map a key press to a command. Returns `None` for unbound keys, and for
/// every key while a text field has focus.
#[must_use]
pub fn shortcut_for(key: &str, mods: KeyModifiers, in_text_field: bool) -> Option<Command> {
    if in_text_field {
        return None;
    }
    match key {
        "g" | "G" if mods.ctrl_or_meta() && mods.shift => Some(Command::UngroupSelected),
        "g" | "G" if mods.ctrl_or_meta() => Some(Command::GroupSelected),
        "g" => Some(Command::ToggleGrid),
        "d" | "D" if mods.ctrl_or_meta() => Some(Command::DuplicateSelected),
        "a" | "A" if mods.ctrl_or_meta() => Some(Command::SelectAll),
        "m" | "M" if mods.ctrl_or_meta() && mods.alt => Some(Command::CreateMask),
        "z" | "Z" if mods.ctrl_or_meta() && mods.shift => Some(Command::Redo),
        "z" | "Z" if mods.ctrl_or_meta() => Some(Command::Undo),
        "Delete" | "Backspace" => Some(Command::DeleteSelected),
        "Escape" => Some(Command::ClearSelection),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: KeyModifiers = KeyModifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    #[test]
    fn test_dispatch_add_and_delete() {
        let mut doc = Document::new(1000, 1000);
        dispatch(
            &mut doc,
            Command::AddText {
                content: "hi".to_string(),
            },
        )
        .expect("dispatch");
        assert_eq!(doc.layers().len(), 1);
        dispatch(&mut doc, Command::DeleteSelected).expect("dispatch");
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn test_dispatch_propagates_mask_error() {
        let mut doc = Document::new(1000, 1000);
        assert!(dispatch(&mut doc, Command::CreateMask).is_err());
    }

    #[test]
    fn test_shortcut_grid_toggle_is_unmodified_g() {
        assert_eq!(
            shortcut_for("g", KeyModifiers::default(), false),
            Some(Command::ToggleGrid)
        );
        assert_eq!(shortcut_for("g", CTRL, false), Some(Command::GroupSelected));
    }

    #[test]
    fn test_shortcut_shift_variants() {
        let ctrl_shift = KeyModifiers {
            shift: true,
            ..CTRL
        };
        assert_eq!(
            shortcut_for("g", ctrl_shift, false),
            Some(Command::UngroupSelected)
        );
        assert_eq!(shortcut_for("z", ctrl_shift, false), Some(Command::Redo));
        assert_eq!(shortcut_for("z", CTRL, false), Some(Command::Undo));
    }

    #[test]
    fn test_shortcut_mask_chord() {
        let ctrl_alt = KeyModifiers { alt: true, ..CTRL };
        assert_eq!(
            shortcut_for("m", ctrl_alt, false),
            Some(Command::CreateMask)
        );
        assert_eq!(shortcut_for("m", CTRL, false), None);
    }

    #[test]
    fn test_shortcuts_suppressed_in_text_fields() {
        assert_eq!(shortcut_for("Delete", KeyModifiers::default(), true), None);
        assert_eq!(shortcut_for("g", KeyModifiers::default(), true), None);
    }

    #[test]
    fn test_delete_and_escape() {
        assert_eq!(
            shortcut_for("Backspace", KeyModifiers::default(), false),
            Some(Command::DeleteSelected)
        );
        assert_eq!(
            shortcut_for("Escape", KeyModifiers::default(), false),
            Some(Command::ClearSelection)
        );
    }

    #[test]
    fn test_command_json_roundtrip() {
        let command = Command::Align {
            alignment: Alignment::CenterHorizontal,
        };
        let json = serde_json::to_string(&command).expect("serialize");
        assert!(json.contains("center-horizontal"));
        let back: Command = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, command);
    }
}
