//! Layer hierarchy resolution for the layers panel.
//!
//! The document stores layers as a flat list; grouping and masking are
//! relationships recorded on the layers themselves. This module derives the
//! tree view from that flat list without mutating it.

use crate::layer::{Layer, LayerId};

/// A layer positioned in the derived tree, with its resolved children.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    /// The layer at this node (cloned from the flat list).
    pub layer: Layer,
    /// Resolved children: group members in stored order, then the mask
    /// child for masked layers.
    pub children: Vec<HierarchyNode>,
    /// Nesting depth; roots are at depth 0.
    pub depth: usize,
}

/// Build the display forest from a flat layer list.
///
/// Roots are layers with no parent group and no masking relationship
/// pointing at them from below (a layer that is `masked_by` another renders
/// as that layer's child). Group children resolve in the group's stored
/// order; ids that no longer exist in the list are skipped. A mask layer
/// attaches as a child of the layer it clips.
///
/// Cycles in parent links are the caller's responsibility to avoid; the
/// mutation layer never creates them.
#[must_use]
pub fn build_forest(layers: &[Layer]) -> Vec<HierarchyNode> {
    layers
        .iter()
        .filter(|layer| layer.parent.is_none() && layer.masked_by.is_none())
        .map(|layer| build_node(layer, layers, 0))
        .collect()
}

fn build_node(layer: &Layer, layers: &[Layer], depth: usize) -> HierarchyNode {
    let mut children = Vec::new();

    if let Some(child_ids) = layer.group_children() {
        for child_id in child_ids {
            if let Some(child) = layers.iter().find(|l| l.id == *child_id) {
                children.push(build_node(child, layers, depth + 1));
            }
        }
    }

    if layer.is_mask {
        if let Some(masked) = layers.iter().find(|l| l.masked_by == Some(layer.id)) {
            children.push(build_node(masked, layers, depth + 1));
        }
    }

    HierarchyNode {
        layer: layer.clone(),
        children,
        depth,
    }
}

/// Flatten a forest into the row order the layers panel shows.
///
/// Pre-order traversal. Children of collapsed groups are omitted; mask
/// relationships are always shown.
#[must_use]
pub fn flatten(forest: &[HierarchyNode]) -> Vec<HierarchyNode> {
    let mut rows = Vec::new();
    for node in forest {
        flatten_into(node, &mut rows);
    }
    rows
}

fn flatten_into(node: &HierarchyNode, rows: &mut Vec<HierarchyNode>) {
    rows.push(node.clone());
    let collapsed = node.layer.is_group() && !node.layer.is_expanded();
    if !collapsed {
        for child in &node.children {
            flatten_into(child, rows);
        }
    }
}
