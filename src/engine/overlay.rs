//! Derived, resettable visual attributes layered over the snapshot.
//!
//! An [`Overlay`] is index-aligned with the snapshot: `nodes[i]` belongs to
//! `snapshot.nodes()[i]` and `edges[i]` to `snapshot.edges()[i]`. Each filter
//! category owns a disjoint set of fields, described by [`OverlayFields`].

use serde::Serialize;

use super::snapshot::GraphSnapshot;

/// Color override symbolic name; the renderer resolves it to a concrete color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayColor {
	/// Dimmed, not part of the current highlight.
	Faded,
	/// Edge takes the color of its source node.
	InheritFromSource,
}

/// Group tag used to style related nodes alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Group {
	/// Position of a surviving community in size order.
	Community(usize),
	/// A focal node of a detail view.
	Focal,
}

/// Overlay attributes of a node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeOverlay {
	/// Not drawn.
	pub hidden: bool,
	/// Takes part in the layout simulation.
	pub physics: bool,
	/// Color override.
	pub color: Option<OverlayColor>,
	/// Size override.
	pub size: Option<f64>,
	/// Group tag.
	pub group: Option<Group>,
}

impl Default for NodeOverlay {
	fn default() -> Self {
		Self {
			hidden: false,
			physics: true,
			color: None,
			size: None,
			group: None,
		}
	}
}

/// Overlay attributes of an edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeOverlay {
	/// Not drawn.
	pub hidden: bool,
	/// Takes part in the layout simulation.
	pub physics: bool,
	/// Color override.
	pub color: Option<OverlayColor>,
	/// Hover annotation.
	pub title: Option<String>,
}

impl Default for EdgeOverlay {
	fn default() -> Self {
		Self {
			hidden: false,
			physics: true,
			color: None,
			title: None,
		}
	}
}

/// A subset of overlay fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OverlayFields {
	/// `hidden` and `physics`.
	pub hidden: bool,
	/// `color`.
	pub color: bool,
	/// `size`.
	pub size: bool,
	/// `group`.
	pub group: bool,
	/// `title`.
	pub title: bool,
}

impl OverlayFields {
	/// No field.
	pub const NONE: Self = Self {
		hidden: false,
		color: false,
		size: false,
		group: false,
		title: false,
	};

	/// Every field.
	pub const ALL: Self = Self {
		hidden: true,
		color: true,
		size: true,
		group: true,
		title: true,
	};

	/// Fields owned by the weight/reciprocity filter.
	pub const VISIBILITY: Self = Self {
		hidden: true,
		title: true,
		..Self::NONE
	};

	/// Fields owned by community highlighting.
	pub const COMMUNITY: Self = Self {
		color: true,
		group: true,
		..Self::NONE
	};

	/// Fields owned by centrality sizing.
	pub const CENTRALITY: Self = Self {
		size: true,
		..Self::NONE
	};

	/// Whether no field is selected.
	pub fn is_empty(&self) -> bool {
		*self == Self::NONE
	}

	/// Fields that differ between two node overlays.
	pub fn between_nodes(a: &NodeOverlay, b: &NodeOverlay) -> Self {
		Self {
			hidden: a.hidden != b.hidden || a.physics != b.physics,
			color: a.color != b.color,
			size: a.size != b.size,
			group: a.group != b.group,
			title: false,
		}
	}

	/// Fields that differ between two edge overlays.
	pub fn between_edges(a: &EdgeOverlay, b: &EdgeOverlay) -> Self {
		Self {
			hidden: a.hidden != b.hidden || a.physics != b.physics,
			color: a.color != b.color,
			size: false,
			group: false,
			title: a.title != b.title,
		}
	}
}

/// Revert every overlay field of `nodes` and `edges` to baseline.
pub fn reset(nodes: &mut [NodeOverlay], edges: &mut [EdgeOverlay]) {
	reset_fields(nodes, edges, OverlayFields::ALL);
}

/// Revert the selected overlay fields of `nodes` and `edges` to baseline.
pub fn reset_fields(nodes: &mut [NodeOverlay], edges: &mut [EdgeOverlay], fields: OverlayFields) {
	for node in nodes {
		if fields.hidden {
			node.hidden = false;
			node.physics = true;
		}
		if fields.color {
			node.color = None;
		}
		if fields.size {
			node.size = None;
		}
		if fields.group {
			node.group = None;
		}
	}
	for edge in edges {
		if fields.hidden {
			edge.hidden = false;
			edge.physics = true;
		}
		if fields.color {
			edge.color = None;
		}
		if fields.title {
			edge.title = None;
		}
	}
}

/// Overlay attributes for every node and edge of a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overlay {
	/// Per-node attributes, aligned with the snapshot's nodes.
	pub nodes: Vec<NodeOverlay>,
	/// Per-edge attributes, aligned with the snapshot's edges.
	pub edges: Vec<EdgeOverlay>,
}

impl Overlay {
	/// The unfiltered overlay for `snapshot`.
	pub fn baseline(snapshot: &GraphSnapshot) -> Self {
		Self {
			nodes: vec![NodeOverlay::default(); snapshot.nodes().len()],
			edges: vec![EdgeOverlay::default(); snapshot.edges().len()],
		}
	}

	/// Revert the selected fields to baseline.
	pub fn reset(&mut self, fields: OverlayFields) {
		reset_fields(&mut self.nodes, &mut self.edges, fields);
	}

	/// Copy the selected fields from `layer`, which must cover the same snapshot.
	pub fn merge(&mut self, layer: &Overlay, fields: OverlayFields) {
		for (node, from) in self.nodes.iter_mut().zip(&layer.nodes) {
			if fields.hidden {
				node.hidden = from.hidden;
				node.physics = from.physics;
			}
			if fields.color {
				node.color = from.color;
			}
			if fields.size {
				node.size = from.size;
			}
			if fields.group {
				node.group = from.group;
			}
		}
		for (edge, from) in self.edges.iter_mut().zip(&layer.edges) {
			if fields.hidden {
				edge.hidden = from.hidden;
				edge.physics = from.physics;
			}
			if fields.color {
				edge.color = from.color;
			}
			if fields.title {
				edge.title.clone_from(&from.title);
			}
		}
	}
}
