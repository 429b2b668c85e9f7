//! The view model handed to the rendering layer.
//!
//! Every pass produces a whole new [`ViewModel`]; the publisher swaps it in
//! behind an `Arc`, so a reader holding the previous one never sees a
//! half-updated node or edge set.

use std::sync::Arc;

use serde::Serialize;

use super::overlay::{EdgeOverlay, NodeOverlay, Overlay, OverlayFields};
use super::snapshot::{EdgeId, GraphSnapshot};
use super::stats::VisibleStats;

/// A node as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeView {
	/// Node id.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Current overlay.
	#[serde(flatten)]
	pub overlay: NodeOverlay,
}

/// An edge as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeView {
	/// Edge id.
	pub id: EdgeId,
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Answer count.
	pub weight: f64,
	/// Whether the reverse edge exists.
	pub reciprocal: bool,
	/// Current overlay.
	#[serde(flatten)]
	pub overlay: EdgeOverlay,
}

/// Immutable per-pass rendering input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewModel {
	/// Increases with every publication.
	pub revision: u64,
	/// Nodes, in snapshot order.
	pub nodes: Vec<NodeView>,
	/// Edges, in snapshot order.
	pub edges: Vec<EdgeView>,
	/// Visible-subgraph statistics.
	pub stats: VisibleStats,
}

impl ViewModel {
	fn build(revision: u64, snapshot: &GraphSnapshot, overlay: &Overlay, stats: VisibleStats) -> Self {
		let nodes = snapshot
			.nodes()
			.iter()
			.zip(&overlay.nodes)
			.map(|(n, o)| NodeView {
				id: n.id.clone(),
				label: n.label.clone(),
				overlay: o.clone(),
			})
			.collect();
		let edges = snapshot
			.edges()
			.iter()
			.zip(&overlay.edges)
			.map(|(e, o)| EdgeView {
				id: e.id,
				from: e.from.clone(),
				to: e.to.clone(),
				weight: e.weight,
				reciprocal: e.reciprocal,
				overlay: o.clone(),
			})
			.collect();
		Self {
			revision,
			nodes,
			edges,
			stats,
		}
	}

	/// Look up a node view by id.
	pub fn node(&self, id: &str) -> Option<&NodeView> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Nodes that are not hidden.
	pub fn visible_nodes(&self) -> impl Iterator<Item = &NodeView> {
		self.nodes.iter().filter(|n| !n.overlay.hidden)
	}

	/// Edges that are not hidden.
	pub fn visible_edges(&self) -> impl Iterator<Item = &EdgeView> {
		self.edges.iter().filter(|e| !e.overlay.hidden)
	}
}

/// A node whose overlay changed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeChange {
	/// Node id.
	pub id: String,
	/// Fields that differ from the previous revision.
	pub changed: OverlayFields,
	/// New overlay.
	pub overlay: NodeOverlay,
}

/// An edge whose overlay changed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeChange {
	/// Edge id.
	pub id: EdgeId,
	/// Fields that differ from the previous revision.
	pub changed: OverlayFields,
	/// New overlay.
	pub overlay: EdgeOverlay,
}

/// What changed between two consecutive revisions.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewDelta {
	/// Revision the delta leads to.
	pub revision: u64,
	/// Changed nodes.
	pub nodes: Vec<NodeChange>,
	/// Changed edges.
	pub edges: Vec<EdgeChange>,
	/// Statistics of the new revision.
	pub stats: VisibleStats,
}

impl ViewDelta {
	/// Whether no node or edge changed.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	fn between(prev: &ViewModel, next: &ViewModel) -> Self {
		let nodes = prev
			.nodes
			.iter()
			.zip(&next.nodes)
			.filter_map(|(a, b)| {
				let changed = OverlayFields::between_nodes(&a.overlay, &b.overlay);
				(!changed.is_empty()).then(|| NodeChange {
					id: b.id.clone(),
					changed,
					overlay: b.overlay.clone(),
				})
			})
			.collect();
		let edges = prev
			.edges
			.iter()
			.zip(&next.edges)
			.filter_map(|(a, b)| {
				let changed = OverlayFields::between_edges(&a.overlay, &b.overlay);
				(!changed.is_empty()).then(|| EdgeChange {
					id: b.id,
					changed,
					overlay: b.overlay.clone(),
				})
			})
			.collect();
		Self {
			revision: next.revision,
			nodes,
			edges,
			stats: next.stats.clone(),
		}
	}
}

/// Result of one publication.
#[derive(Clone, Debug)]
pub struct Publication {
	/// The new view model.
	pub view: Arc<ViewModel>,
	/// Changes relative to the previous one.
	pub delta: ViewDelta,
}

/// Holds the current view model and replaces it atomically.
#[derive(Debug)]
pub struct ViewModelPublisher {
	current: Arc<ViewModel>,
}

impl ViewModelPublisher {
	/// Start with the unfiltered view of `snapshot`.
	pub fn new(snapshot: &GraphSnapshot) -> Self {
		Self {
			current: Arc::new(ViewModel::build(
				0,
				snapshot,
				&Overlay::baseline(snapshot),
				VisibleStats::from_load(snapshot.stats()),
			)),
		}
	}

	/// The most recently published view model.
	pub fn current(&self) -> Arc<ViewModel> {
		Arc::clone(&self.current)
	}

	/// Publish `overlay` and `stats` as the next revision.
	pub fn publish(&mut self, snapshot: &GraphSnapshot, overlay: &Overlay, stats: VisibleStats) -> Publication {
		let next = ViewModel::build(self.current.revision + 1, snapshot, overlay, stats);
		let delta = ViewDelta::between(&self.current, &next);
		self.current = Arc::new(next);
		Publication {
			view: self.current(),
			delta,
		}
	}

	/// Replace the view with the unfiltered view of a newly loaded snapshot.
	/// The revision keeps increasing across loads.
	pub fn reload(&mut self, snapshot: &GraphSnapshot) -> Arc<ViewModel> {
		let revision = self.current.revision + 1;
		let mut fresh = Self::new(snapshot);
		Arc::make_mut(&mut fresh.current).revision = revision;
		self.current = fresh.current;
		self.current()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::overlay::OverlayColor;
	use crate::engine::snapshot::{CommunityPartition, Link, Node};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	fn snapshot() -> GraphSnapshot {
		GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("B", "B")],
			vec![Link::new("A", "B", 3.0)],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap()
	}

	#[test]
	fn starts_unfiltered_with_load_stats() {
		let snap = snapshot();
		let view = ViewModelPublisher::new(&snap).current();
		assert_eq!(view.revision, 0);
		assert_eq!(view.visible_nodes().count(), 2);
		assert_eq!(view.stats.visible_edges, 1);
		assert_eq!(view.stats.avg_edge_weight, 3.0);
	}

	#[test]
	fn publish_swaps_and_reports_changes() {
		let snap = snapshot();
		let mut publisher = ViewModelPublisher::new(&snap);
		let before = publisher.current();

		let mut overlay = Overlay::baseline(&snap);
		overlay.nodes[1].color = Some(OverlayColor::Faded);
		let publication = publisher.publish(&snap, &overlay, VisibleStats::default());

		assert_eq!(before.revision, 0);
		assert_eq!(before.nodes[1].overlay.color, None);
		assert_eq!(publication.view.revision, 1);
		assert_eq!(publication.delta.nodes.len(), 1);
		assert_eq!(publication.delta.nodes[0].id, "B");
		assert_eq!(publication.delta.nodes[0].changed, OverlayFields { color: true, ..OverlayFields::NONE });
		assert!(publication.delta.edges.is_empty());
	}

	#[test]
	fn reload_keeps_revision_increasing() {
		let snap = snapshot();
		let mut publisher = ViewModelPublisher::new(&snap);
		publisher.publish(&snap, &Overlay::baseline(&snap), VisibleStats::default());
		let view = publisher.reload(&snap);
		assert_eq!(view.revision, 2);
		assert_eq!(view.stats.visible_nodes, 2);
	}
}
