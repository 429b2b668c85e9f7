//! The engine session: one loaded snapshot, its filter state and the
//! published view.
//!
//! Each category moves between `Inactive` and `Active`. Every change runs one
//! full pass over all three categories: an active category is recomputed
//! from the snapshot and merged over its own fields, an inactive one has its
//! fields reset. Passes never build on the previous filtered result.

use std::sync::Arc;

use log::{debug, info, warn};

use super::centrality;
use super::community;
use super::ego::{self, DetailSubgraph};
use super::error::SelectionError;
use super::filters::{FilterCategory, FilterChange, FilterState};
use super::overlay::{Overlay, OverlayFields};
use super::publish::{Publication, ViewModel, ViewModelPublisher};
use super::snapshot::{EdgeId, GraphSnapshot};
use super::stats::VisibleStats;
use super::visibility;

/// How a category's state moved during a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	/// `Inactive -> Active`: the category was applied.
	Activated,
	/// `Active -> Inactive`: the category's fields were reset.
	Deactivated,
	/// `Active -> Active`: re-applied from the snapshot.
	Reapplied,
	/// `Inactive -> Inactive`: nothing to do for this category.
	Unchanged,
}

impl Transition {
	fn between(was: bool, now: bool) -> Self {
		match (was, now) {
			(false, true) => Self::Activated,
			(true, false) => Self::Deactivated,
			(true, true) => Self::Reapplied,
			(false, false) => Self::Unchanged,
		}
	}
}

/// Outcome of [`FilterEngine::apply_change`].
#[derive(Clone, Debug)]
pub struct Update {
	/// Category the change belonged to.
	pub category: FilterCategory,
	/// State-machine step taken by that category.
	pub transition: Transition,
	/// The resulting publication.
	pub publication: Publication,
}

fn owned_fields(category: FilterCategory) -> OverlayFields {
	match category {
		FilterCategory::NodeFilters => OverlayFields::VISIBILITY,
		FilterCategory::Community => OverlayFields::COMMUNITY,
		FilterCategory::Centrality => OverlayFields::CENTRALITY,
	}
}

/// Filtering and visual-encoding engine over one loaded graph.
#[derive(Debug)]
pub struct FilterEngine {
	snapshot: GraphSnapshot,
	filters: FilterState,
	overlay: Overlay,
	stats: VisibleStats,
	publisher: ViewModelPublisher,
}

impl FilterEngine {
	/// Start a session with all filters inactive and ranges spanning the graph.
	pub fn new(snapshot: GraphSnapshot) -> Self {
		let filters = FilterState::for_snapshot(snapshot.stats());
		let overlay = Overlay::baseline(&snapshot);
		let stats = VisibleStats::from_load(snapshot.stats());
		let publisher = ViewModelPublisher::new(&snapshot);
		Self {
			snapshot,
			filters,
			overlay,
			stats,
			publisher,
		}
	}

	/// Replace the snapshot. Filters, overlay and stats start over.
	pub fn load(&mut self, snapshot: GraphSnapshot) -> Arc<ViewModel> {
		info!(
			"Replacing snapshot ({} nodes) with a new one ({} nodes)",
			self.snapshot.nodes().len(),
			snapshot.nodes().len()
		);
		self.filters = FilterState::for_snapshot(snapshot.stats());
		self.overlay = Overlay::baseline(&snapshot);
		self.stats = VisibleStats::from_load(snapshot.stats());
		self.snapshot = snapshot;
		self.publisher.reload(&self.snapshot)
	}

	/// The loaded snapshot.
	pub fn snapshot(&self) -> &GraphSnapshot {
		&self.snapshot
	}

	/// The current filter state.
	pub fn filters(&self) -> &FilterState {
		&self.filters
	}

	/// The current overlay.
	pub fn overlay(&self) -> &Overlay {
		&self.overlay
	}

	/// Statistics of the visible subgraph.
	pub fn stats(&self) -> &VisibleStats {
		&self.stats
	}

	/// The most recently published view model.
	pub fn view(&self) -> Arc<ViewModel> {
		self.publisher.current()
	}

	/// Apply one field mutation and run a full pass.
	pub fn apply_change(&mut self, change: FilterChange) -> Update {
		let was = self.filters.is_active(change.category());
		let category = self.filters.apply(change);
		let transition = Transition::between(was, self.filters.is_active(category));
		debug!("{category:?}: {transition:?}");
		let publication = self.recompute();
		Update {
			category,
			transition,
			publication,
		}
	}

	/// Replace the whole filter state and run a full pass.
	pub fn set_filters(&mut self, filters: FilterState) -> Publication {
		self.filters = filters;
		self.recompute()
	}

	/// Run one full pass: visibility and stats, then community highlighting,
	/// then centrality sizing, then publish.
	pub fn recompute(&mut self) -> Publication {
		let mut overlay = self.overlay.clone();
		let mut stats = VisibleStats::from_load(self.snapshot.stats());

		for category in FilterCategory::ALL {
			let fields = owned_fields(category);
			if !self.filters.is_active(category) {
				overlay.reset(fields);
				continue;
			}
			let layer = match category {
				FilterCategory::NodeFilters => {
					let pass = visibility::apply(&self.snapshot, &self.filters.node_filters);
					stats = pass.stats;
					Some(pass.overlay)
				}
				FilterCategory::Community => community::apply(&self.snapshot, &self.filters.community),
				FilterCategory::Centrality => centrality::apply(&self.snapshot, &self.filters.centrality),
			};
			match layer {
				Some(layer) => overlay.merge(&layer, fields),
				None => warn!("{category:?} parameters name nothing in this snapshot; overlay left as is"),
			}
		}

		self.overlay = overlay;
		self.stats = stats.clone();
		let publication = self.publisher.publish(&self.snapshot, &self.overlay, stats);
		debug!(
			"Published revision {}: {} nodes, {} edges visible, {} nodes and {} edges changed",
			publication.view.revision,
			publication.view.stats.visible_nodes,
			publication.view.stats.visible_edges,
			publication.delta.nodes.len(),
			publication.delta.edges.len()
		);
		publication
	}

	/// Ego network of `focal` for the detail view.
	pub fn extract_ego(&self, focal: &str) -> Result<DetailSubgraph, SelectionError> {
		ego::extract_ego(&self.snapshot, focal)
	}

	/// Detail view for a selection in the main view.
	pub fn extract_from_selection<S: AsRef<str>>(
		&self,
		nodes: &[S],
		edges: &[EdgeId],
	) -> Result<DetailSubgraph, SelectionError> {
		ego::extract_from_selection(&self.snapshot, nodes, edges)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::filters::{Interval, SizeOp, SizePredicate};
	use crate::engine::overlay::OverlayColor;
	use crate::engine::snapshot::{CentralityResult, CommunityPartition, Link, Node};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	fn snapshot() -> GraphSnapshot {
		let mut community = CommunityPartition::new();
		community.insert("cliques".into(), vec![vec!["A".into(), "B".into()]]);
		let mut centrality = BTreeMap::new();
		centrality.insert(
			"degree".to_string(),
			CentralityResult::from_values(BTreeMap::from([
				("A".to_string(), 0.0),
				("B".to_string(), 1.0),
			])),
		);
		GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("B", "B"), Node::new("C", "C")],
			vec![
				Link::new("A", "B", 50.0),
				Link::new("B", "A", 10.0),
				Link::new("B", "C", 5.0),
			],
			community,
			centrality,
		)
		.unwrap()
	}

	fn toggle(category: FilterCategory, active: bool) -> FilterChange {
		FilterChange::SetActive { category, active }
	}

	#[test]
	fn transitions_follow_the_state_machine() {
		let mut engine = FilterEngine::new(snapshot());
		let steps = [
			toggle(FilterCategory::Community, true),
			FilterChange::SizePredicate(SizePredicate::new(SizeOp::AtLeast, 2)),
			toggle(FilterCategory::Community, false),
			FilterChange::SizePredicate(SizePredicate::new(SizeOp::Equal, 2)),
		];
		let transitions: Vec<_> = steps
			.into_iter()
			.map(|change| engine.apply_change(change).transition)
			.collect();
		assert_eq!(
			transitions,
			vec![
				Transition::Activated,
				Transition::Reapplied,
				Transition::Deactivated,
				Transition::Unchanged,
			]
		);
	}

	#[test]
	fn deactivating_restores_baseline() {
		let mut engine = FilterEngine::new(snapshot());
		let baseline = engine.overlay().clone();

		engine.apply_change(FilterChange::EdgeWeightRange(Interval::new(20.0, 100.0)));
		engine.apply_change(toggle(FilterCategory::NodeFilters, true));
		engine.apply_change(toggle(FilterCategory::Community, true));
		engine.apply_change(toggle(FilterCategory::Centrality, true));
		assert_ne!(engine.overlay(), &baseline);

		engine.apply_change(toggle(FilterCategory::Community, false));
		engine.apply_change(toggle(FilterCategory::NodeFilters, false));
		engine.apply_change(toggle(FilterCategory::Centrality, false));
		assert_eq!(engine.overlay(), &baseline);
		assert_eq!(engine.stats(), &VisibleStats::from_load(engine.snapshot().stats()));
	}

	#[test]
	fn unknown_metric_leaves_previous_sizes() {
		let mut engine = FilterEngine::new(snapshot());
		engine.apply_change(toggle(FilterCategory::Centrality, true));
		let sized = engine.overlay().clone();

		let update = engine.apply_change(FilterChange::CentralityMetric("pagerank".into()));
		assert_eq!(update.transition, Transition::Reapplied);
		assert_eq!(engine.overlay(), &sized);
		assert!(update.publication.delta.is_empty());
	}

	#[test]
	fn categories_compose_without_interfering() {
		let mut engine = FilterEngine::new(snapshot());
		engine.apply_change(FilterChange::EdgeWeightRange(Interval::new(20.0, 100.0)));
		engine.apply_change(toggle(FilterCategory::NodeFilters, true));
		engine.apply_change(FilterChange::SizePredicate(SizePredicate::new(SizeOp::Equal, 2)));
		engine.apply_change(toggle(FilterCategory::Community, true));

		let view = engine.view();
		let c = view.node("C").unwrap();
		assert!(c.overlay.hidden);
		assert_eq!(c.overlay.color, Some(OverlayColor::Faded));
		assert_eq!(view.edges[0].overlay.color, Some(OverlayColor::InheritFromSource));
		assert!(view.edges[1].overlay.hidden);
		assert_eq!(view.stats.visible_edges, 1);
	}

	#[test]
	fn load_resets_everything() {
		let mut engine = FilterEngine::new(snapshot());
		engine.apply_change(toggle(FilterCategory::NodeFilters, true));
		let previous = engine.view().revision;

		let view = engine.load(snapshot());
		assert!(view.revision > previous);
		assert!(!engine.filters().node_filters.active);
		assert_eq!(engine.filters().node_filters.edge_weight_range, Interval::new(5.0, 50.0));
		assert!(view.visible_nodes().count() == 3);
	}

	#[test]
	fn detail_views_ignore_main_filters() {
		let mut engine = FilterEngine::new(snapshot());
		engine.apply_change(toggle(FilterCategory::Community, true));
		let sub = engine.extract_ego("C").unwrap();
		assert_eq!(sub.nodes.len(), 2);
		assert!(sub.nodes.iter().all(|n| n.overlay.color.is_none()));
	}
}
