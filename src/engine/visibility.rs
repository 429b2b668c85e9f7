//! Weight and reciprocity filtering.
//!
//! Edges are filtered first; node visibility is then derived from them: a
//! node is shown iff it is an endpoint of at least one visible edge.

use std::collections::HashSet;

use super::filters::{NodeFilters, ReciprocalMode};
use super::overlay::{EdgeOverlay, NodeOverlay, Overlay};
use super::snapshot::{Edge, GraphSnapshot};
use super::stats::VisibleStats;

/// Result of one weight/reciprocity pass.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityPass {
	/// `hidden`, `physics` and `title` for every node and edge.
	pub overlay: Overlay,
	/// Aggregates over the visible edges.
	pub stats: VisibleStats,
}

fn filter_edge(edge: &Edge, filters: &NodeFilters) -> EdgeOverlay {
	let mut out = EdgeOverlay {
		hidden: true,
		physics: false,
		..EdgeOverlay::default()
	};
	if !filters.edge_weight_range.contains(edge.weight) {
		return out;
	}

	let visible = match filters.reciprocal_mode {
		ReciprocalMode::All => true,
		ReciprocalMode::NonReciprocalOnly => !edge.reciprocal,
		ReciprocalMode::ReciprocalOnly => match edge.reciprocal_weight_ratio {
			Some(ratio) if edge.reciprocal && filters.reciprocal_weight_ratio_range.contains(ratio) => {
				out.title = Some(ratio.to_string());
				true
			}
			_ => false,
		},
	};

	out.hidden = !visible;
	out.physics = visible;
	out
}

/// Filter `snapshot` by `filters`, starting from the unfiltered baseline.
pub fn apply(snapshot: &GraphSnapshot, filters: &NodeFilters) -> VisibilityPass {
	let edges: Vec<EdgeOverlay> = snapshot
		.edges()
		.iter()
		.map(|edge| filter_edge(edge, filters))
		.collect();

	let visible: Vec<bool> = edges.iter().map(|e| !e.hidden).collect();
	let shown: HashSet<&str> = snapshot
		.edges()
		.iter()
		.zip(&visible)
		.filter(|(_, v)| **v)
		.flat_map(|(e, _)| [e.from.as_str(), e.to.as_str()])
		.collect();

	let nodes = snapshot
		.nodes()
		.iter()
		.map(|node| {
			let on = shown.contains(node.id.as_str());
			NodeOverlay {
				hidden: !on,
				physics: on,
				..NodeOverlay::default()
			}
		})
		.collect();

	VisibilityPass {
		overlay: Overlay { nodes, edges },
		stats: VisibleStats::aggregate(snapshot, &visible),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::filters::Interval;
	use crate::engine::snapshot::{CommunityPartition, Link, Node};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	fn snapshot() -> GraphSnapshot {
		GraphSnapshot::new(
			vec![
				Node::new("A", "A"),
				Node::new("B", "B"),
				Node::new("C", "C"),
				Node::new("D", "D"),
			],
			vec![
				Link::new("A", "B", 50.0),
				Link::new("B", "A", 10.0),
				Link::new("C", "A", 30.0),
			],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap()
	}

	fn filters(min: f64, max: f64, mode: ReciprocalMode) -> NodeFilters {
		NodeFilters {
			active: true,
			edge_weight_range: Interval::new(min, max),
			reciprocal_weight_ratio_range: Interval::new(0.0, 7.0),
			reciprocal_mode: mode,
		}
	}

	fn hidden_edges(pass: &VisibilityPass) -> Vec<bool> {
		pass.overlay.edges.iter().map(|e| e.hidden).collect()
	}

	fn hidden_nodes(pass: &VisibilityPass) -> Vec<bool> {
		pass.overlay.nodes.iter().map(|n| n.hidden).collect()
	}

	#[test]
	fn weight_range_hides_light_edges_and_orphaned_nodes() {
		let pass = apply(&snapshot(), &filters(20.0, 100.0, ReciprocalMode::All));
		assert_eq!(hidden_edges(&pass), vec![false, true, false]);
		assert_eq!(hidden_nodes(&pass), vec![false, false, false, true]);
		assert!(!pass.overlay.nodes[3].physics);
		assert!(!pass.overlay.edges[1].physics);
	}

	#[test]
	fn reciprocal_only_annotates_ratio() {
		let pass = apply(&snapshot(), &filters(0.0, 100.0, ReciprocalMode::ReciprocalOnly));
		assert_eq!(hidden_edges(&pass), vec![false, false, true]);
		assert_eq!(pass.overlay.edges[0].title.as_deref(), Some("5"));
		assert_eq!(pass.overlay.edges[1].title.as_deref(), Some("0.2"));
		assert_eq!(pass.overlay.edges[2].title, None);
		assert_eq!(hidden_nodes(&pass), vec![false, false, true, true]);
	}

	#[test]
	fn reciprocal_only_respects_ratio_range() {
		let mut f = filters(0.0, 100.0, ReciprocalMode::ReciprocalOnly);
		f.reciprocal_weight_ratio_range = Interval::new(1.0, 7.0);
		let pass = apply(&snapshot(), &f);
		assert_eq!(hidden_edges(&pass), vec![false, true, true]);
		assert_eq!(pass.stats.visible_edges, 1);
		assert_eq!(pass.stats.reciprocity_percent, 100.0);
	}

	#[test]
	fn non_reciprocal_only_drops_pairs() {
		let pass = apply(&snapshot(), &filters(0.0, 100.0, ReciprocalMode::NonReciprocalOnly));
		assert_eq!(hidden_edges(&pass), vec![true, true, false]);
		assert_eq!(pass.stats.visible_nodes, 2);
		assert_eq!(pass.stats.reciprocity_percent, 0.0);
	}

	#[test]
	fn empty_range_yields_zero_stats() {
		let pass = apply(&snapshot(), &filters(500.0, 600.0, ReciprocalMode::All));
		assert_eq!(pass.stats, VisibleStats::default());
		assert!(pass.overlay.nodes.iter().all(|n| n.hidden));
	}
}
