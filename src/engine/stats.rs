//! Aggregates over the visible subgraph.

use std::collections::HashSet;

use serde::Serialize;

use super::snapshot::{GraphSnapshot, LoadStats};

/// Statistics of the currently visible subgraph.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleStats {
	/// Distinct endpoints of visible edges.
	pub visible_nodes: usize,
	/// Visible edges.
	pub visible_edges: usize,
	/// Mean weight of visible edges; 0 when none are visible.
	pub avg_edge_weight: f64,
	/// Percentage of visible edges that are reciprocal; 0 when none are visible.
	pub reciprocity_percent: f64,
}

impl VisibleStats {
	/// Aggregate the edges flagged visible in `visible` (aligned with the
	/// snapshot's edges).
	pub fn aggregate(snapshot: &GraphSnapshot, visible: &[bool]) -> Self {
		let mut endpoints = HashSet::new();
		let mut visible_edges = 0usize;
		let mut weight_sum = 0.0;
		let mut reciprocal = 0usize;

		for (edge, _) in snapshot.edges().iter().zip(visible).filter(|(_, v)| **v) {
			visible_edges += 1;
			weight_sum += edge.weight;
			if edge.reciprocal {
				reciprocal += 1;
			}
			endpoints.insert(edge.from.as_str());
			endpoints.insert(edge.to.as_str());
		}

		if visible_edges == 0 {
			return Self {
				visible_nodes: endpoints.len(),
				..Self::default()
			};
		}

		Self {
			visible_nodes: endpoints.len(),
			visible_edges,
			avg_edge_weight: weight_sum / visible_edges as f64,
			reciprocity_percent: reciprocal as f64 * 100.0 / visible_edges as f64,
		}
	}

	/// The unfiltered stats, as reported by the loader.
	pub fn from_load(stats: &LoadStats) -> Self {
		Self {
			visible_nodes: stats.node_count,
			visible_edges: stats.edge_count,
			avg_edge_weight: stats.avg_weight,
			reciprocity_percent: stats.reciprocity,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::snapshot::{CommunityPartition, Link, Node};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	fn snapshot() -> GraphSnapshot {
		GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("B", "B"), Node::new("C", "C")],
			vec![
				Link::new("A", "B", 50.0),
				Link::new("B", "A", 10.0),
				Link::new("C", "A", 6.0),
			],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap()
	}

	#[test]
	fn nothing_visible_is_all_zero() {
		let stats = VisibleStats::aggregate(&snapshot(), &[false, false, false]);
		assert_eq!(stats, VisibleStats::default());
		assert!(stats.avg_edge_weight.is_finite() && stats.reciprocity_percent.is_finite());
	}

	#[test]
	fn aggregates_visible_edges_only() {
		let stats = VisibleStats::aggregate(&snapshot(), &[true, false, true]);
		assert_eq!(
			stats,
			VisibleStats {
				visible_nodes: 3,
				visible_edges: 2,
				avg_edge_weight: 28.0,
				reciprocity_percent: 50.0,
			}
		);
	}
}
