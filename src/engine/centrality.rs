//! Node sizing by centrality score.

use log::debug;

use super::filters::CentralityFilter;
use super::overlay::{NodeOverlay, Overlay};
use super::snapshot::{CentralityResult, GraphSnapshot};

/// Size of the lowest-scored node.
pub const MIN_NODE_SIZE: f64 = 10.0;
/// Size of the highest-scored node.
pub const MAX_NODE_SIZE: f64 = 100.0;

/// Map `value` linearly from the metric's `[min, max]` onto
/// `[MIN_NODE_SIZE, MAX_NODE_SIZE]`. A single-valued domain maps to the
/// midpoint.
pub fn scale(value: f64, result: &CentralityResult) -> f64 {
	let span = result.max - result.min;
	if span == 0.0 {
		return (MIN_NODE_SIZE + MAX_NODE_SIZE) / 2.0;
	}
	MIN_NODE_SIZE + (value - result.min) * (MAX_NODE_SIZE - MIN_NODE_SIZE) / span
}

/// Size every scored node. Returns `None` for an unknown metric.
pub fn apply(snapshot: &GraphSnapshot, filter: &CentralityFilter) -> Option<Overlay> {
	let Some(result) = snapshot.centrality(&filter.metric) else {
		debug!("Unknown centrality metric '{}', skipping", filter.metric);
		return None;
	};

	let mut overlay = Overlay::baseline(snapshot);
	for (id, &value) in &result.values {
		if let Some(idx) = snapshot.node_index(id) {
			overlay.nodes[idx] = NodeOverlay {
				size: Some(scale(value, result)),
				..NodeOverlay::default()
			};
		}
	}
	Some(overlay)
}
