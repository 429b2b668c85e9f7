//! Community highlighting.
//!
//! Communities passing the size predicate are ordered by ascending member
//! count (stable, so equal sizes keep their upstream order) and numbered in
//! that order. Members of a surviving community are un-faded and tagged with
//! its number. When a node belongs to several surviving communities the one
//! processed last wins, i.e. the largest; among equally sized communities,
//! the one listed later upstream.

use std::collections::HashSet;

use log::debug;

use super::filters::CommunityFilter;
use super::overlay::{EdgeOverlay, Group, NodeOverlay, Overlay, OverlayColor};
use super::snapshot::{Community, GraphSnapshot};

/// Communities of `filter.method` that satisfy the size predicate, smallest
/// first. `None` when the method is unknown.
pub fn surviving<'a>(snapshot: &'a GraphSnapshot, filter: &CommunityFilter) -> Option<Vec<&'a Community>> {
	let mut communities: Vec<&Community> = snapshot
		.communities(&filter.method)?
		.iter()
		.filter(|c| filter.size_predicate.matches(c.len()))
		.collect();
	communities.sort_by_key(|c| c.len());
	Some(communities)
}

/// Highlight the surviving communities. Returns `None` for an unknown method,
/// in which case the caller leaves the community fields untouched.
pub fn apply(snapshot: &GraphSnapshot, filter: &CommunityFilter) -> Option<Overlay> {
	let Some(communities) = surviving(snapshot, filter) else {
		debug!("Unknown community method '{}', skipping", filter.method);
		return None;
	};

	let mut nodes = vec![
		NodeOverlay {
			color: Some(OverlayColor::Faded),
			..NodeOverlay::default()
		};
		snapshot.nodes().len()
	];
	for (i, community) in communities.iter().enumerate() {
		for id in community.iter() {
			if let Some(idx) = snapshot.node_index(id) {
				nodes[idx].color = None;
				nodes[idx].group = Some(Group::Community(i));
			}
		}
	}

	let member_sets: Vec<HashSet<&str>> = communities
		.iter()
		.map(|c| c.iter().map(String::as_str).collect())
		.collect();
	let edges = snapshot
		.edges()
		.iter()
		.map(|edge| {
			let inside = member_sets
				.iter()
				.any(|set| set.contains(edge.from.as_str()) && set.contains(edge.to.as_str()));
			EdgeOverlay {
				color: Some(if inside {
					OverlayColor::InheritFromSource
				} else {
					OverlayColor::Faded
				}),
				..EdgeOverlay::default()
			}
		})
		.collect();

	debug!(
		"Highlighted {} '{}' communities",
		communities.len(),
		filter.method
	);
	Some(Overlay { nodes, edges })
}
