//! Detail views: the ego network of a node, or an explicit selection.
//!
//! A detail subgraph is an independent copy. Its overlay starts from
//! baseline and it carries no layout coordinates, so nothing from the main
//! view's filters or simulation leaks into it.

use std::collections::HashSet;

use serde::Serialize;

use super::error::SelectionError;
use super::overlay::{self, EdgeOverlay, Group, NodeOverlay};
use super::snapshot::{Edge, EdgeId, GraphSnapshot, Node};

/// A node copied into a detail view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailNode {
	/// Node id.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Detail-local overlay.
	pub overlay: NodeOverlay,
}

/// An edge copied into a detail view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailEdge {
	/// Id in the main snapshot.
	pub id: EdgeId,
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Answer count.
	pub weight: f64,
	/// Whether the reverse edge exists in the main snapshot.
	pub reciprocal: bool,
	/// Reciprocal ratio, if reciprocal.
	pub reciprocal_weight_ratio: Option<f64>,
	/// Detail-local overlay.
	pub overlay: EdgeOverlay,
}

impl DetailEdge {
	/// Hover text for the edge.
	pub fn tooltip(&self) -> String {
		format!("{} answers", self.weight)
	}
}

/// A self-contained subgraph for the detail view.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetailSubgraph {
	/// Copied nodes.
	pub nodes: Vec<DetailNode>,
	/// Copied edges.
	pub links: Vec<DetailEdge>,
}

impl DetailSubgraph {
	fn copy<'a>(nodes: impl Iterator<Item = &'a Node>, edges: impl Iterator<Item = &'a Edge>) -> Self {
		let nodes: Vec<&Node> = nodes.collect();
		let edges: Vec<&Edge> = edges.collect();
		let mut node_overlays = vec![NodeOverlay::default(); nodes.len()];
		let mut edge_overlays = vec![EdgeOverlay::default(); edges.len()];
		overlay::reset(&mut node_overlays, &mut edge_overlays);

		Self {
			nodes: nodes
				.into_iter()
				.zip(node_overlays)
				.map(|(n, overlay)| DetailNode {
					id: n.id.clone(),
					label: n.label.clone(),
					overlay,
				})
				.collect(),
			links: edges
				.into_iter()
				.zip(edge_overlays)
				.map(|(e, overlay)| DetailEdge {
					id: e.id,
					from: e.from.clone(),
					to: e.to.clone(),
					weight: e.weight,
					reciprocal: e.reciprocal,
					reciprocal_weight_ratio: e.reciprocal_weight_ratio,
					overlay,
				})
				.collect(),
		}
	}

	fn tag_focal(&mut self, ids: &HashSet<&str>) {
		for node in &mut self.nodes {
			if ids.contains(node.id.as_str()) {
				node.overlay.group = Some(Group::Focal);
			}
		}
	}

	/// Nodes tagged as focal.
	pub fn focal_nodes(&self) -> impl Iterator<Item = &DetailNode> {
		self.nodes
			.iter()
			.filter(|n| n.overlay.group == Some(Group::Focal))
	}

	/// Heading for the detail panel.
	pub fn title(&self) -> String {
		let focal: Vec<&str> = self.focal_nodes().map(|n| n.label.as_str()).collect();
		match focal.as_slice() {
			[] => "Detail View".to_string(),
			[one] => format!("{one} (Ego View)"),
			many => many.join(", "),
		}
	}
}

/// The closed neighborhood of `focal`: its incident edges and their endpoints,
/// the focal node included even when it has no edges.
pub fn extract_ego(snapshot: &GraphSnapshot, focal: &str) -> Result<DetailSubgraph, SelectionError> {
	if snapshot.node_index(focal).is_none() {
		return Err(SelectionError::UnknownNode(focal.to_string()));
	}

	let incident: Vec<&Edge> = snapshot
		.edges()
		.iter()
		.filter(|e| e.from == focal || e.to == focal)
		.collect();
	let mut members: HashSet<&str> = HashSet::from([focal]);
	for edge in &incident {
		members.insert(edge.from.as_str());
		members.insert(edge.to.as_str());
	}

	Ok(DetailSubgraph::copy(
		snapshot
			.nodes()
			.iter()
			.filter(|n| members.contains(n.id.as_str())),
		incident.into_iter(),
	))
}

/// Build a detail view from a selection. A single selected node expands to
/// its ego network; otherwise exactly the selected nodes and edges are
/// copied. Selected nodes are tagged [`Group::Focal`].
pub fn extract_from_selection<S: AsRef<str>>(
	snapshot: &GraphSnapshot,
	selected_nodes: &[S],
	selected_edges: &[EdgeId],
) -> Result<DetailSubgraph, SelectionError> {
	let mut nodes = Vec::with_capacity(selected_nodes.len());
	let mut seen = HashSet::new();
	for id in selected_nodes {
		let id = id.as_ref();
		let node = snapshot
			.node(id)
			.ok_or_else(|| SelectionError::UnknownNode(id.to_string()))?;
		if seen.insert(id) {
			nodes.push(node);
		}
	}
	let mut edges = Vec::with_capacity(selected_edges.len());
	let mut seen_edges = HashSet::new();
	for &id in selected_edges {
		let edge = snapshot.edge(id).ok_or(SelectionError::UnknownEdge(id.0))?;
		if seen_edges.insert(id) {
			edges.push(edge);
		}
	}

	let mut sub = match nodes.as_slice() {
		[one] => extract_ego(snapshot, &one.id)?,
		_ => DetailSubgraph::copy(nodes.iter().copied(), edges.into_iter()),
	};
	sub.tag_focal(&seen);
	Ok(sub)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::snapshot::{CommunityPartition, Link};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	fn snapshot() -> GraphSnapshot {
		GraphSnapshot::new(
			vec![
				Node::new("A", "Ada"),
				Node::new("B", "Bea"),
				Node::new("C", "Cy"),
				Node::new("X", "Xan"),
			],
			vec![
				Link::new("A", "B", 4.0),
				Link::new("C", "A", 2.0),
				Link::new("B", "C", 9.0),
			],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap()
	}

	fn node_ids(sub: &DetailSubgraph) -> Vec<&str> {
		sub.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn ego_collects_incident_edges_and_endpoints() {
		let sub = extract_ego(&snapshot(), "A").unwrap();
		assert_eq!(node_ids(&sub), vec!["A", "B", "C"]);
		assert_eq!(sub.links.iter().map(|e| e.id).collect::<Vec<_>>(), vec![EdgeId(0), EdgeId(1)]);
		assert!(sub.nodes.iter().all(|n| n.overlay == NodeOverlay::default()));
	}

	#[test]
	fn isolated_node_is_its_own_ego() {
		let sub = extract_ego(&snapshot(), "X").unwrap();
		assert_eq!(node_ids(&sub), vec!["X"]);
		assert!(sub.links.is_empty());
	}

	#[test]
	fn unknown_focal_is_rejected() {
		assert_eq!(
			extract_ego(&snapshot(), "nobody"),
			Err(SelectionError::UnknownNode("nobody".into()))
		);
	}

	#[test]
	fn single_selection_is_tagged_ego_view() {
		let sub = extract_from_selection(&snapshot(), &["B"], &[]).unwrap();
		assert_eq!(node_ids(&sub), vec!["A", "B", "C"]);
		assert_eq!(sub.focal_nodes().map(|n| n.id.as_str()).collect::<Vec<_>>(), vec!["B"]);
		assert_eq!(sub.title(), "Bea (Ego View)");
	}

	#[test]
	fn multi_selection_copies_exactly_what_was_selected() {
		let sub = extract_from_selection(&snapshot(), &["C", "A"], &[EdgeId(1)]).unwrap();
		assert_eq!(node_ids(&sub), vec!["C", "A"]);
		assert_eq!(sub.links.len(), 1);
		assert_eq!(sub.links[0].tooltip(), "2 answers");
		assert_eq!(sub.title(), "Cy, Ada");
	}

	#[test]
	fn unknown_edge_is_rejected() {
		let err = extract_from_selection(&snapshot(), &["A", "B"], &[EdgeId(7)]).unwrap_err();
		assert_eq!(err, SelectionError::UnknownEdge(7));
	}
}
