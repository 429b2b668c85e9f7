use std::collections::HashMap;

use crate::engine::{DetailSubgraph, EdgeOverlay, Group, NodeOverlay, OverlayColor, ViewModel};

pub const FADED_COLOR: &str = "rgba(120, 120, 120, 0.25)";
pub const DEFAULT_NODE_COLOR: &str = "#4691e7";
pub const FOCAL_NODE_COLOR: &str = "#ab54c3";

const PALETTE: &[&str] = &[
	"#ab54c3", "#53f779", "#ff3d89", "#3fa500", "#008bfe", "#aea100", "#5ca8ff", "#ffa63a",
	"#b0afff", "#01e39c", "#d44930", "#66fdff", "#ffdc6d", "#9495c6", "#f5ffb0", "#a26c50",
	"#92ffd5", "#ffb189", "#837a33",
];

/// Radius of a node without a size override.
pub const NODE_RADIUS: f64 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
	pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	/// `None` draws the default edge color.
	pub color: Option<String>,
	pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

fn node_color(overlay: &NodeOverlay) -> String {
	match (overlay.color, overlay.group) {
		(Some(OverlayColor::Faded), _) => FADED_COLOR.into(),
		(_, Some(Group::Focal)) => FOCAL_NODE_COLOR.into(),
		(_, Some(Group::Community(i))) => PALETTE[i % PALETTE.len()].into(),
		_ => DEFAULT_NODE_COLOR.into(),
	}
}

// vis-network's default node size is 25, drawn here at NODE_RADIUS
fn node_radius(overlay: &NodeOverlay) -> f64 {
	overlay.size.map_or(NODE_RADIUS, |size| size * NODE_RADIUS / 25.0)
}

fn edge_color(overlay: &EdgeOverlay, source: &str, colors: &HashMap<&str, String>) -> Option<String> {
	match overlay.color? {
		OverlayColor::Faded => Some(FADED_COLOR.into()),
		OverlayColor::InheritFromSource => colors.get(source).cloned(),
	}
}

impl GraphData {
	/// Drawable part of a published view: hidden nodes and edges stay out of
	/// the picture and out of the simulation.
	pub fn from_view(view: &ViewModel) -> Self {
		let nodes: Vec<GraphNode> = view
			.visible_nodes()
			.map(|n| GraphNode {
				id: n.id.clone(),
				label: Some(n.label.clone()),
				color: node_color(&n.overlay),
				radius: node_radius(&n.overlay),
			})
			.collect();
		let colors: HashMap<&str, String> =
			nodes.iter().map(|n| (n.id.as_str(), n.color.clone())).collect();
		let links = view
			.visible_edges()
			.map(|e| GraphLink {
				source: e.from.clone(),
				target: e.to.clone(),
				color: edge_color(&e.overlay, &e.from, &colors),
				title: e.overlay.title.clone(),
			})
			.collect();
		Self { nodes, links }
	}

	/// Drawable detail view. Edges always take their source node's color.
	pub fn from_detail(detail: &DetailSubgraph) -> Self {
		let nodes: Vec<GraphNode> = detail
			.nodes
			.iter()
			.map(|n| GraphNode {
				id: n.id.clone(),
				label: Some(n.label.clone()),
				color: node_color(&n.overlay),
				radius: node_radius(&n.overlay),
			})
			.collect();
		let colors: HashMap<&str, String> =
			nodes.iter().map(|n| (n.id.as_str(), n.color.clone())).collect();
		let links = detail
			.links
			.iter()
			.map(|e| GraphLink {
				source: e.from.clone(),
				target: e.to.clone(),
				color: colors.get(e.from.as_str()).cloned(),
				title: Some(e.tooltip()),
			})
			.collect();
		Self { nodes, links }
	}
}
