//! The immutable graph snapshot the engine reads from.
//!
//! A snapshot is validated once, when it is built. Every filter pass only
//! reads it, so the rest of the engine may assume that edge endpoints,
//! community members and scored nodes all exist.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::SnapshotError;

/// A user in the answerer graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
	/// Unique id.
	pub id: String,
	/// Display label.
	pub label: String,
}

impl Node {
	/// Create a node.
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
		}
	}
}

/// Position of an edge in its snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A raw directed "answered" relation, before reciprocity is derived.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Answering user.
	pub from: String,
	/// Answered user.
	pub to: String,
	/// Answer count.
	pub weight: f64,
}

impl Link {
	/// Create a link.
	pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			weight,
		}
	}
}

/// A directed, weighted edge with its derived reciprocity data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
	/// Position in the snapshot.
	pub id: EdgeId,
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Answer count, never negative.
	pub weight: f64,
	/// Whether the reverse edge exists.
	pub reciprocal: bool,
	/// `weight / reverse weight`, rounded to two decimals with ties to even.
	/// Only set when `reciprocal` is true.
	pub reciprocal_weight_ratio: Option<f64>,
}

/// One community: the ids of its members.
pub type Community = Vec<String>;

/// Detection method name to its ordered communities.
pub type CommunityPartition = BTreeMap<String, Vec<Community>>;

/// Scores of one centrality metric with their declared bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentralityResult {
	/// Smallest score.
	pub min: f64,
	/// Largest score.
	pub max: f64,
	/// Node id to score.
	pub values: BTreeMap<String, f64>,
}

impl CentralityResult {
	/// Build a result whose bounds are taken from the scores themselves.
	pub fn from_values(values: BTreeMap<String, f64>) -> Self {
		let min = values.values().copied().fold(f64::INFINITY, f64::min);
		let max = values.values().copied().fold(f64::NEG_INFINITY, f64::max);
		if values.is_empty() {
			return Self {
				min: 0.0,
				max: 0.0,
				values,
			};
		}
		Self { min, max, values }
	}
}

/// Aggregates computed once per load, used to seed filter ranges.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadStats {
	/// Number of nodes.
	pub node_count: usize,
	/// Number of edges.
	pub edge_count: usize,
	/// Mean edge weight, two decimals.
	pub avg_weight: f64,
	/// Percentage of edges that are reciprocal, two decimals.
	pub reciprocity: f64,
	/// Smallest edge weight.
	pub min_weight: f64,
	/// Largest edge weight.
	pub max_weight: f64,
	/// Smallest reciprocal ratio, if any edge is reciprocal.
	pub min_reciprocal_ratio: Option<f64>,
	/// Largest reciprocal ratio, if any edge is reciprocal.
	pub max_reciprocal_ratio: Option<f64>,
}

impl LoadStats {
	fn compute(node_count: usize, edges: &[Edge]) -> Self {
		let edge_count = edges.len();
		if edge_count == 0 {
			return Self {
				node_count,
				..Self::default()
			};
		}

		let weights = edges.iter().map(|e| e.weight);
		let sum: f64 = weights.clone().sum();
		let min_weight = weights.clone().fold(f64::INFINITY, f64::min);
		let max_weight = weights.fold(f64::NEG_INFINITY, f64::max);
		let reciprocal = edges.iter().filter(|e| e.reciprocal).count();

		// a zero reverse weight gives an infinite ratio, which cannot seed a range
		let ratios: Vec<f64> = edges
			.iter()
			.filter_map(|e| e.reciprocal_weight_ratio)
			.filter(|r| r.is_finite())
			.collect();
		let (min_reciprocal_ratio, max_reciprocal_ratio) = if ratios.is_empty() {
			(None, None)
		} else {
			(
				Some(ratios.iter().copied().fold(f64::INFINITY, f64::min)),
				Some(ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
			)
		};

		Self {
			node_count,
			edge_count,
			avg_weight: round2(sum / edge_count as f64),
			reciprocity: round2(reciprocal as f64 * 100.0 / edge_count as f64),
			min_weight,
			max_weight,
			min_reciprocal_ratio,
			max_reciprocal_ratio,
		}
	}
}

/// Two-decimal rounding with ties to even, so `0.125` becomes `0.12`.
pub(crate) fn round2(x: f64) -> f64 {
	(x * 100.0).round_ties_even() / 100.0
}

/// A loaded graph together with its precomputed analysis results.
#[derive(Clone, Debug)]
pub struct GraphSnapshot {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	community: CommunityPartition,
	centrality: BTreeMap<String, CentralityResult>,
	stats: LoadStats,
	index: HashMap<String, usize>,
}

impl GraphSnapshot {
	/// Validate the parts and build a snapshot, deriving reciprocity for
	/// every edge from mutual presence.
	pub fn new(
		nodes: Vec<Node>,
		links: Vec<Link>,
		community: CommunityPartition,
		centrality: BTreeMap<String, CentralityResult>,
	) -> Result<Self, SnapshotError> {
		let mut index = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			if index.insert(node.id.clone(), i).is_some() {
				return Err(SnapshotError::DuplicateNode(node.id.clone()));
			}
		}

		let mut weights: HashMap<(&str, &str), f64> = HashMap::with_capacity(links.len());
		for (i, link) in links.iter().enumerate() {
			for endpoint in [&link.from, &link.to] {
				if !index.contains_key(endpoint) {
					return Err(SnapshotError::DanglingEndpoint {
						edge: i,
						from: link.from.clone(),
						to: link.to.clone(),
						missing: endpoint.clone(),
					});
				}
			}
			if !link.weight.is_finite() || link.weight < 0.0 {
				return Err(SnapshotError::InvalidWeight {
					edge: i,
					from: link.from.clone(),
					to: link.to.clone(),
					weight: link.weight,
				});
			}
			if weights.insert((link.from.as_str(), link.to.as_str()), link.weight).is_some() {
				return Err(SnapshotError::DuplicateEdge {
					from: link.from.clone(),
					to: link.to.clone(),
				});
			}
		}

		let edges: Vec<Edge> = links
			.iter()
			.enumerate()
			.map(|(i, link)| {
				let reverse = weights.get(&(link.to.as_str(), link.from.as_str())).copied();
				Edge {
					id: EdgeId(i),
					from: link.from.clone(),
					to: link.to.clone(),
					weight: link.weight,
					reciprocal: reverse.is_some(),
					reciprocal_weight_ratio: reverse.map(|rw| weight_ratio(link.weight, rw)),
				}
			})
			.collect();

		for (method, communities) in &community {
			for (i, members) in communities.iter().enumerate() {
				if let Some(node) = members.iter().find(|id| !index.contains_key(*id)) {
					return Err(SnapshotError::UnknownCommunityMember {
						method: method.clone(),
						community: i,
						node: node.clone(),
					});
				}
			}
		}

		for (metric, result) in &centrality {
			if !result.min.is_finite() || !result.max.is_finite() || result.min > result.max {
				return Err(SnapshotError::InvalidBounds {
					metric: metric.clone(),
					min: result.min,
					max: result.max,
				});
			}
			for (node, &value) in &result.values {
				if !index.contains_key(node) {
					return Err(SnapshotError::UnknownScoredNode {
						metric: metric.clone(),
						node: node.clone(),
					});
				}
				if !(result.min..=result.max).contains(&value) {
					return Err(SnapshotError::ScoreOutOfBounds {
						metric: metric.clone(),
						node: node.clone(),
						value,
						min: result.min,
						max: result.max,
					});
				}
			}
		}

		let stats = LoadStats::compute(nodes.len(), &edges);
		info!(
			"Loaded snapshot: {} nodes, {} edges, {:.2}% reciprocal",
			stats.node_count, stats.edge_count, stats.reciprocity
		);

		Ok(Self {
			nodes,
			edges,
			community,
			centrality,
			stats,
			index,
		})
	}

	/// Decode the vis-network flavoured JSON served by the data loader.
	pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
		let wire: WireSnapshot = serde_json::from_str(json).inspect_err(|e| {
			warn!("Rejected snapshot JSON: {e}");
		})?;
		wire.into_snapshot().inspect_err(|e| {
			warn!("Rejected snapshot: {e}");
		})
	}

	/// All nodes, in load order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// All edges, in load order. `edges()[i].id == EdgeId(i)`.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.node_index(id).map(|i| &self.nodes[i])
	}

	/// Position of a node in [`nodes`](Self::nodes).
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Look up an edge by id.
	pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.get(id.0)
	}

	/// The communities found by `method`, in upstream order.
	pub fn communities(&self, method: &str) -> Option<&[Community]> {
		self.community.get(method).map(Vec::as_slice)
	}

	/// Names of the available community methods.
	pub fn community_methods(&self) -> impl Iterator<Item = &str> {
		self.community.keys().map(String::as_str)
	}

	/// Smallest and largest community size for `method`.
	pub fn community_size_bounds(&self, method: &str) -> Option<(usize, usize)> {
		let sizes = self.communities(method)?.iter().map(Vec::len);
		Some((sizes.clone().min()?, sizes.max()?))
	}

	/// Scores for `metric`.
	pub fn centrality(&self, metric: &str) -> Option<&CentralityResult> {
		self.centrality.get(metric)
	}

	/// Names of the available centrality metrics.
	pub fn centrality_metrics(&self) -> impl Iterator<Item = &str> {
		self.centrality.keys().map(String::as_str)
	}

	/// Load-time aggregates.
	pub fn stats(&self) -> &LoadStats {
		&self.stats
	}

	/// Nodes whose label contains `term`, ignoring case, ordered by label.
	pub fn search(&self, term: &str) -> Vec<&Node> {
		let term = term.to_lowercase();
		let mut found: Vec<&Node> = self
			.nodes
			.iter()
			.filter(|n| n.label.to_lowercase().contains(&term))
			.collect();
		found.sort_by(|a, b| a.label.cmp(&b.label));
		found
	}
}

fn weight_ratio(weight: f64, reverse: f64) -> f64 {
	if reverse == 0.0 {
		return if weight == 0.0 { 1.0 } else { f64::INFINITY };
	}
	round2(weight / reverse)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
	Text(String),
	Number(i64),
}

impl From<WireId> for String {
	fn from(id: WireId) -> Self {
		match id {
			WireId::Text(s) => s,
			WireId::Number(n) => n.to_string(),
		}
	}
}

#[derive(Deserialize)]
struct WireNode {
	id: WireId,
	#[serde(default)]
	label: Option<WireId>,
}

#[derive(Deserialize)]
struct WireLink {
	from: WireId,
	to: WireId,
	#[serde(alias = "weight")]
	value: f64,
}

#[derive(Deserialize)]
struct WireSnapshot {
	nodes: Vec<WireNode>,
	links: Vec<WireLink>,
	#[serde(default)]
	community: BTreeMap<String, Vec<Vec<WireId>>>,
	#[serde(default)]
	centrality: BTreeMap<String, CentralityResult>,
}

impl WireSnapshot {
	fn into_snapshot(self) -> Result<GraphSnapshot, SnapshotError> {
		let nodes = self
			.nodes
			.into_iter()
			.map(|n| {
				let id = String::from(n.id);
				let label = n.label.map_or_else(|| id.clone(), String::from);
				Node { id, label }
			})
			.collect();
		let links = self
			.links
			.into_iter()
			.map(|l| Link::new(l.from, l.to, l.value))
			.collect();
		let community = self
			.community
			.into_iter()
			.map(|(method, communities)| {
				let communities = communities
					.into_iter()
					.map(|members| members.into_iter().map(String::from).collect())
					.collect();
				(method, communities)
			})
			.collect();
		GraphSnapshot::new(nodes, links, community, self.centrality)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn pair(ab: f64, ba: f64) -> GraphSnapshot {
		GraphSnapshot::new(
			vec![Node::new("A", "Alice"), Node::new("B", "Bob")],
			vec![Link::new("A", "B", ab), Link::new("B", "A", ba)],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap()
	}

	#[test]
	fn mutual_edges_are_reciprocal_with_rounded_ratio() {
		let snapshot = pair(50.0, 15.0);
		let [ab, ba] = snapshot.edges() else {
			panic!("expected two edges");
		};
		assert!(ab.reciprocal && ba.reciprocal);
		assert_eq!(ab.reciprocal_weight_ratio, Some(3.33));
		assert_eq!(ba.reciprocal_weight_ratio, Some(0.3));
	}

	#[test]
	fn zero_reverse_weight_gives_infinite_ratio() {
		let snapshot = pair(4.0, 0.0);
		assert_eq!(snapshot.edges()[0].reciprocal_weight_ratio, Some(f64::INFINITY));
		assert_eq!(snapshot.edges()[1].reciprocal_weight_ratio, Some(0.0));
		assert_eq!(snapshot.stats().min_reciprocal_ratio, Some(0.0));
		assert_eq!(snapshot.stats().max_reciprocal_ratio, Some(0.0));
	}

	#[test]
	fn ratio_halves_round_to_even() {
		let snapshot = pair(1.0, 8.0);
		assert_eq!(snapshot.edges()[0].reciprocal_weight_ratio, Some(0.12));
		assert_eq!(snapshot.edges()[1].reciprocal_weight_ratio, Some(8.0));
		assert_eq!(round2(0.375), 0.38);
	}

	#[test]
	fn load_stats_cover_weights_and_ratios() {
		let snapshot = GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("B", "B"), Node::new("C", "C")],
			vec![
				Link::new("A", "B", 50.0),
				Link::new("B", "A", 10.0),
				Link::new("B", "C", 3.0),
			],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap();

		assert_eq!(
			snapshot.stats(),
			&LoadStats {
				node_count: 3,
				edge_count: 3,
				avg_weight: 21.0,
				reciprocity: 66.67,
				min_weight: 3.0,
				max_weight: 50.0,
				min_reciprocal_ratio: Some(0.2),
				max_reciprocal_ratio: Some(5.0),
			}
		);
	}

	#[test]
	fn empty_snapshot_has_zeroed_stats() {
		let snapshot =
			GraphSnapshot::new(vec![], vec![], CommunityPartition::new(), BTreeMap::new())
				.unwrap();
		assert_eq!(snapshot.stats(), &LoadStats::default());
	}

	#[test]
	fn rejects_dangling_endpoint() {
		let err = GraphSnapshot::new(
			vec![Node::new("A", "A")],
			vec![Link::new("A", "Z", 1.0)],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap_err();
		assert!(matches!(
			err,
			SnapshotError::DanglingEndpoint { ref missing, .. } if missing == "Z"
		));
	}

	#[test]
	fn rejects_duplicate_nodes_and_edges() {
		let dup_node = GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("A", "again")],
			vec![],
			CommunityPartition::new(),
			BTreeMap::new(),
		);
		assert!(matches!(dup_node, Err(SnapshotError::DuplicateNode(id)) if id == "A"));

		let dup_edge = GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("B", "B")],
			vec![Link::new("A", "B", 1.0), Link::new("A", "B", 2.0)],
			CommunityPartition::new(),
			BTreeMap::new(),
		);
		assert!(matches!(dup_edge, Err(SnapshotError::DuplicateEdge { .. })));
	}

	#[test]
	fn rejects_negative_weight() {
		let err = GraphSnapshot::new(
			vec![Node::new("A", "A"), Node::new("B", "B")],
			vec![Link::new("A", "B", -1.0)],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap_err();
		assert!(matches!(err, SnapshotError::InvalidWeight { .. }));
	}

	#[test]
	fn rejects_unknown_community_member_and_out_of_bounds_score() {
		let mut community = CommunityPartition::new();
		community.insert("cliques".into(), vec![vec!["A".into(), "Q".into()]]);
		let err = GraphSnapshot::new(vec![Node::new("A", "A")], vec![], community, BTreeMap::new())
			.unwrap_err();
		assert!(matches!(err, SnapshotError::UnknownCommunityMember { ref node, .. } if node == "Q"));

		let mut centrality = BTreeMap::new();
		centrality.insert(
			"degree".to_string(),
			CentralityResult {
				min: 0.0,
				max: 1.0,
				values: BTreeMap::from([("A".to_string(), 2.0)]),
			},
		);
		let err = GraphSnapshot::new(
			vec![Node::new("A", "A")],
			vec![],
			CommunityPartition::new(),
			centrality,
		)
		.unwrap_err();
		assert!(matches!(err, SnapshotError::ScoreOutOfBounds { .. }));
	}

	#[test]
	fn decodes_wire_json_with_numeric_ids() {
		let json = r#"{
			"nodes": [{"id": 1, "label": "Ada"}, {"id": 2}],
			"links": [{"from": 1, "to": 2, "value": 7, "reciprocal": false}],
			"community": {"cliques": [[1, 2]]},
			"centrality": {"degree": {"min": 0.5, "max": 1.0, "values": {"1": 1.0, "2": 0.5}}},
			"stats": {"node_count": 2}
		}"#;
		let snapshot = GraphSnapshot::from_json(json).unwrap();

		assert_eq!(snapshot.node("2").map(|n| n.label.as_str()), Some("2"));
		assert_eq!(snapshot.edges()[0].from, "1");
		assert_eq!(snapshot.edges()[0].weight, 7.0);
		assert_eq!(snapshot.community_size_bounds("cliques"), Some((2, 2)));
		assert_eq!(snapshot.centrality_metrics().collect::<Vec<_>>(), vec!["degree"]);
	}

	#[test]
	fn numeric_labels_are_accepted() {
		let json = r#"{
			"nodes": [{"id": 1, "label": 1}, {"id": 2, "label": "bo"}],
			"links": [{"from": 1, "to": 2, "value": 3}]
		}"#;
		let snapshot = GraphSnapshot::from_json(json).unwrap();
		assert_eq!(snapshot.node("1").map(|n| n.label.as_str()), Some("1"));
		assert_eq!(snapshot.node("2").map(|n| n.label.as_str()), Some("bo"));
	}

	#[test]
	fn search_matches_labels_case_insensitively() {
		let snapshot = GraphSnapshot::new(
			vec![
				Node::new("1", "Maria"),
				Node::new("2", "bob"),
				Node::new("3", "Amara"),
				Node::new("4", "Jonas"),
			],
			vec![],
			CommunityPartition::new(),
			BTreeMap::new(),
		)
		.unwrap();
		let ids: Vec<&str> = snapshot.search("MAR").iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["3", "1"]);
		assert_eq!(snapshot.search("").len(), 4);
		assert!(snapshot.search("zed").is_empty());
	}

	#[test]
	fn malformed_json_is_rejected() {
		let err = GraphSnapshot::from_json("{\"nodes\": 3}").unwrap_err();
		assert!(matches!(err, SnapshotError::Malformed(_)));
	}
}
