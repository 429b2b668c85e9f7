//! Integrity errors raised while loading a snapshot or extracting a detail view.

use thiserror::Error;

/// A snapshot was rejected because it violates a data-integrity invariant.
///
/// Snapshots are validated as a whole; a rejected snapshot never produces a
/// partially applied overlay.
#[derive(Debug, Error)]
pub enum SnapshotError {
	/// Two nodes share the same id.
	#[error("duplicate node id '{0}'")]
	DuplicateNode(String),

	/// An edge names an endpoint that is not in the node set.
	#[error("edge #{edge} ({from} -> {to}) references unknown node '{missing}'")]
	DanglingEndpoint {
		/// Position of the edge in the snapshot.
		edge: usize,
		/// Source id as given.
		from: String,
		/// Target id as given.
		to: String,
		/// The endpoint that does not exist.
		missing: String,
	},

	/// An edge weight is negative, NaN or infinite.
	#[error("edge #{edge} ({from} -> {to}) has invalid weight {weight}")]
	InvalidWeight {
		/// Position of the edge in the snapshot.
		edge: usize,
		/// Source id.
		from: String,
		/// Target id.
		to: String,
		/// Offending weight.
		weight: f64,
	},

	/// The same directed pair appears more than once.
	#[error("duplicate edge {from} -> {to}")]
	DuplicateEdge {
		/// Source id.
		from: String,
		/// Target id.
		to: String,
	},

	/// A community lists a member that is not in the node set.
	#[error("community #{community} of method '{method}' references unknown node '{node}'")]
	UnknownCommunityMember {
		/// Detection method name.
		method: String,
		/// Position of the community within the method's result.
		community: usize,
		/// Missing member id.
		node: String,
	},

	/// A centrality metric scores a node that is not in the node set.
	#[error("centrality metric '{metric}' scores unknown node '{node}'")]
	UnknownScoredNode {
		/// Metric name.
		metric: String,
		/// Missing node id.
		node: String,
	},

	/// A centrality metric's bounds are not finite or inverted.
	#[error("centrality metric '{metric}' has invalid bounds [{min}, {max}]")]
	InvalidBounds {
		/// Metric name.
		metric: String,
		/// Declared minimum.
		min: f64,
		/// Declared maximum.
		max: f64,
	},

	/// A centrality score lies outside its metric's declared bounds.
	#[error("centrality metric '{metric}' scores node '{node}' at {value}, outside [{min}, {max}]")]
	ScoreOutOfBounds {
		/// Metric name.
		metric: String,
		/// Scored node.
		node: String,
		/// Offending score.
		value: f64,
		/// Declared minimum.
		min: f64,
		/// Declared maximum.
		max: f64,
	},

	/// The snapshot JSON could not be decoded.
	#[error("malformed snapshot: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// A detail-view request named ids that the loaded snapshot does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
	/// The node id is not part of the snapshot.
	#[error("unknown node '{0}'")]
	UnknownNode(String),

	/// The edge id is not part of the snapshot.
	#[error("unknown edge #{0}")]
	UnknownEdge(usize),
}
