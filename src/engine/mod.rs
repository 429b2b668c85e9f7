//! Graph filtering and visual-encoding engine.
//!
//! Given a [`GraphSnapshot`] and a [`FilterState`], the engine decides which
//! nodes and edges are visible, aggregates statistics over the visible
//! subgraph, assigns community colors and groups, scales node sizes by
//! centrality, and publishes the result as an immutable [`ViewModel`]. It also
//! extracts detail subgraphs (ego networks and selections).
//!
//! Everything here is synchronous and free of browser dependencies.

pub mod centrality;
pub mod community;
pub mod ego;
mod error;
pub mod filters;
pub mod overlay;
pub mod publish;
mod session;
pub mod snapshot;
pub mod stats;
pub mod visibility;

pub use ego::{DetailEdge, DetailNode, DetailSubgraph, extract_ego, extract_from_selection};
pub use error::{SelectionError, SnapshotError};
pub use filters::{
	CentralityFilter, CommunityFilter, FilterCategory, FilterChange, FilterState, Interval,
	NodeFilters, ReciprocalMode, SizeOp, SizePredicate,
};
pub use overlay::{EdgeOverlay, Group, NodeOverlay, Overlay, OverlayColor, OverlayFields};
pub use publish::{EdgeView, NodeView, Publication, ViewDelta, ViewModel, ViewModelPublisher};
pub use session::{FilterEngine, Transition, Update};
pub use snapshot::{
	CentralityResult, Community, CommunityPartition, Edge, EdgeId, GraphSnapshot, Link, LoadStats,
	Node,
};
pub use stats::VisibleStats;
