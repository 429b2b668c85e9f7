//! User-controlled filter parameters, grouped in three independent categories.

use serde::{Deserialize, Serialize};

use super::snapshot::LoadStats;

/// Closed interval `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
	/// Lower bound, inclusive.
	pub min: f64,
	/// Upper bound, inclusive.
	pub max: f64,
}

impl Interval {
	/// Create an interval.
	pub const fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}

	/// Whether `value` lies inside, bounds included.
	pub fn contains(&self, value: f64) -> bool {
		value >= self.min && value <= self.max
	}

	/// Whether `other` lies entirely inside `self`.
	pub fn covers(&self, other: &Interval) -> bool {
		self.min <= other.min && other.max <= self.max
	}
}

/// Which edges survive the reciprocity check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReciprocalMode {
	/// No reciprocity-based filtering.
	#[default]
	All,
	/// Keep reciprocal edges whose ratio is in range.
	ReciprocalOnly,
	/// Drop reciprocal edges.
	NonReciprocalOnly,
}

/// Weight and reciprocity parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFilters {
	/// Category switch.
	pub active: bool,
	/// Edge weights to keep.
	pub edge_weight_range: Interval,
	/// Reciprocal ratios to keep in [`ReciprocalMode::ReciprocalOnly`].
	pub reciprocal_weight_ratio_range: Interval,
	/// Reciprocity mode.
	pub reciprocal_mode: ReciprocalMode,
}

impl Default for NodeFilters {
	fn default() -> Self {
		Self {
			active: false,
			edge_weight_range: Interval::new(0.0, 2000.0),
			reciprocal_weight_ratio_range: Interval::new(0.0, 7.0),
			reciprocal_mode: ReciprocalMode::All,
		}
	}
}

/// Comparison applied to a community's member count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeOp {
	/// `=`
	#[serde(rename = "=")]
	Equal,
	/// `≥`
	#[serde(rename = "≥", alias = ">=")]
	AtLeast,
	/// `≤`
	#[serde(rename = "≤", alias = "<=")]
	AtMost,
}

/// `op size`, matched against community member counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePredicate {
	/// Comparison.
	pub op: SizeOp,
	/// Right-hand side.
	pub size: usize,
}

impl SizePredicate {
	/// Create a predicate.
	pub const fn new(op: SizeOp, size: usize) -> Self {
		Self { op, size }
	}

	/// Whether a community of `len` members satisfies the predicate.
	pub fn matches(&self, len: usize) -> bool {
		match self.op {
			SizeOp::Equal => len == self.size,
			SizeOp::AtLeast => len >= self.size,
			SizeOp::AtMost => len <= self.size,
		}
	}
}

/// Community highlighting parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityFilter {
	/// Category switch.
	pub active: bool,
	/// Detection method whose partition is highlighted.
	pub method: String,
	/// Which communities survive.
	pub size_predicate: SizePredicate,
}

impl Default for CommunityFilter {
	fn default() -> Self {
		Self {
			active: false,
			method: "cliques".into(),
			size_predicate: SizePredicate::new(SizeOp::Equal, 3),
		}
	}
}

/// Centrality sizing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentralityFilter {
	/// Category switch.
	pub active: bool,
	/// Metric that drives node size.
	pub metric: String,
}

impl Default for CentralityFilter {
	fn default() -> Self {
		Self {
			active: false,
			metric: "degree".into(),
		}
	}
}

/// The three filter categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterCategory {
	/// Weight/reciprocity visibility.
	NodeFilters,
	/// Community highlighting.
	Community,
	/// Centrality sizing.
	Centrality,
}

impl FilterCategory {
	/// Every category, in recomputation order.
	pub const ALL: [Self; 3] = [Self::NodeFilters, Self::Community, Self::Centrality];
}

/// Complete filter state, threaded explicitly into every pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
	/// Weight/reciprocity filters.
	pub node_filters: NodeFilters,
	/// Community highlighting.
	pub community: CommunityFilter,
	/// Centrality sizing.
	pub centrality: CentralityFilter,
}

impl FilterState {
	/// Defaults with the weight and ratio ranges spanning the loaded graph.
	pub fn for_snapshot(stats: &LoadStats) -> Self {
		let mut state = Self::default();
		if stats.edge_count > 0 {
			state.node_filters.edge_weight_range = Interval::new(stats.min_weight, stats.max_weight);
		}
		if let (Some(min), Some(max)) = (stats.min_reciprocal_ratio, stats.max_reciprocal_ratio) {
			state.node_filters.reciprocal_weight_ratio_range = Interval::new(min, max);
		}
		state
	}

	/// Whether `category` is switched on.
	pub fn is_active(&self, category: FilterCategory) -> bool {
		match category {
			FilterCategory::NodeFilters => self.node_filters.active,
			FilterCategory::Community => self.community.active,
			FilterCategory::Centrality => self.centrality.active,
		}
	}

	/// Apply one field mutation, returning the category it belongs to.
	pub fn apply(&mut self, change: FilterChange) -> FilterCategory {
		let category = change.category();
		match change {
			FilterChange::SetActive { category, active } => match category {
				FilterCategory::NodeFilters => self.node_filters.active = active,
				FilterCategory::Community => self.community.active = active,
				FilterCategory::Centrality => self.centrality.active = active,
			},
			FilterChange::EdgeWeightRange(range) => self.node_filters.edge_weight_range = range,
			FilterChange::ReciprocalWeightRatioRange(range) => {
				self.node_filters.reciprocal_weight_ratio_range = range
			}
			FilterChange::ReciprocalMode(mode) => self.node_filters.reciprocal_mode = mode,
			FilterChange::CommunityMethod(method) => self.community.method = method,
			FilterChange::SizePredicate(predicate) => self.community.size_predicate = predicate,
			FilterChange::CentralityMetric(metric) => self.centrality.metric = metric,
		}
		category
	}
}

/// A single-field mutation coming from the UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum FilterChange {
	/// Toggle a category.
	SetActive {
		/// Target category.
		category: FilterCategory,
		/// New switch position.
		active: bool,
	},
	/// New edge weight range.
	EdgeWeightRange(Interval),
	/// New reciprocal ratio range.
	ReciprocalWeightRatioRange(Interval),
	/// New reciprocity mode.
	ReciprocalMode(ReciprocalMode),
	/// New community method.
	CommunityMethod(String),
	/// New community size predicate.
	SizePredicate(SizePredicate),
	/// New centrality metric.
	CentralityMetric(String),
}

impl FilterChange {
	/// Category this change belongs to.
	pub fn category(&self) -> FilterCategory {
		match self {
			Self::SetActive { category, .. } => *category,
			Self::EdgeWeightRange(_) | Self::ReciprocalWeightRatioRange(_) | Self::ReciprocalMode(_) => {
				FilterCategory::NodeFilters
			}
			Self::CommunityMethod(_) | Self::SizePredicate(_) => FilterCategory::Community,
			Self::CentralityMetric(_) => FilterCategory::Centrality,
		}
	}
}
