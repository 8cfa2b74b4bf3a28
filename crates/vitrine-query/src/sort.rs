//! Sort orders and their wire rendering.

use serde_json::{Map, Value, json};
use vitrine_mapping::{SortDirection, SortMissing};

use crate::{ast::QueryNode, compile::compile};

/// Engine field name for relevance sorting.
pub const SCORE_FIELD: &str = "_score";

/// How values of a multi-valued (nested) field collapse into one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    /// Lowest value.
    #[default]
    Min,
    /// Highest value.
    Max,
    /// Average value.
    Avg,
    /// Sum of values.
    Sum,
    /// Median value.
    Median,
}

impl SortMode {
    /// Returns the wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Median => "median",
        }
    }
}

/// One entry of a request's sort.
#[derive(Debug, Clone, PartialEq)]
pub enum SortOrder {
    /// Sort by relevance.
    Score {
        /// Sort direction.
        direction: SortDirection,
    },
    /// Sort by a top-level field.
    Standard {
        /// Physical field.
        field: String,
        /// Sort direction.
        direction: SortDirection,
        /// Placement of documents without a value.
        missing: Option<SortMissing>,
    },
    /// Sort by a field of nested objects.
    Nested {
        /// Physical field.
        field: String,
        /// Sort direction.
        direction: SortDirection,
        /// Placement of documents without a value.
        missing: Option<SortMissing>,
        /// Nested object group.
        nested_path: String,
        /// Restricts which nested objects take part in sorting.
        nested_filter: Option<QueryNode>,
        /// How nested values collapse into one key.
        score_mode: SortMode,
    },
}

impl SortOrder {
    /// Creates a relevance sort.
    pub fn score(direction: SortDirection) -> Self {
        Self::Score { direction }
    }

    /// Returns the physical field the order sorts on.
    pub fn field(&self) -> &str {
        match self {
            Self::Score { .. } => SCORE_FIELD,
            Self::Standard { field, .. } | Self::Nested { field, .. } => field,
        }
    }

    /// Returns the sort direction.
    pub fn direction(&self) -> SortDirection {
        match self {
            Self::Score { direction }
            | Self::Standard { direction, .. }
            | Self::Nested { direction, .. } => *direction,
        }
    }
}

/// Renders one sort entry.
pub fn render_sort_order(order: &SortOrder) -> Value {
    let mut body = Map::new();
    body.insert("order".into(), Value::String(order.direction().as_str().into()));

    match order {
        SortOrder::Score { .. } => {}
        SortOrder::Standard { missing, .. } => {
            if let Some(missing) = missing {
                body.insert("missing".into(), Value::String(missing.as_str().into()));
            }
        }
        SortOrder::Nested {
            missing,
            nested_path,
            nested_filter,
            score_mode,
            ..
        } => {
            if let Some(missing) = missing {
                body.insert("missing".into(), Value::String(missing.as_str().into()));
            }
            body.insert("mode".into(), Value::String(score_mode.as_str().into()));
            let mut nested = Map::new();
            nested.insert("path".into(), Value::String(nested_path.clone()));
            if let Some(filter) = nested_filter {
                nested.insert("filter".into(), compile(filter));
            }
            body.insert("nested".into(), Value::Object(nested));
        }
    }

    json!({ order.field(): body })
}

/// Renders a request's `sort` array.
pub fn render_sort_orders(orders: &[SortOrder]) -> Value {
    orders.iter().map(render_sort_order).collect()
}
