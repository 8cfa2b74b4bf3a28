//! Sort order builder.

use vitrine_aggregation::{FilterBuilder, FilterSet};
use vitrine_mapping::{Mapping, SortDirection};
use vitrine_query::{SCORE_FIELD, SortMode, SortOrder};

use crate::{filter::FilterQueryBuilder, params::SortSpec};

/// Resolves requested sorts into physical sort orders.
#[derive(Debug, Clone, Copy)]
pub struct SortOrderBuilder<'a> {
    /// Mapping used to resolve field names.
    mapping: &'a Mapping,
    /// Builder for nested sort filters.
    filters: FilterQueryBuilder<'a>,
}

impl<'a> SortOrderBuilder<'a> {
    /// Creates a builder over a mapping.
    pub fn new(mapping: &'a Mapping) -> Self {
        Self {
            mapping,
            filters: FilterQueryBuilder::new(mapping),
        }
    }

    /// Builds the sort orders of a request.
    ///
    /// Relevance and the identifier field are appended as tie-breaks unless
    /// already requested; they sort in the direction of the first requested
    /// order, or descending when nothing is requested.
    pub fn build(&self, specs: &[SortSpec]) -> Vec<SortOrder> {
        let mut orders: Vec<SortOrder> = specs.iter().map(|spec| self.build_order(spec)).collect();
        let direction = specs
            .first()
            .map_or(SortDirection::Desc, |spec| spec.direction);

        if !specs.iter().any(|spec| spec.field == SCORE_FIELD) {
            orders.push(SortOrder::score(direction));
        }

        let id_field = self.mapping.id_field().name();
        if !specs.iter().any(|spec| spec.field == id_field) {
            orders.push(self.build_order(&SortSpec::new(id_field, direction)));
        }

        orders
    }

    /// Resolves one requested sort.
    ///
    /// A nested field sorts on the lowest value ascending and the highest
    /// descending, over the nested objects matching its nested filter.
    fn build_order(&self, spec: &SortSpec) -> SortOrder {
        if spec.field == SCORE_FIELD {
            return SortOrder::score(spec.direction);
        }

        let resolved = self.mapping.resolve_for_sort(&spec.field, spec.direction);
        match resolved.nested_path {
            Some(nested_path) => {
                let filters: FilterSet = spec
                    .nested_filter
                    .iter()
                    .map(|(name, condition)| (format!("{nested_path}.{name}"), condition.clone()))
                    .collect();
                let score_mode = match spec.direction {
                    SortDirection::Asc => SortMode::Min,
                    SortDirection::Desc => SortMode::Max,
                };
                SortOrder::Nested {
                    field: resolved.field,
                    direction: spec.direction,
                    missing: resolved.missing,
                    nested_filter: self.filters.build_filter(&filters, Some(nested_path.as_str())),
                    nested_path,
                    score_mode,
                }
            }
            None => SortOrder::Standard {
                field: resolved.field,
                direction: spec.direction,
                missing: resolved.missing,
            },
        }
    }
}
