//! Field and mapping model for vitrine search indices.
//!
//! This crate decides, per indexed field, which analyzed sub-fields exist and
//! how a logical field name resolves to a physical property path:
//!
//! - **Fields**: storage type, nested path, indexing flags, search weight
//! - **Analyzers**: the sub-field variants (`untouched`, `standard`, ...)
//! - **Mapping**: the ordered field set with name resolution and the wire
//!   `properties` object
//!
//! # Example
//!
//! ```
//! use vitrine_mapping::{Analyzer, Field, FieldConfig, FieldType, Mapping};
//!
//! let name = Field::new(
//!     "name",
//!     FieldType::Text,
//!     None,
//!     FieldConfig { is_searchable: true, is_filterable: true, ..FieldConfig::default() },
//! )
//! .unwrap();
//! assert_eq!(name.mapping_property(None).as_deref(), Some("name.untouched"));
//! assert_eq!(name.mapping_property(Some(Analyzer::Standard)).as_deref(), Some("name.standard"));
//!
//! let mapping = Mapping::new("entity_id", vec![name]).unwrap();
//! assert_eq!(mapping.resolve_for_aggregation("name").field, "name.untouched");
//! ```

#![warn(missing_docs)]

mod analyzer;
mod error;
mod field;
mod mapping;

pub use analyzer::{Analyzer, FieldType};
pub use error::MappingError;
pub use field::{
    DATE_FORMAT, DEFAULT_SEARCH_FIELD, DEFAULT_SPELLING_FIELD, Field, FieldConfig, FieldOverrides,
    IGNORE_ABOVE, LogicalOperator, SortDirection, SortMissing,
};
pub use mapping::{Mapping, ResolvedField, ResolvedSortField};
