//! Index mapping: the ordered set of declared fields.
//!
//! The mapping resolves logical field names to physical property paths. Two
//! resolution failure modes coexist on purpose:
//! - malformed declarations (bad nested paths, duplicates) fail when the
//!   mapping is built;
//! - unknown names at resolution time degrade to the raw name, because
//!   attribute-driven fields may legitimately bypass the static mapping.
//!   Every degradation is logged and counted.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    MappingError,
    analyzer::{Analyzer, FieldType},
    field::{
        DEFAULT_SEARCH_FIELD, DEFAULT_SPELLING_FIELD, Field, FieldConfig, SortDirection,
        SortMissing,
    },
};

/// A logical field resolved for term-level use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Physical property path.
    pub field: String,
    /// Nested object group, if the field is nested.
    pub nested_path: Option<String>,
}

/// A logical field resolved for sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSortField {
    /// Physical property path.
    pub field: String,
    /// Nested object group, if the field is nested.
    pub nested_path: Option<String>,
    /// Missing-value placement, when the field is declared.
    pub missing: Option<SortMissing>,
}

/// Ordered collection of fields plus the identifier field.
///
/// Built once per configuration load and shared read-only afterwards.
#[derive(Debug)]
pub struct Mapping {
    /// Name of the document identifier field.
    id_field: String,
    /// Declared fields in declaration order.
    fields: Vec<Field>,
    /// Number of resolutions that fell back to a raw field name.
    fallbacks: AtomicU64,
}

impl Mapping {
    /// Builds a mapping.
    ///
    /// The id field is added as a filterable, sortable keyword if it is not
    /// declared explicitly. Duplicate field names are rejected.
    pub fn new(id_field: impl Into<String>, fields: Vec<Field>) -> Result<Self, MappingError> {
        let id_field = id_field.into();
        if id_field.is_empty() {
            return Err(MappingError::MissingIdField(id_field));
        }

        let mut declared: Vec<Field> = Vec::with_capacity(fields.len() + 1);
        for field in fields {
            if declared.iter().any(|f| f.name() == field.name()) {
                return Err(MappingError::DuplicateField(field.name().to_string()));
            }
            declared.push(field);
        }

        if !declared.iter().any(|f| f.name() == id_field) {
            let id = Field::new(
                id_field.clone(),
                FieldType::Keyword,
                None,
                FieldConfig {
                    is_filterable: true,
                    is_used_for_sort_by: true,
                    ..FieldConfig::default()
                },
            )?;
            declared.insert(0, id);
        }

        Ok(Self {
            id_field,
            fields: declared,
            fallbacks: AtomicU64::new(0),
        })
    }

    /// Returns the identifier field.
    pub fn id_field(&self) -> &Field {
        self.fields
            .iter()
            .find(|f| f.name() == self.id_field)
            .unwrap_or(&self.fields[0])
    }

    /// Returns all declared fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by logical name.
    pub fn field(&self, name: &str) -> Result<&Field, MappingError> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| MappingError::UnknownField(name.to_string()))
    }

    /// Whether a field with this name is declared.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    /// Returns how many resolutions degraded to a raw field name.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Records a raw-name fallback.
    fn record_fallback(&self, name: &str, reason: &str) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        debug!(field = name, reason, "falling back to raw field name");
    }

    /// Resolves a logical name for aggregations and exact filters.
    ///
    /// Returns the untouched property and the nested path of the declared
    /// field. An undeclared field, or one without an untouched variant,
    /// resolves to its raw name without nested path.
    pub fn resolve_for_aggregation(&self, name: &str) -> ResolvedField {
        match self.field(name) {
            Ok(field) => match field.mapping_property(None) {
                Some(property) => ResolvedField {
                    field: property,
                    nested_path: field.nested_path().map(str::to_string),
                },
                None => {
                    self.record_fallback(name, "no untouched property");
                    ResolvedField {
                        field: name.to_string(),
                        nested_path: None,
                    }
                }
            },
            Err(_) => {
                self.record_fallback(name, "not in mapping");
                ResolvedField {
                    field: name.to_string(),
                    nested_path: None,
                }
            }
        }
    }

    /// Resolves a logical name for sorting.
    ///
    /// Prefers the sortable variant, then the untouched one, then the raw
    /// name.
    pub fn resolve_for_sort(&self, name: &str, direction: SortDirection) -> ResolvedSortField {
        let Ok(field) = self.field(name) else {
            self.record_fallback(name, "not in mapping");
            return ResolvedSortField {
                field: name.to_string(),
                nested_path: None,
                missing: None,
            };
        };

        let property = field
            .mapping_property(Some(Analyzer::Sortable))
            .or_else(|| field.mapping_property(None))
            .unwrap_or_else(|| {
                self.record_fallback(name, "no sortable property");
                name.to_string()
            });

        ResolvedSortField {
            field: property,
            nested_path: field.nested_path().map(str::to_string),
            missing: Some(field.sort_missing(direction)),
        }
    }

    /// Lists searchable properties with their weights, for fulltext queries.
    ///
    /// When `default_field` is given, it is listed first with weight
    /// `boost` (suffixed with the analyzer when one is given), and fields of
    /// weight 1 using the standard analyzer are skipped since their content
    /// is already copied into the default field. `filter` restricts which
    /// fields are considered.
    pub fn weighted_search_properties<F>(
        &self,
        analyzer: Option<Analyzer>,
        default_field: Option<&str>,
        boost: u32,
        filter: F,
    ) -> Vec<(String, u32)>
    where
        F: Fn(&Field) -> bool,
    {
        let mut weighted: Vec<(String, u32)> = Vec::new();

        if let Some(default_field) = default_field {
            let property = match analyzer {
                Some(analyzer) => format!("{default_field}.{analyzer}"),
                None => default_field.to_string(),
            };
            weighted.push((property, boost));
        }

        for field in &self.fields {
            let current = analyzer.unwrap_or_else(|| field.default_search_analyzer());
            let mut can_add = default_field.is_none() || field.search_weight() != 1;
            if analyzer.is_none() {
                can_add = can_add || current != Analyzer::Standard;
            }
            if !can_add || !filter(field) {
                continue;
            }
            if let Some(property) = field.mapping_property(Some(current))
                && !weighted.iter().any(|(p, _)| *p == property)
            {
                weighted.push((property, boost.saturating_mul(field.search_weight())));
            }
        }

        weighted
    }

    /// Builds the wire `properties` object of the mapping.
    ///
    /// Dotted names become `object` parents, and segments matching a field's
    /// nested path become `nested` parents. The `search` and `spelling`
    /// catch-all fields are always present.
    pub fn properties(&self) -> Value {
        let mut root = Map::new();

        for field in default_fields().iter().chain(&self.fields) {
            let segments: Vec<&str> = field.name().split('.').collect();
            insert_property(
                &mut root,
                &segments,
                field.nested_path(),
                field.mapping_property_config(),
            );
        }

        Value::Object(root)
    }
}

/// Catch-all text fields every mapping carries.
fn default_fields() -> [Field; 2] {
    let search = FieldConfig {
        is_searchable: true,
        search_weight: 2,
        ..FieldConfig::default()
    };
    let spelling = FieldConfig {
        is_used_in_spellcheck: true,
        ..search.clone()
    };
    [
        catch_all_field(DEFAULT_SEARCH_FIELD, search),
        catch_all_field(DEFAULT_SPELLING_FIELD, spelling),
    ]
}

/// Builds a catch-all field; its name is a plain segment so it never fails.
fn catch_all_field(name: &str, config: FieldConfig) -> Field {
    match Field::new(name, FieldType::Text, None, config) {
        Ok(field) => field,
        Err(_) => Field::filterable(name),
    }
}

/// Inserts a leaf property under its dotted path, creating parents.
fn insert_property(
    properties: &mut Map<String, Value>,
    segments: &[&str],
    nested_path: Option<&str>,
    leaf: Value,
) {
    insert_property_at(properties, segments, 0, nested_path, leaf);
}

/// Recursive step of [`insert_property`]; `depth` is the index of the current segment.
fn insert_property_at(
    properties: &mut Map<String, Value>,
    segments: &[&str],
    depth: usize,
    nested_path: Option<&str>,
    leaf: Value,
) {
    let Some(segment) = segments.get(depth) else {
        return;
    };

    if depth + 1 == segments.len() {
        properties.insert((*segment).to_string(), leaf);
        return;
    }

    let prefix = segments[..=depth].join(".");
    let parent_type = if nested_path == Some(prefix.as_str()) {
        "nested"
    } else {
        "object"
    };

    let parent = properties
        .entry((*segment).to_string())
        .or_insert_with(|| json!({ "type": parent_type, "properties": {} }));
    if let Some(children) = parent
        .get_mut("properties")
        .and_then(Value::as_object_mut)
    {
        insert_property_at(children, segments, depth + 1, nested_path, leaf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: FieldType, nested: Option<&str>, config: FieldConfig) -> Field {
        Field::new(name, ty, nested.map(str::to_string), config).unwrap()
    }

    fn catalog_mapping() -> Mapping {
        Mapping::new(
            "entity_id",
            vec![
                field(
                    "name",
                    FieldType::Text,
                    None,
                    FieldConfig {
                        is_searchable: true,
                        is_filterable: true,
                        is_used_for_sort_by: true,
                        search_weight: 5,
                        ..FieldConfig::default()
                    },
                ),
                field(
                    "description",
                    FieldType::Text,
                    None,
                    FieldConfig {
                        is_searchable: true,
                        ..FieldConfig::default()
                    },
                ),
                Field::filterable("color"),
                field(
                    "price.price",
                    FieldType::Double,
                    Some("price"),
                    FieldConfig {
                        is_filterable: true,
                        ..FieldConfig::default()
                    },
                ),
                field(
                    "price.customer_group_id",
                    FieldType::Integer,
                    Some("price"),
                    FieldConfig::default(),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn id_field_is_added_when_missing() {
        let mapping = catalog_mapping();
        assert_eq!(mapping.id_field().name(), "entity_id");
        assert!(mapping.id_field().is_filterable());
        assert_eq!(mapping.fields()[0].name(), "entity_id");
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = Mapping::new(
            "entity_id",
            vec![Field::filterable("color"), Field::filterable("color")],
        )
        .unwrap_err();
        assert_eq!(err, MappingError::DuplicateField("color".into()));
    }

    #[test]
    fn empty_id_field_is_rejected() {
        assert!(matches!(
            Mapping::new("", vec![]),
            Err(MappingError::MissingIdField(_))
        ));
    }

    #[test]
    fn unknown_field_lookup_fails() {
        let mapping = catalog_mapping();
        assert_eq!(
            mapping.field("size").unwrap_err(),
            MappingError::UnknownField("size".into())
        );
    }

    #[test]
    fn resolve_for_aggregation_uses_untouched_and_nested_path() {
        let mapping = catalog_mapping();

        let name = mapping.resolve_for_aggregation("name");
        assert_eq!(name.field, "name.untouched");
        assert_eq!(name.nested_path, None);

        let price = mapping.resolve_for_aggregation("price.price");
        assert_eq!(price.field, "price.price");
        assert_eq!(price.nested_path.as_deref(), Some("price"));
        assert_eq!(mapping.fallback_count(), 0);
    }

    #[test]
    fn resolve_for_aggregation_degrades_and_counts() {
        let mapping = catalog_mapping();

        let dynamic = mapping.resolve_for_aggregation("attribute_set_id");
        assert_eq!(dynamic.field, "attribute_set_id");
        assert_eq!(dynamic.nested_path, None);

        let searchable_only = mapping.resolve_for_aggregation("description");
        assert_eq!(searchable_only.field, "description");

        assert_eq!(mapping.fallback_count(), 2);
    }

    #[test]
    fn sort_only_text_field_resolves_without_fallback() {
        let mapping = Mapping::new(
            "entity_id",
            vec![field(
                "sku_label",
                FieldType::Text,
                None,
                FieldConfig {
                    is_used_for_sort_by: true,
                    ..FieldConfig::default()
                },
            )],
        )
        .unwrap();

        assert_eq!(mapping.resolve_for_aggregation("sku_label").field, "sku_label");
        assert_eq!(
            mapping.resolve_for_sort("sku_label", SortDirection::Asc).field,
            "sku_label.sortable"
        );
        assert_eq!(mapping.fallback_count(), 0);
    }

    #[test]
    fn resolve_for_sort_prefers_sortable() {
        let mapping = catalog_mapping();

        let name = mapping.resolve_for_sort("name", SortDirection::Asc);
        assert_eq!(name.field, "name.sortable");
        assert_eq!(name.missing, Some(SortMissing::Last));

        let price = mapping.resolve_for_sort("price.price", SortDirection::Desc);
        assert_eq!(price.field, "price.price");
        assert_eq!(price.nested_path.as_deref(), Some("price"));
        assert_eq!(price.missing, Some(SortMissing::First));

        let raw = mapping.resolve_for_sort("news_from_date", SortDirection::Asc);
        assert_eq!(raw.field, "news_from_date");
        assert_eq!(raw.missing, None);
    }

    #[test]
    fn weighted_search_properties_with_default_field() {
        let mapping = catalog_mapping();
        let weighted =
            mapping.weighted_search_properties(None, Some("search"), 1, Field::is_searchable);

        assert_eq!(
            weighted,
            vec![("search".to_string(), 1), ("name.standard".to_string(), 5)]
        );
    }

    #[test]
    fn weighted_search_properties_with_analyzer() {
        let mapping = catalog_mapping();
        let weighted = mapping.weighted_search_properties(
            Some(Analyzer::Shingle),
            Some("search"),
            10,
            Field::is_searchable,
        );

        assert_eq!(
            weighted,
            vec![
                ("search.shingle".to_string(), 10),
                ("name.shingle".to_string(), 50)
            ]
        );
    }

    #[test]
    fn weighted_search_properties_saturate_large_boosts() {
        let mapping = catalog_mapping();
        let weighted = mapping.weighted_search_properties(
            Some(Analyzer::Shingle),
            Some("search"),
            u32::MAX,
            Field::is_searchable,
        );

        assert_eq!(weighted[1], ("name.shingle".to_string(), u32::MAX));
    }

    #[test]
    fn properties_group_nested_fields() {
        let mapping = catalog_mapping();
        let properties = mapping.properties();

        assert_eq!(properties["price"]["type"], "nested");
        assert_eq!(properties["price"]["properties"]["price"]["type"], "double");
        assert_eq!(
            properties["price"]["properties"]["customer_group_id"]["type"],
            "integer"
        );
        assert_eq!(properties["color"]["type"], "keyword");
        assert_eq!(properties["search"]["type"], "text");
        assert_eq!(
            properties["spelling"]["fields"]["phonetic"]["analyzer"],
            "phonetic"
        );
    }

    #[test]
    fn properties_group_object_fields() {
        let mapping = Mapping::new(
            "entity_id",
            vec![Field::filterable("stock.is_in_stock")],
        )
        .unwrap();
        let properties = mapping.properties();

        assert_eq!(properties["stock"]["type"], "object");
        assert_eq!(
            properties["stock"]["properties"]["is_in_stock"]["type"],
            "keyword"
        );
    }

    #[test]
    fn mapping_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mapping>();
    }
}
