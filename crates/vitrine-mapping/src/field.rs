//! Indexed field declarations.
//!
//! A [`Field`] describes how one logical attribute is indexed: its storage
//! type, whether it lives inside a nested object group, and which analyzed
//! sub-fields exist for it. The analyzer list drives both the wire mapping
//! and the resolution of logical names to physical property paths.
//!
//! Analyzers applicable to a text field, in order:
//! 1. the default search analyzer, if searchable or used for sorting
//! 2. `whitespace` and `shingle`, if searchable with a weight above 1
//! 3. `untouched`, if filterable or nothing else applies
//! 4. `sortable`, if used for sorting
//! 5. `phonetic`, if used by the spellchecker
//! 6. `standard_edge_ngram`, if used for autocomplete

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    MappingError,
    analyzer::{Analyzer, FieldType},
};

/// Maximum length of a value indexed in an untouched sub-field.
pub const IGNORE_ABOVE: u32 = 256;

/// Date format accepted by date fields.
pub const DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss||yyyy-MM-dd";

/// Catch-all field searchable fields are copied to.
pub const DEFAULT_SEARCH_FIELD: &str = "search";

/// Catch-all field spellcheck fields are copied to.
pub const DEFAULT_SPELLING_FIELD: &str = "spelling";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Returns the wire name of the direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where documents without a value end up when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMissing {
    /// Before every document with a value.
    First,
    /// After every document with a value.
    Last,
}

impl SortMissing {
    /// Returns the wire name (`_first` / `_last`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "_first",
            Self::Last => "_last",
        }
    }
}

/// How several values of one filter condition combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// Any value matches (a single `terms` query).
    #[default]
    Or,
    /// Every value must match (one `term` query per value).
    And,
}

/// Indexing flags and tuning of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Included in fulltext search.
    pub is_searchable: bool,
    /// Usable in exact filters and aggregations.
    pub is_filterable: bool,
    /// Usable as a sort criterion.
    pub is_used_for_sort_by: bool,
    /// Fed to the spellchecker.
    pub is_used_in_spellcheck: bool,
    /// Fed to autocomplete.
    pub is_used_in_autocomplete: bool,
    /// Fulltext weight, at least 1.
    pub search_weight: u32,
    /// Analyzer used for fulltext matching.
    pub default_search_analyzer: Analyzer,
    /// Missing-value placement for ascending sorts.
    pub sort_missing_asc: SortMissing,
    /// Missing-value placement for descending sorts.
    pub sort_missing_desc: SortMissing,
    /// Disables length norms on the text root.
    pub norms_disabled: bool,
    /// How multi-value filter conditions on this field combine.
    pub filter_logical_operator: LogicalOperator,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            is_searchable: false,
            is_filterable: false,
            is_used_for_sort_by: false,
            is_used_in_spellcheck: false,
            is_used_in_autocomplete: false,
            search_weight: 1,
            default_search_analyzer: Analyzer::Standard,
            sort_missing_asc: SortMissing::Last,
            sort_missing_desc: SortMissing::First,
            norms_disabled: false,
            filter_logical_operator: LogicalOperator::Or,
        }
    }
}

/// Partial field declaration applied on top of an existing field.
///
/// Every `Some` value replaces the corresponding value of the base field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOverrides {
    /// Storage type.
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    /// Nested object group.
    pub nested_path: Option<String>,
    /// Searchable flag.
    pub searchable: Option<bool>,
    /// Filterable flag.
    pub filterable: Option<bool>,
    /// Sort-by flag.
    pub used_for_sort_by: Option<bool>,
    /// Spellcheck flag.
    pub used_in_spellcheck: Option<bool>,
    /// Autocomplete flag.
    pub used_in_autocomplete: Option<bool>,
    /// Fulltext weight.
    pub search_weight: Option<u32>,
    /// Default search analyzer.
    pub default_search_analyzer: Option<Analyzer>,
    /// Missing placement for ascending sorts.
    pub sort_missing_asc: Option<SortMissing>,
    /// Missing placement for descending sorts.
    pub sort_missing_desc: Option<SortMissing>,
    /// Norms flag.
    pub norms_disabled: Option<bool>,
    /// Filter value combination.
    pub filter_logical_operator: Option<LogicalOperator>,
}

impl FieldOverrides {
    /// Applies every present override onto `config`.
    pub fn apply(&self, config: &mut FieldConfig) {
        if let Some(v) = self.searchable {
            config.is_searchable = v;
        }
        if let Some(v) = self.filterable {
            config.is_filterable = v;
        }
        if let Some(v) = self.used_for_sort_by {
            config.is_used_for_sort_by = v;
        }
        if let Some(v) = self.used_in_spellcheck {
            config.is_used_in_spellcheck = v;
        }
        if let Some(v) = self.used_in_autocomplete {
            config.is_used_in_autocomplete = v;
        }
        if let Some(v) = self.search_weight {
            config.search_weight = v;
        }
        if let Some(v) = self.default_search_analyzer {
            config.default_search_analyzer = v;
        }
        if let Some(v) = self.sort_missing_asc {
            config.sort_missing_asc = v;
        }
        if let Some(v) = self.sort_missing_desc {
            config.sort_missing_desc = v;
        }
        if let Some(v) = self.norms_disabled {
            config.norms_disabled = v;
        }
        if let Some(v) = self.filter_logical_operator {
            config.filter_logical_operator = v;
        }
    }
}

/// One indexed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Logical (and root physical) name, dotted for object and nested fields.
    name: String,
    /// Storage type.
    field_type: FieldType,
    /// Nested object group this field belongs to.
    nested_path: Option<String>,
    /// Flags and tuning.
    config: FieldConfig,
}

impl Field {
    /// Declares a field.
    ///
    /// Fails with [`MappingError::InvalidNestedPath`] when `nested_path` is
    /// set but `name` does not start with `nested_path` followed by a dot.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        nested_path: Option<String>,
        mut config: FieldConfig,
    ) -> Result<Self, MappingError> {
        let name = name.into();
        if let Some(path) = &nested_path {
            let is_prefix = name
                .strip_prefix(path.as_str())
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('.'));
            if path.is_empty() || !is_prefix {
                return Err(MappingError::InvalidNestedPath {
                    field: name,
                    path: path.clone(),
                });
            }
        }
        config.search_weight = config.search_weight.max(1);

        Ok(Self {
            name,
            field_type,
            nested_path,
            config,
        })
    }

    /// Declares a keyword field that is only filterable.
    pub fn filterable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Keyword,
            nested_path: None,
            config: FieldConfig {
                is_filterable: true,
                ..FieldConfig::default()
            },
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the storage type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the flags and tuning.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Whether the field is included in fulltext search.
    pub fn is_searchable(&self) -> bool {
        self.config.is_searchable
    }

    /// Whether the field can be used in exact filters and aggregations.
    pub fn is_filterable(&self) -> bool {
        self.config.is_filterable
    }

    /// Whether the field can be used for sorting.
    pub fn is_used_for_sort_by(&self) -> bool {
        self.config.is_used_for_sort_by
    }

    /// Whether the field feeds the spellchecker.
    pub fn is_used_in_spellcheck(&self) -> bool {
        self.config.is_used_in_spellcheck
    }

    /// Whether the field feeds autocomplete.
    pub fn is_used_in_autocomplete(&self) -> bool {
        self.config.is_used_in_autocomplete
    }

    /// Returns the fulltext weight.
    pub fn search_weight(&self) -> u32 {
        self.config.search_weight
    }

    /// Returns the default search analyzer.
    pub fn default_search_analyzer(&self) -> Analyzer {
        self.config.default_search_analyzer
    }

    /// Returns how multi-value filters on this field combine.
    pub fn filter_logical_operator(&self) -> LogicalOperator {
        self.config.filter_logical_operator
    }

    /// Whether the field lives inside a nested object group.
    pub fn is_nested(&self) -> bool {
        self.nested_path.is_some()
    }

    /// Returns the nested object group, if any.
    pub fn nested_path(&self) -> Option<&str> {
        self.nested_path.as_deref()
    }

    /// Returns the name relative to the nested path (the full name if not nested).
    pub fn nested_field_name(&self) -> &str {
        match &self.nested_path {
            Some(path) => &self.name[path.len() + 1..],
            None => &self.name,
        }
    }

    /// Returns the missing-value placement for a sort direction.
    pub fn sort_missing(&self, direction: SortDirection) -> SortMissing {
        match direction {
            SortDirection::Asc => self.config.sort_missing_asc,
            SortDirection::Desc => self.config.sort_missing_desc,
        }
    }

    /// Returns the analyzers this field is indexed with, in mapping order.
    ///
    /// Only text fields carry analyzers; other types return an empty list.
    pub fn analyzers(&self) -> Vec<Analyzer> {
        if self.field_type != FieldType::Text {
            return Vec::new();
        }

        let config = &self.config;
        let mut analyzers = Vec::new();

        if config.is_searchable || config.is_used_for_sort_by {
            analyzers.push(config.default_search_analyzer);
        }

        if config.is_searchable && config.search_weight > 1 {
            analyzers.push(Analyzer::Whitespace);
            analyzers.push(Analyzer::Shingle);
        }

        if analyzers.is_empty() || config.is_filterable {
            analyzers.push(Analyzer::Untouched);
        }

        if config.is_used_for_sort_by {
            analyzers.push(Analyzer::Sortable);
        }

        if config.is_used_in_spellcheck {
            analyzers.push(Analyzer::Phonetic);
        }

        if config.is_used_in_autocomplete {
            analyzers.push(Analyzer::StandardEdgeNgram);
        }

        analyzers.dedup();
        analyzers
    }

    /// Resolves the physical property path for an analyzer.
    ///
    /// With `None`, resolves the property used for term-level operations
    /// (exact filters, aggregations): the untouched sub-field of a
    /// multi-field text field, the bare name of a single-variant untouched
    /// field or of any non-text field, and the bare name of a non-searchable
    /// field without an untouched variant. Returns `None` for a searchable
    /// field with no untouched variant: term-level operations are
    /// unsupported on it.
    ///
    /// With an explicit analyzer, returns `name.<analyzer>` when the
    /// analyzer applies to the field, `None` otherwise.
    pub fn mapping_property(&self, analyzer: Option<Analyzer>) -> Option<String> {
        let exact = analyzer.is_none();
        let analyzer = analyzer.unwrap_or(Analyzer::Untouched);

        if self.field_type != FieldType::Text {
            return (analyzer == Analyzer::Untouched).then(|| self.name.clone());
        }

        let analyzers = self.analyzers();
        if !analyzers.contains(&analyzer) {
            return (exact && !self.config.is_searchable).then(|| self.name.clone());
        }

        if analyzers.len() == 1 {
            Some(self.name.clone())
        } else {
            Some(format!("{}.{}", self.name, analyzer))
        }
    }

    /// Builds the wire mapping of this field's property.
    pub fn mapping_property_config(&self) -> Value {
        let mut property = match self.field_type {
            FieldType::Text => self.text_property_config(),
            FieldType::Date => json!({ "type": "date", "format": DATE_FORMAT }),
            other => json!({ "type": other.as_str() }),
        };

        let copy_to = self.copy_to();
        if !copy_to.is_empty()
            && let Some(object) = property.as_object_mut()
        {
            object.insert("copy_to".into(), json!(copy_to));
        }

        property
    }

    /// Builds the mapping of a text field: a single variant or a multi-field.
    fn text_property_config(&self) -> Value {
        let analyzers = self.analyzers();

        if let [only] = analyzers.as_slice() {
            let mut property = analyzer_property_config(*only);
            self.apply_norms(&mut property);
            return property;
        }

        let mut fields = Map::new();
        for analyzer in &analyzers {
            fields.insert(
                analyzer.as_str().to_string(),
                analyzer_property_config(*analyzer),
            );
        }

        let mut property = json!({
            "type": "text",
            "analyzer": self.config.default_search_analyzer.as_str(),
        });
        self.apply_norms(&mut property);
        if let Some(object) = property.as_object_mut() {
            object.insert("fields".into(), Value::Object(fields));
        }
        property
    }

    /// Disables norms on an analyzed property when configured.
    fn apply_norms(&self, property: &mut Value) {
        let is_text = property.get("type").and_then(Value::as_str) == Some("text");
        if self.config.norms_disabled
            && is_text
            && let Some(object) = property.as_object_mut()
        {
            object.insert("norms".into(), Value::Bool(false));
        }
    }

    /// Returns the catch-all fields this field's values are copied into.
    fn copy_to(&self) -> Vec<&'static str> {
        let copyable = matches!(self.field_type, FieldType::Text | FieldType::Keyword);
        let is_catch_all = self.name == DEFAULT_SEARCH_FIELD || self.name == DEFAULT_SPELLING_FIELD;
        if !copyable || is_catch_all || self.is_nested() {
            return Vec::new();
        }

        let mut targets = Vec::new();
        if self.config.is_searchable {
            targets.push(DEFAULT_SEARCH_FIELD);
        }
        if self.config.is_used_in_spellcheck {
            targets.push(DEFAULT_SPELLING_FIELD);
        }
        targets
    }

    /// Produces a new field with `overrides` applied (right-biased merge).
    ///
    /// The receiver is left untouched. A changed nested path is validated
    /// exactly like a fresh declaration.
    pub fn merge_config(&self, overrides: &FieldOverrides) -> Result<Self, MappingError> {
        let mut config = self.config.clone();
        overrides.apply(&mut config);
        let nested_path = overrides
            .nested_path
            .clone()
            .or_else(|| self.nested_path.clone());

        Self::new(
            self.name.clone(),
            overrides.field_type.unwrap_or(self.field_type),
            nested_path,
            config,
        )
    }
}

/// Builds the mapping of one analyzer variant.
fn analyzer_property_config(analyzer: Analyzer) -> Value {
    match analyzer {
        Analyzer::Untouched => json!({ "type": "keyword", "ignore_above": IGNORE_ABOVE }),
        Analyzer::Sortable => json!({
            "type": "text",
            "analyzer": analyzer.as_str(),
            "fielddata": true,
        }),
        Analyzer::StandardEdgeNgram => json!({
            "type": "text",
            "analyzer": analyzer.as_str(),
            "search_analyzer": Analyzer::Standard.as_str(),
        }),
        other => json!({ "type": "text", "analyzer": other.as_str() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_field(name: &str, config: FieldConfig) -> Field {
        Field::new(name, FieldType::Text, None, config).unwrap()
    }

    fn searchable_filterable() -> FieldConfig {
        FieldConfig {
            is_searchable: true,
            is_filterable: true,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn searchable_filterable_resolves_untouched_and_standard() {
        let field = text_field("name", searchable_filterable());

        assert_eq!(field.mapping_property(None).as_deref(), Some("name.untouched"));
        assert_eq!(
            field.mapping_property(Some(Analyzer::Standard)).as_deref(),
            Some("name.standard")
        );
    }

    #[test]
    fn not_searchable_resolves_bare_name() {
        let field = text_field(
            "color",
            FieldConfig {
                is_filterable: true,
                ..FieldConfig::default()
            },
        );
        assert_eq!(field.mapping_property(None).as_deref(), Some("color"));

        let plain = text_field("sku_hint", FieldConfig::default());
        assert_eq!(plain.mapping_property(None).as_deref(), Some("sku_hint"));
    }

    #[test]
    fn sort_only_field_resolves_bare_name() {
        let field = text_field(
            "sku_label",
            FieldConfig {
                is_used_for_sort_by: true,
                ..FieldConfig::default()
            },
        );
        assert_eq!(field.analyzers(), [Analyzer::Standard, Analyzer::Sortable]);
        assert_eq!(field.mapping_property(None).as_deref(), Some("sku_label"));
        assert_eq!(field.mapping_property(Some(Analyzer::Untouched)), None);
        assert_eq!(
            field.mapping_property(Some(Analyzer::Sortable)).as_deref(),
            Some("sku_label.sortable")
        );
    }

    #[test]
    fn searchable_only_has_no_untouched_property() {
        let field = text_field(
            "description",
            FieldConfig {
                is_searchable: true,
                ..FieldConfig::default()
            },
        );
        assert_eq!(field.mapping_property(None), None);
        assert_eq!(
            field.mapping_property(Some(Analyzer::Standard)).as_deref(),
            Some("description")
        );
    }

    #[test]
    fn weighted_field_gets_whitespace_and_shingle() {
        let field = text_field(
            "name",
            FieldConfig {
                search_weight: 5,
                ..searchable_filterable()
            },
        );
        assert_eq!(
            field.analyzers(),
            vec![
                Analyzer::Standard,
                Analyzer::Whitespace,
                Analyzer::Shingle,
                Analyzer::Untouched
            ]
        );
        assert_eq!(
            field.mapping_property(Some(Analyzer::Shingle)).as_deref(),
            Some("name.shingle")
        );
    }

    #[test]
    fn autocomplete_adds_edge_ngram() {
        let field = text_field(
            "name",
            FieldConfig {
                is_used_in_autocomplete: true,
                ..searchable_filterable()
            },
        );
        assert_eq!(
            field
                .mapping_property(Some(Analyzer::StandardEdgeNgram))
                .as_deref(),
            Some("name.standard_edge_ngram")
        );
        assert_eq!(field.mapping_property(Some(Analyzer::Phonetic)), None);
    }

    #[test]
    fn numeric_fields_only_resolve_untouched() {
        let field = Field::new("price", FieldType::Double, None, searchable_filterable()).unwrap();
        assert_eq!(field.mapping_property(None).as_deref(), Some("price"));
        assert_eq!(field.mapping_property(Some(Analyzer::Standard)), None);
        assert!(field.analyzers().is_empty());
    }

    #[test]
    fn nested_path_must_prefix_name() {
        let field = Field::new(
            "price.customer_group_id",
            FieldType::Integer,
            Some("price".into()),
            FieldConfig::default(),
        )
        .unwrap();
        assert!(field.is_nested());
        assert!(field.name().starts_with("price."));
        assert_eq!(field.nested_field_name(), "customer_group_id");

        for (name, path) in [
            ("category_position", "category"),
            ("prices.value", "price"),
            ("price", "price"),
            ("price.", "price"),
            ("price.value", ""),
        ] {
            let err = Field::new(name, FieldType::Long, Some(path.into()), FieldConfig::default())
                .unwrap_err();
            assert!(
                matches!(err, MappingError::InvalidNestedPath { .. }),
                "{name} / {path}"
            );
        }
    }

    #[test]
    fn sort_missing_defaults_and_overrides() {
        let field = text_field("name", FieldConfig::default());
        assert_eq!(field.sort_missing(SortDirection::Asc), SortMissing::Last);
        assert_eq!(field.sort_missing(SortDirection::Desc), SortMissing::First);

        let overridden = field
            .merge_config(&FieldOverrides {
                sort_missing_desc: Some(SortMissing::Last),
                ..FieldOverrides::default()
            })
            .unwrap();
        assert_eq!(overridden.sort_missing(SortDirection::Desc), SortMissing::Last);
    }

    #[test]
    fn merge_config_is_right_biased_and_leaves_base_untouched() {
        let base = text_field("name", searchable_filterable());
        let merged = base
            .merge_config(&FieldOverrides {
                filterable: Some(false),
                search_weight: Some(3),
                ..FieldOverrides::default()
            })
            .unwrap();

        assert!(base.is_filterable());
        assert_eq!(base.search_weight(), 1);
        assert!(!merged.is_filterable());
        assert!(merged.is_searchable());
        assert_eq!(merged.search_weight(), 3);
    }

    #[test]
    fn merge_config_validates_nested_path() {
        let base = text_field("color", FieldConfig::default());
        let err = base
            .merge_config(&FieldOverrides {
                nested_path: Some("option".into()),
                ..FieldOverrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, MappingError::InvalidNestedPath { .. }));
    }

    #[test]
    fn zero_weight_is_clamped() {
        let field = text_field(
            "name",
            FieldConfig {
                search_weight: 0,
                ..FieldConfig::default()
            },
        );
        assert_eq!(field.search_weight(), 1);
    }

    #[test]
    fn multi_field_mapping_config() {
        let field = text_field(
            "name",
            FieldConfig {
                is_used_for_sort_by: true,
                is_used_in_spellcheck: true,
                ..searchable_filterable()
            },
        );
        let config = field.mapping_property_config();

        assert_eq!(config["type"], "text");
        assert_eq!(config["analyzer"], "standard");
        assert_eq!(config["fields"]["untouched"]["type"], "keyword");
        assert_eq!(config["fields"]["untouched"]["ignore_above"], 256);
        assert_eq!(config["fields"]["sortable"]["fielddata"], true);
        assert_eq!(config["fields"]["phonetic"]["analyzer"], "phonetic");
        assert_eq!(config["copy_to"], json!(["search", "spelling"]));
    }

    #[test]
    fn single_variant_mapping_config() {
        let field = Field::filterable("color");
        assert_eq!(field.mapping_property_config(), json!({ "type": "keyword" }));

        let text = text_field(
            "color_label",
            FieldConfig {
                is_filterable: true,
                ..FieldConfig::default()
            },
        );
        assert_eq!(
            text.mapping_property_config(),
            json!({ "type": "keyword", "ignore_above": 256 })
        );
    }

    #[test]
    fn date_mapping_carries_format() {
        let field = Field::new("news_from_date", FieldType::Date, None, FieldConfig::default())
            .unwrap();
        assert_eq!(field.mapping_property_config()["format"], DATE_FORMAT);
    }

    #[test]
    fn norms_disabled_on_text_root() {
        let field = text_field(
            "name",
            FieldConfig {
                norms_disabled: true,
                ..searchable_filterable()
            },
        );
        assert_eq!(field.mapping_property_config()["norms"], false);
    }
}
