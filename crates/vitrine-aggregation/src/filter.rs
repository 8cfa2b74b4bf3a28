//! Filter conditions keyed by logical field name.
//!
//! Filters are declared by containers and search calls as a map from a
//! logical field name to a condition. Turning them into queries needs the
//! index mapping, so the aggregation builder receives a [`FilterBuilder`]
//! instead of compiling filters itself.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;
use vitrine_query::{QueryNode, RangeBounds};

/// Filters keyed by logical field name, in declaration order.
pub type FilterSet = IndexMap<String, FilterCondition>;

/// Condition on a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterCondition {
    /// Analyzed text every term of which must match.
    QueryText {
        /// Text to match.
        query_text: String,
    },
    /// Value bounds.
    Range(RangeBounds),
    /// Accepted values, combined with the field's logical operator.
    Values(Vec<Value>),
}

impl FilterCondition {
    /// Creates a single-value condition.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Values(vec![value.into()])
    }

    /// Creates a full-text condition.
    pub fn query_text(text: impl Into<String>) -> Self {
        Self::QueryText {
            query_text: text.into(),
        }
    }

    /// Decodes a condition from its JSON form.
    ///
    /// Scalars and arrays are values, objects with `query_text` are text
    /// conditions, and objects made of `gt`/`gte`/`lt`/`lte` are ranges.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Err("filter condition cannot be null".to_string()),
            Value::Array(values) => Ok(Self::Values(values)),
            Value::Object(map) => {
                if let Some(text) = map.get("query_text") {
                    let text = text
                        .as_str()
                        .ok_or_else(|| format!("query_text must be a string, got {text}"))?;
                    return Ok(Self::query_text(text));
                }
                let bounds: RangeBounds = serde_json::from_value(Value::Object(map))
                    .map_err(|e| format!("unsupported filter condition: {e}"))?;
                if bounds.is_empty() {
                    return Err("range condition has no bound".to_string());
                }
                Ok(Self::Range(bounds))
            }
            scalar => Ok(Self::Values(vec![scalar])),
        }
    }
}

impl<'de> Deserialize<'de> for FilterCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Compiles filter sets into queries.
pub trait FilterBuilder {
    /// Builds one query from `filters`, or `None` when the set is empty.
    ///
    /// `current_path` is the nested path the query will be evaluated in;
    /// fields of that path are not wrapped in a nested query.
    fn build_filter(&self, filters: &FilterSet, current_path: Option<&str>) -> Option<QueryNode>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_and_arrays_are_values() {
        let filters: FilterSet = serde_json::from_value(json!({
            "color": "red",
            "size": ["S", "M"],
            "in_stock": true
        }))
        .unwrap();

        assert_eq!(filters["color"], FilterCondition::value("red"));
        assert_eq!(
            filters["size"],
            FilterCondition::Values(vec![json!("S"), json!("M")])
        );
        assert_eq!(filters["in_stock"], FilterCondition::value(true));
        assert_eq!(filters.keys().collect::<Vec<_>>(), ["color", "size", "in_stock"]);
    }

    #[test]
    fn objects_are_ranges_or_text() {
        let range: FilterCondition = serde_json::from_value(json!({ "gte": 10, "lt": 20 })).unwrap();
        assert_eq!(
            range,
            FilterCondition::Range(RangeBounds {
                gte: Some(json!(10)),
                lt: Some(json!(20)),
                ..RangeBounds::default()
            })
        );

        let text: FilterCondition = serde_json::from_value(json!({ "query_text": "red" })).unwrap();
        assert_eq!(text, FilterCondition::query_text("red"));
    }

    #[test]
    fn unknown_objects_are_rejected() {
        assert!(FilterCondition::from_value(json!({ "near": 1 })).is_err());
        assert!(FilterCondition::from_value(json!({})).is_err());
        assert!(FilterCondition::from_value(Value::Null).is_err());
    }

    #[test]
    fn serializes_to_its_json_form() {
        let range = FilterCondition::Range(RangeBounds {
            gt: Some(json!(1)),
            ..RangeBounds::default()
        });
        assert_eq!(serde_json::to_value(&range).unwrap(), json!({ "gt": 1 }));
        assert_eq!(
            serde_json::to_value(FilterCondition::value("red")).unwrap(),
            json!(["red"])
        );
    }
}
