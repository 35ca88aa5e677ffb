//! Records and the schema derived from them.

use serde::ser::{Serialize, SerializeMap, Serializer};
use strsim::levenshtein;

use crate::filter::{FilterError, FilterResult};

/// Sentinel field name matching every field of a record.
pub const ANY_FIELD: &str = "ANY";

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// One timeline entry: field names mapped to text values, in source order.
///
/// Records are produced by a [`Records`](crate::source::Records) sequence and
/// are never mutated after they are handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Later duplicates of a name are kept but never
    /// returned by [`Record::get`].
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the value of the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates `(name, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Iterates field names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered list of field names available in a dataset.
///
/// The schema is taken from the first record of a dataset; every later
/// record is assumed to carry the same fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Creates a schema from an ordered list of field names.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Derives the schema from a record's field names.
    pub fn from_record(record: &Record) -> Self {
        Self {
            fields: record.names().map(str::to_string).collect(),
        }
    }

    /// The field names, in first-seen order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if `name` is one of the schema's fields.
    ///
    /// The `ANY` sentinel is not a schema field; see [`Schema::accepts`].
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }

    /// Returns true if `name` may appear on the left of a filter clause.
    pub fn accepts(&self, name: &str) -> bool {
        name == ANY_FIELD || self.contains(name)
    }

    /// Finds the closest field name to `name` using Levenshtein distance.
    ///
    /// Returns `None` for exact matches and for names too far from every field.
    /// Distance is measured case-insensitively.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();

        let (best_match, best_distance) = self
            .fields
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(ANY_FIELD))
            .map(|field| (field, levenshtein(&name_lower, &field.to_lowercase())))
            .min_by_key(|(_, distance)| *distance)?;

        // Field names are case-sensitive, so a case-only difference is still worth suggesting.
        if best_match != name && best_distance <= MAX_SUGGESTION_DISTANCE {
            Some(best_match)
        } else {
            None
        }
    }

    /// Builds an unknown-field error for `name`, with a suggestion if one is close.
    pub(crate) fn unknown_field(&self, name: &str) -> FilterError {
        FilterError::unknown_field(name, self.suggest(name))
    }

    /// Validates an explicit field selection against the schema.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownField` for the first requested name the
    /// schema does not contain.
    pub fn select<S: AsRef<str>>(&self, requested: &[S]) -> FilterResult<Vec<String>> {
        requested
            .iter()
            .map(|name| {
                let name = name.as_ref();
                if self.contains(name) {
                    Ok(name.to_string())
                } else {
                    Err(self.unknown_field(name))
                }
            })
            .collect()
    }

    /// Parses a comma-separated field list (e.g. `"date,time,desc"`) and
    /// validates it with [`Schema::select`]. Blank entries are ignored.
    pub fn select_list(&self, list: &str) -> FilterResult<Vec<String>> {
        let requested: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        self.select(&requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2t_schema() -> Schema {
        Schema::new(
            ["date", "time", "timezone", "MACB", "source", "desc"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_record_preserves_insertion_order() {
        let record: Record = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(record.get("a"), Some("1"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_record_serializes_as_ordered_map() {
        let record: Record = [("z", "last"), ("a", "first")].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":"last","a":"first"}"#);
    }

    #[test]
    fn test_schema_from_record() {
        let record: Record = [("a", ""), ("b", "x"), ("c", "y")].into_iter().collect();
        let schema = Schema::from_record(&record);
        assert_eq!(schema.fields(), &["a", "b", "c"]);
    }

    #[test]
    fn test_schema_accepts_any_sentinel() {
        let schema = l2t_schema();
        assert!(schema.accepts("ANY"));
        assert!(schema.accepts("desc"));
        assert!(!schema.contains("ANY"));
        assert!(!schema.accepts("description"));
    }

    #[test]
    fn test_select_list_valid() {
        let schema = l2t_schema();
        let selected = schema.select_list("desc, date ,time").unwrap();
        assert_eq!(selected, vec!["desc", "date", "time"]);
    }

    #[test]
    fn test_select_list_unknown_field_with_suggestion() {
        let schema = l2t_schema();
        let err = schema.select_list("date,sorce").unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownField {
                field: "sorce".to_string(),
                suggestion: Some("source".to_string()),
            }
        );
        assert!(err.to_string().contains("Did you mean 'source'?"));
    }

    #[test]
    fn test_suggest_ignores_distant_names() {
        let schema = l2t_schema();
        assert_eq!(schema.suggest("completely_unrelated"), None);
        assert_eq!(schema.suggest("date"), None);
        assert_eq!(schema.suggest("macb"), Some("MACB"));
    }
}
