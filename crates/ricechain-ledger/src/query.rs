//! Selector queries over JSON documents.
//!
//! A [`RichQuery`] is the document-store query the contract hands to the
//! host: a selector of top-level field equalities plus an optional sort.
//! In JSON form it reads
//!
//! ```json
//! {"selector": {"assetType": "riceBatch"}, "sort": [{"batchID": "desc"}]}
//! ```

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Sort direction of one sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A selector plus sort specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichQuery {
    selector: Map<String, Value>,
    sort: Vec<(String, SortOrder)>,
}

impl RichQuery {
    /// Empty selector: matches every JSON object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.selector.insert(field.into(), value.into());
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    /// Does `doc` satisfy every selector equality?
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        let Value::Object(fields) = doc else {
            return false;
        };
        self.selector
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }

    /// Order two matching documents by the sort specification.
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, order) in &self.sort {
            let ord = compare_values(a.get(field), b.get(field));
            let ord = match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Missing fields sort first; incomparable values compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn equality_selector() {
        let q = RichQuery::new().eq("assetType", "riceBatch");
        assert!(q.matches(&json!({"assetType": "riceBatch", "batchID": "B1"})));
        assert!(!q.matches(&json!({"assetType": "processingOrder"})));
        assert!(!q.matches(&json!({"batchID": "B1"})));
        assert!(!q.matches(&json!("riceBatch")));
    }

    #[test]
    fn every_equality_must_hold() {
        let q = RichQuery::new()
            .eq("assetType", "processingOrder")
            .eq("variety", "Basmati");
        assert!(q.matches(&json!({"assetType": "processingOrder", "variety": "Basmati"})));
        assert!(!q.matches(&json!({"assetType": "processingOrder", "variety": "Jasmine"})));
    }

    #[test]
    fn empty_selector_matches_any_object() {
        assert!(RichQuery::new().matches(&json!({})));
    }

    #[test]
    fn descending_sort() {
        let q = RichQuery::new().sort_by("batchID", SortOrder::Desc);
        let mut docs = vec![
            json!({"batchID": "B1"}),
            json!({"batchID": "B3"}),
            json!({"batchID": "B2"}),
        ];
        docs.sort_by(|a, b| q.compare(a, b));
        let ids: Vec<&str> = docs.iter().map(|d| d["batchID"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["B3", "B2", "B1"]);
    }

    #[test]
    fn missing_sort_field_sorts_first() {
        let q = RichQuery::new().sort_by("quantityInKg", SortOrder::Asc);
        assert_eq!(q.compare(&json!({}), &json!({"quantityInKg": 1})), Ordering::Less);
        assert_eq!(
            q.compare(&json!({"quantityInKg": 20}), &json!({"quantityInKg": 3})),
            Ordering::Greater
        );
    }
}
