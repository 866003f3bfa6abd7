use gridsync_common::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One keyed row. Keys are unique and keep heading order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`. A new key goes to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Record {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// What a read produces and a write consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Collection {
    /// One record per data line.
    Records(Vec<Record>),
    /// A region with a single heading: its values, flat.
    Column { heading: String, values: Vec<Value> },
}

impl Collection {
    pub fn column(heading: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Collection::Column {
            heading: heading.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Number of data lines.
    pub fn len(&self) -> usize {
        match self {
            Collection::Records(records) => records.len(),
            Collection::Column { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Collection::Records(records) => Some(records),
            Collection::Column { .. } => None,
        }
    }
}

impl From<Vec<Record>> for Collection {
    fn from(records: Vec<Record>) -> Self {
        Collection::Records(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces_in_place() {
        let mut r = Record::new();
        r.insert("name", "Al");
        r.insert("age", 30i64);
        assert_eq!(r.insert("name", "Bo"), Some(Value::from("Al")));
        assert_eq!(r.keys().collect::<Vec<_>>(), ["name", "age"]);
        assert_eq!(r.get("name"), Some(&Value::from("Bo")));
        assert!(!r.contains_key("email"));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let r = Record::from([("b", Value::from(1i64)), ("a", Value::from(true))]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"b":{"Number":1.0},"a":{"Boolean":true}}"#);
    }

    #[test]
    fn collection_len_counts_data_lines() {
        let column = Collection::column("age", [Value::from(30i64), Value::from(41i64)]);
        assert_eq!(column.len(), 2);
        assert!(column.as_records().is_none());
        assert!(Collection::Records(vec![]).is_empty());
    }
}
