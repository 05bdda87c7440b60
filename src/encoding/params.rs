//! Parameter values and insertion-ordered parameter sets.

use std::collections::BTreeMap;

use super::error::EncodeError;

/// A single parameter value as accepted by query strings and form bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// No value; encodes as `key=` and is skipped in multipart bodies.
    Null,
    /// A scalar text value.
    Text(String),
    /// Several values for one key, flattened to repeated `key=value` pairs.
    List(Vec<String>),
    /// Nested mapping; not representable in a flat query and encoded as empty.
    Map(BTreeMap<String, String>),
}

impl ParamValue {
    /// Returns true for [`ParamValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ParamValue {
    fn from(values: &[&str]) -> Self {
        Self::List(values.iter().map(|v| (*v).to_string()).collect())
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Map(map)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! param_from_display {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                Self::Text(value.to_string())
            }
        })*
    };
}

param_from_display!(bool, char, i32, i64, u8, u16, u32, u64, usize, f64);

/// Insertion-ordered parameter set. Inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, ParamValue)>,
}

impl FormData {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from a flat `key, value, key, value` list.
    /// A repeated key replaces the earlier value in place.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::KeyValueMismatch`] when the list length is odd.
    pub fn from_flat<S: AsRef<str>>(items: &[S]) -> Result<Self, EncodeError> {
        Self::collect_flat(items, |form, key, value| form.insert(key, value))
    }

    /// Builds a parameter set from a flat `key, value, key, value` list,
    /// keeping every pair in order, repeated keys included.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::KeyValueMismatch`] when the list length is odd.
    pub fn from_flat_repeating<S: AsRef<str>>(items: &[S]) -> Result<Self, EncodeError> {
        Self::collect_flat(items, |form, key, value| form.append(key, value))
    }

    fn collect_flat<S: AsRef<str>>(
        items: &[S],
        mut add: impl FnMut(&mut Self, &str, &str),
    ) -> Result<Self, EncodeError> {
        if items.len() % 2 != 0 {
            return Err(EncodeError::KeyValueMismatch { count: items.len() });
        }
        let mut form = Self::new();
        for pair in items.chunks_exact(2) {
            add(&mut form, pair[0].as_ref().trim(), pair[1].as_ref());
        }
        Ok(form)
    }

    /// Adds or replaces a parameter, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Adds a parameter after the existing ones, even when the key is
    /// already present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Looks up the first parameter with this exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameters with keys sorted case-insensitively (stable for equal keys).
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &ParamValue)> {
        let mut entries: Vec<(&str, &ParamValue)> = self.iter().collect();
        entries.sort_by_cached_key(|(k, _)| k.to_lowercase());
        entries
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (key, value) in iter {
            form.insert(key, value);
        }
        form
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_pairs_items_in_order() {
        let form = FormData::from_flat(&["b", "2", "a", "1"]).unwrap();
        let keys: Vec<&str> = form.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(form.get("a"), Some(&ParamValue::from("1")));
    }

    #[test]
    fn test_from_flat_replaces_repeated_key() {
        let form = FormData::from_flat(&["a", "1", "b", "2", "a", "3"]).unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("a"), Some(&ParamValue::from("3")));
    }

    #[test]
    fn test_from_flat_repeating_keeps_every_pair() {
        let form = FormData::from_flat_repeating(&["a", "1", "a", "2", "b", "3"]).unwrap();
        let pairs: Vec<(&str, &ParamValue)> = form.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("a", &ParamValue::from("1")),
                ("a", &ParamValue::from("2")),
                ("b", &ParamValue::from("3")),
            ]
        );
    }

    #[test]
    fn test_from_flat_repeating_odd_count_is_error() {
        assert!(matches!(
            FormData::from_flat_repeating(&["a"]),
            Err(EncodeError::KeyValueMismatch { count: 1 })
        ));
    }

    #[test]
    fn test_from_flat_odd_count_is_error() {
        let result = FormData::from_flat(&["a", "1", "b"]);
        assert!(matches!(
            result,
            Err(EncodeError::KeyValueMismatch { count: 3 })
        ));
    }

    #[test]
    fn test_insert_replaces_existing_key_in_place() {
        let form = FormData::new().with("a", "1").with("b", "2").with("a", "3");
        let entries: Vec<(&str, &ParamValue)> = form.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("a", &ParamValue::from("3")));
    }

    #[test]
    fn test_sorted_is_case_insensitive() {
        let form = FormData::new().with("b", "2").with("A", "1").with("c", "3");
        let keys: Vec<&str> = form.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "b", "c"]);
    }

    #[test]
    fn test_option_none_is_null() {
        let value: ParamValue = Option::<&str>::None.into();
        assert!(value.is_null());
        assert_eq!(ParamValue::from(Some(5_u32)), ParamValue::from("5"));
    }
}
