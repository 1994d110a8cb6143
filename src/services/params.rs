//! Query parameters attached to a request URL.

use reqwest::Url;
use std::collections::BTreeMap;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::Scalar(value.to_string())
            }
        })*
    };
}

scalar_from!(&str, String, &String, bool, i32, i64, u32, u64, usize, f64);

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered query parameters.
///
/// Lists encode as repeated `name[]=value` pairs:
/// `Params::new().with("tag", vec!["a", "b"])` → `tag[]=a&tag[]=b`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builds params from `(name, value)` pairs; a name seen more than once
    /// becomes a list.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Params::new();
        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();
            let merged = match params.entries.remove(&name) {
                None => ParamValue::Scalar(value),
                Some(ParamValue::Scalar(prev)) => ParamValue::List(vec![prev, value]),
                Some(ParamValue::List(mut prev)) => {
                    prev.push(value);
                    ParamValue::List(prev)
                }
            };
            params.entries.insert(name, merged);
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    /// Flattens into the `(name, value)` pairs written to the query string.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (name, value) in &self.entries {
            match value {
                ParamValue::Scalar(v) => pairs.push((name.clone(), v.clone())),
                ParamValue::List(values) => {
                    let key = format!("{name}[]");
                    pairs.extend(values.iter().map(|v| (key.clone(), v.clone())));
                }
            }
        }
        pairs
    }

    /// Appends these params to `url`, after any query it already carries.
    pub fn append_to(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (name, value) in self.to_pairs() {
            query.append_pair(&name, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_and_lists() {
        let params = Params::new()
            .with("page", 2)
            .with("in_stock", true)
            .with("tag", vec!["new", "sale"]);

        assert_eq!(
            params.to_pairs(),
            vec![
                ("in_stock".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
                ("tag[]".to_string(), "new".to_string()),
                ("tag[]".to_string(), "sale".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_pairs_merges_repeated_names() {
        let params = Params::from_pairs([("tag", "a"), ("q", "shoe"), ("tag", "b"), ("tag", "c")]);

        assert_eq!(params.get("q"), Some(&ParamValue::Scalar("shoe".into())));
        assert_eq!(
            params.get("tag"),
            Some(&ParamValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn test_append_to_url_encodes_values() {
        let mut url = Url::parse("http://shop.test/products?sort=asc").unwrap();
        Params::new().with("q", "red shoes").append_to(&mut url);

        assert_eq!(url.as_str(), "http://shop.test/products?sort=asc&q=red+shoes");
    }

    #[test]
    fn test_empty_params_leave_url_untouched() {
        let mut url = Url::parse("http://shop.test/products").unwrap();
        Params::new().append_to(&mut url);

        assert_eq!(url.as_str(), "http://shop.test/products");
    }
}
