use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Raw query string parameters with the loose coercions browser clients
/// rely on ("2" and "2.0" are both page 2, "" means absent).
#[derive(Debug, Default)]
pub struct QueryParams {
    map: HashMap<String, String>,
}

impl<'de> Deserialize<'de> for QueryParams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(QueryParams { map })
    }
}

impl<const N: usize> From<[(&str, &str); N]> for QueryParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        QueryParams {
            map: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl QueryParams {
    /// Non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
    }

    /// Only the literal strings "true" and "false" count.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}
