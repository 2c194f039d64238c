// Open-shaped vendor result rows
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of an NRQL result set.
///
/// Field names are chosen by the vendor from the query projection (`count(*)`,
/// `uniqueCount.storeName`, `latest.status`, aliases given with `AS`), so the row keeps
/// the raw map and exposes accessors that try a list of aliases in priority order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRow(Map<String, Value>);

/// Grouping dimension of a faceted query
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    Scalar(String),
    Composite(Vec<String>),
}

impl Facet {
    /// Human label: the scalar itself, or the composite parts joined with ", "
    pub fn label(&self) -> String {
        match self {
            Facet::Scalar(s) => s.clone(),
            Facet::Composite(parts) => parts.join(", "),
        }
    }

    /// City is position 0 of a composite facet of two or more parts
    pub fn city(&self) -> Option<&str> {
        match self {
            Facet::Composite(parts) if parts.len() >= 2 => Some(parts[0].as_str()),
            _ => None,
        }
    }

    /// State is position 1 of a composite facet, the only part of a one-element
    /// composite, or the scalar itself
    pub fn state(&self) -> Option<&str> {
        match self {
            Facet::Scalar(s) => Some(s.as_str()),
            Facet::Composite(parts) if parts.len() >= 2 => Some(parts[1].as_str()),
            Facet::Composite(parts) => parts.first().map(|s| s.as_str()),
        }
    }
}

impl QueryRow {
    /// Builds a row from a JSON value; anything other than an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Raw field, treating JSON null as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// First alias holding a number (numeric strings are accepted)
    pub fn number(&self, aliases: &[&str]) -> Option<f64> {
        aliases.iter().find_map(|key| match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }

    /// First alias holding a string
    pub fn text(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .find_map(|key| self.get(key).and_then(Value::as_str))
    }

    /// Non-negative integer count; missing, null and negative values collapse to 0
    pub fn count_of(&self, aliases: &[&str]) -> u64 {
        self.number(aliases).map(clamp_count).unwrap_or(0)
    }

    /// Standard aggregate count, preferring the NRQL `count(*)` key over `count`
    pub fn count(&self) -> u64 {
        self.count_of(&["count(*)", "count"])
    }

    pub fn facet(&self) -> Option<Facet> {
        match self.get("facet")? {
            Value::Array(items) => Some(Facet::Composite(
                items.iter().map(value_to_label).collect(),
            )),
            other => Some(Facet::Scalar(value_to_label(other))),
        }
    }
}

fn clamp_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn value_to_label(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
