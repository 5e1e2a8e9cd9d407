use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque push token of one installed client.
pub type DeviceToken = String;

/// Right-hand side of an equality filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Single `field = value` predicate used to select device tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenFilter {
    pub field: String,
    pub value: FilterValue,
}

impl TokenFilter {
    pub fn new(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn by_user(user_id: impl Into<FilterValue>) -> Self {
        Self::new("user_id", user_id)
    }

    pub fn by_role(column: &str, role: impl Into<FilterValue>) -> Self {
        Self::new(column, role)
    }

    /// PostgREST query operand, e.g. `eq.admin`.
    pub fn operand(&self) -> String {
        format!("eq.{}", self.value)
    }
}

impl fmt::Display for TokenFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}
