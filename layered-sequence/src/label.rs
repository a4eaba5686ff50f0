//! Classification outcomes and their declared types.

use std::fmt;

use layered_features::Primitive;
use serde::{Deserialize, Serialize};

/// One classification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl Label {
    pub fn label_type(&self) -> LabelType {
        match self {
            Label::Text(_) => LabelType::Text,
            Label::Integer(_) => LabelType::Integer,
            Label::Boolean(_) => LabelType::Boolean,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a value read from the graph. Floats have no label form.
    pub fn from_primitive(value: &Primitive) -> Option<Self> {
        match value {
            Primitive::Str(s) => Some(Label::Text(s.clone())),
            Primitive::Int(i) => Some(Label::Integer(*i)),
            Primitive::Bool(b) => Some(Label::Boolean(*b)),
            Primitive::Float(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(s) => f.write_str(s),
            Label::Integer(i) => write!(f, "{}", i),
            Label::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Text(value)
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Integer(value)
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        Label::Boolean(value)
    }
}

/// The type of labels a classifier produces or a writer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Text,
    Integer,
    Boolean,
    /// Accepts labels of every type.
    Any,
}

impl LabelType {
    /// Returns true if labels of this type can be handed to a consumer
    /// expecting `expected`.
    pub fn is_assignable_to(self, expected: LabelType) -> bool {
        expected == LabelType::Any || self == expected
    }

    /// Returns true if `label` is a value of this type.
    pub fn admits(self, label: &Label) -> bool {
        self == LabelType::Any || label.label_type() == self
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LabelType::Text => "text",
            LabelType::Integer => "integer",
            LabelType::Boolean => "boolean",
            LabelType::Any => "any",
        })
    }
}
