//! Hierarchical dataset model
//!
//! Mirrors the JSON shape served by the dataset registry:
//! `{ name, children: [{ name, children: [{ name, value }, ...] }, ...] }`

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// A node of the dataset tree.
///
/// Leaves carry a `value`; internal nodes carry `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn branch(name: &str, children: Vec<Node>) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Sum of leaf values under this node (the node's own value for a leaf).
    pub fn total(&self) -> f64 {
        if self.is_leaf() {
            self.value.unwrap_or(0.0)
        } else {
            self.children.iter().map(Node::total).sum()
        }
    }

    /// Longest path from this node down to a leaf.
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Node::leaf_count).sum()
        }
    }

    /// Distinct names of the direct children, in first-appearance order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.children
            .iter()
            .filter(|c| seen.insert(c.name.as_str()))
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Accept `"value": 123`, `"value": "123"` or `"value": null`.
///
/// The published datasets encode leaf values as strings. Text that is not a
/// finite number (`"NaN"`, `"inf"`) reads as missing.
fn deserialize_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    let value = match raw {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}
