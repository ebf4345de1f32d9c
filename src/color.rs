//! Category colors
//!
//! An ordinal scale: the n-th category of the domain gets the n-th palette
//! entry, wrapping around when there are more categories than colors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The classic ten-color categorical palette
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse `#rrggbb` (leading `#` optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid color '{}': expected #rrggbb", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("invalid color '{}': {}", s, e))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// The default palette as parsed colors
pub fn default_palette() -> Vec<Color> {
    CATEGORY10
        .iter()
        .filter_map(|hex| hex.parse().ok())
        .collect()
}

/// Maps category names to palette colors for one render pass
#[derive(Debug, Clone)]
pub struct ColorScale {
    palette: Vec<Color>,
    index: HashMap<String, usize>,
}

impl ColorScale {
    /// Build from the ordered category domain. Repeated names keep their first slot.
    pub fn new(domain: &[String], palette: &[Color]) -> Self {
        let palette = if palette.is_empty() { default_palette() } else { palette.to_vec() };
        let mut index = HashMap::new();
        for name in domain {
            let next = index.len();
            index.entry(name.clone()).or_insert(next);
        }
        Self { palette, index }
    }

    /// Color for `category`. Names outside the domain still get a stable color,
    /// derived from a hash of the name.
    pub fn color_of(&self, category: &str) -> Color {
        let slot = match self.index.get(category) {
            Some(&i) => i,
            None => category
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize)),
        };
        self.palette[slot % self.palette.len()]
    }

    pub fn domain_len(&self) -> usize {
        self.index.len()
    }
}
