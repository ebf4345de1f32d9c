//! Squarified treemap layout
//!
//! Turns a dataset tree into one rectangle per leaf.
//! - Children sort by descending height, then descending weight
//! - Rows are packed greedily while the worst aspect ratio improves
//! - Padding insets every node by half the inner padding

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::hierarchy::Node;

/// Target aspect ratio for squarified rows (golden ratio)
const RATIO: f64 = 1.618_033_988_749_895;

/// Canvas size and tile spacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            padding: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left and bottom-right corners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }

    /// Shrink by `d` on every side; a side that would invert collapses to its midpoint.
    pub fn inset(&self, d: f64) -> Rect {
        let (mut x0, mut y0, mut x1, mut y1) = (self.x0 + d, self.y0 + d, self.x1 - d, self.y1 - d);
        if x1 < x0 {
            x0 = (x0 + x1) / 2.0;
            x1 = x0;
        }
        if y1 < y0 {
            y0 = (y0 + y1) / 2.0;
            y1 = y0;
        }
        Rect { x0, y0, x1, y1 }
    }
}

/// A positioned leaf, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub name: String,
    pub category: String,
    pub value: f64,
    pub rect: Rect,
}

/// Weighted, sorted copy of the dataset tree with computed rectangles
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub name: String,
    pub value: f64,
    pub height: usize,
    pub rect: Rect,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    /// Build the weighted tree: leaf weight is its value, internal weight is the
    /// sum of its children. Negative or non-finite values weigh 0.
    pub fn from_node(node: &Node) -> Self {
        let mut children: Vec<LayoutNode> = node.children.iter().map(LayoutNode::from_node).collect();
        children.sort_by(|a, b| {
            b.height
                .cmp(&a.height)
                .then(b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal))
        });

        let value = if children.is_empty() {
            node.value.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0)
        } else {
            children.iter().map(|c| c.value).sum()
        };
        let height = children.iter().map(|c| c.height + 1).max().unwrap_or(0);

        Self {
            name: node.name.clone(),
            value,
            height,
            rect: Rect::default(),
            children,
        }
    }

    /// Leaves in pre-order, each tagged with its immediate parent's name.
    /// A childless root is its own category.
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::new();
        if self.children.is_empty() {
            tiles.push(Tile {
                name: self.name.clone(),
                category: self.name.clone(),
                value: self.value,
                rect: self.rect,
            });
        } else {
            collect_tiles(self, &mut tiles);
        }
        tiles
    }
}

fn collect_tiles(parent: &LayoutNode, out: &mut Vec<Tile>) {
    for child in &parent.children {
        if child.children.is_empty() {
            out.push(Tile {
                name: child.name.clone(),
                category: parent.name.clone(),
                value: child.value,
                rect: child.rect,
            });
        } else {
            collect_tiles(child, out);
        }
    }
}

/// Lay out the whole tree and return the positioned root
pub fn treemap(root: &Node, config: &LayoutConfig) -> LayoutNode {
    let mut tree = LayoutNode::from_node(root);
    let canvas = Rect::new(0.0, 0.0, config.width, config.height);
    position(&mut tree, canvas, 0.0, config.padding);
    tracing::debug!(
        "Treemap laid out: {} leaves, total weight {}",
        root.leaf_count(),
        tree.value
    );
    tree
}

/// Lay out the tree and return one tile per leaf
pub fn layout(root: &Node, config: &LayoutConfig) -> Vec<Tile> {
    treemap(root, config).tiles()
}

/// Place `node` inside `rect` (inset by `inset`) and recurse into its children
fn position(node: &mut LayoutNode, rect: Rect, inset: f64, padding: f64) {
    node.rect = rect.inset(inset);
    if node.children.is_empty() {
        return;
    }

    let half = padding / 2.0;
    let inner = node.rect.inset(padding - half);
    squarify(&mut node.children, node.value, inner);

    for child in node.children.iter_mut() {
        let slot = child.rect;
        position(child, slot, half, padding);
    }
}

/// Assign each node a slot inside `region`, in rows of near-golden aspect ratio
fn squarify(nodes: &mut [LayoutNode], total: f64, region: Rect) {
    let Rect { mut x0, mut y0, x1, y1 } = region;
    let n = nodes.len();
    let mut value = total;
    let mut i0 = 0;
    let mut i1 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Start the row at the next non-empty node
        let mut sum_value;
        loop {
            sum_value = nodes[i1].value;
            i1 += 1;
            if sum_value != 0.0 || i1 >= n {
                break;
            }
        }

        let mut min_value = sum_value;
        let mut max_value = sum_value;
        let alpha = (dy / dx).max(dx / dy) / (value * RATIO);
        let mut beta = sum_value * sum_value * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // Grow the row while the worst aspect ratio holds or improves
        while i1 < n {
            let node_value = nodes[i1].value;
            sum_value += node_value;
            min_value = min_value.min(node_value);
            max_value = max_value.max(node_value);
            beta = sum_value * sum_value * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum_value -= node_value;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &mut nodes[i0..i1];
        if dx < dy {
            let y = if value > 0.0 { y0 + dy * sum_value / value } else { y1 };
            dice(row, sum_value, Rect::new(x0, y0, x1, y));
            if value > 0.0 {
                y0 = y;
            }
        } else {
            let x = if value > 0.0 { x0 + dx * sum_value / value } else { x1 };
            slice(row, sum_value, Rect::new(x0, y0, x, y1));
            if value > 0.0 {
                x0 = x;
            }
        }

        value -= sum_value;
        i0 = i1;
    }
}

/// Split `region` left to right in proportion to node weights
fn dice(row: &mut [LayoutNode], row_value: f64, region: Rect) {
    let k = if row_value > 0.0 { region.width() / row_value } else { 0.0 };
    let mut x = region.x0;
    for node in row {
        let x_next = x + node.value * k;
        node.rect = Rect::new(x, region.y0, x_next, region.y1);
        x = x_next;
    }
}

/// Split `region` top to bottom in proportion to node weights
fn slice(row: &mut [LayoutNode], row_value: f64, region: Rect) {
    let k = if row_value > 0.0 { region.height() / row_value } else { 0.0 };
    let mut y = region.y0;
    for node in row {
        let y_next = y + node.value * k;
        node.rect = Rect::new(region.x0, y, region.x1, y_next);
        y = y_next;
    }
}
