//! Hover tooltip state machine
//!
//! Hidden until the pointer enters a tile; hidden again when it leaves.
//! Only one tooltip exists, so entering a new tile replaces the old content.

use crate::layout::Point;
use crate::render::TileMetadata;

/// Tooltip placement relative to the pointer
pub const POINTER_OFFSET: Point = Point { x: 10.0, y: -10.0 };

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Tooltip {
    #[default]
    Hidden,
    Visible { tile: TileMetadata, position: Point },
}

impl Tooltip {
    pub fn pointer_enter(&mut self, tile: TileMetadata, pointer: Point) {
        *self = Tooltip::Visible {
            tile,
            position: offset(pointer),
        };
    }

    /// Follow the pointer while visible
    pub fn pointer_move(&mut self, pointer: Point) {
        if let Tooltip::Visible { position, .. } = self {
            *position = offset(pointer);
        }
    }

    pub fn pointer_leave(&mut self) {
        *self = Tooltip::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Tooltip::Visible { .. })
    }

    /// Currently shown tile, if any
    pub fn tile(&self) -> Option<&TileMetadata> {
        match self {
            Tooltip::Visible { tile, .. } => Some(tile),
            Tooltip::Hidden => None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Tooltip::Visible { position, .. } => Some(*position),
            Tooltip::Hidden => None,
        }
    }

    /// Text lines to display, empty while hidden
    pub fn lines(&self) -> Vec<String> {
        self.tile().map(content_lines).unwrap_or_default()
    }
}

fn offset(pointer: Point) -> Point {
    Point::new(pointer.x + POINTER_OFFSET.x, pointer.y + POINTER_OFFSET.y)
}

pub fn content_lines(tile: &TileMetadata) -> Vec<String> {
    vec![
        format!("Name: {}", tile.name),
        format!("Category: {}", tile.category),
        format!("Value: {}", format_value(tile.value)),
    ]
}

/// Integral values print without a fractional part
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> TileMetadata {
        TileMetadata {
            name: "Inception".to_string(),
            category: "Action".to_string(),
            value: 100.0,
        }
    }

    #[test]
    fn test_hover_shows_then_hides() {
        let mut tooltip = Tooltip::default();
        assert!(!tooltip.is_visible());

        tooltip.pointer_enter(inception(), Point::new(200.0, 120.0));
        assert!(tooltip.is_visible());
        assert_eq!(
            tooltip.lines(),
            vec!["Name: Inception", "Category: Action", "Value: 100"]
        );
        assert_eq!(tooltip.position(), Some(Point::new(210.0, 110.0)));

        tooltip.pointer_leave();
        assert_eq!(tooltip, Tooltip::Hidden);
        assert!(tooltip.lines().is_empty());
    }

    #[test]
    fn test_move_repositions_only_when_visible() {
        let mut tooltip = Tooltip::default();
        tooltip.pointer_move(Point::new(5.0, 5.0));
        assert_eq!(tooltip, Tooltip::Hidden);

        tooltip.pointer_enter(inception(), Point::new(0.0, 0.0));
        tooltip.pointer_move(Point::new(50.0, 60.0));
        assert_eq!(tooltip.position(), Some(Point::new(60.0, 50.0)));
    }

    #[test]
    fn test_entering_another_tile_replaces_content() {
        let mut tooltip = Tooltip::default();
        tooltip.pointer_enter(inception(), Point::new(0.0, 0.0));
        tooltip.pointer_enter(
            TileMetadata {
                name: "Heat".to_string(),
                category: "Action".to_string(),
                value: 67.5,
            },
            Point::new(0.0, 0.0),
        );
        assert_eq!(tooltip.tile().map(|t| t.name.as_str()), Some("Heat"));
        assert_eq!(tooltip.lines()[2], "Value: 67.5");
    }
}
