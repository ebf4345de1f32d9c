//! Treemap drawing
//!
//! Drawing goes through the [`Renderer`] trait so the same pass can feed the
//! native viewer, the SVG page writer, or a test. [`Scene`] is the retained
//! implementation all of them share.

use crate::color::{Color, ColorScale};
use crate::hierarchy::Node;
use crate::layout::{self, LayoutConfig, Point, Rect};

/// Label offset from a tile's top-left corner
pub const LABEL_OFFSET: Point = Point { x: 5.0, y: 15.0 };

/// Horizontal space a label leaves free inside its tile
const LABEL_MARGIN: f64 = 10.0;

/// Units per character when truncating
const TRUNCATE_CHAR_WIDTH: f64 = 6.0;

const ELLIPSIS: &str = "...";

/// What a tile represents, kept with the drawn element for hover and export
#[derive(Debug, Clone, PartialEq)]
pub struct TileMetadata {
    pub name: String,
    pub category: String,
    pub value: f64,
}

/// A drawing surface for tiles, labels and legend entries
pub trait Renderer {
    fn clear(&mut self);
    fn draw_tile(&mut self, rect: Rect, color: Color, metadata: TileMetadata);
    fn draw_label(&mut self, position: Point, text: &str);
    fn clear_legend(&mut self);
    fn draw_legend_item(&mut self, index: usize, color: Color, label: &str);
}

/// Width of a label as it would be drawn
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f64;
}

/// Fixed per-character estimate, used when no real font is available
#[derive(Debug, Clone, Copy)]
pub struct CharWidthEstimate(pub f64);

impl Default for CharWidthEstimate {
    /// Roughly 12px sans-serif
    fn default() -> Self {
        Self(7.0)
    }
}

impl TextMeasure for CharWidthEstimate {
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.0
    }
}

/// Fit `text` into a tile of `tile_width`.
///
/// Tiles narrower than the margin keep the full text.
pub fn fit_label(text: &str, tile_width: f64, measure: &dyn TextMeasure) -> String {
    let available = tile_width - LABEL_MARGIN;
    if available > 0.0 && measure.text_width(text) > available {
        let keep = (available / TRUNCATE_CHAR_WIDTH).floor() as usize;
        let mut truncated: String = text.chars().take(keep).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        text.to_string()
    }
}

/// Lay out `root` and draw one tile and one label per leaf.
///
/// Returns the number of tiles drawn.
pub fn render_treemap<R: Renderer + ?Sized>(
    renderer: &mut R,
    root: &Node,
    colors: &ColorScale,
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> usize {
    renderer.clear();

    let tiles = layout::layout(root, config);
    for tile in &tiles {
        let color = colors.color_of(&tile.category);
        renderer.draw_tile(
            tile.rect,
            color,
            TileMetadata {
                name: tile.name.clone(),
                category: tile.category.clone(),
                value: tile.value,
            },
        );

        let position = Point::new(tile.rect.x0 + LABEL_OFFSET.x, tile.rect.y0 + LABEL_OFFSET.y);
        let label = fit_label(&tile.name, tile.rect.width(), measure);
        renderer.draw_label(position, &label);
    }

    tracing::debug!("Rendered {} tiles for '{}'", tiles.len(), root.name);
    tiles.len()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnTile {
    pub rect: Rect,
    pub color: Color,
    pub metadata: TileMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLabel {
    pub position: Point,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub index: usize,
    pub color: Color,
    pub label: String,
}

/// Retained draw list
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub tiles: Vec<DrawnTile>,
    pub labels: Vec<DrawnLabel>,
    pub legend: Vec<LegendEntry>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the topmost tile under `point`
    pub fn tile_index_at(&self, point: Point) -> Option<usize> {
        self.tiles.iter().rposition(|t| t.rect.contains(point))
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.legend.is_empty()
    }
}

impl Renderer for Scene {
    fn clear(&mut self) {
        self.tiles.clear();
        self.labels.clear();
    }

    fn draw_tile(&mut self, rect: Rect, color: Color, metadata: TileMetadata) {
        self.tiles.push(DrawnTile { rect, color, metadata });
    }

    fn draw_label(&mut self, position: Point, text: &str) {
        self.labels.push(DrawnLabel {
            position,
            text: text.to_string(),
        });
    }

    fn clear_legend(&mut self) {
        self.legend.clear();
    }

    fn draw_legend_item(&mut self, index: usize, color: Color, label: &str) {
        self.legend.push(LegendEntry {
            index,
            color,
            label: label.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::default_palette;

    fn movies() -> Node {
        Node::branch(
            "Movies",
            vec![
                Node::branch(
                    "Action",
                    vec![Node::leaf("Inception", 100.0), Node::leaf("Heat", 40.0)],
                ),
                Node::branch("Comedy", vec![Node::leaf("Airplane!", 50.0)]),
                Node::branch("Drama", vec![Node::leaf("Amadeus", 25.0)]),
            ],
        )
    }

    #[test]
    fn test_long_label_is_truncated() {
        let label = fit_label("Supercalifragilisticexpialidocious", 30.0, &CharWidthEstimate::default());
        assert!(label.ends_with("..."));
        let kept = label.trim_end_matches("...");
        assert!(kept.chars().count() <= 5);
        assert_eq!(label, "Sup...");
    }

    #[test]
    fn test_short_label_is_kept() {
        assert_eq!(fit_label("Up", 100.0, &CharWidthEstimate::default()), "Up");
    }

    #[test]
    fn test_narrow_tile_skips_truncation() {
        assert_eq!(fit_label("Inception", 8.0, &CharWidthEstimate::default()), "Inception");
    }

    #[test]
    fn test_tile_color_follows_parent_category() {
        let root = movies();
        let colors = ColorScale::new(&root.categories(), &default_palette());
        let mut scene = Scene::new();
        let drawn = render_treemap(&mut scene, &root, &colors, &LayoutConfig::default(), &CharWidthEstimate::default());

        assert_eq!(drawn, 4);
        assert_eq!(scene.tiles.len(), 4);
        assert_eq!(scene.labels.len(), 4);
        for tile in &scene.tiles {
            assert_eq!(tile.color, colors.color_of(&tile.metadata.category));
        }
        let action: Vec<_> = scene.tiles.iter().filter(|t| t.metadata.category == "Action").collect();
        assert_eq!(action.len(), 2);
        assert_eq!(action[0].color, action[1].color);
    }

    #[test]
    fn test_labels_sit_at_tile_offset() {
        let root = movies();
        let colors = ColorScale::new(&root.categories(), &default_palette());
        let mut scene = Scene::new();
        render_treemap(&mut scene, &root, &colors, &LayoutConfig::default(), &CharWidthEstimate::default());

        for (tile, label) in scene.tiles.iter().zip(&scene.labels) {
            assert_eq!(label.position.x, tile.rect.x0 + 5.0);
            assert_eq!(label.position.y, tile.rect.y0 + 15.0);
        }
    }

    #[test]
    fn test_render_clears_previous_tiles() {
        let root = movies();
        let colors = ColorScale::new(&root.categories(), &default_palette());
        let mut scene = Scene::new();
        let config = LayoutConfig::default();
        render_treemap(&mut scene, &root, &colors, &config, &CharWidthEstimate::default());
        render_treemap(&mut scene, &root, &colors, &config, &CharWidthEstimate::default());
        assert_eq!(scene.tiles.len(), 4);
    }

    #[test]
    fn test_tile_at_finds_hovered_tile() {
        let root = movies();
        let colors = ColorScale::new(&root.categories(), &default_palette());
        let mut scene = Scene::new();
        render_treemap(&mut scene, &root, &colors, &LayoutConfig::default(), &CharWidthEstimate::default());

        let first = scene.tiles[0].clone();
        let center = Point::new(
            (first.rect.x0 + first.rect.x1) / 2.0,
            (first.rect.y0 + first.rect.y1) / 2.0,
        );
        let hit = scene.tile_index_at(center).map(|i| &scene.tiles[i].metadata);
        assert_eq!(hit, Some(&first.metadata));
        assert!(scene.tile_index_at(Point::new(0.5, 0.5)).is_none());
    }
}
