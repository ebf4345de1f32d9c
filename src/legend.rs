//! Legend: one swatch and label per category

use crate::color::ColorScale;
use crate::render::Renderer;

/// Swatch edge length
pub const SWATCH_SIZE: f64 = 20.0;

/// Horizontal space taken by one legend item
pub const ITEM_WIDTH: f64 = 100.0;

/// Replace the legend with one entry per category, in the given order
pub fn render_legend<R: Renderer + ?Sized>(renderer: &mut R, categories: &[String], colors: &ColorScale) {
    renderer.clear_legend();
    for (index, category) in categories.iter().enumerate() {
        renderer.draw_legend_item(index, colors.color_of(category), category);
    }
    tracing::debug!("Legend rendered with {} entries", categories.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::default_palette;
    use crate::hierarchy::Node;
    use crate::layout::LayoutConfig;
    use crate::render::{render_treemap, CharWidthEstimate, Scene};

    #[test]
    fn test_two_category_movies_scenario() {
        let root = Node::branch(
            "Movies",
            vec![
                Node::branch("Action", vec![Node::leaf("Inception", 100.0)]),
                Node::branch("Comedy", vec![Node::leaf("Airplane!", 50.0)]),
            ],
        );
        let categories = root.categories();
        let colors = ColorScale::new(&categories, &default_palette());
        let mut scene = Scene::new();

        render_treemap(&mut scene, &root, &colors, &LayoutConfig::default(), &CharWidthEstimate::default());
        render_legend(&mut scene, &categories, &colors);

        assert_eq!(scene.tiles.len(), 2);
        let ratio = scene.tiles[0].rect.area() / scene.tiles[1].rect.area();
        assert!((ratio - 2.0).abs() < 0.05);

        let labels: Vec<_> = scene.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Action", "Comedy"]);
        assert_eq!(scene.legend[0].color, colors.color_of("Action"));
    }

    #[test]
    fn test_no_duplicate_entries() {
        let root = Node::branch(
            "Games",
            vec![
                Node::branch("Wii", vec![Node::leaf("Wii Sports", 82.0)]),
                Node::branch("NES", vec![Node::leaf("Super Mario Bros.", 40.0)]),
                Node::branch("Wii", vec![Node::leaf("Mario Kart Wii", 35.0)]),
            ],
        );
        let categories = root.categories();
        let colors = ColorScale::new(&categories, &default_palette());
        let mut scene = Scene::new();

        render_legend(&mut scene, &categories, &colors);
        render_legend(&mut scene, &categories, &colors);

        assert_eq!(scene.legend.len(), 2);
        assert_eq!(scene.legend[1].index, 1);
        assert_eq!(scene.legend[1].label, "NES");
    }
}
