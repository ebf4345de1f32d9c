//! HTML page generation
//!
//! Writes a self-contained page: navbar, title, description, the treemap as
//! inline SVG, the legend, and a hidden tooltip element driven by a few
//! lines of inline script.

use std::fmt::Write;

use crate::layout::LayoutConfig;
use crate::legend::{ITEM_WIDTH, SWATCH_SIZE};
use crate::render::Scene;
use crate::state::AppState;
use crate::tooltip::{format_value, POINTER_OFFSET};

/// Navbar link prefix when pages are served by the HTTP server
pub const SERVED_LINK_BASE: &str = "/datasets/";

/// Render the page for the state's loaded dataset, drawn into `scene`.
///
/// Navbar entries link to `{link_base}{key}`.
pub fn render_page(state: &AppState, scene: &Scene, link_base: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
<!-- generated {generated} -->
{navbar}
    <h1 id="title">{title}</h1>
    <p id="description">{description}</p>
{treemap}
{legend}
    <div id="tooltip" style="display: none"></div>
    <script>{js}</script>
</body>
</html>
"#,
        title = escape(&state.title()),
        description = escape(&state.description()),
        generated = chrono::Local::now().to_rfc3339(),
        css = inline_css(),
        js = inline_javascript(),
        navbar = render_navbar(state, link_base),
        treemap = render_treemap_svg(scene, &state.config.canvas),
        legend = render_legend(scene),
    )
}

fn render_navbar(state: &AppState, link_base: &str) -> String {
    let mut html = String::from("    <nav id=\"navbar\">\n");
    for key in state.config.keys() {
        let class = if key == state.selection() { " class=\"active\"" } else { "" };
        let _ = writeln!(
            html,
            "        <a href=\"{href}\" data-dataset=\"{key}\"{class}>{label}</a>",
            href = escape(&format!("{}{}", link_base, key)),
            key = escape(key),
            class = class,
            label = escape(&key.replace('-', " ")),
        );
    }
    html.push_str("    </nav>");
    html
}

/// The tiles and labels of `scene` as an `<svg id="treemap">` element
pub fn render_treemap_svg(scene: &Scene, canvas: &LayoutConfig) -> String {
    let mut svg = format!(
        "    <svg id=\"treemap\" width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        canvas.width, canvas.height
    );

    for (tile, label) in scene.tiles.iter().zip(&scene.labels) {
        let meta = &tile.metadata;
        let _ = writeln!(svg, "        <g transform=\"translate({},{})\">", tile.rect.x0, tile.rect.y0);
        let _ = writeln!(
            svg,
            "            <rect class=\"tile\" width=\"{}\" height=\"{}\" fill=\"{}\" data-name=\"{}\" data-category=\"{}\" data-value=\"{}\"></rect>",
            tile.rect.width(),
            tile.rect.height(),
            tile.color,
            escape(&meta.name),
            escape(&meta.category),
            format_value(meta.value),
        );
        let _ = writeln!(
            svg,
            "            <text x=\"{}\" y=\"{}\" font-size=\"12px\" fill=\"#fff\">{}</text>",
            label.position.x - tile.rect.x0,
            label.position.y - tile.rect.y0,
            escape(&label.text),
        );
        svg.push_str("        </g>\n");
    }

    svg.push_str("    </svg>");
    svg
}

fn render_legend(scene: &Scene) -> String {
    let mut html = String::from("    <div id=\"legend\">\n");
    for entry in &scene.legend {
        let _ = writeln!(
            html,
            "        <div class=\"legend-item\" style=\"order: {}\"><div class=\"legend-swatch\" style=\"background-color: {}\"></div><span>{}</span></div>",
            entry.index,
            entry.color,
            escape(&entry.label),
        );
    }
    html.push_str("    </div>");
    html
}

fn inline_css() -> String {
    format!(
        r#"
body {{ font-family: sans-serif; margin: 20px; }}
#navbar a {{ margin-right: 12px; text-transform: capitalize; }}
#navbar a.active {{ font-weight: bold; }}
#treemap text {{ pointer-events: none; }}
#legend {{ display: flex; flex-wrap: wrap; width: 960px; margin-top: 10px; }}
.legend-item {{ display: flex; align-items: center; width: {item}px; font-size: 14px; }}
.legend-swatch {{ width: {swatch}px; height: {swatch}px; margin-right: 5px; }}
#tooltip {{ position: absolute; padding: 6px; background: rgba(0, 0, 0, 0.8); color: #fff; font-size: 12px; pointer-events: none; }}
"#,
        item = ITEM_WIDTH,
        swatch = SWATCH_SIZE,
    )
}

fn inline_javascript() -> String {
    format!(
        r#"
const tooltip = document.getElementById('tooltip');
document.querySelectorAll('#treemap .tile').forEach(tile => {{
  tile.addEventListener('mouseover', e => {{
    const d = tile.dataset;
    tooltip.textContent = '';
    ['Name: ' + d.name, 'Category: ' + d.category, 'Value: ' + d.value].forEach((line, i) => {{
      if (i > 0) tooltip.appendChild(document.createElement('br'));
      tooltip.appendChild(document.createTextNode(line));
    }});
    tooltip.setAttribute('data-value', d.value);
    tooltip.style.left = (e.pageX + {dx}) + 'px';
    tooltip.style.top = (e.pageY + {dy}) + 'px';
    tooltip.style.display = 'block';
  }});
  tile.addEventListener('mouseout', () => {{ tooltip.style.display = 'none'; }});
}});
"#,
        dx = POINTER_OFFSET.x,
        dy = POINTER_OFFSET.y,
    )
}

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::hierarchy::Node;
    use crate::render::CharWidthEstimate;
    use crate::state::Action;

    fn rendered() -> (AppState, Scene) {
        let mut state = AppState::new(Config::default());
        let root = Node::branch(
            "Movies",
            vec![
                Node::branch("Action", vec![Node::leaf("Inception", 100.0)]),
                Node::branch("Comedy", vec![Node::leaf("Harold & Kumar", 50.0)]),
            ],
        );
        state.dispatch(Action::Loaded {
            key: "movies".to_string(),
            result: Ok(root),
        });
        let mut scene = Scene::new();
        state.render(&mut scene, &CharWidthEstimate::default());
        (state, scene)
    }

    #[test]
    fn test_page_has_all_regions() {
        let (state, scene) = rendered();
        let html = render_page(&state, &scene, SERVED_LINK_BASE);

        assert!(html.contains("<h1 id=\"title\">Top 100 Movies</h1>"));
        assert!(html.contains("Visualizing the top 100 movies by category and value."));
        assert!(html.contains("data-dataset=\"kickstarter\""));
        assert!(html.contains("data-dataset=\"videogames\""));
        assert!(html.contains("<div id=\"tooltip\" style=\"display: none\">"));
        assert_eq!(html.matches("class=\"tile\"").count(), 2);
        assert_eq!(html.matches("class=\"legend-item\"").count(), 2);
    }

    #[test]
    fn test_navbar_links_use_base() {
        let (state, scene) = rendered();
        let served = render_page(&state, &scene, SERVED_LINK_BASE);
        assert!(served.contains("href=\"/datasets/kickstarter\""));

        let hosted = render_page(&state, &scene, "https://example.org/treemap?dataset=");
        assert!(hosted.contains("href=\"https://example.org/treemap?dataset=movies\""));
        assert!(!hosted.contains("href=\"/datasets/"));
    }

    #[test]
    fn test_tile_attributes_are_escaped() {
        let (state, scene) = rendered();
        let svg = render_treemap_svg(&scene, &state.config.canvas);
        assert!(svg.contains("data-name=\"Inception\" data-category=\"Action\" data-value=\"100\""));
        assert!(svg.contains("data-name=\"Harold &amp; Kumar\""));
        assert!(svg.contains("fill=\"#1f77b4\""));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
