//! Application State - Single Source of Truth (SSOT)
//!
//! Holds the current dataset selection and the last successfully loaded
//! dataset. All changes go through [`AppState::dispatch`].

use crate::color::ColorScale;
use crate::config::Config;
use crate::hierarchy::Node;
use crate::legend::render_legend;
use crate::loader::{self, DataFetchError};
use crate::render::{render_treemap, Renderer, TextMeasure};
use std::sync::Arc;

/// User interactions and load completions
#[derive(Debug)]
pub enum Action {
    /// Navbar click carrying a dataset key
    Select(String),
    /// A fetch for `key` finished
    Loaded {
        key: String,
        result: Result<Node, DataFetchError>,
    },
}

/// What the caller should do after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Start fetching this dataset
    Fetch(String),
    /// New data is in; redraw
    Render,
}

/// A dataset ready to draw
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub key: String,
    pub root: Node,
    pub categories: Vec<String>,
    pub colors: ColorScale,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    selection: String,
    loaded: Option<LoadedDataset>,
}

impl AppState {
    /// Create new app state from config, selecting the default dataset
    pub fn new(config: Config) -> Self {
        let selection = config.default_dataset.clone();
        Self {
            config: Arc::new(config),
            selection,
            loaded: None,
        }
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn loaded(&self) -> Option<&LoadedDataset> {
        self.loaded.as_ref()
    }

    /// Apply an action and report the follow-up work
    pub fn dispatch(&mut self, action: Action) -> Effect {
        match action {
            Action::Select(key) => {
                if self.config.dataset(&key).is_none() {
                    tracing::warn!("Ignoring selection of unknown dataset '{}'", key);
                    return Effect::None;
                }
                tracing::info!("Selected dataset '{}'", key);
                self.selection = key.clone();
                Effect::Fetch(key)
            }
            Action::Loaded { key, result } => match result {
                Ok(root) => {
                    let categories = root.categories();
                    let colors = ColorScale::new(&categories, &self.config.palette);
                    tracing::info!(
                        "Dataset '{}' loaded: {} categories, {} leaves",
                        key,
                        colors.domain_len(),
                        root.leaf_count()
                    );
                    self.loaded = Some(LoadedDataset {
                        key,
                        root,
                        categories,
                        colors,
                    });
                    Effect::Render
                }
                Err(e) => {
                    let url = self.config.dataset(&key).map(|d| d.url.as_str()).unwrap_or("<unknown>");
                    tracing::error!(url = %url, "Error fetching data: {}", e);
                    Effect::None
                }
            },
        }
    }

    /// Fetch the current selection and fold the result back in
    pub async fn load_selected(&mut self) -> Effect {
        let key = self.selection.clone();
        let result = loader::load(&self.config, &key).await;
        self.dispatch(Action::Loaded { key, result })
    }

    /// Draw the loaded dataset's treemap and legend. Returns the tile count,
    /// or `None` when nothing has loaded yet.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R, measure: &dyn TextMeasure) -> Option<usize> {
        let loaded = self.loaded.as_ref()?;
        let tiles = render_treemap(renderer, &loaded.root, &loaded.colors, &self.config.canvas, measure);
        render_legend(renderer, &loaded.categories, &loaded.colors);
        Some(tiles)
    }

    /// Key whose text is on screen: the loaded dataset, else the selection
    fn shown_key(&self) -> &str {
        self.loaded.as_ref().map(|l| l.key.as_str()).unwrap_or(&self.selection)
    }

    pub fn title(&self) -> String {
        title(self.shown_key())
    }

    pub fn description(&self) -> String {
        description(self.shown_key())
    }
}

/// "Top 100 Video Games" for key "video-games"
pub fn title(key: &str) -> String {
    let words: Vec<String> = key
        .replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    format!("Top 100 {}", words.join(" "))
}

pub fn description(key: &str) -> String {
    format!("Visualizing the top 100 {} by category and value.", key.replace('-', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CharWidthEstimate, Scene};

    fn movies() -> Node {
        Node::branch(
            "Movies",
            vec![
                Node::branch("Action", vec![Node::leaf("Inception", 100.0)]),
                Node::branch("Comedy", vec![Node::leaf("Airplane!", 50.0)]),
            ],
        )
    }

    #[test]
    fn test_derived_text() {
        assert_eq!(title("movies"), "Top 100 Movies");
        assert_eq!(title("video-games"), "Top 100 Video Games");
        assert_eq!(
            description("video-games"),
            "Visualizing the top 100 video games by category and value."
        );
    }

    #[test]
    fn test_select_known_key_requests_fetch() {
        let mut state = AppState::new(Config::default());
        assert_eq!(state.selection(), "movies");
        assert_eq!(
            state.dispatch(Action::Select("kickstarter".to_string())),
            Effect::Fetch("kickstarter".to_string())
        );
        assert_eq!(state.selection(), "kickstarter");
    }

    #[test]
    fn test_select_unknown_key_is_ignored() {
        let mut state = AppState::new(Config::default());
        assert_eq!(state.dispatch(Action::Select("books".to_string())), Effect::None);
        assert_eq!(state.selection(), "movies");
    }

    #[test]
    fn test_failed_load_keeps_previous_render() {
        let mut state = AppState::new(Config::default());
        let effect = state.dispatch(Action::Loaded {
            key: "movies".to_string(),
            result: Ok(movies()),
        });
        assert_eq!(effect, Effect::Render);

        state.dispatch(Action::Select("videogames".to_string()));
        let effect = state.dispatch(Action::Loaded {
            key: "videogames".to_string(),
            result: Err(DataFetchError::Malformed("truncated body".to_string())),
        });
        assert_eq!(effect, Effect::None);

        let loaded = state.loaded().unwrap();
        assert_eq!(loaded.key, "movies");
        assert_eq!(state.title(), "Top 100 Movies");

        let mut scene = Scene::new();
        assert_eq!(state.render(&mut scene, &CharWidthEstimate::default()), Some(2));
        assert_eq!(scene.legend.len(), 2);
    }

    #[test]
    fn test_last_applied_load_wins() {
        let mut state = AppState::new(Config::default());
        state.dispatch(Action::Loaded {
            key: "movies".to_string(),
            result: Ok(movies()),
        });
        let games = Node::branch("Games", vec![Node::branch("Wii", vec![Node::leaf("Wii Sports", 82.0)])]);
        state.dispatch(Action::Loaded {
            key: "videogames".to_string(),
            result: Ok(games),
        });
        assert_eq!(state.loaded().unwrap().key, "videogames");
        assert_eq!(state.description(), "Visualizing the top 100 videogames by category and value.");
    }

    #[test]
    fn test_render_before_load_draws_nothing() {
        let state = AppState::new(Config::default());
        let mut scene = Scene::new();
        assert_eq!(state.render(&mut scene, &CharWidthEstimate::default()), None);
        assert!(scene.is_empty());
    }
}
