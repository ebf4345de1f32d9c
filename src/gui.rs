//! Native GUI viewer using egui
//!
//! Navbar, title, description, treemap canvas, legend and a hover tooltip.
//! Fetches run on the tokio runtime and report back over a channel; the UI
//! thread applies them in arrival order.

use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info};

use crate::color::Color;
use crate::config::Config;
use crate::layout::Point;
use crate::legend::{ITEM_WIDTH, SWATCH_SIZE};
use crate::loader;
use crate::render::{Scene, TextMeasure};
use crate::state::{Action, AppState, Effect};
use crate::tooltip::Tooltip;

const LABEL_FONT_SIZE: f32 = 12.0;

/// Run the native GUI viewer
pub fn run_viewer(config: Config, runtime: tokio::runtime::Handle) -> anyhow::Result<()> {
    let size = [
        config.canvas.width as f32 + 40.0,
        config.canvas.height as f32 + 220.0,
    ];
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_title("Treemap Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Treemap Viewer",
        options,
        Box::new(|cc| Ok(Box::new(TreemapApp::new(cc, config, runtime)))),
    ).map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

/// Measures labels with the font egui will draw them in
struct EguiMeasure<'a> {
    ctx: &'a egui::Context,
}

impl TextMeasure for EguiMeasure<'_> {
    fn text_width(&self, text: &str) -> f64 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(
                    text.to_owned(),
                    egui::FontId::proportional(LABEL_FONT_SIZE),
                    egui::Color32::WHITE,
                )
                .size()
                .x as f64
        })
    }
}

struct TreemapApp {
    state: AppState,
    scene: Scene,
    tooltip: Tooltip,
    hovered: Option<usize>,
    needs_render: bool,
    in_flight: usize,
    runtime: tokio::runtime::Handle,
    tx: Sender<Action>,
    rx: Receiver<Action>,
}

impl TreemapApp {
    fn new(cc: &eframe::CreationContext<'_>, config: Config, runtime: tokio::runtime::Handle) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let (tx, rx) = channel();
        let mut app = Self {
            state: AppState::new(config),
            scene: Scene::new(),
            tooltip: Tooltip::default(),
            hovered: None,
            needs_render: false,
            in_flight: 0,
            runtime,
            tx,
            rx,
        };

        let initial = app.state.selection().to_string();
        app.spawn_fetch(&cc.egui_ctx, initial);
        app
    }

    /// Fetch `key` in the background; the result arrives as `Action::Loaded`
    fn spawn_fetch(&mut self, ctx: &egui::Context, key: String) {
        info!("Fetching dataset '{}'", key);
        self.in_flight += 1;

        let config = self.state.config.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = loader::load(&config, &key).await;
            if tx.send(Action::Loaded { key, result }).is_err() {
                debug!("Viewer closed before fetch completed");
            }
            ctx.request_repaint();
        });
    }

    fn dispatch(&mut self, ctx: &egui::Context, action: Action) {
        match self.state.dispatch(action) {
            Effect::Fetch(key) => self.spawn_fetch(ctx, key),
            Effect::Render => self.needs_render = true,
            Effect::None => {}
        }
    }

    fn drain_completed(&mut self, ctx: &egui::Context) {
        while let Ok(action) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(ctx, action);
        }
    }

    fn rerender(&mut self, ctx: &egui::Context) {
        let measure = EguiMeasure { ctx };
        if let Some(tiles) = self.state.render(&mut self.scene, &measure) {
            debug!("Scene rebuilt with {} tiles", tiles);
        }
        self.tooltip.pointer_leave();
        self.hovered = None;
        self.needs_render = false;
    }

    fn navbar(&mut self, ui: &mut egui::Ui) {
        let mut clicked = None;
        ui.horizontal(|ui| {
            for key in self.state.config.keys() {
                let label = key.replace('-', " ");
                if ui.selectable_label(key == self.state.selection(), label).clicked() {
                    clicked = Some(key.to_string());
                }
            }
            if self.in_flight > 0 {
                ui.spinner();
            }
        });

        if let Some(key) = clicked {
            let ctx = ui.ctx().clone();
            self.dispatch(&ctx, Action::Select(key));
        }
    }

    fn treemap(&mut self, ui: &mut egui::Ui) {
        let canvas = self.state.config.canvas;
        let (response, painter) = ui.allocate_painter(
            egui::vec2(canvas.width as f32, canvas.height as f32),
            egui::Sense::hover(),
        );
        let origin = response.rect.min;
        let to_screen = |p: Point| origin + egui::vec2(p.x as f32, p.y as f32);

        for (tile, label) in self.scene.tiles.iter().zip(&self.scene.labels) {
            let rect = egui::Rect::from_min_max(
                to_screen(Point::new(tile.rect.x0, tile.rect.y0)),
                to_screen(Point::new(tile.rect.x1, tile.rect.y1)),
            );
            painter.rect_filled(rect, 0.0, to_color32(tile.color));
            painter.with_clip_rect(rect).text(
                to_screen(label.position),
                egui::Align2::LEFT_BOTTOM,
                &label.text,
                egui::FontId::proportional(LABEL_FONT_SIZE),
                egui::Color32::WHITE,
            );
        }

        self.track_hover(response.hover_pos().map(|pos| {
            let local = pos - origin;
            Point::new(local.x as f64, local.y as f64)
        }));

        if let (Some(position), lines) = (self.tooltip.position(), self.tooltip.lines()) {
            egui::Area::new(egui::Id::new("treemap_tooltip"))
                .order(egui::Order::Tooltip)
                .interactable(false)
                .fixed_pos(to_screen(position))
                .show(ui.ctx(), |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        for line in lines {
                            ui.label(line);
                        }
                    });
                });
        }
    }

    /// Drive the tooltip from the tile under the pointer
    fn track_hover(&mut self, pointer: Option<Point>) {
        let under = pointer.and_then(|p| self.scene.tile_index_at(p));
        match (under, pointer) {
            (Some(index), Some(p)) if self.hovered == Some(index) => self.tooltip.pointer_move(p),
            (Some(index), Some(p)) => {
                if self.hovered.is_some() {
                    self.tooltip.pointer_leave();
                }
                self.tooltip.pointer_enter(self.scene.tiles[index].metadata.clone(), p);
                self.hovered = Some(index);
            }
            _ => {
                if self.hovered.take().is_some() {
                    self.tooltip.pointer_leave();
                }
            }
        }
    }

    fn legend(&self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            for entry in &self.scene.legend {
                ui.allocate_ui(egui::vec2(ITEM_WIDTH as f32, SWATCH_SIZE as f32), |ui| {
                    ui.horizontal(|ui| {
                        let (rect, _) = ui.allocate_exact_size(
                            egui::vec2(SWATCH_SIZE as f32, SWATCH_SIZE as f32),
                            egui::Sense::hover(),
                        );
                        ui.painter().rect_filled(rect, 0.0, to_color32(entry.color));
                        ui.label(&entry.label);
                    });
                });
            }
        });
    }
}

impl eframe::App for TreemapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_completed(ctx);
        if self.needs_render {
            self.rerender(ctx);
        }

        egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
            self.navbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.state.title());
            ui.label(self.state.description());
            if let Some(loaded) = self.state.loaded() {
                ui.small(format!(
                    "{} categories, {} items",
                    loaded.categories.len(),
                    loaded.root.leaf_count()
                ));
            }
            ui.add_space(8.0);
            if self.scene.is_empty() && self.in_flight > 0 {
                ui.label("Loading...");
            }
            self.treemap(ui);
            ui.add_space(8.0);
            self.legend(ui);
        });
    }
}

fn to_color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}
