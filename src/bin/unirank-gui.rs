/*!
 * Desktop dashboard for unirank - university rankings browser
 *
 * A cross-platform desktop application providing:
 * - Year selection with ARWU, QS and THE rankings side by side
 * - Keyword search, multi-university comparison and trend charts
 * - Export of the selected year's rankings
 *
 * Platform support: Windows, macOS, Linux
 */

use anyhow::Result;
use eframe::egui;
use log::warn;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use unirank::config::{MAX_COMPARE_SLOTS, MIN_COMPARE_SLOTS};
use unirank::models::RankingSystem;
use unirank::trend::{ChartBackend, TrendChart};
use unirank::view::{Content, PanelStatus, Table};
use unirank::{Client, Dashboard, Outcome, Request, Settings, storage, viz};

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("University Rankings - unirank"),
        ..Default::default()
    };

    eframe::run_native(
        "University Rankings",
        options,
        Box::new(|cc| Ok(Box::new(RankApp::new(cc)))),
    )
}

/// Draws trend charts into an egui texture. Dropping the handle frees the texture.
struct EguiChartBackend {
    ctx: egui::Context,
    width: u32,
    height: u32,
}

impl ChartBackend for EguiChartBackend {
    type Chart = egui::TextureHandle;

    fn draw(&mut self, chart: &TrendChart) -> Result<Self::Chart> {
        let rgb = viz::render_rgb(chart, self.width, self.height)?;
        let image = egui::ColorImage::from_rgb([self.width as usize, self.height as usize], &rgb);
        Ok(self
            .ctx
            .load_texture("trend-chart", image, egui::TextureOptions::LINEAR))
    }

    fn destroy(&mut self, _chart: Self::Chart) {}
}

/// Main application state
struct RankApp {
    dash: Dashboard<EguiChartBackend>,
    api: Arc<Client>,

    // Background requests report back here, in arrival order.
    sender: mpsc::Sender<Outcome>,
    receiver: mpsc::Receiver<Outcome>,

    status_message: String,
    error_message: String,
}

impl RankApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load(None).unwrap_or_else(|err| {
            warn!("using default settings: {err:#}");
            Settings::default()
        });
        let api = Arc::new(Client::new(&settings));
        let backend = EguiChartBackend {
            ctx: cc.egui_ctx.clone(),
            width: settings.chart_width,
            height: settings.chart_height,
        };
        let (sender, receiver) = mpsc::channel();

        let mut app = Self {
            dash: Dashboard::new(settings, backend),
            api,
            sender,
            receiver,
            status_message: String::new(),
            error_message: String::new(),
        };
        let first = app.dash.initialize();
        app.dispatch(&cc.egui_ctx, first);
        app
    }

    /// Send `request` on a background thread.
    fn dispatch(&self, ctx: &egui::Context, request: Request) {
        let sender = self.sender.clone();
        let api = Arc::clone(&self.api);
        let ctx = ctx.clone();
        thread::spawn(move || {
            let outcome = request.send(api.as_ref());
            let _ = sender.send(outcome);
            ctx.request_repaint();
        });
    }

    fn check_outcomes(&mut self, ctx: &egui::Context) {
        while let Ok(outcome) = self.receiver.try_recv() {
            if let Some(next) = self.dash.apply(outcome) {
                self.dispatch(ctx, next);
            }
        }
    }

    fn export_rankings(&mut self) {
        let state = self.dash.state();
        let (Some(year), Some(snapshot)) = (state.snapshot_year(), state.snapshot()) else {
            self.error_message = "No rankings loaded yet".to_string();
            return;
        };
        let rows = storage::export_rows(snapshot, year);
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .add_filter("JSON", &["json"])
            .set_file_name(format!("rankings_{year}.csv"))
            .save_file()
        else {
            return;
        };
        match storage::save(&rows, &path) {
            Ok(()) => {
                self.status_message = format!("Saved {} rows to {}", rows.len(), path.display());
                self.error_message.clear();
            }
            Err(err) => {
                self.error_message = format!("Failed to save: {err:#}");
                self.status_message.clear();
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui, outbox: &mut Vec<Request>) {
        ui.horizontal(|ui| {
            ui.heading("University Rankings");
            ui.separator();

            ui.label("Year:");
            let years = self.dash.state().years().to_vec();
            let selected = self
                .dash
                .current_year()
                .map(|y| y.to_string())
                .unwrap_or_else(|| "…".to_string());
            egui::ComboBox::from_id_salt("year")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for y in years {
                        let is_current = self.dash.current_year() == Some(y);
                        if ui.selectable_label(is_current, y.to_string()).clicked() && !is_current {
                            outbox.extend(self.dash.select_year(&y.to_string()));
                        }
                    }
                });

            if self.dash.is_loading_rankings() {
                ui.spinner();
            }

            if ui
                .add_enabled(self.dash.state().snapshot().is_some(), egui::Button::new("Export…"))
                .clicked()
            {
                self.export_rankings();
            }
        });

        if !self.status_message.is_empty() {
            ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
        }
        if !self.error_message.is_empty() {
            ui.colored_label(egui::Color32::RED, &self.error_message);
        }
    }

    fn ranking_board(&self, ui: &mut egui::Ui) {
        ui.columns(RankingSystem::ALL.len(), |cols| {
            for (col, section) in cols.iter_mut().zip(&self.dash.board.sections) {
                col.heading(self.dash.board.title(section.system));
                match &section.content {
                    Some(content) => show_content(col, section.system.as_str(), content, None),
                    None if self.dash.is_loading_rankings() => {
                        col.spinner();
                    }
                    None => {}
                }
            }
        });
    }

    fn search_section(&mut self, ui: &mut egui::Ui, outbox: &mut Vec<Request>) {
        ui.group(|ui| {
            ui.label("Search");
            ui.horizontal(|ui| {
                let resp = ui.text_edit_singleline(&mut self.dash.search.input);
                let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Search").clicked() || enter {
                    outbox.extend(self.dash.submit_search());
                }
                if self.dash.search.panel.is_visible() && ui.button("Hide").clicked() {
                    self.dash.hide_search();
                }
                if self.dash.search.panel.status() == PanelStatus::Loading {
                    ui.spinner();
                }
            });
            if let Some(content) = self.dash.search.panel.content() {
                show_content(ui, "search", content, None);
            }
        });
    }

    fn compare_section(&mut self, ui: &mut egui::Ui, outbox: &mut Vec<Request>) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Compare");
                let count = self.dash.compare.inputs.len();
                egui::ComboBox::from_id_salt("compare-count")
                    .selected_text(format!("{count} universities"))
                    .show_ui(ui, |ui| {
                        for n in MIN_COMPARE_SLOTS..=MAX_COMPARE_SLOTS {
                            if ui.selectable_label(n == count, n.to_string()).clicked() && n != count {
                                self.dash.set_compare_count(n);
                            }
                        }
                    });
            });

            let mut clear = None;
            for (i, input) in self.dash.compare.inputs.iter_mut().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!("University {}:", i + 1));
                    ui.text_edit_singleline(input);
                    if !input.is_empty() && ui.small_button("×").clicked() {
                        clear = Some(i);
                    }
                });
            }
            if let Some(i) = clear {
                self.dash.clear_compare_input(i);
            }

            ui.horizontal(|ui| {
                if ui.button("Compare").clicked() {
                    outbox.extend(self.dash.submit_compare());
                }
                if self.dash.compare.panel.is_visible() && ui.button("Hide").clicked() {
                    self.dash.hide_compare();
                }
                if self.dash.compare.panel.status() == PanelStatus::Loading {
                    ui.spinner();
                }
            });
            if let Some(content) = self.dash.compare.panel.content() {
                show_content(ui, "compare", content, None);
            }
        });
    }

    fn trend_section(&mut self, ui: &mut egui::Ui, outbox: &mut Vec<Request>) {
        ui.group(|ui| {
            ui.label("Ranking trend");
            ui.horizontal(|ui| {
                let resp = ui.text_edit_singleline(&mut self.dash.trend.input);
                let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Show trend").clicked() || enter {
                    outbox.extend(self.dash.submit_trend());
                }
                if self.dash.trend.panel.is_visible() && ui.button("Hide").clicked() {
                    self.dash.hide_trend();
                }
                if self.dash.trend.panel.status() == PanelStatus::Loading {
                    ui.spinner();
                }
            });
            if let Some(content) = self.dash.trend.panel.content() {
                show_content(ui, "trend", content, self.dash.trend.canvas.active());
            }
        });
    }

    fn notice_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.dash.notice().map(|n| n.message.clone()) else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("notice")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.label(message);
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });
        if modal.inner || modal.should_close() {
            self.dash.take_notice();
        }
    }
}

impl eframe::App for RankApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_outcomes(ctx);

        let mut outbox = Vec::new();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            self.top_bar(ui, &mut outbox);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.ranking_board(ui);
                ui.add_space(15.0);
                self.search_section(ui, &mut outbox);
                ui.add_space(10.0);
                self.compare_section(ui, &mut outbox);
                ui.add_space(10.0);
                self.trend_section(ui, &mut outbox);
            });
        });

        self.notice_modal(ctx);

        for request in outbox {
            self.dispatch(ctx, request);
        }
    }
}

fn show_content(
    ui: &mut egui::Ui,
    id: &str,
    content: &Content,
    chart: Option<&egui::TextureHandle>,
) {
    match content {
        Content::Message(m) => {
            ui.weak(m.to_string());
        }
        Content::Table(t) => show_table(ui, id, t),
        Content::Sections(sections) => {
            for s in sections {
                ui.strong(&s.heading);
                show_table(ui, &format!("{id}-{}", s.heading), &s.table);
                ui.add_space(6.0);
            }
        }
        Content::Trend { table, .. } => {
            if let Some(texture) = chart {
                ui.add(egui::Image::from_texture(texture).shrink_to_fit());
            }
            show_table(ui, id, table);
        }
    }
}

fn show_table(ui: &mut egui::Ui, id: &str, table: &Table) {
    egui::Grid::new(id).striped(true).show(ui, |ui| {
        for h in &table.headers {
            ui.strong(h);
        }
        ui.end_row();
        for row in &table.rows {
            for cell in row {
                let label = ui.label(&cell.text);
                if let Some(flag) = &cell.flag {
                    label.on_hover_text(format!("{} ({})", flag.alt, flag.url));
                }
            }
            ui.end_row();
        }
    });
    if let Some(note) = &table.note {
        ui.small(note);
    }
}
