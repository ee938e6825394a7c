//! It Works Locally window: egui/eframe application.
//!
//! # Architecture
//!
//! [`ItWorksLocallyApp`] is the top-level [`eframe::App`].  It owns the form
//! inputs and two links to the controller:
//!
//! * `state`: [`SharedState`] snapshot read once per frame.
//! * `command_tx`: sends [`ControllerCommand`]s to the
//!   [`AnalysisController`](crate::pipeline::AnalysisController).
//!
//! # Layout
//!
//! | Section | Shown when |
//! |---------|------------|
//! | Form (error, local / prod env, expertise, Analyze) | always |
//! | Spinner + rotating message | `is_loading` |
//! | Error banner | `error` is set |
//! | Results (TL;DR, tags, root cause, steps, tips, Listen) | `result` is set |

use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::analysis::{AnalysisRequest, AnalysisResult, ExpertiseLevel, Severity};
use crate::config::AppConfig;
use crate::pipeline::{lock_state, ControllerCommand, LifecycleState, SharedState};

const ERROR_HINT: &str = "// Paste your error message or code here
TypeError: Cannot read property 'undefined' of undefined
    at Object.<anonymous> (/app/src/index.js:42:13)";

const LOCAL_HINT: &str = "NODE_ENV=development
Node: v18.17.0
OS: macOS 14.0";

const PROD_HINT: &str = "NODE_ENV=production
Node: v16.14.0
OS: Linux (Ubuntu 22.04)";

/// How long the "copied" tick stays on a fix step.
const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

const ACCENT: egui::Color32 = egui::Color32::from_rgb(139, 92, 246);
const SUCCESS: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
const DANGER: egui::Color32 = egui::Color32::from_rgb(255, 99, 99);
const MUTED: egui::Color32 = egui::Color32::from_rgb(160, 160, 160);

// ---------------------------------------------------------------------------
// ItWorksLocallyApp
// ---------------------------------------------------------------------------

pub struct ItWorksLocallyApp {
    // ── Form ─────────────────────────────────────────────────────────────
    pub error_text: String,
    pub local_env: String,
    pub prod_env: String,
    pub expertise: ExpertiseLevel,

    /// Fix step index last copied, and when.
    copied: Option<(usize, Instant)>,

    // ── Controller link ──────────────────────────────────────────────────
    state: SharedState,
    command_tx: mpsc::Sender<ControllerCommand>,

    pub config: AppConfig,
}

impl ItWorksLocallyApp {
    pub fn new(
        state: SharedState,
        command_tx: mpsc::Sender<ControllerCommand>,
        config: AppConfig,
    ) -> Self {
        Self {
            error_text: String::new(),
            local_env: String::new(),
            prod_env: String::new(),
            expertise: config.ui.default_expertise,
            copied: None,
            state,
            command_tx,
            config,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────

    fn send(&self, command: ControllerCommand) {
        if let Err(e) = self.command_tx.try_send(command) {
            log::warn!("ui: command not delivered: {e}");
        }
    }

    /// The current form contents as a request.
    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest::new(
            self.error_text.clone(),
            self.local_env.clone(),
            self.prod_env.clone(),
            self.expertise,
        )
    }

    /// Analyze is offered only when idle and the error text is not blank.
    pub fn can_submit(&self, is_loading: bool) -> bool {
        !is_loading && !self.error_text.trim().is_empty()
    }

    pub fn submit(&self) {
        self.send(ControllerCommand::Analyze(self.request()));
    }

    pub fn toggle_audio(&self) {
        self.send(ControllerCommand::ToggleAudio);
    }

    /// Clear the form and ask the controller to start over.
    pub fn start_over(&mut self) {
        self.error_text.clear();
        self.local_env.clear();
        self.prod_env.clear();
        self.expertise = self.config.ui.default_expertise;
        self.copied = None;
        self.send(ControllerCommand::Reset);
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("It Works Locally")
                    .color(ACCENT)
                    .strong()
                    .size(22.0),
            );
            ui.label(
                egui::RichText::new("¯\\_(ツ)_/¯  figure out why prod disagrees")
                    .color(MUTED)
                    .size(13.0),
            );
        });
        ui.add_space(6.0);
    }

    fn draw_form(&mut self, ui: &mut egui::Ui, is_loading: bool) {
        ui.label(egui::RichText::new("Error or Code Snippet").monospace().color(MUTED));
        ui.add(
            egui::TextEdit::multiline(&mut self.error_text)
                .hint_text(ERROR_HINT)
                .code_editor()
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(8.0);
        ui.columns(2, |cols| {
            env_input(
                &mut cols[0],
                "Local Environment",
                "(works here)",
                SUCCESS,
                &mut self.local_env,
                LOCAL_HINT,
            );
            env_input(
                &mut cols[1],
                "Production Environment",
                "(breaks here)",
                DANGER,
                &mut self.prod_env,
                PROD_HINT,
            );
        });

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Explain like I'm a:").monospace().color(MUTED));
        ui.horizontal_wrapped(|ui| {
            for level in ExpertiseLevel::ALL {
                if ui
                    .selectable_label(self.expertise == level, level.label())
                    .clicked()
                {
                    self.expertise = level;
                }
            }
        });

        ui.add_space(10.0);
        let label = if is_loading { "Analyzing..." } else { "Analyze" };
        let button = egui::Button::new(egui::RichText::new(label).strong().size(16.0))
            .min_size(egui::vec2(ui.available_width(), 36.0));
        if ui.add_enabled(self.can_submit(is_loading), button).clicked() {
            self.submit();
        }
    }

    fn draw_loading(&self, ui: &mut egui::Ui, message: &str) {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.add(egui::Spinner::new().color(ACCENT));
            ui.label(egui::RichText::new(message).monospace().color(ACCENT));
        });
    }

    fn draw_error(&self, ui: &mut egui::Ui, message: &str) {
        ui.add_space(12.0);
        egui::Frame::new()
            .fill(egui::Color32::from_rgba_premultiplied(80, 20, 20, 200))
            .stroke(egui::Stroke::new(1.0, DANGER))
            .corner_radius(egui::CornerRadius::same(6))
            .inner_margin(egui::Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(format!("! {message}"))
                        .monospace()
                        .color(DANGER),
                );
            });
    }

    fn draw_results(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        result: &AnalysisResult,
        is_playing: bool,
    ) {
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Analysis Results")
                    .color(ACCENT)
                    .strong()
                    .size(18.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Start over").clicked() {
                    self.start_over();
                }
                let listen = if is_playing {
                    "Stop"
                } else {
                    "Listen to explanation"
                };
                if ui.button(listen).clicked() {
                    self.toggle_audio();
                }
            });
        });

        if let Some(tldr) = &result.tldr {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(format!("TL;DR: {tldr}")).italics().size(14.0));
        }

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            if let Some(category) = result.category {
                tag(ui, category.name(), ACCENT);
            }
            if let Some(severity) = result.severity {
                tag(ui, severity.name(), severity_color(severity));
            }
            if let Some(time) = &result.estimated_fix_time {
                tag(ui, &format!("~{time}"), MUTED);
            }
        });

        card(ui, "What went wrong", DANGER, |ui| {
            ui.label(&result.root_cause);
        });

        card(ui, "How to fix it", SUCCESS, |ui| {
            for (index, step) in result.fix_steps.iter().enumerate() {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(format!("{}.", index + 1)).strong().color(ACCENT));
                    ui.label(egui::RichText::new(step).monospace());

                    let copied = matches!(self.copied, Some((i, at))
                        if i == index && at.elapsed() < COPIED_FEEDBACK);
                    let icon = if copied { "copied" } else { "copy" };
                    if ui.small_button(icon).clicked() {
                        ctx.copy_text(step.clone());
                        self.copied = Some((index, Instant::now()));
                    }
                });
            }
        });

        card(ui, "Prevention tips", ACCENT, |ui| {
            for tip in &result.prevention_tips {
                ui.label(format!("→ {tip}"));
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn env_input(
    ui: &mut egui::Ui,
    title: &str,
    note: &str,
    color: egui::Color32,
    text: &mut String,
    hint: &str,
) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(title).monospace().color(MUTED));
        ui.label(egui::RichText::new(note).small().color(color));
    });
    ui.add(
        egui::TextEdit::multiline(text)
            .hint_text(hint)
            .code_editor()
            .desired_rows(5)
            .desired_width(f32::INFINITY),
    );
}

fn tag(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    egui::Frame::new()
        .stroke(egui::Stroke::new(1.0, color))
        .corner_radius(egui::CornerRadius::same(10))
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).small().color(color));
        });
}

fn card(ui: &mut egui::Ui, title: &str, color: egui::Color32, body: impl FnOnce(&mut egui::Ui)) {
    ui.add_space(10.0);
    egui::Frame::group(ui.style())
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(title).strong().size(15.0).color(color));
            ui.add_space(4.0);
            body(ui);
        });
}

fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Low => SUCCESS,
        Severity::Medium => egui::Color32::from_rgb(240, 200, 80),
        Severity::High => egui::Color32::from_rgb(255, 136, 68),
        Severity::Critical => DANGER,
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ItWorksLocallyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot: LifecycleState = lock_state(&self.state).clone();

        // The controller writes from other threads; keep polling while busy.
        if snapshot.is_loading() || snapshot.is_playing {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if self.copied.is_some() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.draw_header(ui);
                    ui.separator();
                    self.draw_form(ui, snapshot.is_loading());

                    if snapshot.is_loading() {
                        self.draw_loading(ui, &snapshot.loading_message);
                    }
                    if let Some(error) = &snapshot.error {
                        self.draw_error(ui, error);
                    }
                    if let Some(result) = &snapshot.result {
                        self.draw_results(ui, ctx, result, snapshot.is_playing);
                    }
                });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("It Works Locally window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
