use crate::api::ApiClient;
use crate::chat::{AdTone, ChatEntry, ChatState, EntryKind, GenerationKind, Language, PosterFormat, Role};
use crate::dictation::DictationAdapter;
use crate::event::AppEvent;
use crate::session::SessionStore;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct AdScribeApp {
    rx: Receiver<AppEvent>,
    api: ApiClient,
    sessions: Arc<SessionStore>,
    dictation: Option<DictationAdapter>,
    chat: ChatState,
    theme: Theme,
    login_visible: bool,
    login_username: String,
    login_password: String,
    login_error: Option<String>,
    login_busy: bool,
    dictation_capturing: bool,
    diagnostics_log: Vec<String>,
}

impl AdScribeApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        api: ApiClient,
        sessions: Arc<SessionStore>,
        dictation: Option<DictationAdapter>,
    ) -> Self {
        // A token persisted by a prior run skips the login surface.
        let login_visible = api.requires_auth() && !sessions.is_present();
        Self {
            rx,
            api,
            sessions,
            dictation,
            chat: ChatState::new(),
            theme: Theme::default(),
            login_visible,
            login_username: String::new(),
            login_password: String::new(),
            login_error: None,
            login_busy: false,
            dictation_capturing: false,
            diagnostics_log: Vec::new(),
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, Some(ctx)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: Option<&egui::Context>) {
        match event {
            AppEvent::LoginSucceeded => {
                self.login_busy = false;
                self.login_visible = false;
                self.login_error = None;
                self.login_password.clear();
                self.log_diagnostic("logged in");
            }
            AppEvent::LoginRejected(message) => {
                self.login_busy = false;
                self.login_error = Some(format!("❌ {message}"));
            }
            AppEvent::LoginUnreachable => {
                self.login_busy = false;
                self.login_error =
                    Some("❌ Connection Error. Is the backend running?".to_string());
            }
            AppEvent::SessionExpired => {
                if self.api.requires_auth() {
                    self.login_visible = true;
                    self.login_error =
                        Some("❌ Session Expired. Please login again.".to_string());
                }
                self.log_diagnostic("session expired");
            }
            AppEvent::AnalysisFinished(result) => self.chat.analysis_finished(result),
            AppEvent::SloganFinished(result) => self.chat.slogan_finished(result),
            AppEvent::PosterFinished(result) => self.chat.poster_finished(result),
            AppEvent::DictationStarted => self.dictation_capturing = true,
            AppEvent::DictationTranscript(text) => self.chat.append_dictation(&text),
            AppEvent::DictationEnded => self.dictation_capturing = false,
            AppEvent::DictationFailed(message) => {
                self.dictation_capturing = false;
                self.log_diagnostic(format!("dictation failed: {message}"));
            }
            AppEvent::DownloadFinished(Ok(path)) => {
                self.log_diagnostic(format!("poster saved to {}", path.display()));
            }
            AppEvent::DownloadFinished(Err(message)) => {
                self.log_diagnostic(format!("poster download failed: {message}"));
                self.chat.append(ChatEntry::bot("❌ Download failed."));
            }
        }

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn render_login(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.25);
                self.theme.card_frame().show(ui, |ui| {
                    ui.set_width(320.0);
                    ui.heading("AdScribe");
                    ui.label(RichText::new("Sign in to start creating ads").color(self.theme.text_muted));
                    ui.add_space(self.theme.spacing_8);

                    ui.add(
                        egui::TextEdit::singleline(&mut self.login_username)
                            .desired_width(f32::INFINITY)
                            .hint_text("Username"),
                    );
                    ui.add(
                        egui::TextEdit::singleline(&mut self.login_password)
                            .desired_width(f32::INFINITY)
                            .password(true)
                            .hint_text("Password"),
                    );

                    if let Some(error) = &self.login_error {
                        ui.label(RichText::new(error).color(self.theme.danger));
                    }

                    // Both fields must be non-empty after trimming or no
                    // call is made at all.
                    let ready = !self.login_busy
                        && !self.login_username.trim().is_empty()
                        && !self.login_password.trim().is_empty();
                    ui.horizontal(|ui| {
                        if ui.add_enabled(ready, egui::Button::new("Login")).clicked() {
                            self.login_busy = true;
                            self.login_error = None;
                            self.api.login(
                                self.login_username.trim().to_string(),
                                self.login_password.trim().to_string(),
                            );
                        }
                        if self.login_busy {
                            ui.add(egui::Spinner::new());
                        }
                    });
                });
            });
        });
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("AdScribe");
                ui.separator();
                if !self.chat.open && ui.button("✨ Describe My Ad").clicked() {
                    self.chat.open_chat();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.api.requires_auth() && ui.button("Logout").clicked() {
                        self.sessions.clear();
                        self.login_visible = true;
                        self.login_error = None;
                        self.chat.close_chat();
                        self.log_diagnostic("logged out");
                    }
                });
            });
        });
    }

    fn render_central(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.chat.open {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.3);
                    ui.heading("Turn a photo or a few words into ad creatives");
                    ui.label(
                        RichText::new("Slogans and posters, in your language.")
                            .color(self.theme.text_muted),
                    );
                    if ui.button("✨ Describe My Ad").clicked() {
                        self.chat.open_chat();
                    }
                });
                return;
            }

            self.render_chat_header(ui);
            ui.separator();

            let form_reserve = if self.chat.form_visible() { 260.0 } else { 120.0 };
            let transcript_height = (ui.available_height() - form_reserve).max(120.0);
            self.render_transcript(ui, transcript_height);
            ui.separator();

            if self.chat.chooser_visible() {
                self.render_chooser(ui);
            }
            if self.chat.analysis_busy {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label(RichText::new("Analyzing image...").color(self.theme.text_muted));
                });
            }
            if self.chat.form_visible() {
                self.render_form(ui);
            }

            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });
    }

    fn render_chat_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Ad Studio");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖").clicked() {
                    self.chat.close_chat();
                }
            });
        });
    }

    fn render_transcript(&mut self, ui: &mut egui::Ui, height: f32) {
        let mut download_url: Option<String> = None;

        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in &self.chat.transcript {
                    let (fill, align) = match entry.role {
                        Role::User => (self.theme.user_bubble, egui::Align::Max),
                        Role::Bot => (self.theme.bot_bubble, egui::Align::Min),
                    };
                    ui.with_layout(egui::Layout::top_down(align), |ui| {
                        self.theme.bubble_frame(fill).show(ui, |ui| {
                            ui.set_max_width(ui.available_width() * 0.8);
                            match entry.kind {
                                EntryKind::Text => {
                                    ui.label(&entry.content);
                                }
                                EntryKind::Image => {
                                    ui.label("🖼 Generated poster");
                                    ui.label(
                                        RichText::new(truncate_url(&entry.content))
                                            .monospace()
                                            .color(self.theme.text_muted),
                                    );
                                    let button = egui::Button::new("⬇ Download");
                                    if ui.add(button).on_hover_text("Save the poster").clicked() {
                                        download_url = Some(entry.content.clone());
                                    }
                                }
                            }
                        });
                    });
                }

                if self.chat.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.chat.scroll_to_bottom = false;

        if let Some(url) = download_url {
            self.api.download_poster(url);
        }
    }

    fn render_chooser(&mut self, ui: &mut egui::Ui) {
        self.theme.card_frame().show(ui, |ui| {
            egui::ComboBox::from_id_salt("language_select")
                .selected_text(self.chat.language.flag_label())
                .show_ui(ui, |ui| {
                    for language in Language::ALL {
                        ui.selectable_value(
                            &mut self.chat.language,
                            language,
                            language.flag_label(),
                        );
                    }
                });

            ui.horizontal(|ui| {
                if ui.button("✍️ Enter Details").clicked() {
                    self.chat.choose_manual();
                }
                if ui.button("📸 Upload Photo").clicked() {
                    self.pick_image();
                }
            });
        });
    }

    fn pick_image(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
            .pick_file();
        // Cancelling the dialog leaves the chooser untouched.
        if let Some(path) = picked {
            if self.chat.file_picked() {
                self.api.analyze_image(path);
            }
        }
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        self.theme.card_frame().show(ui, |ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.chat.business_name)
                    .desired_width(f32::INFINITY)
                    .hint_text("Business Name"),
            );

            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("ad_tone")
                    .selected_text(self.chat.ad_tone.label())
                    .show_ui(ui, |ui| {
                        for tone in AdTone::ALL {
                            ui.selectable_value(&mut self.chat.ad_tone, tone, tone.label());
                        }
                    });
                egui::ComboBox::from_id_salt("poster_format")
                    .selected_text(self.chat.format.label())
                    .show_ui(ui, |ui| {
                        for format in PosterFormat::ALL {
                            ui.selectable_value(&mut self.chat.format, format, format.label());
                        }
                    });
            });

            let hint = if self.dictation_capturing {
                "Listening... Speak now!"
            } else {
                "Describe product details..."
            };
            ui.add(
                egui::TextEdit::multiline(&mut self.chat.product_description)
                    .desired_width(f32::INFINITY)
                    .desired_rows(3)
                    .hint_text(hint),
            );

            if let Some(adapter) = &self.dictation {
                let label = if self.dictation_capturing {
                    "🎙 Stop"
                } else {
                    "🎙 Speak"
                };
                if ui.button(label).clicked() {
                    adapter.toggle(self.chat.language);
                }
            }

            if let Some(notice) = &self.chat.validation_notice {
                ui.label(RichText::new(notice).color(self.theme.danger));
            }

            ui.horizontal(|ui| {
                let slogan_clicked = ui
                    .add_enabled(!self.chat.slogan_busy, egui::Button::new("📝 Slogan"))
                    .clicked();
                if self.chat.slogan_busy {
                    ui.add(egui::Spinner::new());
                }
                let poster_clicked = ui
                    .add_enabled(!self.chat.poster_busy, egui::Button::new("🎬 Poster"))
                    .clicked();
                if self.chat.poster_busy {
                    ui.add(egui::Spinner::new());
                }

                if slogan_clicked {
                    if let Some(payload) = self.chat.request_generation(GenerationKind::Slogan) {
                        self.api.generate_slogan(payload);
                    }
                }
                if poster_clicked {
                    if let Some(payload) = self.chat.request_generation(GenerationKind::Poster) {
                        self.api.generate_poster(payload);
                    }
                }
            });
        });
    }
}

fn truncate_url(url: &str) -> String {
    const MAX: usize = 60;
    if url.chars().count() <= MAX {
        return url.to_string();
    }
    let head: String = url.chars().take(MAX).collect();
    format!("{head}…")
}

impl eframe::App for AdScribeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);

        // Results and dictation events arrive off-thread; keep repainting
        // while anything is outstanding so they surface promptly.
        if self.chat.analysis_busy
            || self.chat.slogan_busy
            || self.chat.poster_busy
            || self.dictation_capturing
            || self.login_busy
        {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        if self.login_visible {
            self.render_login(ctx);
            return;
        }

        self.render_top_bar(ctx);
        self.render_central(ctx);
    }
}
