mod api;
mod app;
mod chat;
mod config;
mod dictation;
mod event;
mod session;
mod theme;

use api::ApiClient;
use app::AdScribeApp;
use dictation::DictationAdapter;
use eframe::egui;
use session::SessionStore;
use std::sync::{mpsc, Arc};
use theme::Theme;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load();
    log::info!("using generation service at {}", config.api_base_url);

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("adscribe-runtime")
        .build()?;

    let sessions = Arc::new(SessionStore::open_default());
    if sessions.is_present() {
        log::info!("restored session token from a previous run");
    }

    let (api, dictation) = runtime.block_on(async {
        let api = ApiClient::new(&config, Arc::clone(&sessions), tx.clone())?;
        let dictation = DictationAdapter::detect(&config, tx.clone());
        Ok::<_, tokio::runtime::TryCurrentError>((api, dictation))
    })?;

    let app = AdScribeApp::new(rx, api, Arc::clone(&sessions), dictation);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1080.0, 760.0])
            .with_min_inner_size([860.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AdScribe",
        native_options,
        Box::new(move |creation_context| {
            Theme::default().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
