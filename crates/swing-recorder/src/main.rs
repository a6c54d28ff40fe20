//! Swing-Recorder: hands-free golf swing capture driven by person detection.

mod app;
mod config;
mod error;
mod logging;
mod overlay_presenter;
mod overlay_text;
mod simulated_camera;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    overlay_presenter::OverlayPresenter,
    overlay_text::OverlayText,
    simulated_camera::SimulatedCamera,
};

use crate::config::Config;

use std::sync::{Arc, Mutex};

use swing_recorder_core::{SessionInbox, SessionRuntime};
use tracing::{error, info};

/// Application entry point.
#[tokio::main]
async fn main() {
    // Logging settings live in the config file, so the load error (if any)
    // is reported once the subscriber is installed.
    let (config, load_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_guard = logging::init(&config.logging);

    if let Some(e) = load_error {
        error!("Failed to load config: {:?}", e);
        std::process::exit(1);
    }

    let recordings_dir = match config.recordings_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to prepare recordings directory: {:?}", e);
            std::process::exit(1);
        }
    };

    let inbox = SessionInbox::default();

    let camera = match SimulatedCamera::new(inbox.sender(), recordings_dir, &config.camera) {
        Ok(camera) => camera,
        Err(e) => {
            error!("Failed to create camera: {:?}", e);
            std::process::exit(1);
        }
    };

    let (mut runtime, handle) =
        SessionRuntime::new(config.session.to_session_config(), Box::new(camera), inbox);

    let presenter = Arc::new(Mutex::new(OverlayPresenter::new(
        config.session.countdown_secs,
    )));
    let observer = Arc::clone(&presenter);
    runtime.on_phase_change(move |snapshot| {
        observer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .present(snapshot);
    });

    let runtime_task = tokio::spawn(runtime.run());

    let app = App {
        handle,
        presenter,
        capture_mode: config.session.capture_mode,
        rearm_after_stop: config.session.rearm_after_stop,
    };

    let app_result = app.run().await;

    match runtime_task.await {
        Ok(Ok(())) => info!("Session runtime stopped cleanly"),
        Ok(Err(e)) => error!(error = ?e, "Session runtime error"),
        Err(e) => error!(error = ?e, "Session runtime task panicked"),
    }

    if let Err(e) = app_result {
        error!(error = ?e, "App error");
        drop(log_guard);
        std::process::exit(1);
    }
}
