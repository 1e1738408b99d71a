//! VoiceFlow desktop client
//!
//! Main entry point for the VoiceFlow application.

use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voiceflow::ui::VoiceFlowApp;
use voiceflow::{AppConfig, Orchestrator};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voiceflow=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VoiceFlow");

    let config = AppConfig::load_or_default()?;
    tracing::info!("Upload endpoint: {}", config.upload_url);

    let (orchestrator, handle) = Orchestrator::new(config)?;
    let core = orchestrator.start()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 720.0])
            .with_min_inner_size([360.0, 480.0])
            .with_drag_and_drop(true)
            .with_title("VoiceFlow"),
        ..Default::default()
    };

    eframe::run_native(
        "VoiceFlow",
        options,
        Box::new(move |cc| Ok(Box::new(VoiceFlowApp::new(cc, handle, core)))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    tracing::info!("VoiceFlow exited");
    Ok(())
}
