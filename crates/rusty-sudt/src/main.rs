//! rusty-sudt: a CKB sUDT wallet demo GUI

use eframe::egui;

mod app;
mod state;
mod ui;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("starting rusty-sudt");

    let config = rusty_sudt_chain_adapters::AdapterConfig::from_env()?;
    let chain = app::ChainContext::from_config(&config)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("rusty-sudt")
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "rusty-sudt",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, chain)))),
    )
    .map_err(|e| eyre::eyre!("{e}"))
}
