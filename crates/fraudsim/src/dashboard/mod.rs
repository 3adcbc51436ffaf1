//! Terminal dashboard (`fraudsim dashboard`).
//!
//! Four tabs: editable inputs, KPI results with the loss histogram, the tornado
//! chart and the threshold curve. Analyses run on a background worker thread so
//! the UI stays responsive and runs can be cancelled.

pub mod app;
pub mod components;
pub mod screens;
pub mod state;
pub mod worker;

pub use app::App;

use fraudsim_core::SimConfig;

/// Run the dashboard until the user quits
pub fn run(config: SimConfig) -> color_eyre::Result<()> {
    let mut app = App::new(config);

    ratatui::run(|terminal| app.run(terminal))?;

    tracing::info!("Dashboard shutting down");

    if let Err(err) = ratatui::try_restore() {
        tracing::error!("Failed to restore terminal: {err}");
    }

    Ok(())
}
