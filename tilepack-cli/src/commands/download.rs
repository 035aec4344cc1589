//! Download an offline pack for the demo viewport.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use tilepack::controller::{ControllerError, ControllerState};
use tilepack::store::MemoryStore;

use crate::commands::{build_controller, demo_simulation, demo_view};
use crate::error::CliError;

/// Arguments for `tilepack download`.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Camera zoom to capture the viewport at
    #[arg(long, default_value_t = 13.0)]
    pub zoom: f64,
}

/// Run `tilepack download`.
///
/// Starts a simulated download of the demo viewport, renders its progress,
/// and tears the pack down again if the user presses Ctrl+C.
pub async fn run(args: DownloadArgs) -> Result<(), CliError> {
    let store = Arc::new(MemoryStore::with_simulation(demo_simulation()));
    let view = demo_view(args.zoom);
    let controller = build_controller(store.clone(), view)?;

    let packs = controller.map_finished_loading().await?;
    if !packs.is_empty() {
        println!("{} pack(s) already cached", packs.len());
    }

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = cancel_tx.send(true);
    })
    .map_err(|e| CliError::Runtime(format!("could not install Ctrl+C handler: {}", e)))?;

    controller.toggle().await?;
    debug!(zoom = args.zoom, "demo download started");
    println!(
        "Downloading viewport at zoom {} (Ctrl+C cancels)",
        args.zoom
    );

    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::default_bar());

    let mut canceled = false;
    loop {
        if *cancel_rx.borrow() && !canceled && controller.state() == ControllerState::Downloading {
            canceled = true;
            bar.println("canceling...");
            // The download may finish in the same instant; a rejected
            // cancel just means there is nothing left to tear down.
            if let Err(e) = controller.cancel_active().await {
                if !matches!(e, ControllerError::InvalidTransition { .. }) {
                    return Err(e.into());
                }
            }
        }

        let control = controller.control_state();
        bar.set_position(control.progress_percent as u64);

        if controller.state() == ControllerState::Idle {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    bar.finish_and_clear();

    if store.region_count() > 0 {
        println!("{} offline pack cached", style("✓").green());
    } else {
        println!("download canceled, pack removed");
    }
    Ok(())
}
