//! `wlcpoll run`: poll on a fixed interval until Ctrl-C.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wlcpoll_core::{Pipeline, PollSummary, Poller};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let poller_config = config::resolve_poller_config(global)?;
    let database = poller_config.database.clone();
    let interval = poller_config.interval;

    let pipeline = super::blocking(move || Pipeline::connect(&poller_config))
        .await
        .map_err(|e| e.with_database(&database))?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), on_signal));

    let summary = Poller::new(pipeline, interval).run(cancel).await;

    let color = output::should_color(global.color);
    let rendered = output::render_single(global.output, &summary, |s| detail(s, color))?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Cancel polling once `interrupt` fires. A listener that cannot be
/// installed leaves polling running.
async fn cancel_on_interrupt<F>(interrupt: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match interrupt.await {
        Ok(()) => {
            info!("interrupt received, finishing current cycle");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "could not listen for Ctrl-C, stop the process another way"),
    }
}

fn detail(summary: &PollSummary, color: bool) -> String {
    let mut lines = vec![
        output::heading("Poller stopped", color),
        format!("  Ticks:          {}", summary.ticks),
        format!("  Cycles:         {}", summary.cycles_started),
        format!("  Succeeded:      {}", summary.cycles_succeeded),
        format!(
            "  Failed:         {}",
            output::count_status(usize::try_from(summary.cycles_failed).unwrap_or(usize::MAX), color)
        ),
        format!("  Ticks skipped:  {}", summary.ticks_skipped),
    ];
    if let Some(ref last) = summary.last_cycle {
        lines.push(format!("  Last snapshot:  {}", last.snapshot_time.to_rfc3339()));
    }
    lines.join("\n")
}
