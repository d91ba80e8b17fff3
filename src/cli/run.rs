//! Run command - seed the queue and drive the merge loop until shutdown

use crate::cli::RunContext;
use gh_automerge::error::{Error, Result};
use gh_automerge::merge::MergeLoop;
use gh_automerge::queue::retry_queue;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Seed `prs` into the retry queue and run the merge loop
///
/// Runs until Ctrl-C. Returns early only if the loop hits a defect.
pub async fn run_automerge(ctx: RunContext, prs: Vec<String>) -> Result<()> {
    let cancel = CancellationToken::new();
    let (sender, receiver) = retry_queue();

    info!(
        count = prs.len(),
        interval = ?ctx.config.interval,
        method = %ctx.config.method,
        "starting auto-merge"
    );

    let mut merge_loop = MergeLoop::new(
        ctx.platform,
        ctx.updater,
        ctx.config.loop_config(),
        sender.clone(),
        receiver,
    );
    let loop_cancel = cancel.clone();
    let worker = tokio::spawn(async move { merge_loop.run(&loop_cancel).await });

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl-C, shutting down");
            signal_cancel.cancel();
        }
    });

    // Each push waits for the single slot, so seeding trails the loop
    let seeding = async {
        for pr in prs {
            sender.push(pr.as_str()).await?;
            info!(pr = %pr, "queued");
        }
        Ok::<_, Error>(())
    };
    let seeded = tokio::select! {
        () = cancel.cancelled() => Ok(()),
        result = seeding => result,
    };
    if let Err(e) = &seeded {
        warn!(error = %e, "stopped seeding");
    }

    let result = worker
        .await
        .map_err(|e| Error::Internal(format!("merge loop task failed: {e}")))?;
    cancel.cancel();
    result?;
    seeded
}
