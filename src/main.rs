//! gh-automerge binary

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, RunContext, init_tracing, run_automerge};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose, args.log_json);

    let ctx = RunContext::new(&args)
        .await
        .context("failed to start gh-automerge")?;

    run_automerge(ctx, args.prs).await?;
    Ok(())
}
