// Apply command: advance a persisted instance of the demo flow

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use stepflow::StepFlow;
use tracing::info;

use crate::demo::DemoContext;
use crate::document::StateDocument;
use crate::output::{print_field, OutputFormat};

pub struct RunOptions<'a> {
    pub state_file: &'a Path,
    pub follow: bool,
    pub interval: Duration,
    pub max_calls: usize,
}

pub async fn run(
    flow: &StepFlow<DemoContext>,
    output: OutputFormat,
    quiet: bool,
    options: RunOptions<'_>,
) -> Result<()> {
    let mut doc = StateDocument::load(options.state_file).await?;
    let mut calls = 0;

    while !flow.is_completed(&doc.state) && calls < options.max_calls {
        if calls > 0 {
            tokio::time::sleep(options.interval).await;
        }
        calls += 1;

        let ctx = DemoContext::new(doc.data.clone());
        let result = flow.apply(&ctx, &doc.state).await;

        // Callables may have touched the data even when the step failed
        doc.data = ctx.snapshot().await;
        let applied = result.map(|state| doc.state = state);
        doc.save(options.state_file).await?;
        applied.with_context(|| format!("Apply failed at state {}", doc.state))?;

        info!(call = calls, state = %doc.state, "applied");
        if output.is_text() && !quiet {
            print_field("State", &doc.state.to_string());
        }

        if !options.follow {
            break;
        }
    }

    let completed = flow.is_completed(&doc.state);
    if output.is_text() {
        if completed {
            println!("Flow {} completed", flow.scope());
        } else if !quiet {
            println!("Flow {} in progress, run again to continue", flow.scope());
        }
    } else {
        output.print_value(&serde_json::json!({
            "flow": flow.scope().path(),
            "calls": calls,
            "state": doc.state,
            "completed": completed,
            "data": doc.data,
        }))?;
    }

    Ok(())
}
