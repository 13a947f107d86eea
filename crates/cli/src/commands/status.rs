// Instance status command

use std::path::Path;

use anyhow::Result;
use stepflow::{FlowContext, StepFlow};

use crate::document::StateDocument;
use crate::output::{print_field, OutputFormat};

pub async fn run<C: FlowContext>(
    flow: &StepFlow<C>,
    output: OutputFormat,
    state_file: &Path,
) -> Result<()> {
    let doc = StateDocument::load(state_file).await?;
    let completed = flow.is_completed(&doc.state);

    if output.is_text() {
        let state = if doc.state.is_empty() {
            "not started".to_string()
        } else {
            doc.state.to_string()
        };
        print_field("Flow", flow.scope().path());
        print_field("State", &state);
        print_field("Completed", if completed { "yes" } else { "no" });
    } else {
        output.print_value(&serde_json::json!({
            "flow": flow.scope().path(),
            "state": doc.state,
            "completed": completed,
            "data": doc.data,
        }))?;
    }

    Ok(())
}
