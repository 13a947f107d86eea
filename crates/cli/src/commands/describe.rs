// Transition table listing command

use anyhow::Result;
use stepflow::{FlowContext, StepFlow};

use crate::output::{print_table_header, print_table_row, OutputFormat};

pub fn run<C: FlowContext>(flow: &StepFlow<C>, output: OutputFormat) -> Result<()> {
    let rows = flow.describe();

    match output {
        OutputFormat::Mermaid => {
            print!("{}", flow.to_mermaid());
        }
        OutputFormat::Text => {
            print_table_header(&[("SOURCE", 32), ("KIND", 8), ("DESTINATION", 32), ("REASON", 26)]);

            for row in &rows {
                let source = row.source.id();
                let kind = if row.exclusive { "dynamic" } else { "static" };
                for dest in &row.destinations {
                    print_table_row(&[
                        (&source, 32),
                        (kind, 8),
                        (&dest.event.id(), 32),
                        (&dest.reason, 26),
                    ]);
                }
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            output.print_value(&serde_json::json!({
                "flow": flow.scope().path(),
                "transitions": rows,
                "total": rows.len(),
            }))?;
        }
    }

    Ok(())
}
