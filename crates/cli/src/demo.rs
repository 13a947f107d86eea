// Demo deployment workflow
//
// Exercises every item kind against a context whose data is persisted
// next to the flow state, so progress survives between invocations.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use stepflow::{StepFlow, StepFlowConfig, Steps};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Root scope name of the demo flow
pub const FLOW_NAME: &str = "deploy";

/// Ready probes needed before the instance reports ready
const READY_AFTER_CHECKS: u32 = 2;

/// Upload attempts before giving up
const MAX_UPLOAD_ATTEMPTS: u32 = 3;

/// Persisted demo data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoData {
    /// Set once provisioning ran
    pub instance: Option<String>,

    /// Ready probes so far
    pub ready_checks: u32,

    /// Upload attempts so far, failed ones included
    pub upload_attempts: u32,

    /// Attempt number on which the upload starts succeeding
    pub upload_succeeds_on: u32,

    /// Batches processed so far
    pub batches_done: u32,

    /// Batches to process before the drain loop stops
    pub batches_total: u32,

    /// Whether to send the completion notification
    pub notify: bool,

    /// Set once the notification was sent
    pub notified: bool,
}

impl Default for DemoData {
    fn default() -> Self {
        Self {
            instance: None,
            ready_checks: 0,
            upload_attempts: 0,
            upload_succeeds_on: 2,
            batches_done: 0,
            batches_total: 3,
            notify: true,
            notified: false,
        }
    }
}

/// Execution context handed to every demo callable
#[derive(Clone)]
pub struct DemoContext {
    data: Arc<Mutex<DemoData>>,
}

impl DemoContext {
    pub fn new(data: DemoData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Copy of the data as the callables left it
    pub async fn snapshot(&self) -> DemoData {
        self.data.lock().await.clone()
    }
}

/// Build the demo flow
pub fn flow(config: StepFlowConfig) -> Result<StepFlow<DemoContext>> {
    let root = Steps::new()
        .step("provision", |ctx: DemoContext| async move {
            let mut data = ctx.data.lock().await;
            let instance = format!("{}-instance", FLOW_NAME);
            info!(instance = %instance, "provisioned");
            data.instance = Some(instance);
            Ok(())
        })
        .wait_for("ready", |ctx: DemoContext| async move {
            let mut data = ctx.data.lock().await;
            data.ready_checks += 1;
            let ready = data.ready_checks >= READY_AFTER_CHECKS;
            info!(checks = data.ready_checks, ready, "probed instance");
            Ok(ready)
        })
        .retry(
            "upload",
            |ctx: DemoContext, err: &anyhow::Error| {
                let reason = err.to_string();
                async move {
                    let data = ctx.data.lock().await;
                    let retry = data.upload_attempts < MAX_UPLOAD_ATTEMPTS;
                    warn!(attempt = data.upload_attempts, error = %reason, retry, "upload failed");
                    Ok(retry)
                }
            },
            Steps::new().step("put", |ctx: DemoContext| async move {
                let mut data = ctx.data.lock().await;
                data.upload_attempts += 1;
                if data.upload_attempts < data.upload_succeeds_on {
                    bail!("connection reset during upload");
                }
                info!(attempt = data.upload_attempts, "uploaded artifact");
                Ok(())
            }),
        )
        .loop_until(
            "drain",
            |ctx: DemoContext| async move {
                let data = ctx.data.lock().await;
                Ok(data.batches_done >= data.batches_total)
            },
            Steps::new().step("batch", |ctx: DemoContext| async move {
                let mut data = ctx.data.lock().await;
                data.batches_done += 1;
                info!(batch = data.batches_done, total = data.batches_total, "processed batch");
                Ok(())
            }),
        )
        .case(
            "notify",
            |ctx: DemoContext| async move { Ok(ctx.data.lock().await.notify) },
            Steps::new().step("send", |ctx: DemoContext| async move {
                let mut data = ctx.data.lock().await;
                data.notified = true;
                info!("sent completion notification");
                Ok(())
            }),
        )
        .build(FLOW_NAME);

    Ok(StepFlow::with_config(root, config)?)
}
