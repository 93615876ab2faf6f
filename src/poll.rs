//! Polling loops for asynchronous remote work.
//!
//! Two loops live here. [`YbaClient::await_task`] observes a task created
//! by a mutating call until it reaches a terminal condition or the wait
//! budget runs out. [`YbaClient::await_extraction`] drives the short-lived
//! package-metadata job, which reports progress through a plain `status`
//! field instead of a task handle.
//!
//! Both loops are synchronous from the caller's point of view: one fetch,
//! a fixed sleep, repeat. A transport failure mid-poll aborts the whole
//! call and is not retried.

use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use crate::client::YbaClient;
use crate::error::Error;
use crate::types::release::ExtractedMetadata;
use crate::types::task::{Task, TaskOutcome};
use crate::Result;

/// Default overall wait budget for task completion.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default sleep between task status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Per-request timeout for a single status fetch, kept short so one slow
/// response cannot consume the wait budget.
const POLL_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Overall budget for the metadata-extraction job.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Sleep between metadata-extraction fetches.
const EXTRACTION_INTERVAL: Duration = Duration::from_secs(1);

/// How long to wait for a task and how often to look.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Overall wait budget. When it elapses, the last observed snapshot is
    /// returned as [`TaskOutcome::TimedOut`].
    pub timeout: Duration,
    /// Sleep between status fetches.
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitConfig {
    /// Override the overall wait budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the sleep between fetches.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl YbaClient {
    /// Observe a submission result until its task settles or the wait
    /// budget elapses.
    ///
    /// If `wait` is `None`, or `submitted` carries no `taskUUID`, the
    /// submission is treated as already terminal and handed back unchanged
    /// as [`TaskOutcome::Immediate`]. Otherwise the task status is fetched
    /// at least once and then every `wait.interval` until the task is
    /// terminal ([`TaskOutcome::Completed`]) or the budget runs out
    /// ([`TaskOutcome::TimedOut`] with the last snapshot).
    ///
    /// A timed-out outcome is not an error: the task may still be running,
    /// or may have failed after the last fetch. Callers must inspect the
    /// snapshot to tell.
    pub async fn await_task(
        &self,
        submitted: Value,
        wait: Option<&WaitConfig>,
    ) -> Result<TaskOutcome> {
        let Some(wait) = wait else {
            return Ok(TaskOutcome::Immediate(submitted));
        };
        let Some(task_id) = submitted.get("taskUUID").and_then(Value::as_str) else {
            return Ok(TaskOutcome::Immediate(submitted));
        };

        let endpoint = self.customer_path(&format!("tasks/{task_id}"));
        let start = Instant::now();
        debug!(task_id, timeout = ?wait.timeout, "waiting for task completion");

        loop {
            let doc = self
                .request(Method::GET, &endpoint, None, &[], Some(POLL_REQUEST_TIMEOUT))
                .await?;
            let task: Task = serde_json::from_value(doc.clone())
                .map_err(|_| Error::protocol("task status response is malformed", doc))?;

            if task.is_terminal() {
                debug!(task_id, percent = task.percent, status = %task.status, "task settled");
                return Ok(TaskOutcome::Completed(task));
            }
            if start.elapsed() >= wait.timeout {
                debug!(task_id, percent = task.percent, "wait budget exhausted");
                return Ok(TaskOutcome::TimedOut(task));
            }
            sleep(wait.interval).await;
        }
    }

    /// Drive the package-metadata extraction job to completion.
    ///
    /// `initial` is the response to the job submission and must carry a
    /// `resourceUUID`; its absence is a protocol error with the raw
    /// response attached. The job is then re-fetched every second for up
    /// to 30 seconds while it has no `status` yet or reports `running`.
    /// Whatever document the loop ends on must contain a `version` field;
    /// a still-running job and a terminal-but-malformed one fail
    /// identically, with the raw document attached.
    pub(crate) async fn await_extraction(&self, initial: Value) -> Result<ExtractedMetadata> {
        let Some(job_id) = initial.get("resourceUUID").and_then(Value::as_str) else {
            return Err(Error::protocol(
                "package metadata response carries no resourceUUID",
                initial,
            ));
        };

        let endpoint = self.customer_path(&format!("ybdb_release/extract_metadata/{job_id}"));
        let start = Instant::now();
        let mut doc = initial.clone();

        while start.elapsed() < EXTRACTION_TIMEOUT && extraction_pending(&doc) {
            doc = self
                .request(Method::GET, &endpoint, None, &[], Some(POLL_REQUEST_TIMEOUT))
                .await?;
            sleep(EXTRACTION_INTERVAL).await;
        }

        if doc.get("version").is_none() {
            return Err(Error::protocol(
                "package metadata never reported a version",
                doc,
            ));
        }
        serde_json::from_value(doc.clone())
            .map_err(|_| Error::protocol("package metadata document is malformed", doc))
    }
}

/// A job with no `status` yet, or one reporting `running`, is still
/// pending; any other status is terminal.
fn extraction_pending(doc: &Value) -> bool {
    match doc.get("status") {
        None => true,
        Some(status) => status.as_str() == Some("running"),
    }
}
