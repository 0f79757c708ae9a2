//! Status polling for remote tasks.
//!
//! [`poll_task`] is provider-agnostic: it repeatedly runs a status check until
//! the check reports a terminal state or the attempt budget runs out.
//! [`interpret_status`] maps the provider's task payload onto [`PollState`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info};
use vidforge_common::{TaskId, TaskStatus};

use super::error::{Result, VideoError};
use super::types::PollState;

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Pause before each status check.
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// Task payload returned by both the submit and the status endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<TaskOutput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOutput {
    #[serde(default)]
    pub url: Option<String>,
}

impl TaskResponse {
    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
            .as_deref()
            .map(TaskId::from)
            .filter(|id| !id.is_empty())
    }

    /// URL of the first result, if any.
    pub fn video_url(&self) -> Option<&str> {
        self.results
            .as_deref()
            .and_then(|r| r.first())
            .and_then(|r| r.url.as_deref())
            .filter(|u| !u.is_empty())
    }

    pub fn error_message(&self) -> &str {
        self.error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown error")
    }
}

/// Task ids come back as strings or bare numbers depending on the endpoint.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Map a provider task payload to a poll result.
///
/// Unrecognized status strings are an error rather than a pending state, so a
/// provider-side API change cannot keep the loop spinning.
pub fn interpret_status(response: &TaskResponse) -> Result<PollState> {
    let status: TaskStatus = response
        .status
        .parse()
        .map_err(|_| VideoError::UnknownStatus(response.status.clone()))?;

    Ok(match status {
        TaskStatus::Succeeded => match response.video_url() {
            Some(url) => PollState::Completed {
                video_url: url.to_string(),
            },
            None => PollState::Failed {
                message: "task succeeded but returned no video url".to_string(),
            },
        },
        TaskStatus::Failed => PollState::Failed {
            message: format!("task failed: {}", response.error_message()),
        },
        TaskStatus::Queued | TaskStatus::Running => PollState::Pending,
    })
}

/// Run `check` until it reports a terminal state.
///
/// Sleeps `options.interval` before every check. `check` receives the
/// 1-based attempt number. Errors from `check` end polling immediately.
pub async fn poll_task<F, Fut>(options: &PollOptions, mut check: F) -> Result<String>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollState>>,
{
    for attempt in 1..=options.max_attempts {
        tokio::time::sleep(options.interval).await;

        match check(attempt).await? {
            PollState::Completed { video_url } => {
                info!(attempt, "Task completed");
                return Ok(video_url);
            }
            PollState::Failed { message } => return Err(VideoError::TaskFailed(message)),
            PollState::Pending => {
                debug!(attempt, max_attempts = options.max_attempts, "Task still pending");
            }
        }
    }

    Err(VideoError::Timeout {
        attempts: options.max_attempts,
    })
}
