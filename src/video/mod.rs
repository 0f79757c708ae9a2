//! Video generation adapter.
//!
//! Validates a [`VideoConfig`], uploads a reference image when there is one,
//! submits the job to the provider, and polls until the provider reports a
//! terminal state.
//!
//! ```no_run
//! use vidforge::config::Config;
//! use vidforge::video::{create_provider, VideoConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider = create_provider(&Config::default());
//! let result = provider
//!     .generate(&VideoConfig::new("a koi pond in autumn rain", "sora-2"))
//!     .await?;
//! println!("{}", result.video_url);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod poll;
pub mod runninghub;
pub mod types;
pub mod validate;

pub use error::{Result, VideoError};
pub use poll::{interpret_status, poll_task, PollOptions};
pub use runninghub::{Endpoints, RunningHubProvider};
pub use types::*;
pub use validate::{find_model, validate_video_config, ModelSpec, SubmissionPlan, MODELS};

use std::time::Instant;

use async_trait::async_trait;
use vidforge_common::TaskId;

use crate::config::Config;

/// A remote video generation service.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    fn poll_options(&self) -> PollOptions;

    /// Validate and submit a job. Uploads the reference image first when the
    /// request has one.
    async fn submit(&self, input: &VideoConfig) -> Result<Submission>;

    /// Check a task's status once.
    async fn query(&self, task_id: &TaskId) -> Result<PollState>;

    /// Poll `task_id` until it completes, fails, or runs out of attempts.
    async fn wait_for_completion(&self, task_id: &TaskId) -> Result<String> {
        let options = self.poll_options();
        poll_task(&options, |attempt| {
            tracing::debug!(provider = self.name(), task_id = %task_id, attempt, "Checking task status");
            self.query(task_id)
        })
        .await
    }

    /// Submit a job and wait for its result.
    async fn generate(&self, input: &VideoConfig) -> Result<GenerationResult> {
        let started = Instant::now();

        let (task_id, video_url) = match self.submit(input).await? {
            Submission::Completed { task_id, video_url } => (task_id, video_url),
            Submission::Pending { task_id } => {
                let video_url = self.wait_for_completion(&task_id).await?;
                (Some(task_id), video_url)
            }
        };

        Ok(GenerationResult {
            task_id,
            video_url,
            elapsed: started.elapsed(),
        })
    }
}

/// Create the configured provider.
pub fn create_provider(config: &Config) -> Box<dyn VideoProvider> {
    Box::new(RunningHubProvider::new(config))
}
