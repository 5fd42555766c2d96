//! In-memory board of generation jobs polled by clients.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use super::models::DeliveryDescriptor;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub purchase_id: String,
    pub product_slug: String,
    pub state: JobState,
    pub progress: u8,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JobBoardError {
    #[error("purchase '{0}' is already being generated")]
    AlreadyInFlight(String),
    #[error("purchase '{0}' has already been generated")]
    AlreadyGenerated(String),
}

/// Tracks `queued -> running -> completed | failed` per purchase id.
///
/// Finished jobs stay readable for the retention window and are pruned
/// lazily on the next enqueue.
pub struct JobBoard {
    jobs: RwLock<HashMap<String, JobStatus>>,
    retention: Duration,
}

impl JobBoard {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Register a queued job. Only a failed job may be replaced under the
    /// same id.
    pub fn enqueue(&self, purchase_id: &str, product_slug: &str) -> Result<JobStatus, JobBoardError> {
        self.prune();

        let mut jobs = self.jobs.write();
        match jobs.get(purchase_id).map(|existing| existing.state) {
            Some(JobState::Queued | JobState::Running) => {
                return Err(JobBoardError::AlreadyInFlight(purchase_id.to_string()))
            }
            Some(JobState::Completed) => {
                return Err(JobBoardError::AlreadyGenerated(purchase_id.to_string()))
            }
            Some(JobState::Failed) | None => {}
        }

        let status = JobStatus {
            purchase_id: purchase_id.to_string(),
            product_slug: product_slug.to_string(),
            state: JobState::Queued,
            progress: 0,
            stage: "queued".to_string(),
            delivery: None,
            error: None,
            updated_at: Utc::now(),
        };
        jobs.insert(purchase_id.to_string(), status.clone());
        Ok(status)
    }

    fn update<F: FnOnce(&mut JobStatus)>(&self, purchase_id: &str, apply: F) {
        let mut jobs = self.jobs.write();
        match jobs.get_mut(purchase_id) {
            Some(status) => {
                apply(status);
                status.updated_at = Utc::now();
            }
            None => log::warn!("Job board has no entry for purchase {}", purchase_id),
        }
    }

    pub fn mark_running(&self, purchase_id: &str) {
        self.update(purchase_id, |status| {
            status.state = JobState::Running;
            status.stage = "running".to_string();
        });
    }

    /// Record a progress checkpoint. Progress never moves backwards.
    pub fn record_progress(&self, purchase_id: &str, progress: u8, stage: &str) {
        self.update(purchase_id, |status| {
            if status.state.is_finished() {
                return;
            }
            status.state = JobState::Running;
            status.progress = status.progress.max(progress.min(100));
            status.stage = stage.to_string();
        });
    }

    pub fn complete(&self, purchase_id: &str, delivery: DeliveryDescriptor) {
        self.update(purchase_id, |status| {
            status.state = JobState::Completed;
            status.progress = 100;
            status.stage = "completed".to_string();
            status.delivery = Some(delivery);
        });
    }

    pub fn fail(&self, purchase_id: &str, error: String) {
        self.update(purchase_id, |status| {
            status.state = JobState::Failed;
            status.stage = "failed".to_string();
            status.error = Some(error);
        });
    }

    pub fn get(&self, purchase_id: &str) -> Option<JobStatus> {
        self.jobs.read().get(purchase_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop finished jobs older than the retention window.
    pub fn prune(&self) -> usize {
        let retention = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::days(3650));
        let cutoff = Utc::now() - retention;

        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, status| !(status.state.is_finished() && status.updated_at < cutoff));
        let removed = before - jobs.len();
        if removed > 0 {
            log::debug!("Pruned {} finished jobs", removed);
        }
        removed
    }
}

/// Marks its job failed when dropped while still armed, so a generation
/// task that panics never leaves the job stuck in `running`.
pub struct JobGuard {
    jobs: Arc<JobBoard>,
    purchase_id: String,
    armed: bool,
}

impl JobGuard {
    pub fn new(jobs: Arc<JobBoard>, purchase_id: &str) -> Self {
        Self {
            jobs,
            purchase_id: purchase_id.to_string(),
            armed: true,
        }
    }

    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        if self.armed {
            log::error!("Generation job {} aborted", self.purchase_id);
            self.jobs
                .fail(&self.purchase_id, "generation aborted unexpectedly".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(id: &str) -> DeliveryDescriptor {
        DeliveryDescriptor {
            purchase_id: id.to_string(),
            files: Vec::new(),
            delivery_url: format!("/delivery/{id}?token=demo"),
            meta_path: format!("/generated/purchases/{id}/meta.json"),
        }
    }

    #[test]
    fn test_lifecycle() {
        let board = JobBoard::new(Duration::from_secs(60));
        let queued = board.enqueue("p1", "career-pay-blueprint").unwrap();
        assert_eq!(queued.state, JobState::Queued);

        board.mark_running("p1");
        board.record_progress("p1", 45, "rendering");
        board.record_progress("p1", 30, "late");
        let running = board.get("p1").unwrap();
        assert_eq!(running.state, JobState::Running);
        assert_eq!(running.progress, 45);
        assert_eq!(running.stage, "late");

        board.complete("p1", delivery("p1"));
        let done = board.get("p1").unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.progress, 100);
        assert!(done.delivery.is_some());
    }

    #[test]
    fn test_in_flight_duplicates_are_rejected() {
        let board = JobBoard::new(Duration::from_secs(60));
        board.enqueue("p1", "x").unwrap();
        assert_eq!(
            board.enqueue("p1", "x").unwrap_err(),
            JobBoardError::AlreadyInFlight("p1".to_string())
        );

        board.fail("p1", "disk full".to_string());
        assert!(board.enqueue("p1", "x").is_ok());
    }

    #[test]
    fn test_completed_job_is_not_replaced() {
        let board = JobBoard::new(Duration::from_secs(60));
        board.enqueue("p1", "x").unwrap();
        board.complete("p1", delivery("p1"));

        assert_eq!(
            board.enqueue("p1", "y").unwrap_err(),
            JobBoardError::AlreadyGenerated("p1".to_string())
        );
        assert_eq!(board.get("p1").unwrap().product_slug, "x");
    }

    #[test]
    fn test_failure_is_terminal() {
        let board = JobBoard::new(Duration::from_secs(60));
        board.enqueue("p1", "x").unwrap();
        board.fail("p1", "boom".to_string());
        board.record_progress("p1", 90, "bundling");

        let status = board.get("p1").unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_prune_drops_only_finished_jobs() {
        let board = JobBoard::new(Duration::ZERO);
        board.enqueue("done", "x").unwrap();
        board.enqueue("busy", "x").unwrap();
        board.complete("done", delivery("done"));
        std::thread::sleep(std::time::Duration::from_millis(5));

        assert_eq!(board.prune(), 1);
        assert!(board.get("done").is_none());
        assert!(board.get("busy").is_some());
    }

    #[test]
    fn test_guard_fails_job_on_panic() {
        let board = Arc::new(JobBoard::new(Duration::from_secs(60)));
        board.enqueue("p1", "x").unwrap();
        board.mark_running("p1");

        let jobs = board.clone();
        let result = std::thread::spawn(move || {
            let _guard = JobGuard::new(jobs, "p1");
            panic!("renderer blew up");
        })
        .join();
        assert!(result.is_err());

        let status = board.get("p1").unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert!(status.error.unwrap().contains("aborted"));
    }

    #[test]
    fn test_disarmed_guard_leaves_job_alone() {
        let board = Arc::new(JobBoard::new(Duration::from_secs(60)));
        board.enqueue("p1", "x").unwrap();
        board.complete("p1", delivery("p1"));

        JobGuard::new(board.clone(), "p1").disarm();
        assert_eq!(board.get("p1").unwrap().state, JobState::Completed);
    }

    #[test]
    fn test_json_state_is_lowercase() {
        let json = serde_json::to_value(JobState::Completed).unwrap();
        assert_eq!(json, "completed");
    }
}
