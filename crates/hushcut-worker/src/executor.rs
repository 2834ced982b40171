//! Tracked job execution.
//!
//! Runs a pipeline future while a ticker advances the task's reported
//! percentage. The percentage is cosmetic: it climbs on a timer, not
//! from encoder progress, and parks below the ceiling until the real
//! work finishes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use crate::error::{WorkerError, WorkerResult};
use crate::tasks::{TaskId, TaskRegistry};

/// Percentage reported as soon as the job starts.
const PROGRESS_FLOOR: u8 = 5;
/// Highest percentage the ticker may reach on its own.
const PROGRESS_CEILING: u8 = 90;
/// Step added per tick.
const PROGRESS_STEP: u8 = 2;
/// Tick period.
const TICK: Duration = Duration::from_millis(500);

/// Run `job` to completion while ticking the task's percentage.
///
/// On success the task is marked completed at 100%; on failure it is
/// marked failed with the error message recorded, and the error is
/// returned to the caller.
pub async fn run_tracked<T, E, F>(
    registry: Arc<TaskRegistry>,
    task_id: TaskId,
    job: F,
) -> WorkerResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<WorkerError>,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let ticker = tokio::spawn(tick_progress(registry.clone(), task_id.clone(), stop_rx));

    let result = job.await;

    // Stop the ticker before writing the terminal state so it cannot
    // overwrite the final percentage.
    let _ = stop_tx.send(true);
    let _ = ticker.await;

    match result {
        Ok(value) => {
            registry.mark_completed(&task_id).await;
            info!(task_id = %task_id, "Job completed");
            Ok(value)
        }
        Err(e) => {
            let e = e.into();
            registry.mark_failed(&task_id, e.to_string()).await;
            error!(task_id = %task_id, error = %e, "Job failed");
            Err(e)
        }
    }
}

async fn tick_progress(
    registry: Arc<TaskRegistry>,
    task_id: TaskId,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut percentage = PROGRESS_FLOOR;
    registry.set_percentage(&task_id, percentage).await;

    let mut interval = tokio::time::interval(TICK);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = interval.tick() => {
                if percentage < PROGRESS_CEILING {
                    percentage += PROGRESS_STEP;
                    registry.set_percentage(&task_id, percentage).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskStatus;
    use hushcut_media::MediaError;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_success_marks_completed_at_100() {
        let registry = Arc::new(TaskRegistry::new());
        let id = registry.create().await;

        let result: WorkerResult<u32> =
            run_tracked(registry.clone(), id.clone(), async { Ok::<_, WorkerError>(7) }).await;
        assert_eq!(result.unwrap(), 7);

        let task = registry.get(&id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.percentage, 100);
    }

    #[tokio::test]
    async fn test_failure_marks_failed_with_message() {
        let registry = Arc::new(TaskRegistry::new());
        let id = registry.create().await;

        let result: WorkerResult<()> = run_tracked(registry.clone(), id.clone(), async {
            Err(MediaError::FileNotFound(PathBuf::from("/gone.mp4")))
        })
        .await;
        assert!(result.is_err());

        let task = registry.get(&id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.as_deref().unwrap().contains("/gone.mp4"));
    }

    #[tokio::test]
    async fn test_ticker_reports_floor_before_completion() {
        let registry = Arc::new(TaskRegistry::new());
        let id = registry.create().await;

        let reg = registry.clone();
        let id2 = id.clone();
        let job = async move {
            // Let the ticker write its floor value before finishing
            tokio::time::sleep(Duration::from_millis(50)).await;
            let pct = reg.get(&id2).await.unwrap().percentage;
            Ok::<_, WorkerError>(pct)
        };

        let pct_during = run_tracked(registry.clone(), id.clone(), job).await.unwrap();
        assert!(pct_during >= PROGRESS_FLOOR);
        assert!(pct_during <= PROGRESS_CEILING);
        assert_eq!(registry.get(&id).await.unwrap().percentage, 100);
    }
}
