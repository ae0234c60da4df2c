//! # Worker Pool Module
//!
//! Dispatcher fork-join con concorrenza limitata.
//!
//! ## Funzionamento:
//! - Avvia `min(N, k)` worker sul runtime multi-thread di tokio
//! - Ogni worker preleva un `FileTask` alla volta da una coda condivisa
//! - Prima di eseguire il task acquisisce un permesso dal `Semaphore` (N permessi)
//! - Il permesso viene rilasciato sempre, anche in caso di errore o panic
//! - Un fallimento NON cancella gli altri task: la coda viene svuotata comunque
//! - `run()` ritorna solo dopo il join di tutti i worker
//!
//! ## Esito:
//! `RunOutcome` contiene tutti i risultati e tutti i fallimenti per-task;
//! `into_result()` lo trasforma in errore aggregato se c'è almeno un fallimento.

use crate::{
    error::{FailedTasks, OptimizeError, TaskFailure},
    file_manager::FileTask,
};
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, error};

/// Everything a run produced: one entry per dispatched task
#[derive(Debug)]
pub struct RunOutcome<T> {
    pub results: Vec<T>,
    pub failures: Vec<TaskFailure>,
}

impl<T> RunOutcome<T> {
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Plain success, or the aggregate of every per-task failure
    pub fn into_result(self) -> Result<Vec<T>, OptimizeError> {
        if self.failures.is_empty() {
            Ok(self.results)
        } else {
            Err(OptimizeError::TasksFailed(FailedTasks {
                failures: self.failures,
            }))
        }
    }
}

/// Bounded fork-join dispatcher
pub struct WorkerPool {
    max_concurrency: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(max_concurrency: usize) -> Result<Self, OptimizeError> {
        if max_concurrency == 0 {
            return Err(OptimizeError::Validation(
                "Worker pool needs at least one worker".to_string(),
            ));
        }

        Ok(Self {
            max_concurrency,
            permits: Arc::new(Semaphore::new(max_concurrency)),
        })
    }

    /// Run `per_task` over every task, at most `max_concurrency` at a time,
    /// and wait until all of them have finished.
    pub async fn run<T, F, Fut>(&self, tasks: Vec<FileTask>, per_task: F) -> RunOutcome<T>
    where
        T: Send + 'static,
        F: Fn(FileTask) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, OptimizeError>> + Send + 'static,
    {
        let total = tasks.len();
        let worker_count = self.max_concurrency.min(total);
        debug!("Dispatching {} tasks to {} workers", total, worker_count);

        let queue = Arc::new(Mutex::new(VecDeque::from(tasks)));
        let per_task = Arc::new(per_task);

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let queue = queue.clone();
            let per_task = per_task.clone();
            let permits = self.permits.clone();

            workers.push(tokio::spawn(async move {
                let mut outcomes = Vec::new();
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(task) = next else {
                        break;
                    };

                    let name = task.name.clone();
                    // Il semaforo non viene mai chiuso
                    let Ok(permit) = permits.clone().acquire_owned().await else {
                        error!("Concurrency permits closed, task {} not run", name);
                        break;
                    };
                    debug!("Worker {} running {}", worker_id, name);

                    let per_task = per_task.clone();
                    let outcome = AssertUnwindSafe(async move { per_task(task).await })
                        .catch_unwind()
                        .await;
                    drop(permit);

                    outcomes.push(match outcome {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(error)) => Err(TaskFailure { name, error }),
                        Err(panic) => {
                            let message = panic_message(panic.as_ref());
                            error!("Task {} panicked: {}", name, message);
                            Err(TaskFailure {
                                name: name.clone(),
                                error: OptimizeError::TaskPanicked { name, message },
                            })
                        }
                    });
                }
                outcomes
            }));
        }

        // Join barrier: nothing is inspected before every worker is done
        let mut outcome = RunOutcome {
            results: Vec::with_capacity(total),
            failures: Vec::new(),
        };
        for (worker_id, worker) in workers.into_iter().enumerate() {
            match worker.await {
                Ok(outcomes) => {
                    for entry in outcomes {
                        match entry {
                            Ok(value) => outcome.results.push(value),
                            Err(failure) => outcome.failures.push(failure),
                        }
                    }
                }
                Err(e) => {
                    error!("Worker {} terminated abnormally: {}", worker_id, e);
                    let name = format!("worker {}", worker_id);
                    outcome.failures.push(TaskFailure {
                        name: name.clone(),
                        error: OptimizeError::TaskPanicked {
                            name,
                            message: e.to_string(),
                        },
                    });
                }
            }
        }

        debug!(
            "All workers joined: {} completed, {} failed",
            outcome.results.len(),
            outcome.failures.len()
        );
        outcome
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn make_tasks(count: usize) -> Vec<FileTask> {
        (0..count)
            .map(|i| FileTask::new(PathBuf::from(format!("/batch/{i}.png"))))
            .collect()
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(OptimizeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let pool = WorkerPool::new(3).unwrap();
        let outcome = pool
            .run(Vec::new(), |task: FileTask| async move { Ok(task.name) })
            .await;

        assert_eq!(outcome.total(), 0);
        assert!(outcome.into_result().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_task_runs_exactly_once() {
        let pool = WorkerPool::new(4).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = pool
            .run(make_tasks(25), move |task: FileTask| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    Ok(task.name)
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 25);
        let names: HashSet<String> = outcome.into_result().unwrap().into_iter().collect();
        assert_eq!(names.len(), 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_never_more_than_max_concurrency_active() {
        for max in [1usize, 3, 7] {
            let pool = WorkerPool::new(max).unwrap();
            let active = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let (active_c, peak_c) = (active.clone(), peak.clone());

            let outcome = pool
                .run(make_tasks(20), move |_task: FileTask| {
                    let active = active_c.clone();
                    let peak = peak_c.clone();
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .await;

            assert_eq!(outcome.results.len(), 20);
            assert_eq!(active.load(Ordering::SeqCst), 0);
            let observed = peak.load(Ordering::SeqCst);
            assert!(observed <= max, "peak {observed} exceeded bound {max}");
            assert!(observed >= 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failures_do_not_cancel_siblings() {
        let pool = WorkerPool::new(2).unwrap();
        let outcome = pool
            .run(make_tasks(10), |task: FileTask| async move {
                if task.name == "3.png" || task.name == "7.png" {
                    Err(OptimizeError::Validation(format!("bad {}", task.name)))
                } else {
                    Ok(task.name)
                }
            })
            .await;

        assert_eq!(outcome.results.len(), 8);
        let failed: HashSet<String> = outcome.failures.iter().map(|f| f.name.clone()).collect();
        assert_eq!(failed, HashSet::from(["3.png".to_string(), "7.png".to_string()]));

        match outcome.into_result() {
            Err(OptimizeError::TasksFailed(failed)) => assert_eq!(failed.len(), 2),
            other => panic!("expected aggregate failure, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panic_is_collected_and_permit_released() {
        let pool = WorkerPool::new(1).unwrap();
        let outcome = pool
            .run(make_tasks(5), |task: FileTask| async move {
                if task.name == "0.png" {
                    panic!("optimizer exploded");
                }
                Ok(task.name)
            })
            .await;

        // With a single permit, the later tasks only run if the panicking one released it
        assert_eq!(outcome.results.len(), 4);
        assert_eq!(outcome.failures.len(), 1);
        match &outcome.failures[0].error {
            OptimizeError::TaskPanicked { name, message } => {
                assert_eq!(name, "0.png");
                assert_eq!(message, "optimizer exploded");
            }
            other => panic!("expected panic failure, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_waits_for_slow_tasks() {
        let pool = WorkerPool::new(3).unwrap();
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();

        let outcome = pool
            .run(make_tasks(6), move |task: FileTask| {
                let counter = counter.clone();
                async move {
                    let delay = if task.name == "5.png" { 80 } else { 5 };
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert_eq!(finished.load(Ordering::SeqCst), 6);
        assert_eq!(outcome.total(), 6);
    }
}
