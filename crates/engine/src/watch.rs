// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem change routing for job directories and the project pipeline.
//!
//! Raw `notify` events are classified by file name, batched by a
//! [`Coalescer`] and delivered over tokio channels. Each watcher is its own
//! task and stops when its [`WatchHandle`] is stopped or dropped.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexSet;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use rln_core::{sentinel, JobId, JobState, Pipeline, WatchConfig, DEFAULT_PIPELINE, JOB_PIPELINE, JOB_STAR};
use rln_project::{JobDirectory, Project};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot watch {}: {source}", path.display())]
    Notify { path: PathBuf, source: notify::Error },
}

/// Category of a changed path inside a job directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A `RELION_JOB_*` file.
    Sentinel,
    /// `job_pipeline.star`.
    Pipeline,
    /// `job.star`.
    Options,
    Content,
}

pub fn classify(path: &Path) -> ChangeKind {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if sentinel::is_sentinel(name) => ChangeKind::Sentinel,
        Some(JOB_PIPELINE) => ChangeKind::Pipeline,
        Some(JOB_STAR) => ChangeKind::Options,
        _ => ChangeKind::Content,
    }
}

/// One coalesced notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Sentinel,
    Pipeline,
    Options,
    Content { paths: Vec<PathBuf> },
}

/// Debounce state for one watcher.
///
/// The window opens at the first event after a flush and is not extended by
/// later events, so a job writing files continuously still yields one batch
/// per window.
#[derive(Debug)]
pub struct Coalescer {
    window: Duration,
    deadline: Option<Instant>,
    kinds: IndexSet<ChangeKind>,
    content: IndexSet<PathBuf>,
}

impl Coalescer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None, kinds: IndexSet::new(), content: IndexSet::new() }
    }

    pub fn push(&mut self, path: &Path, now: Instant) {
        let kind = classify(path);
        self.kinds.insert(kind);
        if kind == ChangeKind::Content {
            self.content.insert(path.to_path_buf());
        }
        self.deadline.get_or_insert(now + self.window);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Drain pending events, one [`Change`] per category in order of first
    /// arrival.
    pub fn flush(&mut self) -> Vec<Change> {
        self.deadline = None;
        let content = std::mem::take(&mut self.content);
        let mut content = Some(content.into_iter().collect());
        self.kinds
            .drain(..)
            .map(|kind| match kind {
                ChangeKind::Sentinel => Change::Sentinel,
                ChangeKind::Pipeline => Change::Pipeline,
                ChangeKind::Options => Change::Options,
                ChangeKind::Content => Change::Content { paths: content.take().unwrap_or_default() },
            })
            .collect()
    }
}

/// Coalesced changes of one job directory, with the state observed at
/// flush time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobUpdate {
    pub job: JobId,
    pub state: JobState,
    pub changes: Vec<Change>,
}

impl JobUpdate {
    pub fn has(&self, kind: ChangeKind) -> bool {
        self.changes.iter().any(|c| {
            matches!(
                (c, kind),
                (Change::Sentinel, ChangeKind::Sentinel)
                    | (Change::Pipeline, ChangeKind::Pipeline)
                    | (Change::Options, ChangeKind::Options)
                    | (Change::Content { .. }, ChangeKind::Content)
            )
        })
    }
}

/// The project pipeline after a batch of writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineUpdated(pub Pipeline);

/// Stops the watcher task on [`WatchHandle::stop`] or drop. Neither waits
/// for the task to finish.
#[derive(Debug)]
pub struct WatchHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Watches one job directory recursively.
pub struct JobWatcher;

impl JobWatcher {
    /// Start watching `job`. Must be called inside a tokio runtime.
    pub fn spawn(
        job: JobDirectory,
        tx: mpsc::Sender<JobUpdate>,
        config: &WatchConfig,
    ) -> Result<WatchHandle, WatchError> {
        let (watcher, raw) = watch_paths(job.path(), RecursiveMode::Recursive, |_| true)?;
        let cancel = CancellationToken::new();
        tracing::debug!(job = %job.job_id(), "job watcher started");
        let task = tokio::spawn(debounce_loop(watcher, raw, cancel.clone(), config.debounce(), move |changes| {
            let job = job.clone();
            let tx = tx.clone();
            async move {
                let id = job.job_id().clone();
                // sentinel and pipeline reads may sleep between retries
                match tokio::task::spawn_blocking(move || job.state()).await {
                    Ok(state) => tx.send(JobUpdate { job: id, state, changes }).await.is_ok(),
                    Err(e) => {
                        tracing::warn!(job = %id, error = %e, "state read task failed");
                        true
                    }
                }
            }
        }));
        Ok(WatchHandle { cancel, task })
    }
}

/// Watches `default_pipeline.star` of a project.
pub struct PipelineWatcher;

impl PipelineWatcher {
    /// Start watching the pipeline of `project`. Must be called inside a
    /// tokio runtime.
    pub fn spawn(
        project: Project,
        tx: mpsc::Sender<PipelineUpdated>,
        config: &WatchConfig,
    ) -> Result<WatchHandle, WatchError> {
        let is_pipeline = |path: &Path| path.file_name().is_some_and(|n| n == DEFAULT_PIPELINE);
        let (watcher, raw) = watch_paths(project.root(), RecursiveMode::NonRecursive, is_pipeline)?;
        let cancel = CancellationToken::new();
        let task = tokio::spawn(debounce_loop(watcher, raw, cancel.clone(), config.debounce(), move |_| {
            let project = project.clone();
            let tx = tx.clone();
            async move {
                match tokio::task::spawn_blocking(move || project.read_pipeline()).await {
                    Ok(Ok(pipeline)) => tx.send(PipelineUpdated(pipeline)).await.is_ok(),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "pipeline changed but could not be parsed");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "pipeline read task failed");
                        true
                    }
                }
            }
        }));
        Ok(WatchHandle { cancel, task })
    }
}

/// Receives job updates in the order they were flushed.
pub trait JobUpdateHandler {
    fn on_job_updated(&mut self, update: &JobUpdate);
}

/// Feed every update from `rx` to `handler` until the channel closes.
pub async fn pump<H: JobUpdateHandler>(mut rx: mpsc::Receiver<JobUpdate>, handler: &mut H) {
    while let Some(update) = rx.recv().await {
        handler.on_job_updated(&update);
    }
}

/// Raw path stream from a `notify` watcher on `root`. Access events are
/// dropped so that reading files in response does not retrigger.
fn watch_paths(
    root: &Path,
    mode: RecursiveMode,
    keep: impl Fn(&Path) -> bool + Send + 'static,
) -> Result<(notify::RecommendedWatcher, mpsc::Receiver<PathBuf>), WatchError> {
    let (tx, rx) = mpsc::channel(256);
    let notify_err = |source| WatchError::Notify { path: root.to_path_buf(), source };
    let mut watcher = notify::recommended_watcher(move |res: Result<NotifyEvent, _>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Access(_)) {
                return;
            }
            for path in event.paths.into_iter().filter(|p| keep(p.as_path())) {
                let _ = tx.blocking_send(path);
            }
        }
    })
    .map_err(notify_err)?;
    watcher.watch(root, mode).map_err(notify_err)?;
    Ok((watcher, rx))
}

async fn debounce_loop<F, Fut>(
    _watcher: notify::RecommendedWatcher,
    mut raw: mpsc::Receiver<PathBuf>,
    cancel: CancellationToken,
    window: Duration,
    mut emit: F,
) where
    F: FnMut(Vec<Change>) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut coalescer = Coalescer::new(window);
    loop {
        let deadline = coalescer.deadline();
        tokio::select! {
            _ = cancel.cancelled() => break,
            path = raw.recv() => match path {
                Some(path) => coalescer.push(&path, Instant::now()),
                None => break,
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                // Receiver gone
                if !emit(coalescer.flush()).await {
                    break;
                }
            }
        }
    }
    tracing::debug!("watcher stopped");
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
