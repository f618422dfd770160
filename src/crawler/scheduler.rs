//! Wave scheduler for depth-synchronous breadth-first crawling
//!
//! This module handles:
//! - Dispatching every state of the current wave to a bounded worker pool
//! - Waiting for the whole wave before anything deeper is dispatched
//! - Filtering successors by the visited set and the depth bound
//! - Checkpointing and halting when a wave reports failures
//!
//! ```text
//! frontier ──► dispatch wave (≤ workers at once) ──► barrier
//!                                                   │
//!           ┌── failures? ── yes ──► checkpoint(next + failed), halt
//!           │
//!           └── no ──► frontier = successors ∖ visited, depth < max
//! ```

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::Config;
use crate::crawler::processor::{record_failure, PageProcessor};
use crate::state::{CrawlPhase, CrawlState, FailureQueue, VisitedSet, DEFAULT_FAILURE_CAPACITY};
use crate::CrawlError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Tunables for a crawl
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// States at this depth or deeper are never dispatched
    pub max_depth: u32,

    /// Maximum number of pages processed at the same time
    pub workers: usize,

    /// Capacity of the failure queue
    pub failure_queue_capacity: usize,

    /// Admit each URL once per wave instead of once per discovering parent
    pub dedupe_frontier: bool,

    /// Recorded in checkpoints written by this crawl
    pub config_hash: Option<String>,
}

impl SchedulerOptions {
    /// Options with the default worker count (cores - 1, at least 1)
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            workers: num_cpus::get().saturating_sub(1).max(1),
            failure_queue_capacity: DEFAULT_FAILURE_CAPACITY,
            dedupe_frontier: false,
            config_hash: None,
        }
    }

    pub fn from_config(config: &Config, max_depth: u32, config_hash: Option<String>) -> Self {
        Self {
            max_depth,
            workers: config.crawler.worker_count(),
            failure_queue_capacity: config.crawler.failure_queue_capacity,
            dedupe_frontier: config.crawler.dedupe_frontier,
            config_hash,
        }
    }
}

/// Where a crawl begins
#[derive(Debug, Clone)]
pub enum CrawlStart {
    /// A fresh crawl from a single seed URL
    Seed(String),

    /// Continue from a previously written checkpoint
    Resume(Checkpoint),
}

/// What happened in one wave
#[derive(Debug, Clone)]
pub struct WaveSummary {
    pub index: usize,
    /// States handed to the worker pool, in submission order
    pub dispatched: Vec<CrawlState>,
    /// Successors returned by all workers, before filtering
    pub successors: usize,
    /// Successors admitted into the next frontier
    pub admitted: usize,
    /// Failures recorded during the wave
    pub failed: usize,
    /// Size of the visited set after the wave
    pub visited: usize,
}

/// Outcome of [`CrawlScheduler::run`]
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub phase: CrawlPhase,
    pub waves: Vec<WaveSummary>,
    /// States that failed in the halting wave
    pub failed: Vec<CrawlState>,
    /// Failures lost because the failure queue was full
    pub dropped_failures: usize,
    /// Location of the checkpoint, if one was written
    pub checkpoint: Option<PathBuf>,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            phase: CrawlPhase::Running,
            waves: Vec::new(),
            failed: Vec::new(),
            dropped_failures: 0,
            checkpoint: None,
        }
    }

    /// Total number of pages handed to workers
    pub fn pages_dispatched(&self) -> usize {
        self.waves.iter().map(|w| w.dispatched.len()).sum()
    }

    /// Converts a failure halt into [`CrawlError::HaltedOnFailure`]
    pub fn into_result(self) -> Result<Self, CrawlError> {
        match (self.phase, &self.checkpoint) {
            (CrawlPhase::HaltedOnFailure, Some(path)) => Err(CrawlError::HaltedOnFailure {
                failed: self.failed.len() + self.dropped_failures,
                checkpoint: path.clone(),
            }),
            _ => Ok(self),
        }
    }
}

/// Drives the crawl one depth level at a time
pub struct CrawlScheduler {
    processor: Arc<PageProcessor>,
    checkpoints: CheckpointStore,
    options: SchedulerOptions,
    frontier: Vec<CrawlState>,
    visited: VisitedSet,
    phase: CrawlPhase,
    /// Whether the last filtering step dropped a candidate for depth
    depth_cut: bool,
}

impl CrawlScheduler {
    /// Creates a scheduler positioned at the start of a crawl
    ///
    /// A fresh crawl starts with the seed as the only frontier entry and the
    /// seed as the only visited URL. A resumed crawl takes both from the
    /// checkpoint.
    pub fn new(
        processor: Arc<PageProcessor>,
        checkpoints: CheckpointStore,
        options: SchedulerOptions,
        start: CrawlStart,
    ) -> Self {
        let (frontier, visited) = match start {
            CrawlStart::Seed(url) => {
                let mut visited = VisitedSet::new();
                visited.insert(url.clone());
                (vec![CrawlState::seed(url)], visited)
            }
            CrawlStart::Resume(checkpoint) => {
                let mut visited = checkpoint.visited_set();
                for state in &checkpoint.pending {
                    visited.insert(state.url.clone());
                }
                (checkpoint.pending, visited)
            }
        };

        Self {
            processor,
            checkpoints,
            options,
            frontier,
            visited,
            phase: CrawlPhase::Running,
            depth_cut: false,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// The pending frontier; after a failure halt, the checkpointed states
    pub fn frontier(&self) -> &[CrawlState] {
        &self.frontier
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Runs waves until the crawl finishes or halts on failure
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl reached a terminal phase; a failure
    ///   halt is reported through `phase`, with the checkpoint already written
    /// * `Err(CrawlError)` - The checkpoint for a failure halt could not be written
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        let semaphore = Arc::new(Semaphore::new(self.options.workers.max(1)));
        let failures = Arc::new(FailureQueue::new(self.options.failure_queue_capacity));
        let mut report = CrawlReport::new();

        tracing::info!(
            "Starting crawl: {} pending, {} visited, max depth {}, {} workers",
            self.frontier.len(),
            self.visited.len(),
            self.options.max_depth,
            self.options.workers
        );

        self.phase = CrawlPhase::Running;
        self.depth_cut = false;
        let initial = std::mem::take(&mut self.frontier);
        self.frontier = initial
            .into_iter()
            .filter(|state| self.within_depth(state))
            .collect();

        loop {
            if self.frontier.is_empty() {
                self.phase = if self.depth_cut {
                    CrawlPhase::DepthLimitReached
                } else {
                    CrawlPhase::Exhausted
                };
                break;
            }

            let wave = std::mem::take(&mut self.frontier);
            let index = report.waves.len();
            tracing::info!("Wave {}: dispatching {} page(s)", index, wave.len());

            let successors = self.dispatch_wave(&wave, &semaphore, &failures).await;
            let successor_count = successors.len();
            let next = self.admit(successors);

            tracing::info!(
                "Wave {} complete: {} successors, {} admitted, {} failed, {} visited",
                index,
                successor_count,
                next.len(),
                failures.len(),
                self.visited.len()
            );

            report.waves.push(WaveSummary {
                index,
                dispatched: wave,
                successors: successor_count,
                admitted: next.len(),
                failed: failures.len(),
                visited: self.visited.len(),
            });

            if !failures.is_empty() || failures.dropped() > 0 {
                let failed = failures.snapshot();
                let mut pending = next;
                pending.extend(failed.iter().cloned());

                let checkpoint =
                    Checkpoint::new(pending, &self.visited, self.options.config_hash.clone());
                if let Err(e) = self.checkpoints.save(&checkpoint) {
                    tracing::error!("Failed to write checkpoint: {}", e);
                    return Err(e.into());
                }

                tracing::warn!(
                    "Halting after wave {}: {} page(s) failed, checkpoint at {}",
                    index,
                    failed.len() + failures.dropped(),
                    self.checkpoints.path().display()
                );

                self.frontier = checkpoint.pending;
                self.phase = CrawlPhase::HaltedOnFailure;
                report.failed = failed;
                report.checkpoint = Some(self.checkpoints.path().to_path_buf());
                break;
            }

            self.frontier = next;
        }

        report.phase = self.phase;
        report.dropped_failures = failures.dropped();
        tracing::info!(
            "Crawl finished: {} after {} wave(s), {} page(s) dispatched",
            report.phase,
            report.waves.len(),
            report.pages_dispatched()
        );

        Ok(report)
    }

    /// Processes every state of a wave and waits for all of them
    async fn dispatch_wave(
        &self,
        wave: &[CrawlState],
        semaphore: &Arc<Semaphore>,
        failures: &Arc<FailureQueue>,
    ) -> Vec<CrawlState> {
        let handles: Vec<_> = wave
            .iter()
            .map(|state| {
                let processor = Arc::clone(&self.processor);
                let semaphore = Arc::clone(semaphore);
                let failures = Arc::clone(failures);
                let task_state = state.clone();

                let handle = tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            record_failure(&failures, task_state);
                            return Vec::new();
                        }
                    };
                    processor.process(task_state, &failures).await
                });

                (state, handle)
            })
            .collect();

        let mut successors = Vec::new();
        for (state, handle) in handles {
            match handle.await {
                Ok(next) => successors.extend(next),
                Err(e) => {
                    tracing::error!("Worker for {} did not complete: {}", state.url, e);
                    record_failure(failures, state.clone());
                }
            }
        }

        successors
    }

    /// Builds the next frontier from a wave's successors
    ///
    /// Membership is checked against the visited set as it stood before this
    /// wave, so a URL found by two parents is admitted twice unless
    /// `dedupe_frontier` is set. Every admitted URL is then marked visited.
    fn admit(&mut self, successors: Vec<CrawlState>) -> Vec<CrawlState> {
        self.depth_cut = false;

        let mut next = Vec::new();
        for state in successors {
            if !self.within_depth(&state) {
                self.depth_cut = true;
                continue;
            }
            if self.visited.contains(&state.url) {
                continue;
            }
            next.push(state);
        }

        if self.options.dedupe_frontier {
            next.retain(|state| self.visited.insert(state.url.clone()));
        } else {
            for state in &next {
                self.visited.insert(state.url.clone());
            }
        }

        next
    }

    fn within_depth(&mut self, state: &CrawlState) -> bool {
        if state.depth < self.options.max_depth {
            true
        } else {
            self.depth_cut = true;
            false
        }
    }
}
