//! Search orchestration off the caller's thread.
//!
//! [`Orchestrator`] supervises at most one scan worker at a time. Starting a
//! second search while one is running is rejected with
//! [`SearchError::Busy`]; a running worker is never silently orphaned. Each
//! started search yields exactly one terminal outcome through its
//! [`SearchHandle`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use crate::corpus::{self, Ranking};
use crate::util::{SearchError, SearchResult};

/// Immutable description of one search.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    /// Path of the query image.
    pub query_path: PathBuf,
    /// Directory holding candidate images.
    pub candidate_dir: PathBuf,
    /// Maximum number of results to return.
    pub top_n: usize,
}

/// Lifecycle of the most recent search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Running,
    Completed,
    Failed,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_COMPLETED: u8 = 2;
const STATE_FAILED: u8 = 3;

impl SearchState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_IDLE => SearchState::Idle,
            STATE_RUNNING => SearchState::Running,
            STATE_COMPLETED => SearchState::Completed,
            _ => SearchState::Failed,
        }
    }
}

/// Cooperative cancellation flag, polled by the scanner between candidates.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; honored at the next candidate boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Handle to one in-flight search.
///
/// Dropping the handle without calling [`SearchHandle::wait`] detaches the
/// worker; it still runs to completion and releases the orchestrator.
pub struct SearchHandle {
    worker: thread::JoinHandle<SearchResult<Ranking>>,
    cancel: CancelToken,
    finished: Arc<AtomicBool>,
}

impl std::fmt::Debug for SearchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHandle")
            .field("finished", &self.finished.load(Ordering::Acquire))
            .finish()
    }
}

impl SearchHandle {
    /// Requests cooperative cancellation of the scan.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the worker has produced its terminal outcome.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Blocks until the scan finishes and returns its single terminal
    /// outcome.
    pub fn wait(self) -> SearchResult<Ranking> {
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(SearchError::Panicked),
        }
    }
}

/// Releases the orchestrator when the worker exits, panics included.
struct WorkerGuard {
    state: Arc<AtomicU8>,
    finished: Arc<AtomicBool>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        // A worker that never stored a terminal state died abnormally.
        let _ = self.state.compare_exchange(
            STATE_RUNNING,
            STATE_FAILED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.finished.store(true, Ordering::Release);
    }
}

/// Supervises at most one scan worker at a time.
pub struct Orchestrator {
    state: Arc<AtomicU8>,
    finished: Option<Arc<AtomicBool>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
            finished: None,
        }
    }

    /// Lifecycle state of the most recent search.
    pub fn state(&self) -> SearchState {
        SearchState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Spawns a worker scanning on behalf of `request`.
    ///
    /// Fails with [`SearchError::Busy`] while a previous search is still
    /// running. A finished search, successful or not, frees the slot even if
    /// its handle was never waited on.
    pub fn start(&mut self, request: SearchRequest) -> SearchResult<SearchHandle> {
        if let Some(finished) = &self.finished {
            if !finished.load(Ordering::Acquire) {
                return Err(SearchError::Busy);
            }
        }

        let cancel = CancelToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let state = Arc::clone(&self.state);
        state.store(STATE_RUNNING, Ordering::Release);

        let worker_cancel = cancel.clone();
        let guard = WorkerGuard {
            state: Arc::clone(&state),
            finished: Arc::clone(&finished),
        };
        let worker = thread::spawn(move || {
            let _guard = guard;
            let outcome = corpus::scan(
                &request.query_path,
                &request.candidate_dir,
                request.top_n,
                &worker_cancel,
            );
            let terminal = if outcome.is_ok() {
                STATE_COMPLETED
            } else {
                STATE_FAILED
            };
            state.store(terminal, Ordering::Release);
            outcome
        });

        self.finished = Some(Arc::clone(&finished));
        Ok(SearchHandle {
            worker,
            cancel,
            finished,
        })
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
