//! Request dispatch.
//!
//! The UI loop never awaits the network. Requests are spawned onto the
//! runtime and their outcomes come back over a channel that the loop drains
//! between frames.

use std::fmt::Debug;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::data::{HealthMap, InventoryTree};
use crate::source::{Backend, Bookmark, DashboardData, FetchError};

/// A request the dashboard can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Inventory,
    /// The backend's cached health map.
    Health,
    /// A forced, fresh health check.
    HealthCheck,
    /// Inventory and health in one response.
    Dashboard,
    Bookmarks,
    SearchBookmarks(String),
}

/// The result of a [`FetchRequest`].
#[derive(Debug)]
pub enum FetchOutcome {
    Inventory(Result<InventoryTree, FetchError>),
    Health(Result<HealthMap, FetchError>),
    HealthCheck(Result<HealthMap, FetchError>),
    Dashboard(Result<DashboardData, FetchError>),
    Bookmarks(Result<Vec<Bookmark>, FetchError>),
    BookmarkSearch {
        query: String,
        result: Result<Vec<Bookmark>, FetchError>,
    },
}

/// Which run of the poller issued a request.
///
/// The poller moves to a new generation whenever it starts or tears down, so
/// outcomes still in flight from an earlier run can be told apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// An outcome stamped with the generation of its request.
#[derive(Debug)]
pub struct Fetched {
    pub generation: Generation,
    pub outcome: FetchOutcome,
}

/// Issue `request` against `backend` and wait for the outcome.
pub async fn perform(backend: &dyn Backend, request: FetchRequest) -> FetchOutcome {
    match request {
        FetchRequest::Inventory => FetchOutcome::Inventory(backend.inventory().await),
        FetchRequest::Health => FetchOutcome::Health(backend.health().await),
        FetchRequest::HealthCheck => FetchOutcome::HealthCheck(backend.check_health().await),
        FetchRequest::Dashboard => FetchOutcome::Dashboard(backend.dashboard().await),
        FetchRequest::Bookmarks => FetchOutcome::Bookmarks(backend.bookmarks().await),
        FetchRequest::SearchBookmarks(query) => {
            let result = backend.search_bookmarks(&query).await;
            FetchOutcome::BookmarkSearch { query, result }
        }
    }
}

/// Starts requests without waiting for them.
pub trait Fetcher: Debug {
    /// Start `request`; its outcome is delivered stamped with `generation`.
    fn spawn(&mut self, generation: Generation, request: FetchRequest);
}

/// Spawns each request as a task on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioFetcher {
    runtime: Handle,
    backend: Arc<dyn Backend>,
    tx: UnboundedSender<Fetched>,
}

impl TokioFetcher {
    /// Create a fetcher and the inbox its outcomes are delivered to.
    pub fn new(runtime: Handle, backend: Arc<dyn Backend>) -> (Self, FetchInbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                runtime,
                backend,
                tx,
            },
            FetchInbox { rx },
        )
    }
}

impl Fetcher for TokioFetcher {
    fn spawn(&mut self, generation: Generation, request: FetchRequest) {
        debug!(?request, ?generation, backend = self.backend.description(), "spawning fetch");
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = perform(backend.as_ref(), request).await;
            // The inbox is gone once the UI has shut down.
            let _ = tx.send(Fetched {
                generation,
                outcome,
            });
        });
    }
}

/// Receiving end for fetch outcomes.
#[derive(Debug)]
pub struct FetchInbox {
    rx: UnboundedReceiver<Fetched>,
}

impl FetchInbox {
    /// Take every outcome that has arrived, without blocking.
    pub fn drain(&mut self) -> Vec<Fetched> {
        let mut outcomes = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        outcomes
    }

    /// Wait for the next outcome.
    pub async fn recv(&mut self) -> Option<Fetched> {
        self.rx.recv().await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records requests instead of issuing them.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingFetcher {
        pub requests: Vec<FetchRequest>,
        /// Generation of the most recent request.
        pub generation: Generation,
    }

    impl RecordingFetcher {
        pub fn take(&mut self) -> Vec<FetchRequest> {
            std::mem::take(&mut self.requests)
        }
    }

    impl Fetcher for RecordingFetcher {
        fn spawn(&mut self, generation: Generation, request: FetchRequest) {
            self.generation = generation;
            self.requests.push(request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryBackend;

    #[tokio::test]
    async fn test_perform_maps_requests() {
        let backend = MemoryBackend::new();
        let mut health = HealthMap::new();
        health.insert("db_h_1_d".into(), false);
        backend.set_health(health.clone());

        match perform(&backend, FetchRequest::HealthCheck).await {
            FetchOutcome::HealthCheck(Ok(map)) => assert_eq!(map, health),
            other => panic!("unexpected outcome: {other:?}"),
        }

        match perform(&backend, FetchRequest::SearchBookmarks("graf".into())).await {
            FetchOutcome::BookmarkSearch { query, result } => {
                assert_eq!(query, "graf");
                assert!(result.unwrap().is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tokio_fetcher_delivers_to_inbox() {
        let backend = MemoryBackend::new();
        backend.set_failing(Some(502));
        let (mut fetcher, mut inbox) =
            TokioFetcher::new(Handle::current(), Arc::new(backend.clone()));

        let generation = Generation::default().next();
        fetcher.spawn(generation, FetchRequest::Inventory);
        match inbox.recv().await {
            Some(Fetched {
                generation: stamped,
                outcome: FetchOutcome::Inventory(Err(FetchError::Status { status, .. })),
            }) => {
                assert_eq!(stamped, generation);
                assert_eq!(status, 502)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert!(inbox.drain().is_empty());
    }
}
