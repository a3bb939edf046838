//! Background layout computation.
//!
//! Each submitted request gets an increasing id. Layouts run on the rayon pool,
//! and only the response to the most recent request is handed back; responses
//! to superseded requests are dropped on receipt.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::layout::{Layout, LayoutEngine, LayoutError, LayoutRequest};

pub type RequestId = u64;

#[derive(Debug)]
pub struct LayoutResponse {
    pub id: RequestId,
    pub result: Result<Layout, LayoutError>,
}

pub struct LayoutWorker {
    engine: Arc<LayoutEngine>,
    latest: AtomicU64,
    sender: Sender<LayoutResponse>,
    receiver: Receiver<LayoutResponse>,
}

impl LayoutWorker {
    pub fn new(engine: LayoutEngine) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            engine: Arc::new(engine),
            latest: AtomicU64::new(0),
            sender,
            receiver,
        }
    }

    /// Starts computing `request` and makes it the latest one.
    pub fn submit(&self, request: LayoutRequest) -> RequestId {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let engine = Arc::clone(&self.engine);
        let sender = self.sender.clone();
        rayon::spawn(move || {
            let result = engine.compute(&request);
            // The worker may have been dropped; nobody is waiting then.
            let _ = sender.send(LayoutResponse { id, result });
        });
        tracing::debug!(id, "layout request submitted");
        id
    }

    pub fn latest_id(&self) -> RequestId {
        self.latest.load(Ordering::SeqCst)
    }

    /// Waits for the response to the latest request.
    ///
    /// Returns `None` if nothing has been submitted or the wait times out. Stale
    /// responses arriving meanwhile do not extend the wait.
    pub fn recv_latest(&self, timeout: Duration) -> Option<LayoutResponse> {
        if self.latest_id() == 0 {
            return None;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(response) if response.id == self.latest_id() => return Some(response),
                Ok(response) => tracing::debug!(id = response.id, "dropping stale layout"),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Non-blocking variant of [`Self::recv_latest`].
    pub fn try_recv_latest(&self) -> Option<LayoutResponse> {
        while let Ok(response) = self.receiver.try_recv() {
            if response.id == self.latest_id() {
                return Some(response);
            }
            tracing::debug!(id = response.id, "dropping stale layout");
        }
        None
    }
}
