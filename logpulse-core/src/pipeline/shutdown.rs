use crossbeam_channel::{Receiver, Sender, bounded, select};
use crossbeam_utils::sync::WaitGroup;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

enum Never {}

/// Cooperative cancellation shared by every pipeline worker.
///
/// Cancelling drops the only sender of an internal channel, which wakes every
/// worker blocked in a `select!` on [`CancelSignal::done`].
#[derive(Clone)]
pub struct CancelSignal {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<Never>>>,
    done: Receiver<Never>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(tx)),
                done: rx,
            }),
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        trigger.take();
        tracing::debug!("cancellation signaled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Becomes ready (disconnected) once [`CancelSignal::cancel`] has been called.
    fn done(&self) -> &Receiver<Never> {
        &self.inner.done
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Handoff {
    Delivered,
    /// The receiving side hung up.
    Closed,
    Cancelled,
}

/// Blocking rendezvous send that gives up on cancellation.
pub(crate) fn send_or_cancel<T>(tx: &Sender<T>, item: T, cancel: &CancelSignal) -> Handoff {
    if cancel.is_cancelled() {
        return Handoff::Cancelled;
    }

    select! {
        send(tx, item) -> res => match res {
            Ok(()) => Handoff::Delivered,
            Err(_) => Handoff::Closed,
        },
        recv(cancel.done()) -> _ => Handoff::Cancelled,
    }
}

/// Blocking receive; `None` once the upstream is exhausted or the run is cancelled.
pub(crate) fn recv_or_cancel<T>(rx: &Receiver<T>, cancel: &CancelSignal) -> Option<T> {
    if cancel.is_cancelled() {
        return None;
    }

    select! {
        recv(rx) -> msg => msg.ok(),
        recv(cancel.done()) -> _ => None,
    }
}

/// Completion latch paired 1:1 with every spawned worker.
///
/// Each worker thread owns one latch token and drops it when its closure returns
/// or unwinds; [`CompletionTracker::wait`] returns once every token is gone.
pub struct CompletionTracker {
    wg: WaitGroup,
    registered: usize,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self {
            wg: WaitGroup::new(),
            registered: 0,
        }
    }

    pub fn spawn<F, R>(&mut self, name: impl Into<String>, f: F) -> io::Result<JoinHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let token = self.wg.clone();
        let handle = thread::Builder::new().name(name.into()).spawn(move || {
            let _token = token;
            f()
        })?;
        self.registered += 1;
        Ok(handle)
    }

    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Block until every registered worker has completed.
    pub fn wait(self) {
        let registered = self.registered;
        self.wg.wait();
        tracing::debug!(workers = registered, "all workers completed");
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}
