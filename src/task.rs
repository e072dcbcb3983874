use core::future::Future;
use std::sync::OnceLock;

use tokio::{runtime::Handle, task::JoinHandle};

static TOKIO: OnceLock<Handle> = OnceLock::new();

/// Captures the current runtime handle so background work spawned from
/// non-async callers lands on the same runtime.
pub fn init_tokio() {
    if is_tokio_initialized() {
        return;
    }

    let tokio = tokio::runtime::Handle::current();
    let _ = TOKIO.set(tokio);
}

pub fn is_tokio_initialized() -> bool {
    TOKIO.get().is_some()
}

pub fn spawn<T>(task: T) -> JoinHandle<T::Output>
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    match TOKIO.get() {
        Some(handle) => handle.spawn(task),
        None => tokio::spawn(task),
    }
}
