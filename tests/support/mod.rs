pub mod socket_guard;

use std::future::Future;

/// Runs blocking client code off the async test runtime.
///
/// The blocking client owns its own runtime and must not be built or dropped
/// inside an async context.
#[allow(dead_code)]
pub fn blocking<F, T>(work: F) -> impl Future<Output = T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    async move {
        tokio::task::spawn_blocking(work)
            .await
            .expect("blocking task panicked")
    }
}
