//! Core environment context trait for the playback driver.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the host's clock and scheduler so the playback
/// driver can run against the real Tokio runtime in production or a
/// controlled clock in tests.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, `tokio::spawn`
/// - **Tests**: `TokioContext` under `tokio::time::pause()`, which makes
///   the tick grid deterministic
#[async_trait]
pub trait BeaconContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Used for tick bookkeeping and duration measurements.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// This is the recurring-timer primitive: the playback driver calls it
    /// once per tick period. It must not block other work on the runtime.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    ///
    /// The playback tick loop runs inside a task spawned here; the caller
    /// keeps only a handle used to request shutdown.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
