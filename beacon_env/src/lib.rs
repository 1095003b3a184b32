//! Beacon Viewer Environment Abstraction Layer
//!
//! This crate provides the seam between the playback core and the host
//! runtime. The playback driver only needs three things from its
//! environment:
//! - Time (`now()`)
//! - A recurring-timer primitive (`sleep()`)
//! - A way to run the tick loop in the background (`spawn()`)
//!
//! Keeping these behind a trait lets the driver run against the production
//! Tokio runtime or against a paused test clock without touching the
//! playback logic itself.
//!
//! # Example
//!
//! ```ignore
//! use beacon_env::{BeaconContext, TokioContext};
//!
//! async fn tick_loop<Ctx: BeaconContext>(ctx: &Ctx) {
//!     loop {
//!         ctx.sleep(Duration::from_millis(1000)).await;
//!         step();
//!     }
//! }
//! ```

mod context;
mod tokio_impl;

pub use context::BeaconContext;
pub use tokio_impl::TokioContext;
