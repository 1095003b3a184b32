//! Playback: advance through the raw feed on a fixed wall-clock period.
//!
//! `PlaybackState` is the pure per-tick stepper (record in, parse attempt
//! out, cursor forward, wrap at the end). `PlaybackDriver` runs that
//! stepper on a recurring timer supplied by the environment context and
//! hands each outcome to a caller-provided callback. The loop never
//! terminates on its own; shutdown comes only from `PlaybackHandle::stop`.

use crate::geodetic::{CartesianConvention, EARTH_RADIUS_KM};
use crate::telemetry::{parse_record, ParseError, TelemetrySample};
use beacon_env::BeaconContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Configuration for a playback run.
///
/// The viewer variants of the original feed tooling differed only in these
/// constants; they are collapsed here into one configurable component.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Wall-clock period between ticks (default: 1000 ms)
    pub tick_period: Duration,

    /// Sphere radius for the Cartesian conversion, km (default: 6371)
    pub sphere_radius_km: f64,

    /// Spherical-to-Cartesian arrangement (default: lat-first)
    pub convention: CartesianConvention,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(1000),
            sphere_radius_km: EARTH_RADIUS_KM,
            convention: CartesianConvention::default(),
        }
    }
}

/// The outcome of one playback tick.
#[derive(Debug)]
pub struct PlaybackTick {
    /// Index of the record this tick processed
    pub index: usize,

    /// The parsed sample, or the parse failure for a malformed record.
    /// An `Err` means "no update this tick"; the cursor advanced anyway.
    pub sample: Result<TelemetrySample, ParseError>,
}

/// The ordered raw feed plus the playback cursor.
///
/// The cursor is the only mutable field. It satisfies
/// `0 <= cursor <= len()` at all times; a cursor equal to `len()` is an
/// ephemeral end-of-sequence state folded back to 0 at the start of the
/// next step, so consumers never observe it as a delivered index.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    records: Vec<String>,
    cursor: usize,
}

impl PlaybackState {
    /// Creates a playback sequence from raw record lines.
    pub fn new(records: Vec<String>) -> Self {
        Self { records, cursor: 0 }
    }

    /// Creates a playback sequence from a newline-delimited feed.
    ///
    /// Blank lines are dropped; everything else is kept as-is, including
    /// malformed records (they still occupy a tick when reached).
    pub fn from_text(text: &str) -> Self {
        let records = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(records)
    }

    /// Number of records in the sequence.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the sequence has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current cursor value (index of the next record to process).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Performs one playback step.
    ///
    /// Reads the record at the cursor, attempts to parse it, and advances
    /// the cursor. When the previous step consumed the last record, the
    /// cursor folds back to 0 here, producing an infinite looping playback.
    /// Returns `None` only for an empty sequence.
    pub fn step(&mut self, config: &PlaybackConfig) -> Option<PlaybackTick> {
        if self.records.is_empty() {
            return None;
        }
        if self.cursor >= self.records.len() {
            self.cursor = 0;
        }

        let index = self.cursor;
        let sample = parse_record(
            &self.records[index],
            config.sphere_radius_km,
            config.convention,
        );
        self.cursor += 1;

        Some(PlaybackTick { index, sample })
    }
}

/// Periodic playback driver.
///
/// Spawns a background tick loop on the environment context: sleep one
/// tick period, perform one `PlaybackState::step`, invoke the callback,
/// repeat forever. Delivery is fire-and-forget at the fixed cadence; there
/// is no back-pressure from the consumer.
pub struct PlaybackDriver;

impl PlaybackDriver {
    /// Starts playback and returns the shutdown handle.
    ///
    /// The callback runs on the spawned task, once per tick, with the tick
    /// outcome (sample or "no update"). Dropping the handle also stops the
    /// loop.
    pub fn spawn<Ctx, F>(
        ctx: Arc<Ctx>,
        mut state: PlaybackState,
        config: PlaybackConfig,
        mut on_tick: F,
    ) -> PlaybackHandle
    where
        Ctx: BeaconContext,
        F: FnMut(PlaybackTick) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let loop_ctx = Arc::clone(&ctx);

        ctx.spawn("playback-tick", async move {
            loop {
                tokio::select! {
                    _ = loop_ctx.sleep(config.tick_period) => {
                        // A stop that raced the timer wins: no callback may
                        // run for a tick scheduled after stop() returned.
                        if *stop_rx.borrow() {
                            break;
                        }
                        if let Some(tick) = state.step(&config) {
                            on_tick(tick);
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        PlaybackHandle { stop_tx }
    }
}

/// Handle for shutting playback down.
pub struct PlaybackHandle {
    stop_tx: watch::Sender<bool>,
}

impl PlaybackHandle {
    /// Stops the periodic stepping.
    ///
    /// Idempotent. Once this returns, no further callback invocations
    /// occur: the tick loop re-checks the stop flag after every timer wake,
    /// before touching the callback.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_env::TokioContext;
    use tokio::sync::mpsc;

    fn record(id: u32, lat: f64, lon: f64, alt: f64) -> String {
        format!(
            "Message {} L[{:.1},{:.1},{:.1}] R[15.0,30.0,0.0] RD[2024-01-01T00:00:{:02}]",
            id,
            lat,
            lon,
            alt,
            id % 60
        )
    }

    fn three_record_feed() -> Vec<String> {
        vec![
            record(1, 10.0, 20.0, 5.0),
            record(2, 11.0, 21.0, 5.0),
            record(3, 12.0, 22.0, 5.0),
        ]
    }

    #[test]
    fn test_step_in_order_then_wraps() {
        let mut state = PlaybackState::new(three_record_feed());
        let config = PlaybackConfig::default();

        for expected in [0, 1, 2, 0, 1] {
            let tick = state.step(&config).unwrap();
            assert_eq!(tick.index, expected);
            assert!(tick.sample.is_ok());
        }
    }

    #[test]
    fn test_cursor_invariant_holds_through_wrap() {
        let mut state = PlaybackState::new(three_record_feed());
        let config = PlaybackConfig::default();

        assert_eq!(state.cursor(), 0);
        for _ in 0..3 {
            state.step(&config);
            assert!(state.cursor() <= state.len());
        }
        // Ephemeral end-of-sequence state, folded on the next step
        assert_eq!(state.cursor(), state.len());
        let tick = state.step(&config).unwrap();
        assert_eq!(tick.index, 0);
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_malformed_record_advances_cursor() {
        let mut state = PlaybackState::new(vec![
            record(1, 10.0, 20.0, 5.0),
            "garbage".to_string(),
            record(2, -10.0, -20.0, 0.0),
        ]);
        let config = PlaybackConfig::default();

        let t0 = state.step(&config).unwrap();
        assert_eq!(t0.sample.unwrap().message_id, "1");

        // The malformed line is skipped, not retried
        let t1 = state.step(&config).unwrap();
        assert_eq!(t1.index, 1);
        assert!(t1.sample.is_err());

        let t2 = state.step(&config).unwrap();
        assert_eq!(t2.index, 2);
        assert_eq!(t2.sample.unwrap().message_id, "2");
    }

    #[test]
    fn test_empty_sequence_never_ticks() {
        let mut state = PlaybackState::new(Vec::new());
        let config = PlaybackConfig::default();

        assert!(state.step(&config).is_none());
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_from_text_drops_blank_lines() {
        let text = format!(
            "{}\n\n  \n{}\n",
            record(1, 10.0, 20.0, 5.0),
            record(2, 11.0, 21.0, 5.0)
        );
        let state = PlaybackState::from_text(&text);
        assert_eq!(state.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_delivers_in_order_and_loops() {
        let ctx = Arc::new(TokioContext::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = PlaybackDriver::spawn(
            ctx,
            PlaybackState::new(three_record_feed()),
            PlaybackConfig::default(),
            move |tick| {
                let _ = tx.send(tick);
            },
        );

        // First full pass plus one wrapped tick
        for expected in [0, 1, 2, 0] {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick.index, expected);
            let sample = tick.sample.unwrap();
            assert_eq!(sample.message_id, (expected as u32 + 1).to_string());
        }

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_skips_malformed_and_keeps_cadence() {
        // The concrete scenario: valid, garbage, valid at 1000 ms
        let feed = vec![
            "Message 1 L[10.0,20.0,5.0] R[15.0,30.0,0.0] RD[2024-01-01T00:00:00]".to_string(),
            "garbage".to_string(),
            "Message 2 L[-10.0,-20.0,0.0] R[0.0,0.0,0.0] RD[2024-01-01T00:00:01]".to_string(),
        ];
        let ctx = Arc::new(TokioContext::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = PlaybackDriver::spawn(
            ctx,
            PlaybackState::new(feed),
            PlaybackConfig::default(),
            move |tick| {
                let _ = tx.send(tick);
            },
        );

        let t0 = rx.recv().await.unwrap();
        assert_eq!(t0.index, 0);
        assert_eq!(t0.sample.unwrap().message_id, "1");

        // Tick 1: no sample delivered, but the tick itself happens
        let t1 = rx.recv().await.unwrap();
        assert_eq!(t1.index, 1);
        assert!(t1.sample.is_err());

        // Tick 2 processes line 2, not a retry of line 1
        let t2 = rx.recv().await.unwrap();
        assert_eq!(t2.index, 2);
        assert_eq!(t2.sample.unwrap().message_id, "2");

        // Tick 3 wraps back to the start
        let t3 = rx.recv().await.unwrap();
        assert_eq!(t3.index, 0);
        assert_eq!(t3.sample.unwrap().message_id, "1");

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_silences_callbacks_and_is_idempotent() {
        let ctx = Arc::new(TokioContext::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = PlaybackDriver::spawn(
            ctx,
            PlaybackState::new(three_record_feed()),
            PlaybackConfig::default(),
            move |tick| {
                let _ = tx.send(tick);
            },
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.index, 0);

        handle.stop();
        handle.stop(); // idempotent

        // Give the (stopped) loop many periods' worth of virtual time
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_survives_empty_feed() {
        let ctx = Arc::new(TokioContext::new());
        let (tx, mut rx) = mpsc::unbounded_channel::<PlaybackTick>();

        let handle = PlaybackDriver::spawn(
            ctx,
            PlaybackState::new(Vec::new()),
            PlaybackConfig::default(),
            move |tick| {
                let _ = tx.send(tick);
            },
        );

        // The loop keeps ticking but has nothing to deliver
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        handle.stop();
    }
}
