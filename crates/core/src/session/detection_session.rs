use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::classification::domain::fallback_classifier::FallbackClassifier;
use crate::classification::domain::features::FacialFeatures;
use crate::classification::domain::mood::{Mood, MoodReading};
use crate::classification::domain::mood_classifier;
use crate::detection::domain::frame_source::{FrameSource, FrameSourceError};
use crate::detection::domain::landmark_extractor::LandmarkExtractor;
use crate::session::fetch_gate::FetchGate;
use crate::session::session_state::{SessionPhase, SessionState};
use crate::session::track_fetcher::TrackFetcher;
use crate::shared::constants::{DEFAULT_STABILIZATION_MS, DEFAULT_TICK_INTERVAL_MS};

/// Granularity of interruptible sleeps in the tick thread.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum SessionError {
    /// Camera access refused at open time. Fatal: the session never starts
    /// and the caller must not retry automatically.
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("failed to open frame source: {0}")]
    Open(String),
}

/// Timing and determinism knobs for a detection session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Delay between the source opening and the first classification,
    /// giving the camera time to stabilize exposure.
    pub stabilization_delay: Duration,
    /// Interval between classification ticks.
    pub tick_interval: Duration,
    /// Stop after this many ticks. `None` runs until `stop()` or the
    /// source is exhausted.
    pub max_ticks: Option<u64>,
    /// Seed for the random fallback classifier. `None` uses OS entropy.
    pub fallback_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stabilization_delay: Duration::from_millis(DEFAULT_STABILIZATION_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            max_ticks: None,
            fallback_seed: None,
        }
    }
}

/// Notifications emitted by a running session.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Started { width: u32, height: u32 },
    MoodChanged { reading: MoodReading },
    FetchStarted { mood: Mood },
    FetchCompleted { mood: Mood, track_count: usize },
    FetchFailed { mood: Mood, error: String },
    Warning(String),
    Stopped { last_mood: Option<Mood> },
}

struct FetchJob {
    mood: Mood,
}

/// A running mood-detection session.
///
/// Owns a tick thread that captures, extracts, and classifies once per
/// interval, and a fetch worker thread that runs at most one blocking
/// track fetch at a time. Ticks are strictly sequential: the loop body
/// completes before the next sleep, so an overdue tick is coalesced
/// rather than run concurrently.
pub struct DetectionSession {
    events: Receiver<SessionEvent>,
    state: Arc<Mutex<SessionState>>,
    stop: Arc<AtomicBool>,
    suppress_events: Arc<AtomicBool>,
    tick_thread: Option<thread::JoinHandle<Option<Mood>>>,
    fetch_tx: Option<Sender<FetchJob>>,
    fetch_thread: Option<thread::JoinHandle<()>>,
    stopped: bool,
}

impl DetectionSession {
    /// Open the frame source and begin detecting.
    ///
    /// `extractor` is `None` when the face-mesh model could not be loaded;
    /// the session then runs fallback-only and emits a warning.
    pub fn start(
        mut source: Box<dyn FrameSource>,
        extractor: Option<Box<dyn LandmarkExtractor>>,
        fetcher: Box<dyn TrackFetcher>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let format = source.open().map_err(|e| match e {
            FrameSourceError::PermissionDenied(msg) => SessionError::PermissionDenied(msg),
            other => SessionError::Open(other.to_string()),
        })?;

        let state = Arc::new(Mutex::new(SessionState::new()));
        state.lock().unwrap().set_phase(SessionPhase::Starting);

        let (event_tx, event_rx) = crossbeam_channel::unbounded::<SessionEvent>();
        // The gate guarantees at most one outstanding job, so capacity 1
        // means dispatch never blocks
        let (fetch_tx, fetch_rx) = crossbeam_channel::bounded::<FetchJob>(1);
        let stop = Arc::new(AtomicBool::new(false));
        let suppress_events = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(FetchGate::new());

        let _ = event_tx.send(SessionEvent::Started {
            width: format.width,
            height: format.height,
        });
        if extractor.is_none() {
            let _ = event_tx.send(SessionEvent::Warning(
                "face-mesh model unavailable, using random classification".into(),
            ));
        }

        let fetch_thread = spawn_fetch_worker(
            fetcher,
            fetch_rx,
            event_tx.clone(),
            gate.clone(),
            stop.clone(),
            suppress_events.clone(),
        );

        let tick_thread = spawn_tick_loop(TickLoop {
            source,
            extractor,
            fallback: match config.fallback_seed {
                Some(seed) => FallbackClassifier::with_seed(seed),
                None => FallbackClassifier::new(),
            },
            config,
            state: state.clone(),
            gate,
            fetch_tx: fetch_tx.clone(),
            event_tx,
            stop: stop.clone(),
            suppress_events: suppress_events.clone(),
        });

        Ok(Self {
            events: event_rx,
            state,
            stop,
            suppress_events,
            tick_thread: Some(tick_thread),
            fetch_tx: Some(fetch_tx),
            fetch_thread: Some(fetch_thread),
            stopped: false,
        })
    }

    /// Event stream for this session. Disconnects after teardown.
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events
    }

    /// Snapshot of the current detection state.
    pub fn state(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    /// Stop detecting and tear down both threads.
    ///
    /// Returns the last detected mood, or `None` if no tick ever produced
    /// a reading. Idempotent: a second call returns `None`.
    pub fn stop(&mut self) -> Option<Mood> {
        if self.stopped {
            return None;
        }
        self.stopped = true;
        self.teardown()
    }

    fn teardown(&mut self) -> Option<Mood> {
        self.stop.store(true, Ordering::Relaxed);
        // Closing the job channel lets the worker drain and exit
        self.fetch_tx.take();
        let last_mood = self
            .tick_thread
            .take()
            .and_then(|handle| handle.join().ok())
            .flatten();
        if let Some(handle) = self.fetch_thread.take() {
            let _ = handle.join();
        }
        self.state.lock().unwrap().reset();
        last_mood
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        if !self.stopped {
            // Silent teardown: no Stopped event, fetch results discarded
            self.suppress_events.store(true, Ordering::Relaxed);
            self.teardown();
        }
    }
}

struct TickLoop {
    source: Box<dyn FrameSource>,
    extractor: Option<Box<dyn LandmarkExtractor>>,
    fallback: FallbackClassifier,
    config: SessionConfig,
    state: Arc<Mutex<SessionState>>,
    gate: Arc<FetchGate>,
    fetch_tx: Sender<FetchJob>,
    event_tx: Sender<SessionEvent>,
    stop: Arc<AtomicBool>,
    suppress_events: Arc<AtomicBool>,
}

fn spawn_tick_loop(mut ctx: TickLoop) -> thread::JoinHandle<Option<Mood>> {
    thread::spawn(move || {
        let mut last_mood = None;

        if sleep_interruptible(ctx.config.stabilization_delay, &ctx.stop) {
            ctx.state
                .lock()
                .unwrap()
                .set_phase(SessionPhase::Detecting);

            let mut ticks: u64 = 0;
            loop {
                match run_tick(&mut ctx) {
                    TickOutcome::Reading(mood) => last_mood = Some(mood),
                    TickOutcome::SourceExhausted => break,
                }

                ticks += 1;
                if ctx.config.max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
                if !sleep_interruptible(ctx.config.tick_interval, &ctx.stop) {
                    break;
                }
            }
        }

        ctx.source.close();
        if !ctx.suppress_events.load(Ordering::Relaxed) {
            let _ = ctx.event_tx.send(SessionEvent::Stopped { last_mood });
        }
        last_mood
    })
}

enum TickOutcome {
    Reading(Mood),
    SourceExhausted,
}

/// One capture → extract → classify cycle. Every per-tick failure is
/// contained by the random fallback; only source exhaustion ends the loop.
fn run_tick(ctx: &mut TickLoop) -> TickOutcome {
    let reading = match ctx.source.capture() {
        Ok(frame) => classify_frame(&frame, ctx.extractor.as_deref_mut(), &mut ctx.fallback),
        Err(FrameSourceError::Exhausted) => return TickOutcome::SourceExhausted,
        Err(e) => {
            log::warn!("frame capture failed, falling back to random mood: {e}");
            ctx.fallback.classify()
        }
    };

    let changed = ctx.state.lock().unwrap().record(reading);
    if changed {
        let _ = ctx.event_tx.send(SessionEvent::MoodChanged { reading });
    }

    if ctx.gate.try_acquire(reading.mood) {
        let _ = ctx.event_tx.send(SessionEvent::FetchStarted {
            mood: reading.mood,
        });
        let _ = ctx.fetch_tx.send(FetchJob { mood: reading.mood });
    }

    TickOutcome::Reading(reading.mood)
}

fn classify_frame(
    frame: &crate::shared::frame::Frame,
    extractor: Option<&mut (dyn LandmarkExtractor + 'static)>,
    fallback: &mut FallbackClassifier,
) -> MoodReading {
    let Some(extractor) = extractor else {
        return fallback.classify();
    };

    match extractor.extract(frame) {
        Ok(faces) => faces
            .first()
            .and_then(FacialFeatures::from_landmarks)
            .map(|features| mood_classifier::classify(&features))
            .unwrap_or_else(|| fallback.classify()),
        Err(e) => {
            log::warn!("landmark extraction failed, falling back to random mood: {e}");
            fallback.classify()
        }
    }
}

fn spawn_fetch_worker(
    mut fetcher: Box<dyn TrackFetcher>,
    jobs: Receiver<FetchJob>,
    event_tx: Sender<SessionEvent>,
    gate: Arc<FetchGate>,
    stop: Arc<AtomicBool>,
    suppress_events: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        // One blocking fetch at a time; the gate serializes dispatch
        for job in jobs.iter() {
            let result = fetcher.fetch_tracks(job.mood);
            gate.release();

            // A result arriving after stop is discarded without an event
            if stop.load(Ordering::Relaxed) || suppress_events.load(Ordering::Relaxed) {
                continue;
            }
            let event = match result {
                Ok(track_count) => SessionEvent::FetchCompleted {
                    mood: job.mood,
                    track_count,
                },
                Err(e) => SessionEvent::FetchFailed {
                    mood: job.mood,
                    error: e.to_string(),
                },
            };
            let _ = event_tx.send(event);
        }
    })
}

/// Sleep in slices so a stop request interrupts promptly.
/// Returns `false` if stopped during the sleep.
fn sleep_interruptible(duration: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
