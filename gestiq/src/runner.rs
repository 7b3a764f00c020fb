//! Processing loop: pull frames from a provider, feed the session, emit
//! events, and stop on signal, timer, stop gesture or end of input.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, error, info};

use crate::action::ActionDispatcher;
use crate::frame_timing::FrameTiming;
use crate::gesture::Transition;
use crate::provider::{KeypointProvider, Polled};
use crate::session::{DispatchOutcome, FrameOutcome, Session};
use crate::sexp;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    // A second signal terminates immediately
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Stop after this long (for scripted runs and CI).
    pub exit_after: Option<Duration>,
    /// Write one s-expression per fired/suppressed gesture to the output.
    pub emit_events: bool,
    pub status_interval: Duration,
    /// Longest wait for a frame before the stop conditions are checked again.
    pub poll_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            exit_after: None,
            emit_events: false,
            status_interval: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfInput,
    InputError,
    StopGesture,
    Signal,
    ExitTimer,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndOfInput => "end-of-input",
            Self::InputError => "input-error",
            Self::StopGesture => "stop-gesture",
            Self::Signal => "signal",
            Self::ExitTimer => "exit-timer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub fires: u64,
    pub reason: StopReason,
}

// ── Frame clock ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timebase {
    Detector,
    Loop,
}

/// Picks one timebase per run so the debouncer never compares detector
/// time with loop time.  The first frame decides: detector timestamps if
/// it carries one, time since the loop started otherwise.
#[derive(Debug)]
struct FrameClock {
    start: Instant,
    timebase: Option<Timebase>,
    last: Duration,
}

impl FrameClock {
    fn new(start: Instant) -> Self {
        Self {
            start,
            timebase: None,
            last: Duration::ZERO,
        }
    }

    fn stamp(&mut self, detector: Option<Duration>, now: Instant) -> Duration {
        let timebase = *self.timebase.get_or_insert_with(|| {
            let timebase = if detector.is_some() { Timebase::Detector } else { Timebase::Loop };
            debug!("Frame clock: using {:?} time", timebase);
            timebase
        });
        let stamp = match (timebase, detector) {
            (Timebase::Detector, Some(t)) => t,
            // Missing detector time: hold the last stamp
            (Timebase::Detector, None) => self.last,
            (Timebase::Loop, _) => now.saturating_duration_since(self.start),
        };
        self.last = stamp;
        stamp
    }
}

// ── Loop ───────────────────────────────────────────────────

/// Run until a stop condition.  The provider is polled with
/// `config.poll_interval` so signals and the exit timer are noticed while
/// input is silent.
pub fn run<P, D, W>(
    provider: &mut P,
    session: &mut Session<D>,
    config: &RunnerConfig,
    out: &mut W,
) -> anyhow::Result<RunSummary>
where
    P: KeypointProvider,
    D: ActionDispatcher,
    W: Write,
{
    let start_time = Instant::now();
    let mut last_status_log = Instant::now();
    let mut timing = FrameTiming::default();
    let mut clock = FrameClock::new(start_time);
    let mut acquire_start = Instant::now();

    info!("Entering frame loop");

    let reason = loop {
        // Check global shutdown flag (set by signal handler)
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown signal received, exiting");
            break StopReason::Signal;
        }

        if let Some(dur) = config.exit_after {
            if start_time.elapsed() >= dur {
                info!("Exit timer fired after {}ms", dur.as_millis());
                break StopReason::ExitTimer;
            }
        }

        if last_status_log.elapsed() >= config.status_interval {
            info!("Status: {} timing {}", session.status_sexp(), timing.stats_sexp());
            last_status_log = Instant::now();
        }

        let frame = match provider.poll_frame(config.poll_interval) {
            Ok(Polled::Frame(frame)) => frame,
            Ok(Polled::Idle) => continue,
            Ok(Polled::End) => {
                info!("End of input");
                break StopReason::EndOfInput;
            }
            Err(e) => {
                error!("Keypoint provider failed: {}", e);
                break StopReason::InputError;
            }
        };
        let acquire_ms = acquire_start.elapsed().as_secs_f64() * 1000.0;

        let process_start = Instant::now();
        let timestamp = clock.stamp(frame.timestamp, process_start);
        let outcome = session.process_frame(&frame, timestamp);
        timing.record_frame(acquire_ms, process_start.elapsed().as_secs_f64() * 1000.0);
        acquire_start = Instant::now();

        if config.emit_events {
            if let Some(line) = event_line(session, &outcome) {
                writeln!(out, "{}", line).context("failed to write event")?;
                out.flush().context("failed to flush events")?;
            }
        }

        if session.stop_requested {
            break StopReason::StopGesture;
        }
    };

    let summary = RunSummary {
        frames: session.frames,
        fires: session.debouncer().stats().fires,
        reason,
    };
    info!(
        "Frame loop finished ({}): {} frames, {} fires, timing {}",
        reason.as_str(),
        summary.frames,
        summary.fires,
        timing.stats_sexp()
    );
    Ok(summary)
}

/// Event s-expression for a fired or suppressed gesture.
fn event_line<D: ActionDispatcher>(session: &Session<D>, outcome: &FrameOutcome) -> Option<String> {
    let timestamp_ms = outcome.event.timestamp.as_millis().to_string();
    match outcome.transition {
        Transition::Fired(label) => {
            let mut fields = vec![("gesture", format!(":{}", label.as_str()))];
            if let Some(binding) = session.binding(label) {
                fields.push(("action", sexp::quote(binding.target.name())));
                fields.push(("description", sexp::quote(&binding.description)));
                fields.push(("color", sexp::quote(&binding.color)));
            }
            let status = match outcome.dispatch {
                Some(DispatchOutcome::Dispatched) => "dispatched",
                Some(DispatchOutcome::Failed) => "failed",
                Some(DispatchOutcome::Unbound) | None => "unbound",
                Some(DispatchOutcome::Stop) => "stop",
            };
            fields.push(("status", format!(":{}", status)));
            fields.push(("timestamp-ms", timestamp_ms));
            Some(sexp::format_event("gesture-fired", &fields))
        }
        Transition::Suppressed(label) => Some(sexp::format_event(
            "gesture-suppressed",
            &[
                ("gesture", format!(":{}", label.as_str())),
                ("timestamp-ms", timestamp_ms),
            ],
        )),
        _ => None,
    }
}

// ── Tests ──────────────────────────────────────────────────
