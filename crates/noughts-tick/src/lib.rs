//! Fixed-interval scheduler for noughts.
//!
//! The server runs two periodic jobs next to message handling: the
//! matchmaking safety-net sweep and the idle reaper. Each owns a
//! [`TickScheduler`] and loops on it:
//!
//! ```ignore
//! let mut ticks = TickScheduler::new(TickConfig::from_period(config.reaper_interval));
//! loop {
//!     let tick = ticks.wait_for_tick().await;
//!     state.orchestrator.lock().await.reap_idle(Instant::now());
//!     ticks.record_tick_end();
//! }
//! ```
//!
//! A tick that wakes up late never produces a burst: missed periods are
//! counted, logged, and the next tick is a full period after the late one.
//! A scheduler built from a zero period is disabled and its
//! [`wait_for_tick`](TickScheduler::wait_for_tick) never resolves, so a job
//! can be switched off by configuration alone.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. `None` disables the scheduler.
    pub period: Option<Duration>,

    /// Share of the period (0.0 to 1.0) a job may run before a warning
    /// is logged.
    pub budget_warn_threshold: f64,

    /// Upper bound of a random delay added to the first tick.
    pub initial_jitter: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: None,
            budget_warn_threshold: 0.8,
            initial_jitter: Duration::from_millis(50),
        }
    }
}

impl TickConfig {
    /// Shortest period accepted; anything shorter is raised to this.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn every(period: Duration) -> Self {
        Self {
            period: Some(period),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Ticks every `period`, or never if `period` is zero.
    pub fn from_period(period: Duration) -> Self {
        if period.is_zero() {
            Self::disabled()
        } else {
            Self::every(period)
        }
    }

    /// Raises a too-short period and clamps the warn threshold.
    pub fn validated(mut self) -> Self {
        match self.period {
            Some(period) if period < Self::MIN_PERIOD => {
                warn!(?period, "tick period below minimum, raising");
                self.period = Some(Self::MIN_PERIOD);
            }
            _ => {}
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

/// One fired tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1 for the first tick.
    pub number: u64,

    /// Whole periods that went by without a tick because this one woke up
    /// late.
    pub skipped: u64,
}

/// Drives one periodic job.
#[derive(Debug)]
pub struct TickScheduler {
    config: TickConfig,
    fired: u64,
    due: Option<TokioInstant>,
    job_started: Option<Instant>,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let due = config
            .period
            .map(|period| TokioInstant::now() + period + jitter(config.initial_jitter));

        match config.period {
            Some(period) => debug!(?period, "tick scheduler started"),
            None => debug!("tick scheduler disabled"),
        }

        Self {
            config,
            fired: 0,
            due,
            job_started: None,
        }
    }

    /// Shorthand for `new(TickConfig::every(period))`.
    pub fn every(period: Duration) -> Self {
        Self::new(TickConfig::every(period))
    }

    /// Sleeps until the next tick is due. Never returns when disabled.
    pub async fn wait_for_tick(&mut self) -> Tick {
        let (Some(due), Some(period)) = (self.due, self.config.period) else {
            return std::future::pending().await;
        };

        time::sleep_until(due).await;

        let now = TokioInstant::now();
        let late_by = now.saturating_duration_since(due);
        let skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
        if skipped > 0 {
            warn!(
                tick = self.fired + 1,
                skipped,
                late_ms = late_by.as_millis() as u64,
                "tick woke up late, skipping ahead"
            );
        }

        self.fired += 1;
        self.due = Some(now + period);
        self.job_started = Some(Instant::now());
        trace!(tick = self.fired, "tick");

        Tick {
            number: self.fired,
            skipped,
        }
    }

    /// Marks the current tick's job as done. Warns if it ate most of the
    /// period. Returns how long the job took, or `None` if no tick was
    /// outstanding.
    pub fn record_tick_end(&mut self) -> Option<Duration> {
        let elapsed = self.job_started.take()?.elapsed();
        if let Some(period) = self.config.period {
            if elapsed.as_secs_f64() >= period.as_secs_f64() * self.config.budget_warn_threshold
            {
                warn!(
                    tick = self.fired,
                    elapsed_ms = elapsed.as_millis() as u64,
                    period_ms = period.as_millis() as u64,
                    "periodic job is close to its period"
                );
            }
        }
        Some(elapsed)
    }

    pub fn is_disabled(&self) -> bool {
        self.config.period.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.fired
    }

    pub fn period(&self) -> Option<Duration> {
        self.config.period
    }
}

fn jitter(max: Duration) -> Duration {
    let max = max.as_micros() as u64;
    if max == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::rng().random_range(0..max))
}
