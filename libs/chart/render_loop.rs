//! Frame driver
//!
//! One thread owns the [`ChartContext`] and runs everything to completion in
//! order: surface events, due append ticks, the scroll update, one draw.
//! Appends are driven by their own [`AppendTimer`], so the data cadence is
//! independent of the frame rate.

use crate::config::{ChartConfig, TimeStepMode};
use crate::context::{ChartContext, Scene};
use crate::error::ChartError;
use price_feed::PriceSample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Longest frame delta applied in measured mode
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// How much the clock advances per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeStep {
    /// Constant nominal delta, whatever the real frame time
    Fixed { delta: Duration },
    /// Real elapsed time, capped at `max_delta`
    Measured { max_delta: Duration },
}

impl TimeStep {
    pub fn from_config(config: &ChartConfig) -> Self {
        match config.time_step {
            TimeStepMode::Fixed => TimeStep::Fixed {
                delta: config.frame_interval(),
            },
            TimeStepMode::Measured => TimeStep::Measured {
                max_delta: MAX_FRAME_DELTA,
            },
        }
    }

    pub fn delta(&self, elapsed: Duration) -> Duration {
        match *self {
            TimeStep::Fixed { delta } => delta,
            TimeStep::Measured { max_delta } => elapsed.min(max_delta),
        }
    }
}

/// Fires once per interval. The first poll fires immediately; missed periods
/// collapse into a single tick.
#[derive(Debug, Clone)]
pub struct AppendTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl AppendTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.interval);
                true
            }
            Some(due) if now >= due => {
                let next = due + self.interval;
                self.next_due = Some(if next <= now { now + self.interval } else { next });
                true
            }
            Some(_) => false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Host input the loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Resize { width: u32, height: u32 },
    Quit,
}

/// Something the chart can be drawn on
pub trait RenderSurface {
    /// Current drawable size
    fn size(&self) -> (u32, u32);

    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), ChartError>;

    /// Wait up to `timeout` for the next event
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<SurfaceEvent>, ChartError>;
}

/// What one call to [`RenderLoop::frame`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub appended: bool,
    pub time: f64,
    pub scroll_distance: f64,
}

pub struct RenderLoop {
    state: LoopState,
    time_step: TimeStep,
    append_timer: AppendTimer,
    frame_interval: Duration,
    /// World units per second
    scroll_speed: f64,
    time: f64,
    last_frame: Option<Instant>,
    frames: u64,
    ticks: u64,
}

impl RenderLoop {
    pub fn new(config: &ChartConfig, step: f64) -> Self {
        let append_interval = config.append_interval();
        Self {
            state: LoopState::Idle,
            time_step: TimeStep::from_config(config),
            append_timer: AppendTimer::new(append_interval),
            frame_interval: config.frame_interval(),
            scroll_speed: step / append_interval.as_secs_f64(),
            time: 0.0,
            last_frame: None,
            frames: 0,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Idle -> Running. There is no way back.
    pub fn start(&mut self) -> Result<(), ChartError> {
        match self.state {
            LoopState::Idle => {
                self.state = LoopState::Running;
                info!(
                    "[Chart] Render loop started ({:?}, {:.1} fps, scroll {} u/s)",
                    self.time_step,
                    1.0 / self.frame_interval.as_secs_f64(),
                    self.scroll_speed
                );
                Ok(())
            }
            LoopState::Running => Err(ChartError::InvalidState(
                "render loop is already running".to_string(),
            )),
        }
    }

    /// Seconds of animation time so far
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn scroll_speed(&self) -> f64 {
        self.scroll_speed
    }

    /// Advance the clock for a frame starting at `now`
    pub fn advance(&mut self, now: Instant) -> f64 {
        let elapsed = self
            .last_frame
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_frame = Some(now);
        self.time += self.time_step.delta(elapsed).as_secs_f64();
        self.time
    }

    /// Model work for one frame: a due append (with eviction) completes
    /// before the clock advances and the scroll is applied.
    pub fn frame(
        &mut self,
        ctx: &mut ChartContext,
        latest: &PriceSample,
        now: Instant,
    ) -> Result<FrameReport, ChartError> {
        if self.state != LoopState::Running {
            return Err(ChartError::InvalidState(
                "render loop has not been started".to_string(),
            ));
        }

        let appended = self.append_timer.poll(now);
        if appended {
            ctx.append_tick(latest);
            self.ticks += 1;
        }

        let time = self.advance(now);
        let scroll_distance = time * self.scroll_speed;
        ctx.update_scroll(scroll_distance);
        self.frames += 1;

        Ok(FrameReport {
            appended,
            time,
            scroll_distance,
        })
    }

    /// Drive frames until `keep_running` is cleared or the surface asks to
    /// quit. Surface errors are logged and never stop the loop.
    pub fn run<S, F>(
        &mut self,
        ctx: &mut ChartContext,
        surface: &mut S,
        latest: F,
        keep_running: &AtomicBool,
    ) -> Result<(), ChartError>
    where
        S: RenderSurface,
        F: Fn() -> PriceSample,
    {
        self.start()?;

        let (width, height) = surface.size();
        ctx.set_pixel_ratio(surface.pixel_ratio());
        ctx.resize(width, height);

        let mut draw_failures = 0u64;

        while keep_running.load(Ordering::Acquire) {
            let frame_start = Instant::now();

            if self.drain_events(ctx, surface, Duration::ZERO) {
                break;
            }

            self.frame(ctx, &latest(), frame_start)?;

            if let Err(e) = surface.draw(&ctx.scene()) {
                draw_failures += 1;
                warn!("[Chart] Draw failed (#{}): {}", draw_failures, e);
            }

            // Yield until the next frame deadline, still reacting to input
            let deadline = frame_start + self.frame_interval;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !remaining.is_zero() && self.drain_events(ctx, surface, remaining) {
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }

        info!(
            "[Chart] Render loop stopped after {} frames, {} appends",
            self.frames, self.ticks
        );
        Ok(())
    }

    /// Handle pending surface events. Returns true on quit.
    fn drain_events<S: RenderSurface>(
        &mut self,
        ctx: &mut ChartContext,
        surface: &mut S,
        timeout: Duration,
    ) -> bool {
        let mut wait = timeout;
        loop {
            match surface.poll_event(wait) {
                Ok(Some(SurfaceEvent::Resize { width, height })) => ctx.resize(width, height),
                Ok(Some(SurfaceEvent::Quit)) => {
                    debug!("[Chart] Quit requested by surface");
                    return true;
                }
                Ok(None) => return false,
                Err(e) => {
                    warn!("[Chart] Event poll failed: {}", e);
                    return false;
                }
            }
            // Only the first poll may block
            wait = Duration::ZERO;
        }
    }
}
