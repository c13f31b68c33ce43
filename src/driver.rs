//! Running a clock on a calloop event loop.
//!
//! Three kinds of timers drive a clock:
//!
//! - a one-second tick timer that recomputes the countdown (not inserted for
//!   static time),
//! - a frame timer that advances card animations and is only registered
//!   while at least one card is flipping,
//! - one fallback timer per running flip that settles the card if the
//!   animation never reports its end.
//!
//! Fallback timers belonging to cards that settled or unmounted are removed
//! from the loop. Detaching the driver (or dropping it) removes everything.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use chrono::{DateTime, Utc};

use crate::clock::{ClockFrame, FlipClock, TickReport};
use crate::countdown::TimeRemaining;
use crate::digit::{CellId, FlipStarted};
use crate::error::Result;
use crate::segments::Segments;
use crate::time::TimeSource;

/// Countdown cadence
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Animation cadence while any card is flipping
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Receives render snapshots from a running clock.
pub trait FrameSink {
    fn present(&mut self, frame: &ClockFrame);

    /// Called once, on the tick the countdown reaches zero
    fn completed(&mut self) {}
}

impl<F: FnMut(&ClockFrame)> FrameSink for F {
    fn present(&mut self, frame: &ClockFrame) {
        self(frame)
    }
}

struct DriverState {
    clock: FlipClock,
    time: Box<dyn TimeSource>,
    sink: Box<dyn FrameSink>,
    tick_token: Option<RegistrationToken>,
    frame_token: Option<RegistrationToken>,
    /// Armed fallback timers, with the flip generation each belongs to
    fallbacks: HashMap<CellId, (u64, RegistrationToken)>,
}

type Shared = Rc<RefCell<DriverState>>;

pub struct ClockDriver<Data: 'static> {
    shared: Shared,
    handle: LoopHandle<'static, Data>,
}

impl<Data: 'static> ClockDriver<Data> {
    /// Mount `clock` on the loop behind `handle`: run the first tick now,
    /// then keep ticking every second unless the clock shows static time.
    pub fn attach(
        clock: FlipClock,
        time: impl TimeSource + 'static,
        sink: impl FrameSink + 'static,
        handle: &LoopHandle<'static, Data>,
    ) -> Result<Self> {
        let shared = Rc::new(RefCell::new(DriverState {
            clock,
            time: Box::new(time),
            sink: Box::new(sink),
            tick_token: None,
            frame_token: None,
            fallbacks: HashMap::new(),
        }));
        let driver = Self {
            shared,
            handle: handle.clone(),
        };

        driver.tick_now();
        if !driver.shared.borrow().clock.is_static() {
            driver.start_ticking()?;
        }
        Ok(driver)
    }

    fn start_ticking(&self) -> Result<()> {
        if self.shared.borrow().tick_token.is_some() {
            return Ok(());
        }
        let shared = self.shared.clone();
        let handle = self.handle.clone();
        let token = self
            .handle
            .insert_source(Timer::from_duration(TICK_INTERVAL), move |_, _, _| {
                run_tick(&shared, &handle);
                TimeoutAction::ToDuration(TICK_INTERVAL)
            })
            .map_err(|err| err.error)?;
        log::debug!("countdown ticking every {:?}", TICK_INTERVAL);
        self.shared.borrow_mut().tick_token = Some(token);
        Ok(())
    }

    fn stop_ticking(&self) {
        if let Some(token) = self.shared.borrow_mut().tick_token.take() {
            self.handle.remove(token);
        }
    }

    /// Run a tick immediately, outside the regular cadence.
    pub fn tick_now(&self) {
        run_tick(&self.shared, &self.handle);
    }

    /// Count down to a new instant. Takes effect on the next tick; a static
    /// clock starts ticking.
    pub fn set_target(&self, target: DateTime<Utc>) -> Result<()> {
        self.shared.borrow_mut().clock.set_target(target);
        self.start_ticking()
    }

    /// Freeze the clock at `time` and stop ticking.
    pub fn set_static_time(&self, time: TimeRemaining) {
        self.stop_ticking();
        let mut state = self.shared.borrow_mut();
        let report = state.clock.set_static_time(time, Instant::now());
        apply(&mut state, &self.shared, &self.handle, report);
    }

    /// Change visible segments; timers of unmounted cards are cancelled.
    pub fn set_segments(&self, segments: Segments) {
        let mut state = self.shared.borrow_mut();
        let report = state.clock.set_segments(segments, Instant::now());
        apply(&mut state, &self.shared, &self.handle, report);
    }

    pub fn with_clock<R>(&self, f: impl FnOnce(&FlipClock) -> R) -> R {
        f(&self.shared.borrow().clock)
    }

    pub fn is_ticking(&self) -> bool {
        self.shared.borrow().tick_token.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.shared.borrow().frame_token.is_some()
    }

    /// Number of armed fallback timers
    pub fn pending_fallbacks(&self) -> usize {
        self.shared.borrow().fallbacks.len()
    }

    /// Remove every timer of this clock from the loop.
    pub fn detach(&self) {
        let mut state = self.shared.borrow_mut();
        let tokens = state
            .tick_token
            .take()
            .into_iter()
            .chain(state.frame_token.take())
            .chain(state.fallbacks.drain().map(|(_, (_, token))| token))
            .collect::<Vec<_>>();
        drop(state);

        for token in tokens {
            self.handle.remove(token);
        }
    }
}

impl<Data: 'static> Drop for ClockDriver<Data> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn run_tick<Data: 'static>(shared: &Shared, handle: &LoopHandle<'static, Data>) {
    let mut state = shared.borrow_mut();
    let wall = state.time.now();
    let report = state.clock.tick(wall, Instant::now());
    if report.completed {
        state.sink.completed();
    }
    apply(&mut state, shared, handle, report);
}

/// Arm and release timers for `report`, then present a frame.
fn apply<Data: 'static>(
    state: &mut DriverState,
    shared: &Shared,
    handle: &LoopHandle<'static, Data>,
    report: TickReport,
) {
    for id in &report.unmounted {
        if let Some((_, token)) = state.fallbacks.remove(id) {
            handle.remove(token);
        }
    }
    for flip in &report.flips {
        arm_fallback(state, shared, handle, flip);
    }
    release_settled(state, handle);

    if state.clock.is_animating() && state.frame_token.is_none() {
        match insert_frame_timer(shared, handle) {
            Ok(token) => state.frame_token = Some(token),
            Err(err) => log::error!("failed to schedule animation frames: {err}"),
        }
    }

    let frame = state.clock.frame(Instant::now());
    state.sink.present(&frame);
}

fn arm_fallback<Data: 'static>(
    state: &mut DriverState,
    shared: &Shared,
    handle: &LoopHandle<'static, Data>,
    flip: &FlipStarted,
) {
    if let Some((_, stale)) = state.fallbacks.remove(&flip.cell) {
        handle.remove(stale);
    }

    let (cell, generation) = (flip.cell, flip.generation);
    let timer_shared = shared.clone();
    let timer_handle = handle.clone();
    let inserted = handle.insert_source(Timer::from_duration(flip.fallback), move |_, _, _| {
        on_fallback(&timer_shared, &timer_handle, cell, generation);
        TimeoutAction::Drop
    });

    match inserted {
        Ok(token) => {
            state.fallbacks.insert(cell, (generation, token));
        }
        Err(err) => log::error!("failed to arm fallback timer for {cell:?}: {}", err.error),
    }
}

fn on_fallback<Data: 'static>(
    shared: &Shared,
    handle: &LoopHandle<'static, Data>,
    cell: CellId,
    generation: u64,
) {
    let mut state = shared.borrow_mut();
    // This timer is being dropped by the loop; forget its token.
    if matches!(state.fallbacks.get(&cell), Some((g, _)) if *g == generation) {
        state.fallbacks.remove(&cell);
    }

    let flips = state
        .clock
        .fallback_elapsed(cell, generation, Instant::now())
        .into_iter()
        .collect();
    let report = TickReport {
        remaining: state.clock.remaining(),
        flips,
        ..TickReport::default()
    };
    apply(&mut state, shared, handle, report);
}

/// Remove fallback timers whose card is no longer flipping.
fn release_settled<Data: 'static>(state: &mut DriverState, handle: &LoopHandle<'static, Data>) {
    let settled: Vec<CellId> = state
        .fallbacks
        .keys()
        .filter(|id| !state.clock.is_flipping(**id))
        .copied()
        .collect();
    for id in settled {
        if let Some((_, token)) = state.fallbacks.remove(&id) {
            handle.remove(token);
        }
    }
}

fn insert_frame_timer<Data: 'static>(
    shared: &Shared,
    handle: &LoopHandle<'static, Data>,
) -> Result<RegistrationToken> {
    let frame_shared = shared.clone();
    let frame_handle = handle.clone();
    let token = handle
        .insert_source(Timer::from_duration(FRAME_INTERVAL), move |_, _, _| {
            let mut state = frame_shared.borrow_mut();
            let flips = state.clock.advance(Instant::now());
            let report = TickReport {
                remaining: state.clock.remaining(),
                flips,
                ..TickReport::default()
            };
            apply(&mut state, &frame_shared, &frame_handle, report);

            if state.clock.is_animating() {
                TimeoutAction::ToDuration(FRAME_INTERVAL)
            } else {
                state.frame_token = None;
                TimeoutAction::Drop
            }
        })
        .map_err(|err| err.error)?;
    Ok(token)
}
