//! Session scheduler
//!
//! Owns the current session and decides, for every host callback, whether
//! the frame chain and the 1 Hz interval keep going. The host (browser or
//! a test harness) only executes those decisions, so there is never more
//! than one live frame chain no matter how often a session is restarted.

use super::state::GameSession;
use super::tick::{self, Command};
use crate::tuning::Tuning;

/// Identifies one frame chain; callbacks from an older chain are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(u64);

/// What the host should do after `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPlan {
    /// Clear the previous session's interval before creating a new one
    pub cancel_interval: bool,
    /// Request a first frame carrying this token
    pub start_frame_loop: Option<FrameToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Request the next frame with the same token
    Reschedule,
    /// Let the chain end
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalOutcome {
    Continue,
    /// Session over: clear the interval and cancel the pending frame
    Cancel,
}

#[derive(Debug)]
pub struct Scheduler {
    tuning: Tuning,
    session: Option<GameSession>,
    /// Token of the live frame chain, if one is running
    frame_chain: Option<FrameToken>,
    next_chain: u64,
    interval_active: bool,
    /// Frame callbacks handled (any chain, any state)
    frame_callbacks: u64,
}

impl Scheduler {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            session: None,
            frame_chain: None,
            next_chain: 0,
            interval_active: false,
            frame_callbacks: 0,
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    /// Use a different tuning from the next start on
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn frame_loop_active(&self) -> bool {
        self.frame_chain.is_some()
    }

    pub fn interval_active(&self) -> bool {
        self.interval_active
    }

    pub fn frame_callbacks(&self) -> u64 {
        self.frame_callbacks
    }

    /// Start a fresh session, replacing any current one
    ///
    /// A frame chain that is still alive keeps running and simply picks up
    /// the new session; a new chain is only requested when none is live.
    pub fn start(&mut self, seed: u64) -> StartPlan {
        let restarting = self.session.is_some();
        self.session = Some(GameSession::new(seed, self.tuning.clone()));

        let cancel_interval = self.interval_active;
        self.interval_active = true;

        let start_frame_loop = if self.frame_chain.is_none() {
            let token = FrameToken(self.next_chain);
            self.next_chain += 1;
            self.frame_chain = Some(token);
            Some(token)
        } else {
            None
        };

        if restarting {
            log::info!("Session restarted (seed {})", seed);
        } else {
            log::info!("Session started (seed {})", seed);
        }

        StartPlan {
            cancel_interval,
            start_frame_loop,
        }
    }

    /// Host frame callback
    pub fn on_frame(&mut self, token: FrameToken) -> FrameOutcome {
        self.frame_callbacks += 1;

        if self.frame_chain != Some(token) {
            log::debug!("Dropping stale frame chain {:?}", token);
            return FrameOutcome::Stop;
        }

        match self.session.as_mut() {
            Some(session) if !session.is_over() => {
                tick::frame_tick(session);
                FrameOutcome::Reschedule
            }
            _ => {
                self.frame_chain = None;
                FrameOutcome::Stop
            }
        }
    }

    /// Host 1 Hz callback
    pub fn on_second(&mut self) -> IntervalOutcome {
        let Some(session) = self.session.as_mut() else {
            self.interval_active = false;
            return IntervalOutcome::Cancel;
        };

        tick::second_tick(session);
        if session.is_over() {
            self.interval_active = false;
            // Any frame still queued for this chain is now stale
            self.frame_chain = None;
            IntervalOutcome::Cancel
        } else {
            IntervalOutcome::Continue
        }
    }

    /// Forward player input to the session
    pub fn handle(&mut self, command: Command) {
        if let Some(session) = self.session.as_mut() {
            tick::apply_command(session, command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, RunState};

    /// Stand-in for the browser: a queue of pending frame callbacks and one
    /// optional interval
    #[derive(Default)]
    struct FakeHost {
        pending_frames: Vec<FrameToken>,
        interval: bool,
        intervals_created: u32,
    }

    impl FakeHost {
        fn start(&mut self, scheduler: &mut Scheduler, seed: u64) {
            let plan = scheduler.start(seed);
            if plan.cancel_interval {
                assert!(self.interval);
                self.interval = false;
            }
            assert!(!self.interval, "interval leaked across sessions");
            self.interval = true;
            self.intervals_created += 1;
            if let Some(token) = plan.start_frame_loop {
                self.pending_frames.push(token);
            }
        }

        /// One display refresh: run every callback queued for it
        fn frame(&mut self, scheduler: &mut Scheduler) {
            for token in std::mem::take(&mut self.pending_frames) {
                if scheduler.on_frame(token) == FrameOutcome::Reschedule {
                    self.pending_frames.push(token);
                }
            }
        }

        fn second(&mut self, scheduler: &mut Scheduler) {
            if self.interval && scheduler.on_second() == IntervalOutcome::Cancel {
                self.interval = false;
            }
        }
    }

    fn running() -> (Scheduler, FakeHost) {
        let mut scheduler = Scheduler::new(Tuning::default());
        let mut host = FakeHost::default();
        host.start(&mut scheduler, 42);
        (scheduler, host)
    }

    #[test]
    fn test_first_start_requests_one_chain() {
        let (scheduler, host) = running();
        assert_eq!(host.pending_frames.len(), 1);
        assert!(scheduler.frame_loop_active());
        assert!(scheduler.interval_active());
        assert_eq!(scheduler.session().unwrap().state, RunState::Running);
    }

    #[test]
    fn test_countdown_to_over_stops_frames() {
        let (mut scheduler, mut host) = running();
        for _ in 0..60 {
            host.frame(&mut scheduler);
            host.second(&mut scheduler);
        }

        let session = scheduler.session().unwrap();
        assert_eq!(session.state, RunState::Over);
        assert_eq!(session.time_left, 0);
        assert!(!host.interval);

        // The pending frame sees Over and ends the chain
        host.frame(&mut scheduler);
        assert!(host.pending_frames.is_empty());
        assert!(!scheduler.frame_loop_active());

        let ticks = scheduler.session().unwrap().frame_ticks;
        host.frame(&mut scheduler);
        assert_eq!(scheduler.session().unwrap().frame_ticks, ticks);
    }

    #[test]
    fn test_pause_freezes_positions_then_resumes() {
        let (mut scheduler, mut host) = running();
        for _ in 0..130 {
            host.frame(&mut scheduler);
        }
        let frozen: Vec<_> = scheduler.session().unwrap().foods.all().to_vec();
        assert!(!frozen.is_empty());

        scheduler.handle(Command::TogglePause);
        for _ in 0..10 {
            host.frame(&mut scheduler);
            host.second(&mut scheduler);
        }
        let session = scheduler.session().unwrap();
        assert_eq!(session.foods.all(), frozen.as_slice());
        assert_eq!(session.time_left, 60);
        // Chain stays alive while paused
        assert_eq!(host.pending_frames.len(), 1);

        scheduler.handle(Command::TogglePause);
        host.frame(&mut scheduler);
        let session = scheduler.session().unwrap();
        for before in &frozen {
            if let Some(after) = session.foods.get(before.id) {
                let expected = before.pos.y + before.speed * session.difficulty.speed_multiplier;
                assert!((after.pos.y - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_restart_resets_without_second_chain() {
        let (mut scheduler, mut host) = running();
        for _ in 0..200 {
            host.frame(&mut scheduler);
        }
        for _ in 0..5 {
            host.second(&mut scheduler);
        }
        scheduler.handle(Command::MoveRight);
        if let Some(session) = scheduler.session_mut() {
            session.score = 420;
            session.level = 3;
            let tuning = session.tuning.clone();
            session.difficulty.escalate(&tuning);
            session.difficulty.escalate(&tuning);
            assert_ne!(session.difficulty, Difficulty::initial(&tuning));
        }

        host.start(&mut scheduler, 7);
        let session = scheduler.session().unwrap();
        assert_eq!(session.score, 0);
        assert_eq!(session.level, 1);
        assert_eq!(session.difficulty, Difficulty::initial(&Tuning::default()));
        assert_eq!(session.time_left, 60);
        assert_eq!(session.player.x, 410.0);
        assert!(session.foods.is_empty());
        assert_eq!(host.pending_frames.len(), 1);
        assert_eq!(host.intervals_created, 2);

        let callbacks = scheduler.frame_callbacks();
        for expected in 1..=50 {
            host.frame(&mut scheduler);
            assert_eq!(scheduler.session().unwrap().frame_ticks, expected);
        }
        // One tick per frame callback
        assert_eq!(scheduler.frame_callbacks(), callbacks + 50);
    }

    #[test]
    fn test_restart_after_over_starts_exactly_one_chain() {
        let (mut scheduler, mut host) = running();
        for _ in 0..60 {
            host.second(&mut scheduler);
        }
        assert!(scheduler.session().unwrap().is_over());

        // Restart before the old chain's pending frame has fired
        host.start(&mut scheduler, 9);
        assert_eq!(host.pending_frames.len(), 2);

        let callbacks = scheduler.frame_callbacks();
        host.frame(&mut scheduler);
        assert_eq!(host.pending_frames.len(), 1);
        // Both callbacks ran, only the live chain ticked
        assert_eq!(scheduler.frame_callbacks(), callbacks + 2);
        assert_eq!(scheduler.session().unwrap().frame_ticks, 1);

        host.frame(&mut scheduler);
        assert_eq!(scheduler.frame_callbacks(), callbacks + 3);
        assert_eq!(scheduler.session().unwrap().frame_ticks, 2);
    }

    #[test]
    fn test_callbacks_before_start_are_harmless() {
        let mut scheduler = Scheduler::new(Tuning::default());
        assert_eq!(scheduler.on_second(), IntervalOutcome::Cancel);
        assert_eq!(scheduler.on_frame(FrameToken(0)), FrameOutcome::Stop);
        scheduler.handle(Command::TogglePause);
        assert!(scheduler.session().is_none());
    }
}
