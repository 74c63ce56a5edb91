// Playback over one bound viewer: clamp-and-seek navigation plus a
// stopped/playing machine driven by a host-owned repeating timer. The
// controller never arms timers itself; `play` hands the period to the caller,
// `tick` is invoked on each firing and `pause` returns the handle to cancel.
// Invariant: a timer handle is stored iff playback is running.

use std::time::Duration;

use crate::viewer::ViewerHandle;

pub const PLAYBACK_PERIOD: Duration = Duration::from_millis(1000);

/// Outcome of one timer firing. `Finished` carries the armed timer handle,
/// which the caller must cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick<H> {
    Advanced,
    Finished(Option<H>),
}

pub struct PlaybackController<V: ViewerHandle, H> {
    viewer: V,
    current_move: usize,
    total_moves: usize,
    timer: Option<H>,
}

impl<V: ViewerHandle, H> PlaybackController<V, H> {
    pub fn new(viewer: V) -> Self {
        let mut controller =
            PlaybackController { viewer, current_move: 0, total_moves: 0, timer: None };
        controller.refresh_move_info();
        controller
    }

    pub fn viewer(&self) -> &V { &self.viewer }
    pub fn current_move(&self) -> usize { self.current_move }
    pub fn total_moves(&self) -> usize { self.total_moves }
    pub fn is_playing(&self) -> bool { self.timer.is_some() }

    /// Re-derives the cached counters from the viewer. Must be called after a
    /// new record is loaded into the bound viewer. A viewer that has not
    /// exposed its move list yet is not an error: cached values stay.
    pub fn refresh_move_info(&mut self) {
        match (self.viewer.current_move(), self.viewer.total_moves()) {
            (Some(current), Some(total)) => {
                self.total_moves = total;
                self.current_move = current.min(total);
            }
            _ => log::debug!("Viewer not ready yet; keeping cached move info"),
        }
    }

    fn seek(&mut self, index: usize) {
        let index = index.min(self.total_moves);
        self.viewer.seek(index);
        self.current_move = index;
        self.refresh_move_info();
    }

    pub fn go_to_start(&mut self) { self.seek(0); }
    pub fn go_to_previous(&mut self) { self.seek(self.current_move.saturating_sub(1)); }
    pub fn go_to_next(&mut self) { self.seek(self.current_move + 1); }
    pub fn go_to_end(&mut self) { self.seek(self.total_moves); }

    /// Begins playback: returns the period the caller must arm a repeating
    /// timer with, then hand the armed handle back via `attach_timer`.
    /// `None` when already playing. Starting from the last move rewinds to
    /// the start first.
    pub fn play(&mut self) -> Option<Duration> {
        if self.is_playing() {
            return None;
        }
        self.refresh_move_info();
        if self.current_move >= self.total_moves {
            self.go_to_start();
        }
        Some(PLAYBACK_PERIOD)
    }

    pub fn attach_timer(&mut self, handle: H) {
        debug_assert!(self.timer.is_none(), "timer already armed");
        self.timer = Some(handle);
    }

    /// Stops playback, returning the handle the caller must cancel. Safe to
    /// call when already stopped.
    pub fn pause(&mut self) -> Option<H> { self.timer.take() }

    /// One timer firing: advance, or stop at the end.
    pub fn tick(&mut self) -> Tick<H> {
        if self.current_move < self.total_moves {
            self.go_to_next();
            Tick::Advanced
        } else {
            Tick::Finished(self.timer.take())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::FakeViewer;

    type TestController = PlaybackController<FakeViewer, u32>;

    fn controller_with_moves(total: usize) -> TestController {
        PlaybackController::new(FakeViewer::ready(total))
    }

    // Drives the caller's side of the timer contract.
    fn start_playback(controller: &mut TestController, handle: u32) {
        assert_eq!(controller.play(), Some(PLAYBACK_PERIOD));
        controller.attach_timer(handle);
    }

    #[test]
    fn navigation_clamps_to_bounds() {
        let mut controller = controller_with_moves(3);
        controller.go_to_previous();
        assert_eq!(controller.current_move(), 0);
        controller.go_to_end();
        assert_eq!(controller.current_move(), 3);
        controller.go_to_next();
        assert_eq!(controller.current_move(), 3);
        controller.go_to_previous();
        assert_eq!(controller.current_move(), 2);
        controller.go_to_start();
        assert_eq!(controller.current_move(), 0);
    }

    #[test]
    fn unready_viewer_keeps_cached_state() {
        let mut controller: TestController = PlaybackController::new(FakeViewer::uninitialized());
        assert_eq!(controller.total_moves(), 0);
        controller.go_to_next();
        assert_eq!(controller.current_move(), 0);
        // Seeks are still forwarded, clamped to the cached total.
        assert_eq!(controller.viewer().seeks(), vec![0]);
    }

    #[test]
    fn play_from_the_end_rewinds_first() {
        let mut controller = controller_with_moves(2);
        controller.go_to_end();
        start_playback(&mut controller, 7);
        // The rewind happened before the first timer firing.
        assert_eq!(controller.current_move(), 0);
        assert!(controller.is_playing());
        assert_eq!(controller.viewer().seeks(), vec![2, 0]);
    }

    #[test]
    fn playback_runs_to_the_end_and_stops() {
        let mut controller = controller_with_moves(3);
        start_playback(&mut controller, 42);
        for expected in 1..=3 {
            assert_eq!(controller.tick(), Tick::Advanced);
            assert_eq!(controller.current_move(), expected);
        }
        assert_eq!(controller.tick(), Tick::Finished(Some(42)));
        assert!(!controller.is_playing());
        // The timer is gone: a stray late firing reports nothing to cancel.
        assert_eq!(controller.tick(), Tick::Finished(None));
    }

    #[test]
    fn play_while_playing_is_rejected() {
        let mut controller = controller_with_moves(3);
        start_playback(&mut controller, 1);
        assert_eq!(controller.play(), None);
    }

    #[test]
    fn pause_returns_the_handle_once() {
        let mut controller = controller_with_moves(3);
        start_playback(&mut controller, 5);
        assert_eq!(controller.pause(), Some(5));
        assert!(!controller.is_playing());
        assert_eq!(controller.pause(), None);
    }

    #[test]
    fn zero_move_record_finishes_immediately() {
        let mut controller = controller_with_moves(0);
        start_playback(&mut controller, 9);
        assert_eq!(controller.tick(), Tick::Finished(Some(9)));
    }

    #[test]
    fn refresh_after_load_rederives_counters() {
        let mut controller = controller_with_moves(3);
        controller.go_to_end();
        controller.viewer().set_total_moves(5);
        controller.refresh_move_info();
        assert_eq!(controller.total_moves(), 5);
        assert_eq!(controller.current_move(), 3);
    }
}
