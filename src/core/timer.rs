use crate::domain::model::TimerState;
use crate::domain::ports::ResendDisplay;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Countdown gating the resend action. One instance is shared across
/// reopen cycles of the OTP dialog; every (re)start resets to a full
/// window.
pub struct ResendTimer {
    inner: Arc<TimerInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct TimerInner {
    state: Mutex<TimerState>,
    display: Arc<dyn ResendDisplay>,
}

impl TimerInner {
    /// One countdown step. Returns false when the countdown finished or
    /// was stopped, telling the driving task to exit.
    fn tick(&self) -> bool {
        let remaining = {
            let mut state = self.state.lock().unwrap();
            if !state.running {
                return false;
            }
            state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
            if state.remaining_seconds == 0 {
                state.running = false;
            }
            state.remaining_seconds
        };

        if remaining == 0 {
            self.display.ready();
            false
        } else {
            self.display.countdown(remaining);
            true
        }
    }
}

impl ResendTimer {
    pub fn new(display: Arc<dyn ResendDisplay>) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                state: Mutex::new(TimerState {
                    remaining_seconds: 0,
                    running: false,
                }),
                display,
            }),
            task: Mutex::new(None),
        }
    }

    /// Cancels any running countdown and restarts from a full window,
    /// pushing a disabled countdown display immediately.
    pub fn start(&self, seconds: u64) {
        self.stop();

        {
            let mut state = self.inner.state.lock().unwrap();
            state.remaining_seconds = seconds;
            state.running = seconds > 0;
        }

        if seconds == 0 {
            self.inner.display.ready();
            return;
        }
        self.inner.display.countdown(seconds);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if !inner.tick() {
                    break;
                }
            }
        });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// Idempotent; freezes the countdown where it is.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        self.inner.state.lock().unwrap().running = false;
    }

    /// One countdown step; exposed so tests can drive the countdown
    /// without wall-clock waits.
    pub fn tick(&self) -> bool {
        self.inner.tick()
    }

    pub fn state(&self) -> TimerState {
        *self.inner.state.lock().unwrap()
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }
}

impl Drop for ResendTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDisplay {
        events: Mutex<Vec<String>>,
    }

    impl RecordingDisplay {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ResendDisplay for RecordingDisplay {
        fn countdown(&self, remaining: u64) {
            self.events.lock().unwrap().push(format!("countdown:{}", remaining));
        }

        fn ready(&self) {
            self.events.lock().unwrap().push("ready".to_string());
        }

        fn resending(&self) {
            self.events.lock().unwrap().push("resending".to_string());
        }

        fn reset(&self) {
            self.events.lock().unwrap().push("reset".to_string());
        }
    }

    fn timer() -> (ResendTimer, Arc<RecordingDisplay>) {
        let display = Arc::new(RecordingDisplay::default());
        (ResendTimer::new(display.clone()), display)
    }

    #[tokio::test]
    async fn test_full_countdown_ends_stopped_with_resend_ready() {
        let (timer, display) = timer();
        timer.start(30);

        for _ in 0..30 {
            timer.tick();
        }

        let state = timer.state();
        assert_eq!(state.remaining_seconds, 0);
        assert!(!state.running);
        assert_eq!(display.events().last().map(String::as_str), Some("ready"));
    }

    #[tokio::test]
    async fn test_stop_freezes_countdown_without_enabling_resend() {
        let (timer, display) = timer();
        timer.start(30);

        for _ in 0..10 {
            timer.tick();
        }
        timer.stop();

        let state = timer.state();
        assert_eq!(state.remaining_seconds, 20);
        assert!(!state.running);
        assert!(!display.events().contains(&"ready".to_string()));

        // A stopped timer ignores further ticks.
        assert!(!timer.tick());
        assert_eq!(timer.state().remaining_seconds, 20);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (timer, _display) = timer();
        timer.stop();
        timer.start(5);
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_restart_resets_to_a_full_window() {
        tokio_test::block_on(async {
            let (timer, display) = timer();
            timer.start(30);
            for _ in 0..5 {
                timer.tick();
            }
            assert_eq!(timer.state().remaining_seconds, 25);

            timer.start(30);
            let state = timer.state();
            assert_eq!(state.remaining_seconds, 30);
            assert!(state.running);
            assert_eq!(
                display.events().last().map(String::as_str),
                Some("countdown:30")
            );
        });
    }

    #[tokio::test]
    async fn test_display_sees_each_remaining_value() {
        let (timer, display) = timer();
        timer.start(3);
        timer.tick();
        timer.tick();
        timer.tick();
        assert_eq!(
            display.events(),
            vec!["countdown:3", "countdown:2", "countdown:1", "ready"]
        );
    }
}
