use super::error::EngineError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pause and stop flags shared between a running optimization and its host.
///
/// Clones share the same flags. The engine consults the channel only between
/// evaluator calls, so an evaluation in flight always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct ControlChannel {
    pause: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl ControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.pause.store(false, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Blocks while paused; fails with [`EngineError::Cancelled`] once stopped.
    pub fn checkpoint(&self) -> Result<(), EngineError> {
        while self.is_paused() && !self.is_stopped() {
            thread::sleep(PAUSE_POLL_INTERVAL);
        }
        if self.is_stopped() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_passes_when_idle() {
        assert!(ControlChannel::new().checkpoint().is_ok());
    }

    #[test]
    fn stop_is_shared_between_clones() {
        let control = ControlChannel::new();
        let host = control.clone();
        host.stop();
        assert!(matches!(control.checkpoint(), Err(EngineError::Cancelled)));
    }

    #[test]
    fn checkpoint_blocks_until_resumed() {
        let control = ControlChannel::new();
        control.pause();
        let host = control.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(120));
            host.resume();
        });

        assert!(control.checkpoint().is_ok());
        assert!(!control.is_paused());
        handle.join().unwrap();
    }

    #[test]
    fn stop_releases_a_paused_checkpoint() {
        let control = ControlChannel::new();
        control.pause();
        control.stop();
        assert!(matches!(control.checkpoint(), Err(EngineError::Cancelled)));
    }
}
