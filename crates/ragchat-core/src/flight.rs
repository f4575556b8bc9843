use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// At most one operation of a kind in progress at a time.
///
/// The flag is set while a [`FlightGuard`] is alive. Dropping the guard
/// clears it, whichever way the operation ends.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_guard_drops() {
        let flight = SingleFlight::new();
        let guard = flight.try_acquire();
        assert!(guard.is_some());
        assert!(flight.is_busy());
        assert!(flight.try_acquire().is_none());

        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_acquire().is_some());
    }

    #[test]
    fn guard_clears_flag_on_panic() {
        let flight = SingleFlight::new();
        let inner = flight.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = inner.try_acquire();
            panic!("round-trip blew up");
        });
        assert!(result.is_err());
        assert!(!flight.is_busy());
    }
}
