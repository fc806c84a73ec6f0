//! Single-flight guard for a session's persistence calls
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether a message for the session is in flight. Clones share
/// the same flag, so the caller can hold one to check before dispatching.
#[derive(Debug, Clone, Default)]
pub struct MessageGate {
    sending: Arc<AtomicBool>,
}

/// Held for the duration of a call; dropping it clears the flag.
#[derive(Debug)]
pub struct InFlight {
    sending: Arc<AtomicBool>,
}

impl MessageGate {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }
    /// `None` while another message is outstanding
    pub fn try_begin(&self) -> Option<InFlight> {
        self.sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                sending: Arc::clone(&self.sending),
            })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.sending.store(false, Ordering::Release);
    }
}
