//! Single-shot cooperative shutdown signal.
//!
//! The signal side owns the only [`Sender`]; signaling is dropping it, which
//! disconnects the channel. Disconnection is permanent, so every later poll
//! of the token observes the signaled state. Because
//! [`ShutdownSignal::signal`] takes `self`, signaling twice does not
//! compile. A `ShutdownSignal` that goes out of scope unsignaled signals on
//! drop, so a worker polling the token can never be left waiting on a signal
//! nobody can fire anymore.
//!
//! Cancellation stays cooperative: a worker only reacts at its poll points.
//! One blocked in external I/O is unaffected until that call returns.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

/// Creates a connected signal/token pair.
pub fn shutdown_pair() -> (ShutdownSignal, ShutdownToken) {
    let (tx, rx) = bounded::<()>(0);
    (ShutdownSignal { _tx: tx }, ShutdownToken { rx })
}

/// The controlling side. Fires at most once, enforced by move.
#[derive(Debug)]
pub struct ShutdownSignal {
    _tx: Sender<()>,
}

impl ShutdownSignal {
    /// Fires the signal by disconnecting the channel.
    pub fn signal(self) {
        // Dropping the sender is the signal.
    }
}

/// The observing side. Polled by workers between units of work.
///
/// Clones observe the same signal. Once signaled, every poll returns `true`
/// forever.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: Receiver<()>,
}

impl ShutdownToken {
    /// Non-blocking poll of the signal state.
    pub fn is_signaled(&self) -> bool {
        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    /// The underlying receiver, for use as a `select!` arm.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

#[cfg(test)]
mod signal_tests {
    use super::*;

    #[test]
    fn token_starts_unsignaled() {
        let (_signal, token) = shutdown_pair();
        assert!(!token.is_signaled());
        assert!(!token.is_signaled());
    }

    #[test]
    fn signal_is_permanent() {
        let (signal, token) = shutdown_pair();
        signal.signal();
        assert!(token.is_signaled());
        assert!(token.is_signaled());
    }

    #[test]
    fn dropping_the_signal_also_signals() {
        let (signal, token) = shutdown_pair();
        drop(signal);
        assert!(token.is_signaled());
    }

    #[test]
    fn cloned_tokens_share_the_signal() {
        let (signal, token) = shutdown_pair();
        let second = token.clone();
        signal.signal();
        assert!(token.is_signaled());
        assert!(second.is_signaled());
    }
}
