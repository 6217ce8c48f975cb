//! Trailing-edge debouncer on the tokio timer.
//!
//! Each [`Debouncer::schedule`] aborts the previously scheduled delivery and
//! starts a new quiet period. When the period elapses the value is sent to
//! the owner's channel wrapped with a ticket; the owner passes the ticket
//! back to [`Debouncer::accept`], which only succeeds for the latest one.
//! A delivery that raced a reschedule is therefore recognised as stale.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Debouncer<T, M> {
    delay: Duration,
    sender: mpsc::UnboundedSender<M>,
    wrap: fn(u64, T) -> M,
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

impl<T, M> Debouncer<T, M>
where
    T: Send + 'static,
    M: Send + 'static,
{
    pub fn new(delay: Duration, sender: mpsc::UnboundedSender<M>, wrap: fn(u64, T) -> M) -> Self {
        Self {
            delay,
            sender,
            wrap,
            ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restarts the quiet period with a new value. Must be called from
    /// within a tokio runtime.
    pub fn schedule(&mut self, value: T) -> u64 {
        self.abort();
        self.ticket += 1;
        let ticket = self.ticket;
        let delay = self.delay;
        let sender = self.sender.clone();
        let message = (self.wrap)(ticket, value);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(message);
        }));
        ticket
    }

    /// Drops the scheduled delivery, if any.
    pub fn cancel(&mut self) {
        self.abort();
    }

    /// Claims a delivered ticket. False for anything but the latest
    /// scheduled one, and for a ticket already claimed or cancelled.
    pub fn accept(&mut self, ticket: u64) -> bool {
        if self.pending.is_some() && ticket == self.ticket {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// True between `schedule` and the matching `accept` or `cancel`.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn abort(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T, M> Drop for Debouncer<T, M> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T, M> std::fmt::Debug for Debouncer<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("ticket", &self.ticket)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
