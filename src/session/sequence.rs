use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one fetch issued through a [`RequestSequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Latest-wins arbitration for overlapping fetches of the same data.
///
/// Each fetch takes a ticket before it starts. When it finishes, its result
/// is only accepted if no newer ticket was handed out meanwhile, so a slow
/// early response can never overwrite a fast later one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Hand back `value` if `ticket` is still the newest, otherwise drop it.
    pub fn complete<T>(&self, ticket: RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::Acquire),
                "Discarding superseded response"
            );
            None
        }
    }
}
