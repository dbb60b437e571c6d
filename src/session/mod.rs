//! State that outlives a single request: the cached category list and the
//! sequencer that keeps overlapping fetches from clobbering each other.

mod cache;
mod sequence;

pub use cache::{CachedCategories, SessionContext, SessionError};
pub use sequence::{RequestSequencer, RequestTicket};
