//! Status Broadcaster
//!
//! Live progress for external observers. A [`StatusRelay`] is attached to a
//! run's store and turns each write into a human-readable [`StatusEvent`];
//! the [`StatusBroadcaster`] delivers it to every channel currently open for
//! the run's subscriber id. Delivery is fire-and-forget.

pub mod broadcaster;
pub mod relay;

pub use broadcaster::{StatusBroadcaster, StatusEvent, StatusSubscription};
pub use relay::{StatusPhrases, StatusRelay};
