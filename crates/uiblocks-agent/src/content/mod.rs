//! Static content announcements.

pub mod welcome;

pub use welcome::welcome_payload;
