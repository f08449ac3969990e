//! Atelier Navigation
//!
//! Visit log shared by the session engine:
//! - Live navigation between open documents (back / forward)
//! - Recall of recently closed documents
//!
//! Pushing after going back discards the "forward" branch, and navigating past
//! either end asks a fallback for the element to insert there.

mod history;

pub use history::{Direction, NavigationHistory};
