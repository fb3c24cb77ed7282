//! Services shared across handlers.

pub mod cookies;
pub mod google;
pub mod session;
