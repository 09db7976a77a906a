//! Per-run state tying the source and target submissions together.

mod session;

pub use session::{Session, Side};
