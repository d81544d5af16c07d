pub mod general;
pub mod hydrogen;

// Re-export commonly used items for convenience
pub use hydrogen::h2_opt::{optimize, run_h2_opt};
pub use hydrogen::sweep::run_target_sweep;
