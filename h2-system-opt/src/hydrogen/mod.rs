pub mod backend;
pub mod h2_opt;
pub mod h2_system_utils;
pub mod report;
pub mod sweep;
