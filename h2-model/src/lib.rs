pub mod general;
pub mod results;
