pub mod finance;
pub mod profiles;
