//! Validation modules

pub mod email;

pub use email::is_valid_email;
