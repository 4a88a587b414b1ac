pub mod fetch;
pub mod notify;
