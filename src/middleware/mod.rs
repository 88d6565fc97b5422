pub mod authentication;
mod timeout;

pub use timeout::RequestTimeout;
