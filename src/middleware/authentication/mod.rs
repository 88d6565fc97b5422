mod manager;
mod manager_middleware;
mod method;

pub use manager::*;
pub use manager_middleware::*;
