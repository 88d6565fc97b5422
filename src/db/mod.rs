pub mod conversation;
mod error;
pub mod exercise;
pub mod message;
pub mod migrations;
pub mod pool;
pub mod user;
pub mod workout;

pub use error::StoreError;
pub use pool::PoolManager;
