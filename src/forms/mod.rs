mod auth;
mod conversation;
mod exercise;
mod message;
mod workout;

pub use auth::*;
pub use conversation::*;
pub use exercise::*;
pub use message::*;
pub use workout::*;
