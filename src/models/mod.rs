mod conversation;
mod exercise;
mod message;
mod migration;
mod user;
mod workout;

pub use conversation::*;
pub use exercise::*;
pub use message::*;
pub use migration::*;
pub use user::*;
pub use workout::*;
