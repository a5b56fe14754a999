mod admins;
mod auth;
mod blocks;
mod blog;
mod messages;
mod projects;

pub use admins::*;
pub use auth::*;
pub use blocks::*;
pub use blog::*;
pub use messages::*;
pub use projects::*;
