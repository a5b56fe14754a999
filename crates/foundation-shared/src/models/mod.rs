mod admin;
mod blog;
mod message;
mod project;

pub use admin::*;
pub use blog::*;
pub use message::*;
pub use project::*;
