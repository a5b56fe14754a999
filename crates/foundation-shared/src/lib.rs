pub mod api;
pub mod blocks;
pub mod models;
pub mod save;
pub mod slug;

pub use models::*;
