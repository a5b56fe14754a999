pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod import;
pub mod pages;
pub mod routes;

pub use config::Config;
pub use db::DbPool;
