//! Collaborative session and persistence coordinator for CodeHaven rooms.

pub mod collab;
pub mod config;
pub mod db;
pub mod docs;
pub mod engine;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
pub mod ws;

pub use collab::{CollabSettings, Coordinator};
pub use state::AppState;
