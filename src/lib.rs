pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use client::{KnowledgeApi, KnowledgeClient};
pub use error::{Error, Result};
