//! HTTP request handlers for the Talk2Code API

pub mod chat;
pub mod health;
pub mod repository;
pub mod types;

pub use chat::*;
pub use health::*;
pub use repository::*;
pub use types::*;
