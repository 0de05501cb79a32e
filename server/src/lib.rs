//! HTTP surface: `GET /user/{id}` and `GET /users`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use server::{router, Server, ServerBuilder};
pub use state::AppState;
