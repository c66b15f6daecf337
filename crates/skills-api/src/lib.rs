pub mod auth;
pub mod conversations;
pub mod error;
pub mod matching;
pub mod messages;
pub mod middleware;
pub mod profiles;
pub mod routes;
pub mod state;
pub mod stream;
pub mod tasks;

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

#[cfg(test)]
mod tests;
