mod auth;
mod error;
pub mod routes;
mod server;

pub use auth::*;
pub use error::*;
pub use server::*;
