pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod state;
