mod auth;

pub use auth::{authorization, caller};
