pub mod users;
pub mod webhook;
