pub mod user_sync;
