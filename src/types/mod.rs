pub mod event;

pub use event::{EventError, UserEvent, UserFields};
