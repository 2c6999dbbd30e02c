pub mod event;

pub use event::{Event, NewEvent, EVENT_NAME_MAX_LEN};
