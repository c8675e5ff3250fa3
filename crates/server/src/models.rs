mod message;

pub use message::{ContactMessage, CreateMessage, MessageQueryParams};
