mod message;

pub use message::MessageRepository;
