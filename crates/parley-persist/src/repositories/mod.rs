mod chat;

pub use chat::ChatRepository;
