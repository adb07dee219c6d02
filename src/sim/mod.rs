pub mod codec;
pub mod document;
pub mod event;
pub mod play;
pub mod session;
