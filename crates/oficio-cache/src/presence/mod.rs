//! Typing presence

mod typing;

pub use typing::{TypingState, TypingStore};
