//! Startup components, registered through `#[bootstrapper]`.

pub mod cache;
pub mod keys;
pub mod notes;
pub mod tokens;

pub use keys::KeyRing;
pub use notes::NoteStore;
