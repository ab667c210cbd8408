//! Reference backend holding every entity kind in process memory.

mod cursor;
mod store;

pub use store::InMemoryBackend;
