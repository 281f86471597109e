mod structs;

pub use structs::{FileStore, JsonStore, KeyValueStore, MemoryStore};
