use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory keyspace: flat strings plus named hash maps.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Store {
    strings: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, String>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_string(&mut self, key: String, value: String) {
        self.strings.insert(key, value);
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// Set a field in the named hash, creating the hash on first use.
    pub fn hset(&mut self, map: String, field: String, value: String) {
        self.hashes.entry(map).or_default().insert(field, value);
    }

    pub fn hget(&self, map: &str, field: &str) -> Option<&str> {
        self.hashes.get(map)?.get(field).map(String::as_str)
    }

    /// Number of string keys.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Number of hash maps.
    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }
}

pub type SharedStore = Arc<RwLock<Store>>;
