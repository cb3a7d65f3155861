use dashmap::DashMap;

/// A single key/value pair copied out of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Local key/value state of one node.
///
/// Reads never wait on writers of other shards, and every read observes a
/// whole entry: `DashMap` guards each key behind its shard lock, so a value is
/// either fully present or absent.
#[derive(Debug, Default)]
pub struct Store {
    data: DashMap<String, String>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Inserts or overwrites `key`.
    pub fn put(&self, key: String, value: String) {
        self.data.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|value| value.value().clone())
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    /// Copies every entry out of the store, sorted by key.
    pub fn snapshot(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .data
            .iter()
            .map(|entry| Entry::new(entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Renders entries as newline-terminated `key=value` lines.
pub fn render_entries(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.key);
        out.push('=');
        out.push_str(&entry.value);
        out.push('\n');
    }
    out
}
