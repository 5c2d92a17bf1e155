//! Single-value storage.

/// Holds one string value.
#[derive(Debug, Default, Clone)]
pub struct SimpleStorage {
    data: String,
}

impl SimpleStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    pub fn get(&self) -> &str {
        &self.data
    }
}
