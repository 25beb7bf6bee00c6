use crate::zip::DEFAULT_MAX_ENTRY_SIZE;

/// Tunables for a single inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOptions {
    /// Largest entry (compressed or uncompressed) that will be buffered in memory
    pub max_entry_size: u64,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }
}

impl InspectOptions {
    pub fn with_max_entry_size(mut self, limit: u64) -> Self {
        self.max_entry_size = limit;
        self
    }
}
