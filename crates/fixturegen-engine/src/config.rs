//! Configuration for the resolution engine

use serde::{Deserialize, Serialize};

/// Engine configuration, passed explicitly to a resolution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest active resolution path before resolution fails
    pub max_depth: usize,
    /// How often one type may repeat on the active path before resolution fails
    pub max_type_repetition: usize,
    /// Element count for generated sequences, sets and maps
    pub collection_size: usize,
    /// Seed for the context's random source; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_type_repetition: 16,
            collection_size: 3,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_collection_size(mut self, size: usize) -> Self {
        self.collection_size = size;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_type_repetition(mut self, repetition: usize) -> Self {
        self.max_type_repetition = repetition;
        self
    }
}
