use serde::{Deserialize, Serialize};

/// Configuration for rendering and searching a log tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Non-matching lines kept before and after each search match
    pub context_lines: usize,

    /// Global cap on emitted search blocks; enforced by the consumer
    /// taking at most this many hits
    pub max_results: usize,

    /// Namespace prepended to every CSS class the renderer emits, keeping
    /// them clear of host page styles
    pub class_prefix: String,

    /// Size of the nickname color palette
    pub color_buckets: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            max_results: 30,
            class_prefix: "log-".to_string(),
            color_buckets: 10,
        }
    }
}

impl ViewerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_results == 0 {
            return Err("max_results must be greater than 0".into());
        }

        if self.color_buckets == 0 {
            return Err("color_buckets must be greater than 0".into());
        }

        Ok(())
    }
}
