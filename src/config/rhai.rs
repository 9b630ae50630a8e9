use serde::Deserialize;

/// Limits applied to the Rhai engine that runs user code units.
///
/// A value of `0` disables the corresponding limit, matching Rhai's own
/// semantics for these settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RhaiConfig {
    /// Maximum number of operations a single invocation can perform
    #[serde(default = "default_max_operations")]
    pub max_operations: u64,

    /// Maximum function call nesting depth
    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,

    /// Maximum size of strings in characters
    #[serde(default)]
    pub max_string_size: usize,

    /// Maximum number of array elements
    #[serde(default)]
    pub max_array_size: usize,

    /// Maximum number of object map properties
    #[serde(default)]
    pub max_map_size: usize,
}

impl Default for RhaiConfig {
    fn default() -> Self {
        Self {
            max_operations: default_max_operations(),
            max_call_levels: default_max_call_levels(),
            max_string_size: 0,
            max_array_size: 0,
            max_map_size: 0,
        }
    }
}

/// User code is bounded by the host's process timeout, not by an operation
/// budget.
fn default_max_operations() -> u64 {
    0
}

fn default_max_call_levels() -> usize {
    64
}
