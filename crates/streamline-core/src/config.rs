use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::selection::DEFAULT_FILE_PATTERN;
use crate::StreamlineError;

/// Method names (without the trailing `_`) whose receivers are wrapped with
/// the runtime's array adapter.
pub const DEFAULT_ARRAY_METHODS: [&str; 8] = [
    "forEach",
    "map",
    "filter",
    "every",
    "some",
    "reduce",
    "reduceRight",
    "sort",
];

/// Transform configuration
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Identifier bound to the runtime library in every transformed file
    pub runtime_binding: String,
    /// Module the runtime is loaded from
    pub runtime_module: String,
    /// Export of the runtime module bound to `runtime_binding`
    pub runtime_export: String,
    /// Name of the marker identifier
    pub marker: String,
    /// Regex matched against file names when no source kind is given
    pub file_pattern: String,
    /// Block comment appended to the runtime declaration
    pub declaration_comment: String,
    /// Iteration methods that get a runtime-adapted receiver
    pub array_methods: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            runtime_binding: "$$streamline".to_string(),
            runtime_module: "streamline-runtime".to_string(),
            runtime_export: "runtime".to_string(),
            marker: "_".to_string(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            declaration_comment: "::declare type _<T> = (err : ?Error, result : T) => void;".to_string(),
            array_methods: DEFAULT_ARRAY_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl TransformConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            StreamlineError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// `true` for `<method>_` where `<method>` is one of the array methods.
    pub fn is_array_method(&self, property: &str) -> bool {
        property
            .strip_suffix('_')
            .is_some_and(|base| self.array_methods.iter().any(|m| m == base))
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.runtime_binding.is_empty() {
            return Err(StreamlineError::Config("runtime_binding must not be empty".to_string()));
        }
        if self.marker.is_empty() {
            return Err(StreamlineError::Config("marker must not be empty".to_string()));
        }
        if self.marker == self.runtime_binding {
            return Err(StreamlineError::Config(format!(
                "marker `{}` cannot double as the runtime binding",
                self.marker
            )));
        }
        Ok(())
    }
}
