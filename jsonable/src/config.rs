use jsonable_types::{DEFAULT_MAX_DEPTH, Depth};
use serde::{Deserialize, Serialize};

/// Settings for one encode or decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Deepest nesting of records and containers accepted before
    /// `DepthExceeded` is raised.
    pub max_depth: usize,
}

impl CodecConfig {
    /// A configuration for untrusted input with a tighter nesting limit.
    pub fn strict(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// The recursion guard a call starts with.
    pub fn depth(&self) -> Depth {
        Depth::new(self.max_depth)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn loads_from_json() {
        let config: CodecConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config, CodecConfig::strict(8));
        assert_eq!(config.depth().limit(), 8);
    }
}
