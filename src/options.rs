//! Container options.

use crate::error::{DiError, DiResult};

const DEFAULT_MAX_DEPTH: usize = 1024;

/// Runtime knobs for a container.
///
/// With the `config` feature the options can be deserialized; missing
/// fields take their defaults.
///
/// # Examples
///
/// ```
/// use scoped_di::{ContainerOptions, ServiceCollection};
///
/// let options = ContainerOptions::default()
///     .with_max_depth(64)
///     .with_warn_on_undisposed_drop(false);
/// assert_eq!(options.max_depth, 64);
///
/// let mut services = ServiceCollection::new();
/// services.with_options(options);
/// let _root = services.build().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Maximum nesting of factory invocations on one thread.
    pub max_depth: usize,
    /// Emit a warning when a scope holding instances is dropped undisposed.
    pub warn_on_undisposed_drop: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            warn_on_undisposed_drop: true,
        }
    }
}

impl ContainerOptions {
    /// Sets the maximum resolution depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables the undisposed-drop warning.
    pub fn with_warn_on_undisposed_drop(mut self, warn: bool) -> Self {
        self.warn_on_undisposed_drop = warn;
        self
    }

    /// Rejects option values the container cannot run with.
    pub fn validate(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::InvalidOptions("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parses options from JSON.
    ///
    /// ```
    /// use scoped_di::ContainerOptions;
    ///
    /// let options = ContainerOptions::from_json(r#"{ "max_depth": 32 }"#).unwrap();
    /// assert_eq!(options.max_depth, 32);
    /// assert!(options.warn_on_undisposed_drop);
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| DiError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}
