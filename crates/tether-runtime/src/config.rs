#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! A [`BindingConfig`] is installed per thread; bindings read it when they
//! are created. Sources, in precedence order:
//!
//! 1. [`BindingConfig::install`] with an explicit value.
//! 2. Environment variables through [`BindingConfig::from_env`]:
//!
//! | Variable | Values |
//! |----------|--------|
//! | `TETHER_REENTRANCY` | `suppress`, `converge`, `converge:<max-depth>` |
//! | `TETHER_LOCALE` | a locale tag such as `de-DE` |
//! | `TETHER_WARN_SILENT` | `1`/`0`/`true`/`false` |
//!
//! 3. TOML or JSON text with the `policy-config` feature:
//!
//! ```toml
//! reentrancy = "converge"
//! max_depth = 16
//! default_locale = "fr-FR"
//! warn_on_silent_properties = false
//! ```

use std::cell::RefCell;
use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::locale::{Locale, LocaleContext, normalize_locale_raw};

pub const ENV_REENTRANCY: &str = "TETHER_REENTRANCY";
pub const ENV_LOCALE: &str = crate::locale::LOCALE_ENV;
pub const ENV_WARN_SILENT: &str = "TETHER_WARN_SILENT";

/// Depth limit used by `converge` without an explicit number.
pub const DEFAULT_MAX_DEPTH: usize = 8;

thread_local! {
    static CURRENT: RefCell<BindingConfig> = RefCell::new(BindingConfig::default());
}

/// What a binding does when asked to propagate while already propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReentrancyPolicy {
    /// Skip the nested request.
    #[default]
    Suppress,
    /// Allow nesting up to `max_depth` levels, relying on equality gates to
    /// settle the values.
    Converge { max_depth: usize },
}

impl fmt::Display for ReentrancyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppress => f.write_str("suppress"),
            Self::Converge { max_depth } => write!(f, "converge:{max_depth}"),
        }
    }
}

impl FromStr for ReentrancyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let invalid = || ConfigError::invalid("reentrancy", s, "expected suppress|converge[:N]");
        match raw.split_once(':') {
            None if raw == "suppress" => Ok(Self::Suppress),
            None if raw == "converge" => Ok(Self::Converge {
                max_depth: DEFAULT_MAX_DEPTH,
            }),
            Some(("converge", depth)) => match depth.trim().parse::<usize>() {
                Ok(max_depth) if max_depth > 0 => Ok(Self::Converge { max_depth }),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}={value} ({message})")]
    Invalid {
        field: &'static str,
        value: String,
        message: &'static str,
    },

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

impl ConfigError {
    fn invalid(field: &'static str, value: &str, message: &'static str) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            message,
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    pub reentrancy: ReentrancyPolicy,
    /// Overrides system locale detection when set.
    pub default_locale: Option<Locale>,
    /// Warn once per strategy when a named property cannot report changes.
    pub warn_on_silent_properties: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            reentrancy: ReentrancyPolicy::default(),
            default_locale: None,
            warn_on_silent_properties: true,
        }
    }
}

/// Result of parsing a configuration source, with every rejected value.
#[derive(Debug, Clone, Default)]
pub struct BindingConfigParse {
    pub config: BindingConfig,
    pub errors: Vec<ConfigError>,
}

impl BindingConfig {
    /// The configuration installed on this thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(|c| c.borrow().clone())
    }

    /// Make this the thread's configuration. A default locale is pushed
    /// into the global [`LocaleContext`].
    pub fn install(self) {
        if let Some(locale) = &self.default_locale {
            LocaleContext::global().set_locale(locale.as_str());
        }
        tracing::debug!(reentrancy = %self.reentrancy, "binding config installed");
        CURRENT.with(|c| *c.borrow_mut() = self);
    }

    /// Parse the environment. Invalid values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let parse = Self::from_env_with(|key| env::var(key).ok());
        for error in &parse.errors {
            warn!(%error, "ignoring invalid environment setting");
        }
        parse.config
    }

    /// Parse settings through an arbitrary variable lookup.
    pub fn from_env_with(mut get: impl FnMut(&str) -> Option<String>) -> BindingConfigParse {
        let mut parse = BindingConfigParse::default();

        if let Some(value) = get(ENV_REENTRANCY) {
            match value.parse() {
                Ok(policy) => parse.config.reentrancy = policy,
                Err(err) => parse.errors.push(err),
            }
        }

        if let Some(value) = get(ENV_LOCALE) {
            match normalize_locale_raw(&value) {
                Some(locale) => parse.config.default_locale = Some(locale),
                None => parse.errors.push(ConfigError::invalid(
                    "default_locale",
                    &value,
                    "expected a locale tag",
                )),
            }
        }

        if let Some(value) = get(ENV_WARN_SILENT) {
            match parse_bool(&value) {
                Some(flag) => parse.config.warn_on_silent_properties = flag,
                None => parse.errors.push(ConfigError::invalid(
                    "warn_on_silent_properties",
                    &value,
                    "expected bool (1/0/true/false)",
                )),
            }
        }

        parse
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(feature = "policy-config")]
mod file {
    use serde::Deserialize;

    use super::{BindingConfig, ConfigError, ReentrancyPolicy};
    use crate::locale::normalize_locale_raw;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct RawConfig {
        reentrancy: Option<String>,
        max_depth: Option<usize>,
        default_locale: Option<String>,
        warn_on_silent_properties: Option<bool>,
    }

    impl RawConfig {
        fn resolve(self) -> Result<BindingConfig, ConfigError> {
            let mut config = BindingConfig::default();
            if let Some(policy) = &self.reentrancy {
                config.reentrancy = policy.parse()?;
            }
            if let Some(depth) = self.max_depth {
                match config.reentrancy {
                    ReentrancyPolicy::Converge { .. } if depth > 0 => {
                        config.reentrancy = ReentrancyPolicy::Converge { max_depth: depth };
                    }
                    _ => {
                        return Err(ConfigError::Invalid {
                            field: "max_depth",
                            value: depth.to_string(),
                            message: "requires reentrancy = \"converge\" and a positive depth",
                        });
                    }
                }
            }
            if let Some(locale) = &self.default_locale {
                config.default_locale = Some(normalize_locale_raw(locale).ok_or_else(|| {
                    ConfigError::Invalid {
                        field: "default_locale",
                        value: locale.clone(),
                        message: "expected a locale tag",
                    }
                })?);
            }
            if let Some(flag) = self.warn_on_silent_properties {
                config.warn_on_silent_properties = flag;
            }
            Ok(config)
        }
    }

    impl BindingConfig {
        /// Parse TOML configuration text.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Malformed`] for invalid TOML or unknown keys, and
        /// [`ConfigError::Invalid`] for rejected values.
        pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
            let raw: RawConfig =
                toml::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
            raw.resolve()
        }

        /// Parse JSON configuration text.
        ///
        /// # Errors
        ///
        /// Same as [`from_toml_str`](Self::from_toml_str).
        pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
            let raw: RawConfig =
                serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
            raw.resolve()
        }
    }

}
