//! Environment variable overrides for settings profiles.

use std::collections::HashMap;

/// Prefix of environment variables that override profile keys.
pub const ENV_PREFIX: &str = "UPDATE_CONF";

/// Environment variable overrides for profile settings.
///
/// `UPDATE_CONF_<PROFILE>__<KEY>` sets `<key>` in profile `<profile>`.
/// Variables without the `__` separator after the prefix are not profile
/// overrides (e.g. `UPDATE_CONF_LOG`) and are ignored here.
///
/// # Examples
///
/// ```rust
/// use update_conf::settings::EnvOverrides;
///
/// // UPDATE_CONF_PHP__TARGET=/tmp/php.ini -> php.target = /tmp/php.ini
/// let overrides = EnvOverrides::new("UPDATE_CONF");
/// ```
#[derive(Debug, Clone)]
pub struct EnvOverrides {
    prefix: String,
    separator: String,
    vars: Option<HashMap<String, String>>,
}

impl EnvOverrides {
    /// Overrides read from the process environment with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "__".to_string(),
            vars: None,
        }
    }

    /// Read from `vars` instead of the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// No overrides at all.
    pub fn none() -> Self {
        Self::new(ENV_PREFIX).with_vars(Vec::<(String, String)>::new())
    }

    /// Human-readable name for logging.
    pub fn name(&self) -> String {
        format!("env:{}_*", self.prefix)
    }

    /// Build the `config` crate source holding only profile overrides.
    pub(crate) fn into_source(self) -> config::Environment {
        let leader = format!("{}_", self.prefix);
        let vars = self.vars.unwrap_or_else(|| std::env::vars().collect());
        let matching: config::Map<String, String> = vars
            .into_iter()
            .filter(|(key, _)| {
                key.strip_prefix(&leader)
                    .is_some_and(|rest| rest.contains(&self.separator))
            })
            .collect();

        config::Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator(&self.separator)
            .source(Some(matching))
    }
}

impl Default for EnvOverrides {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}
