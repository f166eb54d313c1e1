//! Access to environment variables, gated by the caller's capabilities.

use std::collections::HashMap;

/// Variables consulted, in order, to pick the active environment.
pub const ENV_NAME_VARS: [&str; 2] = ["NODE_CONFIG_ENV", "NODE_ENV"];

/// Environment used when no name variable is set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// What the embedding application allows the loader to read.
///
/// Resolved once by the caller before loading; the loader never asks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub read_config_dir: bool,
    pub read_env: bool,
}

impl Capabilities {
    pub fn denied() -> Self {
        Self {
            read_config_dir: false,
            read_env: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            read_config_dir: true,
            read_env: true,
        }
    }
}

/// A source of environment variables.
pub trait VariableProvider: Send + Sync + std::fmt::Debug {
    fn var(&self, name: &str) -> Option<String>;

    fn vars(&self) -> HashMap<String, String>;
}

/// The real process environment. Variables that are not valid UTF-8 are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VariableProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

impl VariableProvider for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.clone()
    }
}

/// Picks the active environment name.
///
/// Overrides are checked for every name variable before the provider is
/// consulted. Empty values count as unset.
pub fn resolve_environment_name(
    overrides: Option<&HashMap<String, String>>,
    provider: &dyn VariableProvider,
    capabilities: Capabilities,
) -> String {
    let from_overrides = overrides.and_then(|vars| {
        ENV_NAME_VARS
            .iter()
            .find_map(|name| vars.get(*name).filter(|v| !v.is_empty()).cloned())
    });

    let from_provider = || {
        if !capabilities.read_env {
            return None;
        }
        ENV_NAME_VARS
            .iter()
            .find_map(|name| provider.var(name).filter(|v| !v.is_empty()))
    };

    from_overrides
        .or_else(from_provider)
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Builds the variables used for substitution.
///
/// Overrides win over the provider key by key. Returns `None` when reading
/// the environment is not allowed and no overrides were given.
pub fn resolve_variables(
    overrides: Option<&HashMap<String, String>>,
    provider: &dyn VariableProvider,
    capabilities: Capabilities,
) -> Option<HashMap<String, String>> {
    let mut vars = match (capabilities.read_env, overrides) {
        (true, _) => provider.vars(),
        (false, Some(_)) => HashMap::new(),
        (false, None) => return None,
    };

    if let Some(overrides) = overrides {
        vars.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    Some(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_defaults_to_development() {
        let name = resolve_environment_name(None, &vars(&[]), Capabilities::default());
        assert_eq!(name, "development");
    }

    #[test]
    fn test_config_env_beats_node_env() {
        let provider = vars(&[("NODE_ENV", "staging"), ("NODE_CONFIG_ENV", "qa")]);
        let name = resolve_environment_name(None, &provider, Capabilities::default());
        assert_eq!(name, "qa");
    }

    #[test]
    fn test_overrides_beat_provider() {
        let overrides = vars(&[("NODE_ENV", "production")]);
        let provider = vars(&[("NODE_CONFIG_ENV", "qa")]);
        let name = resolve_environment_name(Some(&overrides), &provider, Capabilities::default());
        assert_eq!(name, "production");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let overrides = vars(&[("NODE_CONFIG_ENV", "")]);
        let provider = vars(&[("NODE_CONFIG_ENV", ""), ("NODE_ENV", "test")]);
        let name = resolve_environment_name(Some(&overrides), &provider, Capabilities::default());
        assert_eq!(name, "test");
    }

    #[test]
    fn test_provider_ignored_without_capability() {
        let provider = vars(&[("NODE_ENV", "production")]);
        let caps = Capabilities {
            read_config_dir: true,
            read_env: false,
        };
        assert_eq!(resolve_environment_name(None, &provider, caps), "development");
    }

    #[test]
    fn test_variables_overrides_win() {
        let overrides = vars(&[("DB_HOST", "override")]);
        let provider = vars(&[("DB_HOST", "process"), ("DB_PORT", "5432")]);
        let resolved =
            resolve_variables(Some(&overrides), &provider, Capabilities::default()).unwrap();
        assert_eq!(resolved["DB_HOST"], "override");
        assert_eq!(resolved["DB_PORT"], "5432");
    }

    #[test]
    fn test_variables_unavailable() {
        let provider = vars(&[("DB_HOST", "process")]);
        assert_eq!(resolve_variables(None, &provider, Capabilities::denied()), None);

        let overrides = vars(&[]);
        let resolved = resolve_variables(Some(&overrides), &provider, Capabilities::denied());
        assert_eq!(resolved, Some(HashMap::new()));
    }

    #[test]
    #[serial]
    fn test_process_env_reads_real_environment() {
        temp_env::with_vars(
            [
                ("CASCADE_CONFIG_TEST_VAR", Some("set")),
                ("NODE_CONFIG_ENV", None),
                ("NODE_ENV", Some("ci")),
            ],
            || {
                assert_eq!(
                    ProcessEnv.var("CASCADE_CONFIG_TEST_VAR").as_deref(),
                    Some("set")
                );
                assert_eq!(
                    ProcessEnv.vars().get("CASCADE_CONFIG_TEST_VAR").map(String::as_str),
                    Some("set")
                );
                assert_eq!(
                    resolve_environment_name(None, &ProcessEnv, Capabilities::default()),
                    "ci"
                );
            },
        );
    }
}
