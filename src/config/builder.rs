use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::env::{
    resolve_environment_name, resolve_variables, Capabilities, ProcessEnv, VariableProvider,
};
use super::file::load_file;
use super::format::Format;
use super::merge::extend_deep;
use super::query::{Config, SourceInfo};
use super::substitute::substitute_deep;
use super::value::Table;
use super::ConfigError;

/// Directory searched when none is configured.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// File stem of the substitution map.
pub const SUBSTITUTION_STEM: &str = "custom-environment-variables";

/// Stages of a load, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Init,
    PermissionCheck,
    EnvResolution,
    BaseFileMerge,
    SubstitutionFileMerge,
    Ready,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Init => "init",
            LoadStage::PermissionCheck => "permission-check",
            LoadStage::EnvResolution => "env-resolution",
            LoadStage::BaseFileMerge => "base-file-merge",
            LoadStage::SubstitutionFileMerge => "substitution-file-merge",
            LoadStage::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Loader for a cascade of environment-specific config files.
///
/// For an active environment `env`, these files are read from the config
/// directory and merged in order, each one overriding the ones before it:
///
/// 1. `default.json`, `default.json5`
/// 2. `<env>.json`, `<env>.json5`
/// 3. `local.json`, `local.json5`
/// 4. `local-<env>.json`, `local-<env>.json5`
///
/// Missing or malformed files are skipped. Afterwards
/// `custom-environment-variables.json` and `.json5` are read as substitution
/// maps and the variables they name are merged on top. Errors in those maps
/// abort the load.
///
/// The environment name comes from `NODE_CONFIG_ENV`, then `NODE_ENV`, and
/// defaults to `development`.
///
/// ## Example
///
/// ```no_run
/// use cascade_config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_config_dir("config")
///     .with_env_override("NODE_ENV", "production")
///     .load()?;
///
/// let port = config.get("server.port")?;
/// # Ok::<(), cascade_config::ConfigError>(())
/// ```
#[derive(Debug)]
#[must_use = "loaders do nothing until .load() is called"]
pub struct ConfigLoader {
    config_dir: PathBuf,
    overrides: Option<HashMap<String, String>>,
    capabilities: Capabilities,
    provider: Box<dyn VariableProvider>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            overrides: None,
            capabilities: Capabilities::default(),
            provider: Box::new(ProcessEnv),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory config files are read from.
    pub fn with_config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Replaces the override variables.
    ///
    /// Overrides take priority over the process environment, both for picking
    /// the environment name and for substitution. They are used even when
    /// reading the environment is not permitted.
    pub fn with_env_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Adds a single override variable.
    pub fn with_env_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replaces the process environment as the source of variables.
    pub fn with_provider(mut self, provider: impl VariableProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Runs the load pipeline.
    ///
    /// Only substitution map errors fail the load; everything else is
    /// skipped and logged at `debug`.
    pub fn load(self) -> Result<Config, ConfigError> {
        let mut merged = Table::new();
        let mut sources = Vec::new();
        tracing::debug!(stage = %LoadStage::Init, dir = %self.config_dir.display(), "loading configuration");

        tracing::debug!(stage = %LoadStage::PermissionCheck);
        if !self.capabilities.read_config_dir {
            tracing::debug!(
                stage = %LoadStage::Ready,
                "config directory not readable, skipping file loading"
            );
            return Ok(Config::new(merged, None, sources));
        }

        let environment = resolve_environment_name(
            self.overrides.as_ref(),
            self.provider.as_ref(),
            self.capabilities,
        );
        tracing::debug!(stage = %LoadStage::EnvResolution, environment = %environment);

        for (name, format) in cascade_files(&environment) {
            let path = self.config_dir.join(name);
            if let Some(table) = read_optional(&path, format) {
                tracing::debug!(stage = %LoadStage::BaseFileMerge, path = %path.display(), "merging config file");
                extend_deep(&mut merged, table);
                sources.push(SourceInfo {
                    path,
                    stage: LoadStage::BaseFileMerge,
                });
            }
        }

        let Some(variables) = resolve_variables(
            self.overrides.as_ref(),
            self.provider.as_ref(),
            self.capabilities,
        ) else {
            tracing::debug!(
                stage = %LoadStage::Ready,
                "no environment available, skipping substitution"
            );
            return Ok(Config::new(merged, Some(environment), sources));
        };

        for (name, format) in substitution_files() {
            let path = self.config_dir.join(name);
            if let Some(map) = read_optional(&path, format) {
                let substituted = substitute_deep(&map, &variables)?;
                tracing::debug!(
                    stage = %LoadStage::SubstitutionFileMerge,
                    path = %path.display(),
                    keys = substituted.len(),
                    "merging environment substitutions"
                );
                extend_deep(&mut merged, substituted);
                sources.push(SourceInfo {
                    path,
                    stage: LoadStage::SubstitutionFileMerge,
                });
            }
        }

        tracing::debug!(stage = %LoadStage::Ready, files = sources.len());
        Ok(Config::new(merged, Some(environment), sources))
    }
}

/// Candidate files for `environment`, in merge order.
pub fn cascade_files(environment: &str) -> Vec<(String, Format)> {
    let local_env = format!("local-{environment}");
    let stems = ["default", environment, "local", local_env.as_str()];

    stems
        .iter()
        .flat_map(|stem| {
            Format::ALL
                .iter()
                .map(move |format| (format!("{stem}.{}", format.extension()), *format))
        })
        .collect()
}

/// Candidate substitution maps, in merge order.
pub fn substitution_files() -> Vec<(String, Format)> {
    Format::ALL
        .iter()
        .map(|format| {
            (
                format!("{SUBSTITUTION_STEM}.{}", format.extension()),
                *format,
            )
        })
        .collect()
}

fn read_optional(path: &Path, format: Format) -> Option<Table> {
    match load_file(path, format) {
        Ok(Some(table)) => Some(table),
        Ok(None) => {
            tracing::trace!(path = %path.display(), "config file not found");
            None
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping config file");
            None
        }
    }
}
