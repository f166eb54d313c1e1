//! Configuration loading, merging and querying.

mod builder;
mod env;
mod error;
mod file;
mod format;
mod merge;
mod path;
mod query;
mod substitute;
mod value;

pub use builder::{
    cascade_files, substitution_files, ConfigLoader, LoadStage, DEFAULT_CONFIG_DIR,
    SUBSTITUTION_STEM,
};
pub use env::{
    resolve_environment_name, resolve_variables, Capabilities, ProcessEnv, VariableProvider,
    DEFAULT_ENVIRONMENT, ENV_NAME_VARS,
};
pub use error::ConfigError;
pub use file::load_file;
pub use format::{Format, FormatError, UnknownFormat};
pub use merge::extend_deep;
pub use path::{get_path, set_path, KeyPath};
pub use query::{Config, SourceInfo};
pub use substitute::{substitute_deep, FORMAT_KEY, NAME_KEY};
pub use value::{Atomic, Pending, Table, Value};
