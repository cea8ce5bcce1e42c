//! Merge policy: the base builder every load starts from.
//!
//! Defaults are seeded as the lowest-precedence layer, so every key has a
//! value before any file or environment source is applied and
//! `Config::get` on a partially configured builder still sees the defaults.

use crate::config::MicroagentsConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = MicroagentsConfig::default();
    Config::builder()
        .set_default("sources.include_builtin", defaults.sources.include_builtin)?
        .set_default("sources.include_user", defaults.sources.include_user)?
        .set_default("sources.include_workspace", defaults.sources.include_workspace)?
        .set_default("sources.directories", Vec::<String>::new())?
        .set_default("dispatch.separator", defaults.dispatch.separator)?
        .set_default("dispatch.include_header", defaults.dispatch.include_header)?
        .set_default("watch.debounce_ms", defaults.watch.debounce_ms)?
        .set_default("logging.enabled", defaults.logging.enabled)?
        .set_default("logging.level", defaults.logging.level)?
        .set_default("logging.format", defaults.logging.format)?
        .set_default("logging.output", defaults.logging.output)?
        .set_default("logging.color", defaults.logging.color)
}
