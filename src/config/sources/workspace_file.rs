//! Workspace config file source: `<workspace>/.microagents/config.toml`.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = xdg::workspace_config_path(workspace_root);
    Ok(builder.add_source(File::from(path).required(false)))
}
