//! Environment variable source: MICROAGENTS_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses MICROAGENTS prefix and __ as separator for nested keys, e.g.
/// `MICROAGENTS__DISPATCH__MAX_AGENTS=3`. `sources.directories` takes a
/// comma separated list.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("MICROAGENTS")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("sources.directories"),
    );
    Ok(builder)
}
