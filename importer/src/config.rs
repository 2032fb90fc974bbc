use config::load_config;
use config::shared::ImporterConfig;

use crate::error::ImporterResult;

/// Loads and validates the importer configuration.
///
/// Uses the standard hierarchical loading mechanism from the [`config`]
/// crate and validates the resulting [`ImporterConfig`] before returning it.
pub fn load_importer_config() -> ImporterResult<ImporterConfig> {
    let config = load_config::<ImporterConfig>()?;
    config.validate()?;

    Ok(config)
}
