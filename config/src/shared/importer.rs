use serde::{Deserialize, Serialize};

use crate::shared::{PgConnectionConfig, PipelineConfig, ValidationError};

/// Location of the spreadsheet supplying the input records.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpreadsheetConfig {
    /// Path to the workbook file.
    pub path: String,
    /// Worksheet to read. Defaults to the first sheet in the workbook.
    #[serde(default)]
    pub sheet: Option<String>,
}

/// Names of the destination tables.
///
/// The tables are collaborator-provided; only their names are configurable
/// so the importer can target differently-named deployments.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TableNamesConfig {
    /// Table holding group rows.
    #[serde(default = "default_groups_table")]
    pub groups: String,
    /// Table holding location rows.
    #[serde(default = "default_locations_table")]
    pub locations: String,
    /// Table holding user rows.
    #[serde(default = "default_users_table")]
    pub users: String,
}

impl Default for TableNamesConfig {
    fn default() -> Self {
        Self {
            groups: default_groups_table(),
            locations: default_locations_table(),
            users: default_users_table(),
        }
    }
}

fn default_groups_table() -> String {
    "groups".to_owned()
}

fn default_locations_table() -> String {
    "locations".to_owned()
}

fn default_users_table() -> String {
    "users".to_owned()
}

/// Top-level configuration for the importer service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImporterConfig {
    /// Spreadsheet supplying the input records.
    pub spreadsheet: SpreadsheetConfig,
    /// Connection settings for the destination database.
    pub destination: PgConnectionConfig,
    /// Names of the destination tables.
    #[serde(default)]
    pub tables: TableNamesConfig,
    /// Partitioning, worker and pool settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ImporterConfig {
    /// Validates the full importer configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spreadsheet.path.is_empty() {
            return Err(ValidationError::EmptySpreadsheetPath);
        }

        if self.tables.groups.is_empty() {
            return Err(ValidationError::EmptyTableName("groups"));
        }
        if self.tables.locations.is_empty() {
            return Err(ValidationError::EmptyTableName("locations"));
        }
        if self.tables.users.is_empty() {
            return Err(ValidationError::EmptyTableName("users"));
        }

        self.destination.tls.validate()?;
        self.pipeline.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::TlsConfig;

    fn test_config() -> ImporterConfig {
        ImporterConfig {
            spreadsheet: SpreadsheetConfig {
                path: "workshop_data.xlsx".to_owned(),
                sheet: None,
            },
            destination: PgConnectionConfig {
                host: "localhost".to_owned(),
                port: 5432,
                name: "workshop".to_owned(),
                username: "importer".to_owned(),
                password: None,
                tls: TlsConfig {
                    trusted_root_certs: String::new(),
                    enabled: false,
                },
            },
            tables: TableNamesConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn empty_spreadsheet_path_is_rejected() {
        let mut config = test_config();
        config.spreadsheet.path = String::new();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptySpreadsheetPath)
        ));
    }

    #[test]
    fn empty_table_name_is_rejected() {
        let mut config = test_config();
        config.tables.locations = String::new();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyTableName("locations"))
        ));
    }
}
