//! Operation: print the control record of a `.deb` file.

use std::path::Path;

use debtree_core::config::GlobalConfig;
use debtree_core::control::ControlRecord;
use debtree_resolver::{ControlReader, DebControlReader};
use debtree_util::errors::{DebError, DebResult};

use crate::OutputFormat;

pub fn read(config: &GlobalConfig, path: &Path) -> DebResult<ControlRecord> {
    let reader = DebControlReader::from_config(&config.extract)?;
    reader.read_control(path)
}

pub fn render(record: &ControlRecord, format: OutputFormat) -> DebResult<String> {
    match format {
        OutputFormat::Text => Ok(record.to_control_string()),
        OutputFormat::Json => serde_json::to_string_pretty(record)
            .map(|json| json + "\n")
            .map_err(|e| DebError::Io(e.into())),
    }
}

pub fn control(config: &GlobalConfig, path: &Path, format: OutputFormat) -> miette::Result<()> {
    let record = read(config, path)?;
    print!("{}", render(&record, format)?);
    Ok(())
}
