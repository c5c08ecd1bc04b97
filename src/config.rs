use crate::error::Result;
use crate::heuristics::{OrderLayout, ReferenceLayout};
use crate::layout::TableSettings;
use crate::xlsx::ReportConfig;
use serde::Deserialize;
use std::{fs, path::Path};

/// Run settings. Every section and field is optional in the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub order_layout: OrderLayout,
    #[serde(default)]
    pub reference_layout: ReferenceLayout,
    #[serde(rename = "tables", default)]
    pub table_settings: TableSettings,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
