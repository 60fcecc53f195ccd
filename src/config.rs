use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::mapping::RoleMapping;
use crate::pipeline::size_selection::SizeFilter;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub size_filter: SizeFilter,
    /// Worker threads for batch conversion; 0 lets rayon decide
    pub thread_count: usize,
    pub mapping: RoleMapping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            size_filter: SizeFilter::All,
            mapping: RoleMapping::default(),
            thread_count: 0,
        }
    }
}

impl Config {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_size_filter(mut self, filter: SizeFilter) -> Self {
        self.size_filter = filter;
        self
    }

    pub fn with_mapping(mut self, mapping: RoleMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let content = self.to_toml_string().map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mapping::RoleSource;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_toml_str(r#"input_dir = "theme""#).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("theme"));
        assert_eq!(config.size_filter, SizeFilter::All);
        assert_eq!(config.thread_count, 0);
        assert!(config.mapping.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            input_dir = "/usr/share/wincursors"
            size_filter = { specific = [32] }
            thread_count = 4

            [mapping.left_ptr]
            path = "Normal.ani"

            [mapping.wait]
            path = "Busy.ani"
            sizes = "all"
            "#,
        )
        .unwrap();

        assert_eq!(config.size_filter, SizeFilter::Specific(vec![32]));
        assert_eq!(config.thread_count, 4);
        assert_eq!(config.mapping.len(), 2);
        assert_eq!(config.mapping.get("wait").unwrap().sizes, Some(SizeFilter::All));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut mapping = RoleMapping::default();
        mapping.set_source("text", RoleSource::new("Text.cur"));
        let config = Config::new("/themes/red")
            .with_size_filter(SizeFilter::LargestOnly)
            .with_mapping(mapping)
            .with_thread_count(2);

        config.save_to_file(&path).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }
}
