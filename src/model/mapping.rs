use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::size_selection::SizeFilter;

/// Source file for one cursor role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSource {
    /// Path relative to the input directory
    pub path: PathBuf,

    /// Overrides the run-wide size filter for this role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<SizeFilter>,
}

impl RoleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sizes: None,
        }
    }

    pub fn with_sizes(mut self, sizes: SizeFilter) -> Self {
        self.sizes = Some(sizes);
        self
    }
}

/// Cursor role name (`left_ptr`, `wait`, ...) to its source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMapping {
    pub roles: BTreeMap<String, RoleSource>,
}

impl RoleMapping {
    pub fn get(&self, role: &str) -> Option<&RoleSource> {
        self.roles.get(role)
    }

    pub fn set_source(&mut self, role: impl Into<String>, source: RoleSource) {
        self.roles.insert(role.into(), source);
    }

    pub fn remove(&mut self, role: &str) -> Option<RoleSource> {
        self.roles.remove(role)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RoleSource)> {
        self.roles.iter()
    }

    /// Filter for `role`: its own override, else `default`.
    pub fn filter_for<'a>(&'a self, role: &str, default: &'a SizeFilter) -> &'a SizeFilter {
        self.get(role)
            .and_then(|source| source.sizes.as_ref())
            .unwrap_or(default)
    }

    pub fn resolve(&self, input_dir: &Path, role: &str) -> Option<PathBuf> {
        self.get(role).map(|source| input_dir.join(&source.path))
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

impl FromIterator<(String, RoleSource)> for RoleMapping {
    fn from_iter<I: IntoIterator<Item = (String, RoleSource)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RoleMapping {
        let mut mapping = RoleMapping::default();
        mapping.set_source("left_ptr", RoleSource::new("Normal.ani"));
        mapping.set_source(
            "wait",
            RoleSource::new("Busy.ani").with_sizes(SizeFilter::Specific(vec![32, 48])),
        );
        mapping.set_source("text", RoleSource::new("Text.cur").with_sizes(SizeFilter::LargestOnly));
        mapping
    }

    #[test]
    fn test_filter_override() {
        let mapping = sample();
        let default = SizeFilter::All;

        assert_eq!(mapping.filter_for("left_ptr", &default), &SizeFilter::All);
        assert_eq!(
            mapping.filter_for("wait", &default),
            &SizeFilter::Specific(vec![32, 48])
        );
        assert_eq!(mapping.filter_for("missing", &default), &SizeFilter::All);
    }

    #[test]
    fn test_resolve_joins_input_dir() {
        let mapping = sample();
        assert_eq!(
            mapping.resolve(Path::new("/themes/blue"), "text"),
            Some(PathBuf::from("/themes/blue/Text.cur"))
        );
        assert_eq!(mapping.resolve(Path::new("/themes/blue"), "help"), None);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mapping = sample();
        let toml_str = mapping.to_toml_string().unwrap();
        assert!(toml_str.contains("[wait]"));

        let parsed = RoleMapping::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, mapping);
    }

    #[test]
    fn test_parse_handwritten_toml() {
        let parsed = RoleMapping::from_toml_str(
            r#"
            [left_ptr]
            path = "Normal.ani"

            [wait]
            path = "Busy.ani"
            sizes = { specific = [24, 32] }

            [text]
            path = "Text.cur"
            sizes = "largest_only"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.get("left_ptr").unwrap().sizes, None);
        assert_eq!(
            parsed.get("wait").unwrap().sizes,
            Some(SizeFilter::Specific(vec![24, 32]))
        );
        assert_eq!(parsed.get("text").unwrap().sizes, Some(SizeFilter::LargestOnly));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.toml");

        let mapping = sample();
        mapping.save_to_file(&path).unwrap();
        assert_eq!(RoleMapping::load_from_file(&path).unwrap(), mapping);

        std::fs::write(&path, "[broken").unwrap();
        let err = RoleMapping::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
