//! Settings file loading.
//!
//! Settings are YAML files with camelCase keys. A file may inherit other
//! settings files through `import`; top-level keys from later imports win over
//! earlier ones, and the importing file's own keys win over all imports.
//!
//! Only the attachment mixing sections are interpreted here. Other keys
//! (game paths, mod configs, ...) are accepted and ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const IMPORT_KEY: &str = "import";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Settings import cycle detected at {0}")]
    ImportCycle(PathBuf),

    #[error("`import` in {0} must be a list of file paths")]
    InvalidImport(PathBuf),
}

/// Slot → attachment → list of part sets
pub type PartSets = BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>;

/// Attachment mixing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Folder holding attachment definition files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments_dir: Option<PathBuf>,

    /// Base models each slot is mixed onto
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_models: BTreeMap<String, Vec<String>>,

    /// Attachments equivalent to combining other attachments
    #[serde(default, deserialize_with = "null_as_default")]
    pub equivalent_parts: PartSets,

    /// Attachments that are strict supersets of other attachments
    #[serde(default, deserialize_with = "null_as_default")]
    pub superset_parts: PartSets,

    /// Groups where at most one attachment may appear
    #[serde(default, deserialize_with = "null_as_default")]
    pub mutually_exclusive: BTreeMap<String, Vec<Vec<String>>>,

    /// Attachment → attachments it conflicts with
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachment_conflicts: BTreeMap<String, BTreeMap<String, Vec<String>>>,

    /// Combinations to leave out of the mix
    #[serde(default, deserialize_with = "null_as_default")]
    pub combos_to_skip: BTreeMap<String, Vec<Vec<SkipEntry>>>,

    /// Files this settings object was assembled from, in load order
    #[serde(skip)]
    pub sources: Vec<PathBuf>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Settings {
    /// Parse settings from YAML text. `import` is ignored.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(yaml)?;
        let mut mapping = match value {
            Value::Null => Mapping::new(),
            other => serde_yaml::from_value(other)?,
        };
        mapping.remove(IMPORT_KEY);
        serde_yaml::from_value(Value::Mapping(mapping))
    }

    /// Load a settings file, resolving its imports
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut chain = Vec::new();
        let mut sources = Vec::new();
        let merged = load_merged(path, &mut chain, &mut sources)?;

        let mut settings: Settings = serde_yaml::from_value(Value::Mapping(merged))
            .map_err(|source| SettingsError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.sources = sources;
        Ok(settings)
    }
}

fn load_merged(
    path: &Path,
    chain: &mut Vec<PathBuf>,
    sources: &mut Vec<PathBuf>,
) -> Result<Mapping, SettingsError> {
    let canonical = path.canonicalize().map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if chain.contains(&canonical) {
        return Err(SettingsError::ImportCycle(path.to_path_buf()));
    }

    let text = fs::read_to_string(&canonical).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let yaml_error = |source| SettingsError::YamlParse {
        path: path.to_path_buf(),
        source,
    };
    let mut own = match serde_yaml::from_str::<Value>(&text).map_err(yaml_error)? {
        Value::Null => Mapping::new(),
        other => serde_yaml::from_value::<Mapping>(other).map_err(yaml_error)?,
    };

    let imports = match own.remove(IMPORT_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_yaml::from_value::<Vec<PathBuf>>(value)
            .map_err(|_| SettingsError::InvalidImport(path.to_path_buf()))?,
    };

    chain.push(canonical);
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut merged = Mapping::new();
    for import in imports {
        let resolved = base_dir.join(import);
        tracing::debug!("Importing settings from {}", resolved.display());
        for (key, value) in load_merged(&resolved, chain, sources)? {
            merged.insert(key, value);
        }
    }
    chain.pop();

    for (key, value) in own {
        merged.insert(key, value);
    }
    sources.push(path.to_path_buf());
    Ok(merged)
}

/// One element of a `combosToSkip` pattern.
///
/// Written as `Name`, `Name==`, `Name:Model1,Model2` or `Name==:Model1,Model2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SkipEntry {
    pub attachment: String,
    /// Skip only the exact combination rather than every superset
    pub exact: bool,
    /// Base models the skip applies to (empty = all)
    pub base_models: Vec<String>,
}

impl SkipEntry {
    pub fn parse(text: &str) -> Self {
        let (name, models) = match text.split_once(':') {
            Some((name, models)) => (name, models),
            None => (text, ""),
        };

        let name = name.trim();
        let (attachment, exact) = match name.strip_suffix("==") {
            Some(stripped) => (stripped.trim_end(), true),
            None => (name, false),
        };

        let base_models = models
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        SkipEntry {
            attachment: attachment.to_string(),
            exact,
            base_models,
        }
    }
}

impl From<String> for SkipEntry {
    fn from(text: String) -> Self {
        SkipEntry::parse(&text)
    }
}

impl From<SkipEntry> for String {
    fn from(entry: SkipEntry) -> Self {
        entry.to_string()
    }
}

impl fmt::Display for SkipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attachment)?;
        if self.exact {
            write!(f, "==")?;
        }
        if !self.base_models.is_empty() {
            write!(f, ":{}", self.base_models.join(","))?;
        }
        Ok(())
    }
}
