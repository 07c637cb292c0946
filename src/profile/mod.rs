// src/profile/mod.rs
//! Key-value platform profile
//!
//! A profile is a hierarchical document (TOML or JSON) describing the
//! capabilities of the platform under test. Fields are addressed by paths
//! whose segments are separated by `/` or `.`, for example
//! `dsAudio/Ports/1/Typeid` or `dsAudio.Type`. A numeric segment selects an
//! array element (0-based) or, on a table, the key with that literal name.
//!
//! The store is read-only once loaded; accessors never allocate more than the
//! returned value.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Profile access errors
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("key '{0}' not found")]
    NotFound(String),

    #[error("key '{key}' holds {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("key '{key}' value {value} does not fit in {target}")]
    OutOfRange {
        key: String,
        value: i128,
        target: &'static str,
    },

    #[error("key '{key}' string of {len} bytes exceeds buffer of {max_len}")]
    StringTooLong { key: String, len: usize, max_len: usize },
}

impl ProfileError {
    /// True when the key is simply absent, as opposed to present but unusable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProfileError::NotFound(_))
    }
}

/// Document format of a profile file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Toml,
    Json,
}

impl ProfileFormat {
    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Some(ProfileFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ProfileFormat::Json),
            _ => None,
        }
    }
}

/// Loaded platform profile
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    root: Value,
    source: Option<PathBuf>,
}

impl ProfileStore {
    /// Load a profile file. The format follows the extension; files without a
    /// known extension are tried as TOML first, then JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let root = match ProfileFormat::from_path(path) {
            Some(ProfileFormat::Toml) => parse_toml(&text),
            Some(ProfileFormat::Json) => parse_json(&text),
            None => parse_toml(&text).or_else(|_| parse_json(&text)),
        }
        .map_err(|reason| ProfileError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(path = %path.display(), "profile loaded");
        Ok(Self {
            root,
            source: Some(path.to_path_buf()),
        })
    }

    /// Build a store from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let root = parse_toml(text).map_err(|reason| ProfileError::Parse {
            path: PathBuf::from("<inline>"),
            reason,
        })?;
        Ok(Self { root, source: None })
    }

    /// Build a store from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ProfileError> {
        let root = parse_json(text).map_err(|reason| ProfileError::Parse {
            path: PathBuf::from("<inline>"),
            reason,
        })?;
        Ok(Self { root, source: None })
    }

    /// Wrap an already parsed document.
    pub fn from_value(root: Value) -> Self {
        Self { root, source: None }
    }

    /// File the profile was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether `key` names any node, scalar or not.
    pub fn field_present(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of entries of the array or table at `key`; 0 when absent or scalar.
    pub fn list_count(&self, key: &str) -> usize {
        match self.lookup(key) {
            Some(Value::Array(items)) => items.len(),
            Some(Value::Object(map)) => map.len(),
            _ => 0,
        }
    }

    /// Read a string that must fit a buffer of `max_len` bytes including the
    /// terminator, i.e. at most `max_len - 1` bytes of text.
    pub fn get_string(&self, key: &str, max_len: usize) -> Result<String, ProfileError> {
        let value = self.require(key)?;
        let text = match value {
            Value::String(text) => text.clone(),
            other => {
                return Err(ProfileError::TypeMismatch {
                    key: key.to_string(),
                    expected: "string",
                    found: kind(other),
                })
            }
        };
        if text.len() >= max_len {
            return Err(ProfileError::StringTooLong {
                key: key.to_string(),
                len: text.len(),
                max_len,
            });
        }
        Ok(text)
    }

    pub fn get_u8(&self, key: &str) -> Result<u8, ProfileError> {
        self.get_integer(key, "uint8")
    }

    pub fn get_u16(&self, key: &str) -> Result<u16, ProfileError> {
        self.get_integer(key, "uint16")
    }

    pub fn get_u32(&self, key: &str) -> Result<u32, ProfileError> {
        self.get_integer(key, "uint32")
    }

    /// Signed read, used for enumerations with negative members.
    pub fn get_i32(&self, key: &str) -> Result<i32, ProfileError> {
        self.get_integer(key, "int32")
    }

    /// Booleans, or the strings `true`/`false` in any case.
    pub fn get_bool(&self, key: &str) -> Result<bool, ProfileError> {
        match self.require(key)? {
            Value::Bool(flag) => Ok(*flag),
            Value::String(text) if text.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(text) if text.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(ProfileError::TypeMismatch {
                key: key.to_string(),
                expected: "bool",
                found: kind(other),
            }),
        }
    }

    /// Floats, integers or numeric strings.
    pub fn get_f32(&self, key: &str) -> Result<f32, ProfileError> {
        let value = self.require(key)?;
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.map(|v| v as f32).ok_or_else(|| ProfileError::TypeMismatch {
            key: key.to_string(),
            expected: "float",
            found: kind(value),
        })
    }

    fn get_integer<T>(&self, key: &str, target: &'static str) -> Result<T, ProfileError>
    where
        T: TryFrom<i128>,
    {
        let value = self.require(key)?;
        let raw = match value {
            Value::Number(number) => number
                .as_i64()
                .map(i128::from)
                .or_else(|| number.as_u64().map(i128::from)),
            Value::String(text) => parse_integer_text(text),
            _ => None,
        }
        .ok_or_else(|| ProfileError::TypeMismatch {
            key: key.to_string(),
            expected: target,
            found: kind(value),
        })?;

        T::try_from(raw).map_err(|_| ProfileError::OutOfRange {
            key: key.to_string(),
            value: raw,
            target,
        })
    }

    fn require(&self, key: &str) -> Result<&Value, ProfileError> {
        self.lookup(key)
            .ok_or_else(|| ProfileError::NotFound(key.to_string()))
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        key.split(['/', '.'])
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.root, |node, segment| match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

fn parse_toml(text: &str) -> Result<Value, String> {
    let document: toml::Value = toml::from_str(text).map_err(|e| e.to_string())?;
    serde_json::to_value(document).map_err(|e| e.to_string())
}

fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_integer_text(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[dsAudio]
Type = "source"
Name = "Audio"
Audio_Capabilities = "0x22"
Number_of_supported_ports = 2

[dsAudio.Ports.1]
Typeid = 4
stereo_auto_mode = true
compressions = [0, 1, 3]

[dsAudio.Ports.1.dialog_enhancement_level]
min = 0
max = 16

[dsVideoDevice.Device.1.VideoCodecInfo.VideoCodec0]
level = 3.5
"#;

    fn store() -> ProfileStore {
        ProfileStore::from_toml_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_slash_and_dot_paths() {
        let store = store();
        assert_eq!(store.get_string("dsAudio.Type", 8).unwrap(), "source");
        assert_eq!(store.get_string("dsAudio/Type", 8).unwrap(), "source");
        assert_eq!(store.get_u32("dsAudio/Ports/1/Typeid").unwrap(), 4);
    }

    #[test]
    fn test_hex_strings_are_integers() {
        assert_eq!(store().get_u32("dsAudio/Audio_Capabilities").unwrap(), 0x22);
    }

    #[test]
    fn test_array_segments_are_zero_based() {
        let store = store();
        assert_eq!(store.get_u32("dsAudio/Ports/1/compressions/0").unwrap(), 0);
        assert_eq!(store.get_u32("dsAudio/Ports/1/compressions/2").unwrap(), 3);
        assert!(store.get_u32("dsAudio/Ports/1/compressions/3").unwrap_err().is_not_found());
        assert_eq!(store.list_count("dsAudio/Ports/1/compressions"), 3);
    }

    #[test]
    fn test_list_count_of_table_and_scalar() {
        let store = store();
        assert_eq!(store.list_count("dsAudio/Ports"), 1);
        assert_eq!(store.list_count("dsAudio/Name"), 0);
        assert_eq!(store.list_count("dsAudio/Missing"), 0);
    }

    #[test]
    fn test_string_buffer_limit() {
        let store = store();
        // "source" is 6 bytes and needs a 7 byte buffer
        assert!(store.get_string("dsAudio/Type", 7).is_ok());
        assert!(matches!(
            store.get_string("dsAudio/Type", 6),
            Err(ProfileError::StringTooLong { len: 6, max_len: 6, .. })
        ));
    }

    #[test]
    fn test_type_mismatch_and_range() {
        let store = store();
        assert!(matches!(
            store.get_u32("dsAudio/Name"),
            Err(ProfileError::TypeMismatch { .. })
        ));
        assert!(matches!(
            store.get_string("dsAudio/Number_of_supported_ports", 8),
            Err(ProfileError::TypeMismatch { .. })
        ));

        let wide = ProfileStore::from_toml_str("value = 70000\nneg = -1").unwrap();
        assert!(matches!(wide.get_u16("value"), Err(ProfileError::OutOfRange { .. })));
        assert!(matches!(wide.get_u32("neg"), Err(ProfileError::OutOfRange { .. })));
        assert_eq!(wide.get_i32("neg").unwrap(), -1);
    }

    #[test]
    fn test_bool_and_float() {
        let store = store();
        assert!(store.get_bool("dsAudio/Ports/1/stereo_auto_mode").unwrap());
        let level = store
            .get_f32("dsVideoDevice/Device/1/VideoCodecInfo/VideoCodec0/level")
            .unwrap();
        assert!((level - 3.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_field_present() {
        let store = store();
        assert!(store.field_present("dsAudio"));
        assert!(store.field_present("dsAudio/Ports/1/dialog_enhancement_level"));
        assert!(!store.field_present("dsVideoPort"));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"dsHost": {{"Type": "sink"}}}}"#).unwrap();

        let store = ProfileStore::load(file.path()).unwrap();
        assert_eq!(store.get_string("dsHost/Type", 8).unwrap(), "sink");
        assert_eq!(store.source(), Some(file.path()));
    }

    #[test]
    fn test_load_without_extension_falls_back_to_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"dsFPD": {{"count": 1}}}}"#).unwrap();

        let store = ProfileStore::load(file.path()).unwrap();
        assert_eq!(store.get_u8("dsFPD/count").unwrap(), 1);
    }

    #[test]
    fn test_load_errors() {
        let missing = ProfileStore::load("/nonexistent/profile.toml");
        assert!(matches!(missing, Err(ProfileError::Io { .. })));

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dsAudio\nType = ").unwrap();
        assert!(matches!(
            ProfileStore::load(file.path()),
            Err(ProfileError::Parse { .. })
        ));
    }
}
