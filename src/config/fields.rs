// src/config/fields.rs
//! Per-field read policy shared by the subsystem parsers
//!
//! Per-port fields are optional: an absent key leaves the zero value and is
//! logged at debug level, a present but unusable value (wrong type, out of
//! range, unknown enumerator, oversized string) leaves the zero value and is
//! logged as a warning. Only list counts and required fields can fail a parse.

use crate::config::key_path::KeyPath;
use crate::config::ConfigError;
use crate::hal::types::HalEnum;
use crate::profile::{ProfileError, ProfileStore};
use arrayvec::ArrayString;
use bitflags::Flags;
use tracing::{debug, warn};

/// Reader bound to one subsystem, for log attribution.
pub(crate) struct FieldReader<'a> {
    store: &'a ProfileStore,
    module: &'static str,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(store: &'a ProfileStore, module: &'static str) -> Self {
        Self { store, module }
    }

    pub(crate) fn store(&self) -> &'a ProfileStore {
        self.store
    }

    pub(crate) fn present(&self, key: &KeyPath) -> bool {
        self.store.field_present(key.as_str())
    }

    pub(crate) fn u16(&self, key: &KeyPath) -> u16 {
        self.settle(key, self.store.get_u16(key.as_str()))
            .unwrap_or_default()
    }

    pub(crate) fn u32(&self, key: &KeyPath) -> u32 {
        self.settle(key, self.store.get_u32(key.as_str()))
            .unwrap_or_default()
    }

    pub(crate) fn bool(&self, key: &KeyPath) -> bool {
        self.settle(key, self.store.get_bool(key.as_str()))
            .unwrap_or_default()
    }

    pub(crate) fn f32(&self, key: &KeyPath) -> f32 {
        self.settle(key, self.store.get_f32(key.as_str()))
            .unwrap_or_default()
    }

    /// Bounded string; `CAP` is the buffer size including the terminator.
    pub(crate) fn name<const CAP: usize>(&self, key: &KeyPath) -> ArrayString<CAP> {
        self.settle(key, self.store.get_string(key.as_str(), CAP))
            .and_then(|text| ArrayString::from(&text).ok())
            .unwrap_or_default()
    }

    pub(crate) fn enumerated<E: HalEnum>(&self, key: &KeyPath) -> E {
        let Some(raw) = self.settle(key, self.store.get_i32(key.as_str())) else {
            return E::default();
        };
        match E::decode(i64::from(raw)) {
            Some(value) => value,
            None => {
                warn!(
                    module = self.module,
                    key = %key,
                    raw,
                    kind = E::TYPE_NAME,
                    "value outside enumeration, using default"
                );
                E::default()
            }
        }
    }

    pub(crate) fn mask<M>(&self, key: &KeyPath) -> M
    where
        M: Flags<Bits = u32> + Default,
    {
        self.settle(key, self.store.get_u32(key.as_str()))
            .map(M::from_bits_retain)
            .unwrap_or_default()
    }

    /// Declared entry count, rejected when it exceeds the table capacity.
    pub(crate) fn count(&self, key: &KeyPath, capacity: usize) -> Result<usize, ConfigError> {
        let count = self.u32(key) as usize;
        self.bounded(key, count, capacity)
    }

    pub(crate) fn bounded(
        &self,
        key: &KeyPath,
        count: usize,
        capacity: usize,
    ) -> Result<usize, ConfigError> {
        if count > capacity {
            return Err(ConfigError::CapacityExceeded {
                module: self.module,
                key: key.to_string(),
                count,
                capacity,
            });
        }
        Ok(count)
    }

    /// Required string: absence or an unusable value fails the parse.
    pub(crate) fn required_name<const CAP: usize>(
        &self,
        key: &KeyPath,
    ) -> Result<ArrayString<CAP>, ConfigError> {
        let text = self
            .store
            .get_string(key.as_str(), CAP)
            .map_err(|source| ConfigError::MissingRequired {
                module: self.module,
                key: key.to_string(),
                source,
            })?;
        // get_string already bounds the length below CAP
        ArrayString::from(&text).map_err(|_| ConfigError::MissingRequired {
            module: self.module,
            key: key.to_string(),
            source: ProfileError::StringTooLong {
                key: key.to_string(),
                len: text.len(),
                max_len: CAP,
            },
        })
    }

    fn settle<T>(&self, key: &KeyPath, result: Result<T, ProfileError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) if err.is_not_found() => {
                debug!(module = self.module, key = %key, "field absent, using default");
                None
            }
            Err(err) => {
                warn!(module = self.module, key = %key, error = %err, "field unusable, using default");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::types::{HdrCapabilities, StereoMode};

    fn reader_over(text: &str) -> ProfileStore {
        ProfileStore::from_toml_str(text).unwrap()
    }

    #[test]
    fn test_missing_and_malformed_fields_default() {
        let store = reader_over("[m]\nbad = \"x\"\nbig = 70000\n");
        let reader = FieldReader::new(&store, "m");
        let root = KeyPath::new("m");
        assert_eq!(reader.u32(&root.field("absent")), 0);
        assert_eq!(reader.u32(&root.field("bad")), 0);
        assert_eq!(reader.u16(&root.field("big")), 0);
        assert!(!reader.bool(&root.field("bad")));
    }

    #[test]
    fn test_enumerated_rejects_unknown_values() {
        let store = reader_over("[m]\nok = 2\nsentinel = 7\n");
        let reader = FieldReader::new(&store, "m");
        let root = KeyPath::new("m");
        assert_eq!(reader.enumerated::<StereoMode>(&root.field("ok")), StereoMode::Stereo);
        assert_eq!(
            reader.enumerated::<StereoMode>(&root.field("sentinel")),
            StereoMode::Unknown
        );
    }

    #[test]
    fn test_mask_retains_bits() {
        let store = reader_over("[m]\nhdr = 0x43\n");
        let reader = FieldReader::new(&store, "m");
        let caps: HdrCapabilities = reader.mask(&KeyPath::new("m").field("hdr"));
        assert_eq!(caps.bits(), 0x43);
    }

    #[test]
    fn test_count_bounds() {
        let store = reader_over("[m]\nn = 5\n");
        let reader = FieldReader::new(&store, "m");
        let key = KeyPath::new("m").field("n");
        assert_eq!(reader.count(&key, 5).unwrap(), 5);
        assert!(matches!(
            reader.count(&key, 4),
            Err(ConfigError::CapacityExceeded { count: 5, capacity: 4, .. })
        ));
    }

    #[test]
    fn test_name_too_long_is_empty() {
        let store = reader_over("[m]\nname = \"abcdefgh\"\n");
        let reader = FieldReader::new(&store, "m");
        let key = KeyPath::new("m").field("name");
        assert_eq!(reader.name::<9>(&key).as_str(), "abcdefgh");
        assert!(reader.name::<8>(&key).is_empty());
        assert!(reader.required_name::<8>(&key).is_err());
    }
}
