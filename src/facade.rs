//! Lazy accessor facade
//!
//! [`LazySettings`] is the object application code holds. It forwards the
//! verbs `get`, `set`, `delete` and `all` to the manager, and resolves any
//! other name through [`lookup`](LazySettings::lookup): the stored setting
//! if there is one, otherwise the static default of the same name.

use crate::error::{Error, Result};
use crate::manager::SettingsManager;
use crate::store::SettingRecord;
use crate::value::SettingValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Static fallback configuration consulted when a key is not stored
pub trait StaticDefaults: Send + Sync {
    /// Value of the default named `name`
    ///
    /// # Errors
    ///
    /// Returns `Error::AttributeNotFound` (or whatever the source uses) when
    /// there is no such default.
    fn attribute(&self, name: &str) -> Result<SettingValue>;
}

/// Defaults held in a map
#[derive(Debug, Clone, Default)]
pub struct MapDefaults {
    values: HashMap<String, SettingValue>,
}

impl MapDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SettingValue>) {
        self.values.insert(name.into(), value.into());
    }
}

impl StaticDefaults for MapDefaults {
    fn attribute(&self, name: &str) -> Result<SettingValue> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| Error::AttributeNotFound(name.to_string()))
    }
}

impl StaticDefaults for HashMap<String, SettingValue> {
    fn attribute(&self, name: &str) -> Result<SettingValue> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::AttributeNotFound(name.to_string()))
    }
}

/// No static defaults: every fallback fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaults;

impl StaticDefaults for NoDefaults {
    fn attribute(&self, name: &str) -> Result<SettingValue> {
        Err(Error::AttributeNotFound(name.to_string()))
    }
}

/// Uniform settings accessor with fallback to static defaults
///
/// # Example
///
/// ```rust
/// use simple_settings::{LazySettings, MapDefaults, MemoryStore, SettingValue, SettingsManager};
/// use std::sync::Arc;
///
/// let manager = SettingsManager::builder(Arc::new(MemoryStore::new())).build()?;
/// let settings = LazySettings::new(Arc::new(manager), MapDefaults::new().with("PAGE_SIZE", 5));
///
/// assert_eq!(settings.lookup("PAGE_SIZE")?, SettingValue::Int(5));
/// settings.set("PAGE_SIZE", 10)?;
/// assert_eq!(settings.lookup("PAGE_SIZE")?, SettingValue::Int(10));
/// # Ok::<(), simple_settings::Error>(())
/// ```
#[derive(Clone)]
pub struct LazySettings {
    manager: Arc<SettingsManager>,
    defaults: Arc<dyn StaticDefaults>,
}

impl LazySettings {
    pub fn new(manager: Arc<SettingsManager>, defaults: impl StaticDefaults + 'static) -> Self {
        Self {
            manager,
            defaults: Arc::new(defaults),
        }
    }

    /// Facade without static defaults
    pub fn without_defaults(manager: Arc<SettingsManager>) -> Self {
        Self::new(manager, NoDefaults)
    }

    /// The manager behind this facade
    pub fn manager(&self) -> &Arc<SettingsManager> {
        &self.manager
    }

    /// `get` verb: [`SettingsManager::get_item`]
    ///
    /// # Errors
    ///
    /// Same as [`SettingsManager::get_item`].
    pub fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        self.manager.get_item(key)
    }

    /// `get` verb with a default: [`SettingsManager::get_item_or`]
    ///
    /// # Errors
    ///
    /// Same as [`SettingsManager::get_item`].
    pub fn get_or(&self, key: &str, default: impl Into<SettingValue>) -> Result<SettingValue> {
        self.manager.get_item_or(key, default)
    }

    /// `set` verb: [`SettingsManager::set_item`]
    ///
    /// # Errors
    ///
    /// Same as [`SettingsManager::set_item`].
    pub fn set(&self, key: &str, value: impl Into<SettingValue>) -> Result<SettingRecord> {
        self.manager.set_item(key, value)
    }

    /// `delete` verb: [`SettingsManager::del_item`]
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if the key is not stored.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.manager.del_item(key)
    }

    /// `all` verb: [`SettingsManager::to_dict`]
    ///
    /// # Errors
    ///
    /// Same as [`SettingsManager::to_dict`].
    pub fn all(&self) -> Result<BTreeMap<String, SettingValue>> {
        self.manager.to_dict()
    }

    /// Resolve `name` as a stored setting, falling back to the static default.
    ///
    /// Verb names are not reserved: a setting stored as `"get"` is found here.
    ///
    /// # Errors
    ///
    /// Returns the static source's error (normally `Error::AttributeNotFound`)
    /// when neither exists, or any error from the stored lookup.
    pub fn lookup(&self, name: &str) -> Result<SettingValue> {
        match self.manager.get_item(name)? {
            Some(value) => Ok(value),
            None => self.defaults.attribute(name),
        }
    }

    /// Subscript access: the stored value only, no default and no fallback.
    ///
    /// # Errors
    ///
    /// Same as [`SettingsManager::get_item`].
    pub fn item(&self, key: &str) -> Result<Option<SettingValue>> {
        self.manager.get_item(key)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn facade(defaults: impl StaticDefaults + 'static) -> LazySettings {
        let manager = SettingsManager::builder(Arc::new(MemoryStore::new()))
            .build()
            .unwrap();
        LazySettings::new(Arc::new(manager), defaults)
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let settings = facade(MapDefaults::new().with("X", 5));

        assert_eq!(settings.lookup("X").unwrap(), SettingValue::Int(5));
        settings.set("X", 10).unwrap();
        assert_eq!(settings.lookup("X").unwrap(), SettingValue::Int(10));

        settings.delete("X").unwrap();
        assert_eq!(settings.lookup("X").unwrap(), SettingValue::Int(5));
    }

    #[test]
    fn test_lookup_missing_everywhere() {
        let settings = facade(MapDefaults::new());
        let err = settings.lookup("MISSING").unwrap_err();
        assert!(matches!(err, Error::AttributeNotFound(ref name) if name == "MISSING"));
    }

    #[test]
    fn test_item_has_no_fallback() {
        let settings = facade(MapDefaults::new().with("X", 5));
        assert_eq!(settings.item("X").unwrap(), None);

        settings.set("X", "stored").unwrap();
        assert_eq!(
            settings.item("X").unwrap(),
            Some(SettingValue::Str("stored".into()))
        );
    }

    #[test]
    fn test_verb_names_are_plain_keys() {
        let settings = facade(NoDefaults);
        settings.set("get", true).unwrap();
        assert_eq!(settings.lookup("get").unwrap(), SettingValue::Bool(true));
    }

    #[test]
    fn test_verbs_forward_to_manager() {
        let settings = facade(NoDefaults);
        settings.set("a", 1).unwrap();
        settings.set("b", 2.5).unwrap();

        assert_eq!(settings.get("a").unwrap(), Some(SettingValue::Int(1)));
        assert_eq!(settings.get_or("zzz", "dflt").unwrap(), SettingValue::Str("dflt".into()));
        assert_eq!(settings.all().unwrap().len(), 2);
        assert!(settings.delete("zzz").unwrap_err().is_not_found());
    }

    #[test]
    fn test_hashmap_defaults() {
        let mut defaults = HashMap::new();
        defaults.insert("DEBUG".to_string(), SettingValue::Bool(false));
        let settings = facade(defaults);

        assert_eq!(settings.lookup("DEBUG").unwrap(), SettingValue::Bool(false));
        assert!(settings.lookup("OTHER").is_err());
    }
}
