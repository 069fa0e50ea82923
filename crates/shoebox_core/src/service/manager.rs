//! Data manager facade over registry, store and codec.
//!
//! # Responsibility
//! - Sole entry point for collaborators: load/save, category CRUD, typed
//!   record access, allow-list configuration.
//! - Enforce the file-level abort contract: a failed load leaves the store
//!   exactly as it was.
//!
//! # Invariants
//! - `load` replaces the store wholesale only after the document passed
//!   every file-level check.
//! - `save` always serializes the entire current store; in-place edits made
//!   through `category_mut` need no commit step.

use crate::codec::{self, CodecError, LoadWarning};
use crate::model::record::{RecordData, RecordId, RecordMap};
use crate::registry::type_registry::{RecordType, RegistryResult, TypeRegistry};
use crate::store::data_store::DataStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type PersistResult<T> = Result<T, PersistError>;

/// File-level persistence failure; the store is left untouched.
#[derive(Debug)]
pub enum PersistError {
    EmptyPath,
    Missing(PathBuf),
    EmptyFile(PathBuf),
    Io(std::io::Error),
    Codec(CodecError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "path is empty"),
            Self::Missing(path) => {
                write!(f, "file does not exist: {}", path.display())
            }
            Self::EmptyFile(path) => {
                write!(f, "file is empty: {}", path.display())
            }
            Self::Io(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CodecError> for PersistError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Summary of one completed load.
///
/// A non-empty `warnings` list means "loaded with warnings", which is still
/// a successful load.
#[derive(Debug)]
pub struct LoadReport {
    pub categories: usize,
    pub records: usize,
    pub warnings: Vec<LoadWarning>,
}

/// Facade owning one type registry and one data store.
///
/// Single-threaded and synchronous; all I/O is whole-file. The namespace
/// allow-list is runtime state supplied by the host, never persisted in the
/// data file.
pub struct DataManager {
    registry: TypeRegistry,
    store: DataStore,
}

impl DataManager {
    /// Creates an empty manager with the host-supplied namespace allow-list.
    pub fn new(namespaces: Vec<String>) -> Self {
        Self {
            registry: TypeRegistry::new(namespaces),
            store: DataStore::new(),
        }
    }

    /// Registers one domain type with the registry.
    ///
    /// Hosts call this once per storable type at startup.
    pub fn register_type<T: RecordData>(&mut self) -> RegistryResult<()> {
        self.registry.register::<T>()
    }

    /// Loads a document from disk, replacing the store wholesale.
    ///
    /// File-level failures (empty path, missing file, unreadable file, blank
    /// content, malformed or non-object root) abort with the store
    /// untouched. Category- and item-level problems are recovered per unit
    /// and reported in the returned [`LoadReport`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> PersistResult<LoadReport> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PersistError::EmptyPath);
        }
        if !path.exists() {
            return Err(PersistError::Missing(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Err(PersistError::EmptyFile(path.to_path_buf()));
        }
        let document = codec::decode_document(&text)?;

        // All file-level checks passed; from here every failure is recovered
        // per unit and the replace goes ahead.
        let (decoded, warnings) = codec::decode_store(document, &mut self.registry);
        self.store.clear();
        let mut records = 0;
        for (category, map) in decoded {
            records += map.len();
            self.store.set_category(category, map);
        }

        info!(
            "data manager: loaded {} categories, {} records, {} warnings from {}",
            self.store.len(),
            records,
            warnings.len(),
            path.display()
        );
        Ok(LoadReport {
            categories: self.store.len(),
            records,
            warnings,
        })
    }

    /// Serializes the entire current store to disk as one indented JSON
    /// document.
    pub fn save(&self, path: impl AsRef<Path>) -> PersistResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PersistError::EmptyPath);
        }

        let text = codec::encode_store(&self.store)?;
        std::fs::write(path, text)?;
        info!(
            "data manager: saved {} categories to {}",
            self.store.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces or creates one category; overwrites are logged.
    pub fn set_category(&mut self, name: impl Into<String>, records: RecordMap) {
        self.store.set_category(name, records);
    }

    /// Returns one category's records for reading.
    pub fn category(&self, name: &str) -> Option<&RecordMap> {
        self.store.category(name)
    }

    /// Returns the live category map for editing; mutations are visible to
    /// the next `save` with no commit step.
    pub fn category_mut(&mut self, name: &str) -> Option<&mut RecordMap> {
        self.store.category_mut(name)
    }

    /// Returns current category names. Order is not contractual.
    pub fn category_names(&self) -> Vec<String> {
        self.store.category_names()
    }

    /// Typed record accessor; the category is inferred from `T::NAME`.
    ///
    /// Returns `None` (with a warning) when the category or id is absent, or
    /// when the stored record's runtime type is not `T`.
    pub fn get_record<T: RecordData>(&self, id: RecordId) -> Option<&T> {
        let Some(records) = self.store.category(T::NAME) else {
            warn!("data manager: no category `{}` for record {id}", T::NAME);
            return None;
        };
        let Some(record) = records.get(&id) else {
            warn!("data manager: no record {id} in category `{}`", T::NAME);
            return None;
        };
        let typed = record.as_any().downcast_ref::<T>();
        if typed.is_none() {
            warn!(
                "data manager: record {id} in category `{}` has runtime type `{}`, not the requested one",
                T::NAME,
                record.type_name()
            );
        }
        typed
    }

    /// Mutable variant of [`DataManager::get_record`].
    pub fn get_record_mut<T: RecordData>(&mut self, id: RecordId) -> Option<&mut T> {
        let records = self.store.category_mut(T::NAME)?;
        let Some(record) = records.get_mut(&id) else {
            warn!("data manager: no record {id} in category `{}`", T::NAME);
            return None;
        };
        let typed = record.as_any_mut().downcast_mut::<T>();
        if typed.is_none() {
            warn!(
                "data manager: record {id} in category `{}` has a different runtime type",
                T::NAME
            );
        }
        typed
    }

    /// Replaces the namespace allow-list.
    pub fn set_namespaces(&mut self, namespaces: Vec<String>) {
        self.registry.set_namespaces(namespaces);
    }

    /// Adds one namespace to the allow-list.
    pub fn add_namespace(&mut self, namespace: impl Into<String>) {
        self.registry.add_namespace(namespace);
    }

    /// Removes one namespace from the allow-list.
    pub fn remove_namespace(&mut self, namespace: &str) {
        self.registry.remove_namespace(namespace);
    }

    /// Returns a copy of the current allow-list.
    pub fn namespaces(&self) -> Vec<String> {
        self.registry.namespaces()
    }

    /// Fresh snapshot of every allow-listed type, for "create new record"
    /// pickers.
    pub fn list_available_types(&self) -> Vec<Arc<RecordType>> {
        self.registry.list_available()
    }

    /// Resolves a type name through the registry.
    pub fn resolve_type(&mut self, name: &str) -> Option<Arc<RecordType>> {
        self.registry.resolve(name)
    }
}

#[cfg(test)]
mod tests {
    use super::DataManager;
    use crate::model::record::{BoxedRecord, RecordData, RecordMap};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct CardSpec {
        card_name: String,
        attack: i64,
        defense: i64,
    }

    impl RecordData for CardSpec {
        const NAMESPACE: &'static str = "Data";
        const NAME: &'static str = "CardSpec";
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct BoardSpec {
        width: u32,
    }

    impl RecordData for BoardSpec {
        const NAMESPACE: &'static str = "Data";
        const NAME: &'static str = "BoardSpec";
    }

    fn manager() -> DataManager {
        let mut manager = DataManager::new(vec!["Data".to_string()]);
        manager
            .register_type::<CardSpec>()
            .expect("CardSpec should register");
        manager
            .register_type::<BoardSpec>()
            .expect("BoardSpec should register");
        manager
    }

    fn card(name: &str) -> BoxedRecord {
        Box::new(CardSpec {
            card_name: name.to_string(),
            attack: 1,
            defense: 1,
        })
    }

    #[test]
    fn get_record_finds_typed_record_by_inferred_category() {
        let mut manager = manager();
        let mut records = RecordMap::new();
        records.insert(1, card("Wisp"));
        manager.set_category("CardSpec", records);

        let found = manager
            .get_record::<CardSpec>(1)
            .expect("record should be found");
        assert_eq!(found.card_name, "Wisp");
        assert!(manager.get_record::<CardSpec>(2).is_none());
        assert!(manager.get_record::<BoardSpec>(1).is_none());
    }

    #[test]
    fn get_record_rejects_runtime_type_mismatch() {
        let mut manager = manager();
        let mut records = RecordMap::new();
        // A BoardSpec filed under the CardSpec category; atypical but the
        // store does not reject it.
        records.insert(1, Box::new(BoardSpec { width: 4 }) as BoxedRecord);
        manager.set_category("CardSpec", records);

        assert!(manager.get_record::<CardSpec>(1).is_none());
    }

    #[test]
    fn get_record_mut_edits_in_place() {
        let mut manager = manager();
        let mut records = RecordMap::new();
        records.insert(1, card("Wisp"));
        manager.set_category("CardSpec", records);

        manager
            .get_record_mut::<CardSpec>(1)
            .expect("record should be found")
            .attack = 9;
        assert_eq!(manager.get_record::<CardSpec>(1).unwrap().attack, 9);
    }

    #[test]
    fn namespace_passthroughs_reach_the_registry() {
        let mut manager = manager();
        assert_eq!(manager.namespaces(), vec!["Data"]);

        manager.add_namespace("Extra");
        assert_eq!(manager.namespaces(), vec!["Data", "Extra"]);

        manager.remove_namespace("Extra");
        manager.set_namespaces(vec!["Data".to_string()]);
        assert_eq!(manager.list_available_types().len(), 2);

        let resolved = manager
            .resolve_type("CardSpec")
            .expect("CardSpec should resolve");
        assert_eq!(resolved.qualified_name(), "Data.CardSpec");
    }
}
