//! Type descriptors and the allow-listed, memoizing name resolver.
//!
//! # Responsibility
//! - Hold one descriptor per registered domain type, in registration order.
//! - Resolve caller-supplied type names (qualified or simple) to descriptors.
//!
//! # Invariants
//! - The cache never outlives an allow-list change.
//! - A successful resolution is always memoized under the caller's original
//!   input string.

use crate::model::record::{BoxedRecord, RecordData};
use log::warn;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Type registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateType(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateType(name) => {
                write!(f, "type already registered: {name}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Descriptor for one registered domain type.
///
/// Carries everything core needs to decode and default-construct instances
/// without knowing the concrete type.
pub struct RecordType {
    name: &'static str,
    namespace: &'static str,
    decode_fn: fn(Value) -> Result<BoxedRecord, serde_json::Error>,
    instantiate_fn: fn() -> BoxedRecord,
}

impl Debug for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl RecordType {
    /// Builds the descriptor for one `RecordData` type.
    pub fn of<T: RecordData>() -> Self {
        Self {
            name: T::NAME,
            namespace: T::NAMESPACE,
            decode_fn: |value| {
                serde_json::from_value::<T>(value)
                    .map(|record| Box::new(record) as BoxedRecord)
            },
            instantiate_fn: || Box::new(T::default()) as BoxedRecord,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Returns `"{namespace}.{name}"`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Decodes a JSON value into an instance of this type.
    ///
    /// Field tolerance follows the concrete type's serde attributes.
    pub fn decode(&self, value: Value) -> Result<BoxedRecord, serde_json::Error> {
        (self.decode_fn)(value)
    }

    /// Default-constructs a fresh instance, used by "create new record"
    /// editor flows. The caller assigns the id.
    pub fn instantiate(&self) -> BoxedRecord {
        (self.instantiate_fn)()
    }
}

/// Allow-listed, memoizing registry of domain types.
pub struct TypeRegistry {
    // Registration order defines scan order for name matching.
    types: Vec<Arc<RecordType>>,
    namespaces: Vec<String>,
    cache: HashMap<String, Arc<RecordType>>,
}

impl TypeRegistry {
    /// Creates a registry with the host-supplied namespace allow-list.
    pub fn new(namespaces: Vec<String>) -> Self {
        Self {
            types: Vec::new(),
            namespaces,
            cache: HashMap::new(),
        }
    }

    /// Registers one domain type.
    ///
    /// Rejects a second registration under the same qualified name.
    pub fn register<T: RecordData>(&mut self) -> RegistryResult<()> {
        let entry = Arc::new(RecordType::of::<T>());
        let duplicate = self
            .types
            .iter()
            .any(|t| t.name == entry.name && t.namespace == entry.namespace);
        if duplicate {
            return Err(RegistryError::DuplicateType(entry.qualified_name()));
        }

        self.types.push(entry);
        // A new registration can win earlier resolution steps than a cached
        // fallback hit.
        self.cache.clear();
        Ok(())
    }

    /// Count of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Replaces the allow-list; invalidates every memoized resolution.
    pub fn set_namespaces(&mut self, namespaces: Vec<String>) {
        self.namespaces = namespaces;
        self.cache.clear();
    }

    /// Appends one namespace; invalidates the cache only on actual change.
    pub fn add_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
            self.cache.clear();
        }
    }

    /// Removes one namespace; invalidates the cache only on actual change.
    pub fn remove_namespace(&mut self, namespace: &str) {
        let before = self.namespaces.len();
        self.namespaces.retain(|ns| ns != namespace);
        if self.namespaces.len() != before {
            self.cache.clear();
        }
    }

    /// Returns a copy of the current allow-list.
    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.clone()
    }

    /// Resolves a type name to a descriptor.
    ///
    /// Order:
    /// 1. Cache hit on the exact input.
    /// 2. Qualified input: exact qualified-name match over all registered
    ///    types.
    /// 3. Qualified input: cache hit on the trailing simple name.
    /// 4. Simple-name match restricted to allow-listed namespaces, in
    ///    registration order.
    /// 5. Relaxed fallback: simple-name match ignoring the allow-list; the
    ///    first registered match wins.
    ///
    /// Every hit memoizes under the original input. Returns `None` when
    /// nothing matches; callers branch on the absence rather than an error.
    pub fn resolve(&mut self, name: &str) -> Option<Arc<RecordType>> {
        if name.is_empty() {
            warn!("type registry: empty type name");
            return None;
        }
        if let Some(hit) = self.cache.get(name) {
            return Some(hit.clone());
        }

        let found = self.resolve_uncached(name);
        match found {
            Some(record_type) => {
                self.cache.insert(name.to_string(), record_type.clone());
                Some(record_type)
            }
            None => {
                warn!("type registry: no type found for `{name}`");
                None
            }
        }
    }

    fn resolve_uncached(&self, name: &str) -> Option<Arc<RecordType>> {
        if name.contains('.') {
            if let Some(direct) =
                self.types.iter().find(|t| t.qualified_name() == name)
            {
                return Some(direct.clone());
            }
            let simple = name.rsplit('.').next().unwrap_or(name);
            if let Some(by_simple) = self.cache.get(simple) {
                return Some(by_simple.clone());
            }
        }

        if let Some(allowed) = self
            .types
            .iter()
            .find(|t| t.name == name && self.is_allowed(t.namespace))
        {
            return Some(allowed.clone());
        }

        // Relaxed fallback ignores the allow-list.
        self.types.iter().find(|t| t.name == name).cloned()
    }

    fn is_allowed(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|ns| ns == namespace)
    }

    /// Returns a fresh snapshot of every allow-listed type.
    pub fn list_available(&self) -> Vec<Arc<RecordType>> {
        self.types
            .iter()
            .filter(|t| self.is_allowed(t.namespace))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, TypeRegistry};
    use crate::model::record::RecordData;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct CardSpec {
        card_name: String,
    }

    impl RecordData for CardSpec {
        const NAMESPACE: &'static str = "Data";
        const NAME: &'static str = "CardSpec";
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct AltCardSpec {
        label: String,
    }

    impl RecordData for AltCardSpec {
        const NAMESPACE: &'static str = "Alt";
        const NAME: &'static str = "CardSpec";
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct BoardSpec {
        width: u32,
    }

    impl RecordData for BoardSpec {
        const NAMESPACE: &'static str = "Hidden";
        const NAME: &'static str = "BoardSpec";
    }

    fn registry_with_all() -> TypeRegistry {
        let mut registry =
            TypeRegistry::new(vec!["Data".to_string(), "Alt".to_string()]);
        registry
            .register::<CardSpec>()
            .expect("CardSpec should register");
        registry
            .register::<AltCardSpec>()
            .expect("AltCardSpec should register");
        registry
            .register::<BoardSpec>()
            .expect("BoardSpec should register");
        registry
    }

    #[test]
    fn rejects_duplicate_qualified_name() {
        let mut registry = TypeRegistry::new(vec!["Data".to_string()]);
        registry
            .register::<CardSpec>()
            .expect("first registration should succeed");
        let duplicate = registry.register::<CardSpec>();
        assert_eq!(
            duplicate,
            Err(RegistryError::DuplicateType("Data.CardSpec".to_string()))
        );
    }

    #[test]
    fn resolves_simple_name_within_allow_list_in_registration_order() {
        let mut registry = registry_with_all();
        let resolved = registry
            .resolve("CardSpec")
            .expect("CardSpec should resolve");
        assert_eq!(resolved.namespace(), "Data");
    }

    #[test]
    fn resolves_qualified_name_directly() {
        let mut registry = registry_with_all();
        let resolved = registry
            .resolve("Alt.CardSpec")
            .expect("qualified name should resolve");
        assert_eq!(resolved.namespace(), "Alt");
    }

    #[test]
    fn unknown_qualifier_falls_back_to_cached_simple_name() {
        let mut registry = registry_with_all();
        let simple = registry
            .resolve("CardSpec")
            .expect("simple name should resolve");
        let qualified = registry
            .resolve("Legacy.CardSpec")
            .expect("unknown qualifier should reuse the simple-name cache");
        assert!(Arc::ptr_eq(&simple, &qualified));
    }

    #[test]
    fn relaxed_fallback_ignores_allow_list() {
        let mut registry = registry_with_all();
        let resolved = registry
            .resolve("BoardSpec")
            .expect("fallback should find a non-allow-listed type");
        assert_eq!(resolved.namespace(), "Hidden");
    }

    #[test]
    fn empty_and_unknown_names_return_none() {
        let mut registry = registry_with_all();
        assert!(registry.resolve("").is_none());
        assert!(registry.resolve("NoSuchSpec").is_none());
    }

    #[test]
    fn namespace_removal_invalidates_cached_resolution() {
        let mut registry = registry_with_all();

        let first = registry
            .resolve("CardSpec")
            .expect("CardSpec should resolve");
        let second = registry
            .resolve("CardSpec")
            .expect("cached CardSpec should resolve");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.namespace(), "Data");

        registry.remove_namespace("Data");
        let after = registry
            .resolve("CardSpec")
            .expect("CardSpec should re-resolve against remaining namespaces");
        assert_eq!(after.namespace(), "Alt");
    }

    #[test]
    fn set_namespaces_replaces_allow_list() {
        let mut registry = registry_with_all();
        registry.set_namespaces(vec!["Hidden".to_string()]);
        let available = registry.list_available();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name(), "BoardSpec");
    }

    #[test]
    fn add_and_remove_namespace_round_trip() {
        let mut registry = TypeRegistry::new(vec!["Data".to_string()]);
        registry.add_namespace("Alt");
        registry.add_namespace("Alt");
        assert_eq!(registry.namespaces(), vec!["Data", "Alt"]);

        registry.remove_namespace("Data");
        assert_eq!(registry.namespaces(), vec!["Alt"]);
    }

    #[test]
    fn list_available_filters_by_allow_list_and_is_fresh() {
        let registry = registry_with_all();
        let names: Vec<&str> = registry
            .list_available()
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(names, vec!["CardSpec", "CardSpec"]);

        let mut registry = registry;
        registry.add_namespace("Hidden");
        assert_eq!(registry.list_available().len(), 3);
    }

    #[test]
    fn descriptor_instantiates_defaults_and_decodes() {
        let mut registry = registry_with_all();
        let card_type = registry
            .resolve("Data.CardSpec")
            .expect("CardSpec should resolve");

        let fresh = card_type.instantiate();
        assert_eq!(fresh.type_name(), "CardSpec");

        let decoded = card_type
            .decode(serde_json::json!({ "card_name": "Wisp" }))
            .expect("object should decode");
        let typed = decoded
            .as_any()
            .downcast_ref::<CardSpec>()
            .expect("decoded record should be a CardSpec");
        assert_eq!(typed.card_name, "Wisp");
    }
}
