// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry mapping fully-qualified message names to parse trees.
//!
//! Registration is atomic: either every definition in a batch is added or
//! none is. Re-registering an identical definition is a no-op; a conflicting
//! shape fails. Codecs hold `Arc` handles so lookups happen once per
//! connection, not per message.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, RwLock};

use crate::core::error::{BagError, Result};

use super::ast::MsgDef;
use super::builtin;

/// Registry of message definitions.
pub struct TypeRegistry {
    inner: RwLock<HashMap<String, Arc<MsgDef>>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-populated with the built-in ROS2 message set.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry
            .register(builtin::builtin_types())
            .expect("built-in type set is internally consistent");
        registry
    }

    /// Register a batch of definitions atomically.
    ///
    /// Definitions identical to already-registered ones are skipped. A
    /// definition whose shape differs from the registered one fails the
    /// whole batch with `TypeConflict`. `std_msgs/msg/Header` is exempt
    /// because its ROS1 rendition legitimately differs.
    pub fn register(&self, defs: BTreeMap<String, MsgDef>) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        for (name, def) in &defs {
            if name == "std_msgs/msg/Header" {
                continue;
            }
            if let Some(have) = inner.get(name) {
                if !have.same_shape(def) {
                    return Err(BagError::type_conflict(name));
                }
            }
        }
        for (name, def) in defs {
            inner.entry(name).or_insert_with(|| Arc::new(def));
        }
        Ok(())
    }

    /// Look up a definition by fully-qualified name.
    pub fn lookup(&self, name: &str) -> Result<Arc<MsgDef>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .get(name)
            .cloned()
            .ok_or_else(|| BagError::type_not_found(name))
    }

    /// Whether a definition is registered.
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The process-wide registry, lazily initialized with the built-in set.
pub fn default_registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TypeRegistry::with_builtins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesys::ast::{BaseType, FieldDef, FieldType};

    fn simple_def(name: &str, field_ty: FieldType) -> BTreeMap<String, MsgDef> {
        let mut def = MsgDef::new(name);
        def.fields.push(FieldDef {
            name: "value".into(),
            ty: field_ty,
            default: None,
        });
        BTreeMap::from([(name.to_string(), def)])
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        registry
            .register(simple_def("test_msgs/msg/A", FieldType::Base(BaseType::Int32)))
            .unwrap();
        let def = registry.lookup("test_msgs/msg/A").unwrap();
        assert_eq!(def.fields.len(), 1);
        assert!(registry.lookup("test_msgs/msg/B").is_err());
    }

    #[test]
    fn test_identical_reregistration_is_noop() {
        let registry = TypeRegistry::new();
        let defs = simple_def("test_msgs/msg/A", FieldType::Base(BaseType::Int32));
        registry.register(defs.clone()).unwrap();
        registry.register(defs).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_reregistration_fails() {
        let registry = TypeRegistry::new();
        registry
            .register(simple_def("test_msgs/msg/A", FieldType::Base(BaseType::Int32)))
            .unwrap();
        let err = registry
            .register(simple_def("test_msgs/msg/A", FieldType::Base(BaseType::Int64)))
            .unwrap_err();
        assert!(matches!(err, BagError::TypeConflict { .. }));
    }

    #[test]
    fn test_register_is_atomic() {
        let registry = TypeRegistry::new();
        registry
            .register(simple_def("test_msgs/msg/A", FieldType::Base(BaseType::Int32)))
            .unwrap();

        let mut batch = simple_def("test_msgs/msg/New", FieldType::Base(BaseType::Bool));
        batch.extend(simple_def("test_msgs/msg/A", FieldType::Base(BaseType::Int64)));
        assert!(registry.register(batch).is_err());
        assert!(!registry.contains("test_msgs/msg/New"));
    }

    #[test]
    fn test_header_is_exempt_from_conflicts() {
        let registry = TypeRegistry::with_builtins();
        // ROS1 Header carries an extra seq field; re-registration must pass.
        let ros1_header = crate::typesys::msg::parse_msg(
            "uint32 seq\ntime stamp\nstring frame_id\n",
            "std_msgs/msg/Header",
        )
        .unwrap();
        registry.register(ros1_header).unwrap();
        // The built-in definition wins.
        let def = registry.lookup("std_msgs/msg/Header").unwrap();
        assert_eq!(def.fields[0].name, "stamp");
    }

    #[test]
    fn test_builtins_present() {
        let registry = TypeRegistry::with_builtins();
        for name in [
            "std_msgs/msg/String",
            "std_msgs/msg/Header",
            "builtin_interfaces/msg/Time",
            "geometry_msgs/msg/Point",
            "sensor_msgs/msg/Imu",
            "tf2_msgs/msg/TFMessage",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }
}
