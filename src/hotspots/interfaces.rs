//! Synthetic interface bindings
//!
//! Dependency-injected fields are usually typed by interface (`IUserService`)
//! while the implementation is the class without the `I` prefix. The resolver
//! assumes that convention for every indexed class.

use indexmap::IndexMap;

/// `"I" + ClassName` -> `ClassName` for every indexed class
#[derive(Debug, Clone, Default)]
pub struct InterfaceResolver {
    bindings: IndexMap<String, String>,
}

impl InterfaceResolver {
    /// Build bindings from class names in scan order.
    ///
    /// Two classes producing the same interface name resolve to the one seen last.
    pub fn build<'a>(class_names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut bindings = IndexMap::new();
        for class in class_names {
            bindings.insert(format!("I{class}"), class.to_string());
        }
        Self { bindings }
    }

    /// Resolve a declared field type to the concrete class name.
    /// Types without a binding are returned unchanged.
    pub fn resolve<'a>(&'a self, type_name: &'a str) -> &'a str {
        self.binding(type_name).unwrap_or(type_name)
    }

    /// The bound class for an interface name, if any
    pub fn binding(&self, interface: &str) -> Option<&str> {
        self.bindings.get(interface).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_prefixed_interface() {
        let resolver = InterfaceResolver::build(["UserService", "UserRepository"]);
        assert_eq!(resolver.binding("IUserService"), Some("UserService"));
        assert_eq!(resolver.resolve("IUserRepository"), "UserRepository");
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_unbound_type_passes_through() {
        let resolver = InterfaceResolver::build(["UserService"]);
        assert_eq!(resolver.resolve("ILogger"), "ILogger");
        assert_eq!(resolver.resolve("UserService"), "UserService");
    }

    #[test]
    fn test_collision_last_write_wins() {
        // Both normalize to the same interface key
        let resolver = InterfaceResolver::build(["Cache", "Cache"]);
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.binding("ICache"), Some("Cache"));
    }
}
