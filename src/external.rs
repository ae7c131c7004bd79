//! Items owned by other plugins, looked up by `namespace:reference`.

use crate::error::ResolveError;
use crate::item::ItemStack;
use crate::player::Player;
use std::collections::HashMap;
use std::fmt;

/// Resolves references within one namespace into item stacks.
pub trait ExternalItemResolver {
    /// Produce the base stack for `reference`. The caller overwrites the count.
    fn resolve(&self, reference: &str, player: Option<&Player>) -> Result<ItemStack, String>;

    /// Whether `stack` is an instance of `reference`.
    fn matches(&self, _reference: &str, _stack: &ItemStack) -> bool {
        false
    }
}

impl<F> ExternalItemResolver for F
where
    F: Fn(&str, Option<&Player>) -> Result<ItemStack, String>,
{
    fn resolve(&self, reference: &str, player: Option<&Player>) -> Result<ItemStack, String> {
        self(reference, player)
    }
}

/// Capability table of resolvers keyed by lower-cased namespace.
#[derive(Default)]
pub struct ExternalItemRegistry {
    resolvers: HashMap<String, Box<dyn ExternalItemResolver>>,
}

impl fmt::Debug for ExternalItemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalItemRegistry")
            .field("namespaces", &self.resolvers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExternalItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resolver` for `namespace`, returning the one it replaced.
    pub fn register(
        &mut self,
        namespace: &str,
        resolver: impl ExternalItemResolver + 'static,
    ) -> Option<Box<dyn ExternalItemResolver>> {
        self.resolvers
            .insert(namespace.to_lowercase(), Box::new(resolver))
    }

    pub fn unregister(&mut self, namespace: &str) -> Option<Box<dyn ExternalItemResolver>> {
        self.resolvers.remove(&namespace.to_lowercase())
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.resolvers.contains_key(&namespace.to_lowercase())
    }

    pub fn resolve(
        &self,
        namespace: &str,
        reference: &str,
        player: Option<&Player>,
    ) -> Result<ItemStack, ResolveError> {
        let namespace = namespace.to_lowercase();
        let reference = reference.to_lowercase();
        let resolver =
            self.resolvers
                .get(&namespace)
                .ok_or_else(|| ResolveError::UnknownNamespace {
                    namespace: namespace.clone(),
                    reference: reference.clone(),
                })?;
        resolver
            .resolve(&reference, player)
            .map_err(|reason| ResolveError::External {
                namespace,
                reference,
                reason,
            })
    }

    /// Unregistered namespaces never match.
    pub fn matches(&self, namespace: &str, reference: &str, stack: &ItemStack) -> bool {
        self.resolvers
            .get(&namespace.to_lowercase())
            .is_some_and(|r| r.matches(&reference.to_lowercase(), stack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gems;

    impl ExternalItemResolver for Gems {
        fn resolve(&self, reference: &str, _player: Option<&Player>) -> Result<ItemStack, String> {
            match reference {
                "ruby" => Ok(ItemStack::new("RED_DYE", 1)),
                other => Err(format!("no gem called {other}")),
            }
        }

        fn matches(&self, reference: &str, stack: &ItemStack) -> bool {
            reference == "ruby" && stack.item == "RED_DYE"
        }
    }

    #[test]
    fn namespaces_are_case_insensitive() {
        let mut registry = ExternalItemRegistry::new();
        registry.register("Gems", Gems);
        assert!(registry.contains("GEMS"));
        let stack = registry.resolve("gems", "RUBY", None).unwrap();
        assert_eq!(stack.item, "RED_DYE");
        assert!(registry.matches("gems", "ruby", &stack));
    }

    #[test]
    fn unknown_namespace_is_a_typed_error() {
        let registry = ExternalItemRegistry::new();
        let err = registry.resolve("gems", "ruby", None).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownNamespace { .. }));
        assert!(!registry.matches("gems", "ruby", &ItemStack::new("RED_DYE", 1)));
    }

    #[test]
    fn resolver_failures_carry_the_reason() {
        let mut registry = ExternalItemRegistry::new();
        registry.register("gems", Gems);
        let err = registry.resolve("gems", "opal", None).unwrap_err();
        assert!(err.to_string().contains("no gem called opal"));
    }

    #[test]
    fn closures_are_resolvers() {
        let mut registry = ExternalItemRegistry::new();
        registry.register(
            "books",
            |reference: &str, _: Option<&Player>| -> Result<ItemStack, String> {
                Ok(ItemStack::new(format!("BOOK_{}", reference.to_uppercase()), 1))
            },
        );
        assert_eq!(registry.resolve("books", "Guide", None).unwrap().item, "BOOK_GUIDE");
    }
}
