use classsync_core::{catalog, LocalReference, SchemaTarget};

use crate::error::BootstrapError;

// ---------------------------------------------------------------------------
// MandatoryDocument
// ---------------------------------------------------------------------------

/// A document the application guarantees to exist, with its schema.
#[derive(Debug, Clone)]
pub struct MandatoryDocument {
    pub reference: LocalReference,
    pub target: SchemaTarget,
}

// ---------------------------------------------------------------------------
// MandatoryDocumentRegistry
// ---------------------------------------------------------------------------

/// Ordered list of mandatory documents.
///
/// Documents are initialized in registration order. Each reference may be
/// registered once; schemas for the same document are composed before
/// registration, not merged here.
#[derive(Debug, Clone, Default)]
pub struct MandatoryDocumentRegistry {
    documents: Vec<MandatoryDocument>,
}

impl MandatoryDocumentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with every built-in class document.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Schema`] if a built-in declaration is invalid.
    pub fn with_builtin() -> Result<Self, BootstrapError> {
        let mut registry = Self::new();
        for (reference, target) in catalog::builtin()? {
            registry.register(reference, target)?;
        }
        Ok(registry)
    }

    /// Appends a document after the ones already registered.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::DuplicateRegistration`] if `reference` is
    /// already registered.
    pub fn register(
        &mut self,
        reference: LocalReference,
        target: SchemaTarget,
    ) -> Result<(), BootstrapError> {
        if self.get(&reference).is_some() {
            return Err(BootstrapError::DuplicateRegistration { reference });
        }
        self.documents.push(MandatoryDocument { reference, target });
        Ok(())
    }

    #[must_use]
    pub fn get(&self, reference: &LocalReference) -> Option<&MandatoryDocument> {
        self.documents.iter().find(|d| &d.reference == reference)
    }

    /// Registered documents in initialization order.
    pub fn iter(&self) -> impl Iterator<Item = &MandatoryDocument> {
        self.documents.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use classsync_core::FieldSpec;

    use super::*;

    fn target(class: &str) -> SchemaTarget {
        SchemaTarget::builder(class)
            .field(FieldSpec::text("name", "Name", 30))
            .build()
            .unwrap()
    }

    #[test]
    fn register_keeps_order() {
        let mut registry = MandatoryDocumentRegistry::new();
        registry
            .register(LocalReference::new("XWiki", "B"), target("XWiki.B"))
            .unwrap();
        registry
            .register(LocalReference::new("XWiki", "A"), target("XWiki.A"))
            .unwrap();

        let order: Vec<String> = registry.iter().map(|d| d.reference.to_string()).collect();
        assert_eq!(order, vec!["XWiki.B", "XWiki.A"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = MandatoryDocumentRegistry::new();
        let reference = LocalReference::new("XWiki", "XWikiUsers");
        registry.register(reference.clone(), target("XWiki.XWikiUsers")).unwrap();

        let err = registry
            .register(reference, target("XWiki.XWikiUsers"))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::DuplicateRegistration { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn builtin_registry_contains_core_classes() {
        let registry = MandatoryDocumentRegistry::with_builtin().unwrap();
        assert!(!registry.is_empty());
        assert!(registry
            .get(&LocalReference::new("XWiki", "XWikiUsers"))
            .is_some());
        assert!(registry
            .get(&LocalReference::new("XWiki", "XWikiGlobalRights"))
            .is_some_and(|d| d.target.main_wiki_only()));
    }
}
