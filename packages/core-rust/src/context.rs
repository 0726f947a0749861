/// Read-only capabilities the reconciler needs from its caller.
///
/// Implementations answer questions the reconciler cannot compute itself.
/// Lookups may fail (e.g. the wiki descriptor store is unreachable); failures
/// are propagated, never guessed.
pub trait ExecutionContext {
    /// Identifier of the wiki whose documents are being reconciled.
    fn current_wiki_id(&self) -> &str;

    /// Whether the current wiki is the primary (main) wiki.
    ///
    /// # Errors
    ///
    /// Returns an error when the answer cannot be determined.
    fn is_primary_wiki(&self) -> anyhow::Result<bool>;
}

/// Execution context for a wiki whose primary status is known up front.
#[derive(Debug, Clone)]
pub struct WikiContext {
    /// Identifier of the wiki being initialized.
    pub wiki_id: String,
    /// Identifier of the primary wiki of the farm.
    pub primary_wiki_id: String,
}

impl WikiContext {
    #[must_use]
    pub fn new(wiki_id: impl Into<String>, primary_wiki_id: impl Into<String>) -> Self {
        Self {
            wiki_id: wiki_id.into(),
            primary_wiki_id: primary_wiki_id.into(),
        }
    }

    /// Context for the primary wiki itself.
    #[must_use]
    pub fn primary(wiki_id: impl Into<String>) -> Self {
        let wiki_id = wiki_id.into();
        Self {
            primary_wiki_id: wiki_id.clone(),
            wiki_id,
        }
    }
}

impl ExecutionContext for WikiContext {
    fn current_wiki_id(&self) -> &str {
        &self.wiki_id
    }

    fn is_primary_wiki(&self) -> anyhow::Result<bool> {
        Ok(self.wiki_id == self.primary_wiki_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_context_is_primary() {
        let ctx = WikiContext::primary("xwiki");
        assert_eq!(ctx.current_wiki_id(), "xwiki");
        assert!(ctx.is_primary_wiki().unwrap());
    }

    #[test]
    fn secondary_context_is_not_primary() {
        let ctx = WikiContext::new("sub", "xwiki");
        assert_eq!(ctx.current_wiki_id(), "sub");
        assert!(!ctx.is_primary_wiki().unwrap());
    }
}
