//! Layer tagging for the endpoint walk
//!
//! Decides whether a call target counts as a service or a repository hop.

use crate::models::FileRole;

/// Classifies call targets into application layers.
///
/// `role` is the file role of the class's declaring file, or `None` when the
/// class was never indexed. The two checks are independent.
pub trait LayerTagger: Send + Sync {
    fn is_service(&self, class_name: &str, role: Option<FileRole>) -> bool;
    fn is_repository(&self, class_name: &str, role: Option<FileRole>) -> bool;
}

/// Role classification or a `Service` / `Repository` class-name suffix
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConventionTagger;

impl LayerTagger for NamingConventionTagger {
    fn is_service(&self, class_name: &str, role: Option<FileRole>) -> bool {
        role == Some(FileRole::Service) || class_name.ends_with("Service")
    }

    fn is_repository(&self, class_name: &str, role: Option<FileRole>) -> bool {
        role == Some(FileRole::Repository) || class_name.ends_with("Repository")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_rules() {
        let tagger = NamingConventionTagger;
        assert!(tagger.is_service("BillingService", None));
        assert!(tagger.is_repository("OrderRepository", None));
        assert!(!tagger.is_service("OrderRepository", None));
        assert!(!tagger.is_repository("Helpers", Some(FileRole::Unknown)));
    }

    #[test]
    fn test_role_rules() {
        let tagger = NamingConventionTagger;
        // Managers/Handlers are classified as services by file role
        assert!(tagger.is_service("BillingManager", Some(FileRole::Service)));
        assert!(tagger.is_repository("CustomerDal", Some(FileRole::Repository)));
    }
}
