//! Build context for the hotspot analysis
//!
//! Phase one indexes every C# file (class, fields, method bodies, DB-touch
//! counts). Phase two binds interfaces over the complete class set and
//! resolves each method's outgoing calls. The result is read-only.

use super::braces::BraceScan;
use super::call_graph::{extract_member_calls, CallEdge};
use super::db_touch::count_db_touches;
use super::interfaces::InterfaceResolver;
use super::source_index::SourceIndex;
use crate::file_provider::FileProvider;
use crate::models::FileRole;
use indexmap::IndexMap;
use tracing::debug;

/// One indexed method
#[derive(Debug, Clone, Default)]
pub struct MethodRecord {
    pub body: String,
    pub db_touches: usize,
    /// Outgoing edges in lexical order
    pub calls: Vec<CallEdge>,
}

/// One indexed class
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub name: String,
    /// Relative path of the (last) declaring file
    pub source_file: String,
    pub role: FileRole,
    pub field_types: IndexMap<String, String>,
    pub methods: IndexMap<String, MethodRecord>,
}

/// Phase-one and phase-two results for one audit
#[derive(Debug, Clone, Default)]
pub struct HotspotIndex {
    classes: IndexMap<String, ClassRecord>,
    interfaces: InterfaceResolver,
    files_indexed: usize,
    skipped_methods: usize,
}

impl HotspotIndex {
    /// Index every non-empty `.cs` file the provider knows about, in order.
    pub fn build(provider: &dyn FileProvider, scan: BraceScan) -> Self {
        let mut index = Self::default();

        for file in provider.files().iter().filter(|f| f.is_csharp()) {
            let content = provider.content(file.path());
            if content.is_empty() {
                continue;
            }
            let extracted = SourceIndex::extract(&content, file.primary_class(), scan);
            index.files_indexed += 1;
            index.skipped_methods += extracted.skipped_methods;
            index.insert(extracted, &file.relative_path, file.role);
        }

        index.interfaces = InterfaceResolver::build(index.classes.keys().map(String::as_str));
        index.resolve_calls();

        debug!(
            "Hotspot index: {} files, {} classes, {} methods ({} skipped)",
            index.files_indexed,
            index.classes.len(),
            index.method_count(),
            index.skipped_methods
        );
        index
    }

    /// Record one file's extraction. A later file declaring the same class
    /// replaces the earlier record entirely.
    fn insert(&mut self, extracted: SourceIndex, relative_path: &str, role: FileRole) {
        let methods = extracted
            .methods
            .into_iter()
            .map(|(name, body)| {
                let db_touches = count_db_touches(&body);
                let method = MethodRecord {
                    body,
                    db_touches,
                    calls: Vec::new(),
                };
                (name, method)
            })
            .collect();

        let record = ClassRecord {
            name: extracted.class_name.clone(),
            source_file: relative_path.to_string(),
            role,
            field_types: extracted.field_types,
            methods,
        };
        if let Some(previous) = self.classes.insert(extracted.class_name, record) {
            debug!(
                "Class {} from {} replaced by {}",
                previous.name, previous.source_file, relative_path
            );
        }
    }

    fn resolve_calls(&mut self) {
        let interfaces = &self.interfaces;
        for record in self.classes.values_mut() {
            for method in record.methods.values_mut() {
                method.calls = extract_member_calls(&method.body, &record.field_types, interfaces);
            }
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.values()
    }

    pub fn method(&self, class: &str, method: &str) -> Option<&MethodRecord> {
        self.classes.get(class)?.methods.get(method)
    }

    /// DB touches of a method; 0 when the method was never indexed
    pub fn db_touches(&self, class: &str, method: &str) -> usize {
        self.method(class, method).map_or(0, |m| m.db_touches)
    }

    /// Outgoing edges of a method; empty when the method was never indexed
    pub fn calls(&self, class: &str, method: &str) -> &[CallEdge] {
        self.method(class, method)
            .map(|m| m.calls.as_slice())
            .unwrap_or(&[])
    }

    pub fn role_of(&self, class: &str) -> Option<FileRole> {
        self.classes.get(class).map(|c| c.role)
    }

    pub fn interfaces(&self) -> &InterfaceResolver {
        &self.interfaces
    }

    pub fn files_indexed(&self) -> usize {
        self.files_indexed
    }

    pub fn skipped_methods(&self) -> usize {
        self.skipped_methods
    }

    pub fn method_count(&self) -> usize {
        self.classes.values().map(|c| c.methods.len()).sum()
    }
}
