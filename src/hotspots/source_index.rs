//! Per-file lexical extraction
//!
//! Pulls three things out of C# source text without parsing it:
//! the first declared class, underscore-prefixed fields with their declared
//! types, and method bodies delimited by brace matching.

use super::braces::{find_matching_brace, BraceScan};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

static CLASS_DECL: OnceLock<Regex> = OnceLock::new();
static FIELD_DECL: OnceLock<Regex> = OnceLock::new();
static METHOD_DECL: OnceLock<Regex> = OnceLock::new();

fn class_decl() -> &'static Regex {
    CLASS_DECL.get_or_init(|| Regex::new(r"\bclass\s+([A-Za-z_]\w*)").expect("valid regex"))
}

fn field_decl() -> &'static Regex {
    FIELD_DECL.get_or_init(|| {
        Regex::new(
            r"(?:private|protected|internal|public)\s+(?:readonly\s+)?([A-Za-z_][\w.]*(?:<[^>;]+>)?\??)\s+(_[A-Za-z_]\w*)\s*;",
        )
        .expect("valid regex")
    })
}

fn method_decl() -> &'static Regex {
    METHOD_DECL.get_or_init(|| {
        Regex::new(
            r"(?:public|private|protected|internal)\s+(?:virtual\s+|override\s+|static\s+|sealed\s+|new\s+|partial\s+)*(?:async\s+)?[\w<>,\[\]\.\?]+\s+(\w+)\s*\([^;{}]*\)\s*\{",
        )
        .expect("valid regex")
    })
}

/// Lexical structure of one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIndex {
    /// First declared class, or the file's base name when none is found
    pub class_name: String,
    /// Field name -> normalized declared type, in discovery order
    pub field_types: IndexMap<String, String>,
    /// Method name -> body text (between the braces), in discovery order.
    /// A later method with the same name overwrites the earlier body.
    pub methods: IndexMap<String, String>,
    /// Methods whose opening brace never found a match
    pub skipped_methods: usize,
}

impl SourceIndex {
    /// Extract the lexical structure of `text`.
    pub fn extract(text: &str, fallback_name: &str, scan: BraceScan) -> Self {
        let class_name = first_class_name(text)
            .unwrap_or(fallback_name)
            .to_string();
        let field_types = extract_field_types(text);
        let (methods, skipped_methods) = extract_method_bodies(text, scan);

        if skipped_methods > 0 {
            debug!(
                "{}: skipped {} method(s) with unbalanced braces",
                class_name, skipped_methods
            );
        }

        Self {
            class_name,
            field_types,
            methods,
            skipped_methods,
        }
    }
}

/// Name of the first `class` declaration in the text
pub fn first_class_name(text: &str) -> Option<&str> {
    declared_classes(text).next()
}

/// Every `class` declaration in the text, in order
pub fn declared_classes(text: &str) -> impl Iterator<Item = &str> {
    class_decl()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Underscore-prefixed field declarations: `_field` -> normalized type
pub fn extract_field_types(text: &str) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();
    for caps in field_decl().captures_iter(text) {
        let field_type = normalize_type_name(&caps[1]);
        fields.insert(caps[2].to_string(), field_type);
    }
    fields
}

/// Method name -> body text. Returns the bodies and the number of methods
/// dropped because their braces never balanced.
pub fn extract_method_bodies(text: &str, scan: BraceScan) -> (IndexMap<String, String>, usize) {
    let mut methods = IndexMap::new();
    let mut skipped = 0;

    for caps in method_decl().captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let open = whole.end() - 1;
        match find_matching_brace(text, open, scan) {
            Some(close) => {
                methods.insert(name.as_str().to_string(), text[open + 1..close].to_string());
            }
            None => skipped += 1,
        }
    }

    (methods, skipped)
}

/// Strip nullable markers, generic arguments and namespace qualifiers:
/// `Data.IRepository<User>?` -> `IRepository`
pub fn normalize_type_name(type_name: &str) -> String {
    let cleaned = type_name.replace('?', "");
    let cleaned = cleaned.trim();
    let cleaned = cleaned.split('<').next().unwrap_or(cleaned);
    cleaned.rsplit('.').next().unwrap_or(cleaned).to_string()
}
