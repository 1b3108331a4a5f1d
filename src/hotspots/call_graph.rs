//! Member-call extraction
//!
//! Only calls through underscore-prefixed fields (`_orders.Find(`) are
//! followed. Locals, statics and `this.` calls produce no edge.

use super::interfaces::InterfaceResolver;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

static MEMBER_CALL: OnceLock<Regex> = OnceLock::new();

fn member_call() -> &'static Regex {
    MEMBER_CALL.get_or_init(|| {
        Regex::new(r"\b(_[A-Za-z_]\w*)\s*\.\s*([A-Za-z_]\w*)\s*\(").expect("valid regex")
    })
}

/// One resolved outgoing call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallEdge {
    pub target_class: String,
    pub target_method: String,
}

impl CallEdge {
    pub fn new(target_class: impl Into<String>, target_method: impl Into<String>) -> Self {
        Self {
            target_class: target_class.into(),
            target_method: target_method.into(),
        }
    }

    /// `Class.Method`
    pub fn label(&self) -> String {
        format!("{}.{}", self.target_class, self.target_method)
    }
}

/// Edges for every `_field.Method(` in `body`, in lexical order.
///
/// Fields missing from `field_types` are skipped. Duplicate calls yield
/// duplicate edges.
pub fn extract_member_calls(
    body: &str,
    field_types: &IndexMap<String, String>,
    interfaces: &InterfaceResolver,
) -> Vec<CallEdge> {
    member_call()
        .captures_iter(body)
        .filter_map(|caps| {
            let declared = field_types.get(&caps[1])?;
            Some(CallEdge::new(interfaces.resolve(declared), &caps[2]))
        })
        .collect()
}
