//! Inferred class dependency graph for the architecture diagrams
//!
//! Nodes are the primary classes of controller, service, repository and
//! model files. An edge `A -> B` means B's name appears as a whole word in
//! A's source. This is a textual heuristic, not a compile-time dependency.

use crate::file_provider::FileProvider;
use crate::models::FileRole;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::debug;

pub const MAX_NODES: usize = 24;
pub const MAX_EDGES: usize = 40;

/// A class shown in the dependency diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    pub role: FileRole,
}

/// A directed reference between two classes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDependencyGraph {
    /// Sorted by name
    pub nodes: Vec<ClassNode>,
    /// Sorted by (source, target)
    pub edges: Vec<ClassEdge>,
}

impl ClassDependencyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn is_diagram_role(role: FileRole) -> bool {
    matches!(
        role,
        FileRole::Controller
            | FileRole::ApiController
            | FileRole::Service
            | FileRole::Repository
            | FileRole::Model
    )
}

/// Build the graph from the classified files.
///
/// At most [`MAX_NODES`] classes (alphabetically first) and [`MAX_EDGES`]
/// edges. Model-to-model references are left out. When two files share a
/// primary class name the later file wins.
pub fn infer_class_dependencies(files: &dyn FileProvider) -> ClassDependencyGraph {
    let mut classes: BTreeMap<String, (FileRole, PathBuf)> = BTreeMap::new();
    for file in files.files().iter().filter(|f| is_diagram_role(f.role)) {
        classes.insert(
            file.primary_class().to_string(),
            (file.role, file.path.clone()),
        );
    }

    let selected: Vec<(&String, &(FileRole, PathBuf))> = classes.iter().take(MAX_NODES).collect();
    let matchers: Vec<Option<Regex>> = selected
        .iter()
        .map(|(name, _)| Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok())
        .collect();

    let mut edges: BTreeSet<ClassEdge> = BTreeSet::new();
    'sources: for (source, (source_role, path)) in &selected {
        let content = files.content(path);
        if content.is_empty() {
            continue;
        }

        for ((target, (target_role, _)), matcher) in selected.iter().zip(&matchers) {
            if source == target {
                continue;
            }
            let Some(matcher) = matcher else { continue };
            if !matcher.is_match(&content) {
                continue;
            }
            if *source_role == FileRole::Model && *target_role == FileRole::Model {
                continue;
            }

            edges.insert(ClassEdge {
                source: (*source).clone(),
                target: (*target).clone(),
            });
            if edges.len() >= MAX_EDGES {
                break 'sources;
            }
        }
    }

    debug!(
        "Class dependency graph: {} nodes, {} edges",
        selected.len(),
        edges.len()
    );

    ClassDependencyGraph {
        nodes: selected
            .iter()
            .map(|(name, (role, _))| ClassNode {
                name: (*name).clone(),
                role: *role,
            })
            .collect(),
        edges: edges.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_provider::MockFileProvider;

    #[test]
    fn test_edges_follow_name_references() {
        let provider = MockFileProvider::new(vec![
            (
                "Controllers/OrdersController.cs",
                "public class OrdersController : Controller { private readonly IOrderService _s; OrderService x; Order o; }",
            ),
            (
                "Services/OrderService.cs",
                "public class OrderService : IOrderService { OrderRepository r; }",
            ),
            ("Data/OrderRepository.cs", "public class OrderRepository { Order o; }"),
            ("Models/Order.cs", "public class Order { Customer c; }"),
            ("Models/Customer.cs", "public class Customer { Order last; }"),
            ("Helpers/Util.cs", "public class Util { OrderService s; }"),
        ]);

        let graph = infer_class_dependencies(&provider);
        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Customer", "Order", "OrderRepository", "OrderService", "OrdersController"]
        );

        let edges: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("OrderRepository", "Order"),
                ("OrderService", "OrderRepository"),
                ("OrdersController", "Order"),
                ("OrdersController", "OrderService"),
            ]
        );
    }

    #[test]
    fn test_no_relevant_files() {
        let provider = MockFileProvider::new(vec![("Helpers/Util.cs", "public class Util { }")]);
        assert!(infer_class_dependencies(&provider).is_empty());
    }
}
