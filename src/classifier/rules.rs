//! Naming-convention rules for file roles
//!
//! Rules are checked in order and the first hit wins. API controllers are
//! checked before plain controllers, repositories before services.

use crate::models::FileRole;
use regex::Regex;
use std::sync::OnceLock;

struct RoleRule {
    role: FileRole,
    paths: Vec<Regex>,
    content: Option<Regex>,
}

impl RoleRule {
    fn new(role: FileRole, paths: &[&str], content: Option<&str>) -> Self {
        Self {
            role,
            paths: paths
                .iter()
                .map(|p| Regex::new(p).expect("valid regex"))
                .collect(),
            content: content.map(|p| Regex::new(p).expect("valid regex")),
        }
    }

    fn matches(&self, relative_path: &str, content: &str) -> bool {
        self.paths.iter().any(|re| re.is_match(relative_path))
            || self.content.as_ref().is_some_and(|re| re.is_match(content))
    }
}

static ROLE_RULES: OnceLock<Vec<RoleRule>> = OnceLock::new();

fn role_rules() -> &'static [RoleRule] {
    ROLE_RULES.get_or_init(|| {
        vec![
            RoleRule::new(
                FileRole::ApiController,
                &[r"ApiController\.cs$", r"Api.*Controller\.cs$"],
                Some(r":\s*ApiController"),
            ),
            RoleRule::new(
                FileRole::Controller,
                &[r"Controller\.cs$", r"Controllers/"],
                Some(r":\s*Controller"),
            ),
            RoleRule::new(
                FileRole::Repository,
                &[r"Repository\.cs$", r"Repositories/", r"Dal\.cs$", r"DataAccess/"],
                Some(r":\s*I.*Repository"),
            ),
            RoleRule::new(
                FileRole::Service,
                &[
                    r"Service\.cs$",
                    r"Services/",
                    r"Manager\.cs$",
                    r"Managers/",
                    r"Handler\.cs$",
                    r"Handlers/",
                ],
                Some(r":\s*I.*Service"),
            ),
            RoleRule::new(
                FileRole::Model,
                &[r"Models/", r"Entities/", r"Dto\.cs$", r"ViewModel\.cs$", r"Model\.cs$"],
                None,
            ),
        ]
    })
}

/// Role of a file from its `/`-separated relative path and content
pub fn determine_role(relative_path: &str, content: &str) -> FileRole {
    if relative_path.ends_with(".cshtml") {
        return FileRole::View;
    }

    if let Some(rule) = role_rules()
        .iter()
        .find(|rule| rule.matches(relative_path, content))
    {
        return rule.role;
    }

    let lower = relative_path.to_lowercase();
    if lower.contains("web.config") || lower.contains("app.config") {
        return FileRole::Config;
    }

    FileRole::Unknown
}
