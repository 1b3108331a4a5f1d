//! Stored procedure names and SQL fragments from C# string literals

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Fragments are truncated to this many characters
pub const MAX_FRAGMENT_CHARS: usize = 180;

static STRING_LITERAL: OnceLock<Regex> = OnceLock::new();
static SQL_KEYWORD: OnceLock<Regex> = OnceLock::new();
static EXEC_PROCEDURE: OnceLock<Regex> = OnceLock::new();
static STORED_PROCEDURE_MARKER: OnceLock<Regex> = OnceLock::new();
static COMMAND_TEXT: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();

fn string_literal() -> &'static Regex {
    STRING_LITERAL.get_or_init(|| {
        Regex::new(r#"(?s)(?:\$@|@\$|@|\$)?"(?:""|\\"|[^"])*""#).expect("valid regex")
    })
}

fn sql_keyword() -> &'static Regex {
    SQL_KEYWORD.get_or_init(|| {
        Regex::new(r"(?i)\b(select|insert|update|delete|merge|with|join|exec(?:ute)?)\b")
            .expect("valid regex")
    })
}

fn exec_procedure() -> &'static Regex {
    EXEC_PROCEDURE.get_or_init(|| {
        Regex::new(r"(?i)\bEXEC(?:UTE)?\s+((?:\[?\w+\]?\.)*\[?\w+\]?)").expect("valid regex")
    })
}

fn stored_procedure_marker() -> &'static Regex {
    STORED_PROCEDURE_MARKER
        .get_or_init(|| Regex::new(r"(?i)CommandType\.StoredProcedure").expect("valid regex"))
}

fn command_text() -> &'static Regex {
    COMMAND_TEXT.get_or_init(|| {
        Regex::new(r#"(?i)CommandText\s*=\s*@?"([^"]+)""#).expect("valid regex")
    })
}

fn whitespace() -> &'static Regex {
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Deduplicated, lexicographically ordered SQL artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlArtifacts {
    pub stored_procedures: BTreeSet<String>,
    pub sql_fragments: BTreeSet<String>,
}

impl SqlArtifacts {
    /// Artifacts found in one file's text
    pub fn collect_from(content: &str) -> Self {
        let mut artifacts = Self::default();

        for literal in string_literal().find_iter(content) {
            let decoded = decode_literal(literal.as_str());
            let compact = whitespace().replace_all(&decoded, " ");
            let compact = compact.trim();
            if compact.is_empty() {
                continue;
            }

            if sql_keyword().is_match(compact) {
                artifacts
                    .sql_fragments
                    .insert(compact.chars().take(MAX_FRAGMENT_CHARS).collect());
            }

            for caps in exec_procedure().captures_iter(compact) {
                if let Some(name) = procedure_name(&caps[1]) {
                    artifacts.stored_procedures.insert(name);
                }
            }
        }

        if stored_procedure_marker().is_match(content) {
            for caps in command_text().captures_iter(content) {
                if let Some(name) = procedure_name(&caps[1]) {
                    artifacts.stored_procedures.insert(name);
                }
            }
        }

        artifacts
    }

    pub fn merge(&mut self, other: SqlArtifacts) {
        self.stored_procedures.extend(other.stored_procedures);
        self.sql_fragments.extend(other.sql_fragments);
    }

    pub fn is_empty(&self) -> bool {
        self.stored_procedures.is_empty() && self.sql_fragments.is_empty()
    }
}

/// Decode a C# string literal token into its text.
///
/// Verbatim literals (`@"..."`) only un-double quotes. Regular literals
/// unescape `\"`, `\n` and `\t`. Anything not shaped like a literal decodes
/// to an empty string.
pub fn decode_literal(literal: &str) -> String {
    let prefix_len = literal
        .bytes()
        .take_while(|b| *b == b'@' || *b == b'$')
        .count();
    let (prefix, quoted) = literal.split_at(prefix_len);

    if quoted.len() < 2 || !quoted.starts_with('"') || !quoted.ends_with('"') {
        return String::new();
    }
    let body = &quoted[1..quoted.len() - 1];

    if prefix.contains('@') {
        body.replace("\"\"", "\"")
    } else {
        body.replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\t", "\t")
    }
}

/// Last dotted segment with brackets removed: `[dbo].[GetUser]` -> `GetUser`
pub fn procedure_name(raw: &str) -> Option<String> {
    let last = raw.rsplit('.').next().unwrap_or(raw);
    let name = last.replace(['[', ']'], "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
