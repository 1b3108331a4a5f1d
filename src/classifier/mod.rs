//! File role classification
//!
//! Assigns each scanned file an architectural [`FileRole`] from its path and
//! a few inheritance markers in its content, and records the classes,
//! methods and technologies it uses.

mod rules;

pub use rules::determine_role;

use crate::cache::FileCache;
use crate::hotspots::source_index::declared_classes;
use crate::models::SourceFile;
use rayon::prelude::*;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

static METHOD_NAME: OnceLock<Regex> = OnceLock::new();
static ASYNC_USAGE: OnceLock<Regex> = OnceLock::new();
static ENTITY_FRAMEWORK: OnceLock<Vec<Regex>> = OnceLock::new();
static SQL_USAGE: OnceLock<Vec<Regex>> = OnceLock::new();

fn method_name() -> &'static Regex {
    METHOD_NAME.get_or_init(|| {
        Regex::new(
            r"(?:public|private|protected|internal)\s+(?:static\s+)?(?:async\s+)?(?:Task<?[^>]*>?|void|[\w<>]+)\s+(\w+)\s*\(",
        )
        .expect("valid regex")
    })
}

fn async_usage() -> &'static Regex {
    ASYNC_USAGE.get_or_init(|| Regex::new(r"\b(?:async|await)\b").expect("valid regex"))
}

fn entity_framework() -> &'static [Regex] {
    ENTITY_FRAMEWORK.get_or_init(|| {
        [
            r"using\s+System\.Data\.Entity",
            r"using\s+Microsoft\.EntityFrameworkCore",
            r"DbContext",
            r"DbSet<",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn sql_usage() -> &'static [Regex] {
    SQL_USAGE.get_or_init(|| {
        [
            r"SqlCommand",
            r"SqlConnection",
            r"ExecuteSqlCommand",
            r"FromSql",
            r#"@"SELECT\s+"#,
            r"'SELECT\s+",
            r#"@"INSERT\s+"#,
            r#"@"UPDATE\s+"#,
            r#"@"DELETE\s+"#,
        ]
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
        .collect()
    })
}

/// Classify one file in place from its content.
pub fn classify(file: &mut SourceFile, content: &str) {
    file.role = determine_role(&file.relative_path, content);
    file.class_names = declared_classes(content).map(String::from).collect();
    file.method_names = method_name()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect();
    file.has_async = async_usage().is_match(content);
    file.has_entity_framework = entity_framework().iter().any(|re| re.is_match(content));
    file.has_sql = sql_usage().iter().any(|re| re.is_match(content));
}

/// Classify every file in parallel, reading contents through the cache.
pub fn classify_all(files: &mut [SourceFile], cache: &FileCache) {
    files.par_iter_mut().for_each(|file| {
        let content = cache.content(file.path());
        classify(file, &content);
    });
    debug!("Classified {} files", files.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileRole;

    fn classified(rel: &str, content: &str) -> SourceFile {
        let mut file = SourceFile::new(format!("/r/{rel}"), rel, content.lines().count());
        classify(&mut file, content);
        file
    }

    #[test]
    fn test_extracts_names_and_flags() {
        let content = r#"
using Microsoft.EntityFrameworkCore;
public class OrderService : IOrderService
{
    private readonly AppDbContext _db;
    public async Task<Order> Get(int id) { return await _db.Orders.FindAsync(id); }
    private void Log(string m) { }
}
internal class Helper { }
"#;
        let file = classified("Services/OrderService.cs", content);
        assert_eq!(file.role, FileRole::Service);
        assert_eq!(file.class_names, vec!["OrderService", "Helper"]);
        assert_eq!(file.method_names, vec!["Get", "Log"]);
        assert!(file.has_async);
        assert!(file.has_entity_framework);
        assert!(!file.has_sql);
    }

    #[test]
    fn test_sql_flag() {
        let file = classified(
            "Data/Dal.cs",
            "var q = @\"select * from T\"; using (var c = new SqlConnection(cs)) { }",
        );
        assert!(file.has_sql);
        assert!(!file.has_async);
    }

    #[test]
    fn test_classify_all_reads_cache() {
        let cache = FileCache::new();
        cache.insert("/r/Controllers/HomeController.cs", "public class HomeController : Controller { }");
        let mut files = vec![SourceFile::new(
            "/r/Controllers/HomeController.cs",
            "Controllers/HomeController.cs",
            1,
        )];
        classify_all(&mut files, &cache);
        assert_eq!(files[0].role, FileRole::Controller);
        assert_eq!(files[0].primary_class(), "HomeController");
    }
}
