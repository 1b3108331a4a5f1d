//! Heuristic database-touch scoring
//!
//! Every match of every signature counts, so a body calling `.ToList()`
//! twice scores two. The count approximates "likely talks to the database"
//! and errs on the high side.

use regex::Regex;
use std::sync::OnceLock;

/// ORM and ADO.NET call shapes
const DB_TOUCH_PATTERNS: &[&str] = &[
    r"\.SaveChanges(?:Async)?\s*\(",
    r"\.ExecuteSql(?:Command|Raw|Interpolated)(?:Async)?\s*\(",
    r"\.FromSql(?:Raw|Interpolated)?\s*\(",
    r"\.ToList(?:Async)?\s*\(",
    r"\.FirstOrDefault(?:Async)?\s*\(",
    r"\.SingleOrDefault(?:Async)?\s*\(",
    r"\.Find(?:Async)?\s*\(",
    r"\.Any(?:Async)?\s*\(",
    r"\.Count(?:Async)?\s*\(",
    r"SqlCommand\s*\(",
    r"SqlConnection\s*\(",
    r"SqlDataReader\b",
    r"CommandType\.StoredProcedure",
];

static DB_TOUCH_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

fn db_touch_regexes() -> &'static [Regex] {
    DB_TOUCH_REGEXES.get_or_init(|| {
        DB_TOUCH_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
            .collect()
    })
}

/// Sum of non-overlapping matches of every signature in `body`
pub fn count_db_touches(body: &str) -> usize {
    db_touch_regexes()
        .iter()
        .map(|re| re.find_iter(body).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_occurrence() {
        let body = "var a = db.Users.ToList(); var b = db.Orders.ToList(); db.SaveChanges();";
        assert_eq!(count_db_touches(body), 3);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(count_db_touches("ctx.savechangesasync ()"), 1);
    }

    #[test]
    fn test_ado_net_patterns() {
        let body = r#"
            using var conn = new SqlConnection(cs);
            var cmd = new SqlCommand("usp_Get", conn);
            cmd.CommandType = CommandType.StoredProcedure;
            SqlDataReader reader = cmd.ExecuteReader();
        "#;
        assert_eq!(count_db_touches(body), 4);
    }

    #[test]
    fn test_plain_code_scores_zero() {
        assert_eq!(count_db_touches("return a + b;"), 0);
        assert_eq!(count_db_touches(""), 0);
    }
}
