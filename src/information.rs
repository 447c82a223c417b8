use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VolleyError};

static FROM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)FROM \[([^\]]+)\]\.\[([^\]]+)\] AS (\[[^\]]+\])").expect("valid FROM pattern")
});

/// Structured facts extracted from one textual rendering of a compiled
/// query: schema, table, the row-alias token used inside the trace, and the
/// WHERE clause with every `alias.` prefix stripped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInformation {
    pub schema: String,
    pub table: String,
    /// The bracketed alias token, e.g. `[Extent1]`.
    pub alias: String,
    /// Begins with `WHERE` when the trace carried a predicate, empty
    /// otherwise. An empty predicate makes generated DELETE/UPDATE
    /// statements operate over the full table; guaranteeing a predicate is
    /// the caller's responsibility.
    pub where_sql: String,
}

/// Extract schema, table, alias and the normalized WHERE clause from a query
/// trace. The trace must contain a `FROM [schema].[table] AS [alias]`
/// fragment, optionally followed by a `WHERE` predicate referencing columns
/// as `alias.column`.
pub fn extract_query_information(trace: &str) -> Result<QueryInformation> {
    let captures = FROM_REGEX.captures(trace).ok_or_else(|| {
        VolleyError::MalformedQueryTrace(format!(
            "No FROM [schema].[table] AS [alias] fragment found in query trace: {}",
            trace
        ))
    })?;

    let mut info = QueryInformation {
        schema: captures[1].to_owned(),
        table: captures[2].to_owned(),
        alias: captures[3].to_owned(),
        where_sql: String::new(),
    };

    if let Some(i) = trace.find("WHERE") {
        if i > 0 {
            let where_clause = &trace[i..];
            info.where_sql = where_clause.replace(&format!("{}.", info.alias), "");
        }
    }
    Ok(info)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extracts_schema_table_alias() {
        let trace = "SELECT [Extent1].[Id] FROM [dbo].[Users] AS [Extent1]";
        let info = extract_query_information(trace).unwrap();
        assert_eq!(info.schema, "dbo");
        assert_eq!(info.table, "Users");
        assert_eq!(info.alias, "[Extent1]");
        assert_eq!(info.where_sql, "");
    }

    #[test]
    fn strips_alias_from_where_clause() {
        let trace = "SELECT [a].[X] FROM [S].[T] AS [a] WHERE [a].[X] = 1 AND [a].[Y] = 2";
        let info = extract_query_information(trace).unwrap();
        assert_eq!(info.schema, "S");
        assert_eq!(info.table, "T");
        assert_eq!(info.alias, "[a]");
        assert_eq!(info.where_sql, "WHERE [X] = 1 AND [Y] = 2");
        assert!(!info.where_sql.contains("[a]."));
    }

    #[test]
    fn matches_case_insensitively() {
        let trace = "select [e].[Id] from [dbo].[Orders] as [e] WHERE [e].[Id] > 10";
        let info = extract_query_information(trace).unwrap();
        assert_eq!(info.table, "Orders");
        assert_eq!(info.where_sql, "WHERE [Id] > 10");
    }

    #[test]
    fn fails_without_from_fragment() {
        let result = extract_query_information("SELECT 1");
        assert!(matches!(
            result,
            Err(VolleyError::MalformedQueryTrace(_))
        ));
    }

    #[test]
    fn where_at_position_zero_is_ignored() {
        let trace = "WHERE [u].[Id] = 1 FROM [dbo].[Users] AS [u]";
        let info = extract_query_information(trace).unwrap();
        assert_eq!(info.where_sql, "");
    }
}
