/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */
//! SQL Server statement text for the bulk-mutation engine: DELETE/UPDATE
//! fragments built from extracted query information, and the staging-table
//! protocol statements (create, merge, drop).
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::information::QueryInformation;
use crate::mapping::ColumnMapping;

static ASSIGNMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\[[^\]]+\])[^=]+=(.+)").expect("valid assignment pattern"));

pub fn quote_identifier(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// `[schema].[table]`, or `[table]` when no schema is given.
pub fn destination_table(schema: &str, table: &str) -> String {
    if schema.trim().is_empty() {
        quote_identifier(table)
    } else {
        format!("{}.{}", quote_identifier(schema), quote_identifier(table))
    }
}

/// `DELETE FROM [schema].[table] {where}`. The generator imposes no check on
/// the predicate; an empty `where_sql` produces a full-table delete.
pub fn build_delete_query(query_info: &QueryInformation) -> String {
    format!(
        "DELETE FROM [{}].[{}] {}",
        query_info.schema, query_info.table, query_info.where_sql
    )
}

/// `UPDATE [schema].[table] SET {assignment} {where}`. The modification
/// query's WHERE fragment encodes the column assignment compiled by the host
/// layer; the text up to the first `AND` is rewritten into an assignment.
pub fn build_update_query(
    predicate_info: &QueryInformation,
    modification_info: &QueryInformation,
) -> String {
    let msql = modification_info.where_sql.replace("WHERE ", "");
    let update = match msql.find("AND") {
        None => msql,
        Some(i) => msql[..i].trim().to_owned(),
    };

    format!(
        "UPDATE [{}].[{}] SET {} {}",
        predicate_info.schema,
        predicate_info.table,
        rewrite_assignment(&update),
        predicate_info.where_sql
    )
}

/// Turns the host layer's rendering of `column <comparator> expression` into
/// a `column = expression` assignment. Falls back to reversing the two sides
/// of a single `=`-delimited expression when the rendering does not match;
/// both paths exist to absorb quirks of the upstream trace renderer and are
/// covered by a table-driven corpus in the tests below.
pub fn rewrite_assignment(update: &str) -> String {
    match ASSIGNMENT_REGEX.captures(update) {
        Some(captures) => {
            let column = &captures[1];
            let rest = fix_parentheses(&captures[2]);
            format!("{} = {}", column, rest)
        }
        None => {
            let mut parts: Vec<&str> = update.split(" = ").filter(|p| !p.is_empty()).collect();
            parts.reverse();
            parts.join(" = ")
        }
    }
}

/// Drops the unbalanced trailing closing parentheses the trace renderer
/// sometimes leaves behind.
pub fn fix_parentheses(text: &str) -> String {
    let mut out = text.trim().to_owned();
    loop {
        let opening = out.matches('(').count();
        let closing = out.matches(')').count();
        if closing > opening && out.ends_with(')') {
            out.pop();
            out.truncate(out.trim_end().len());
        } else {
            break;
        }
    }
    out
}

/// A unique, session-scoped staging table name for one bulk update.
pub fn staging_table_name(table: &str) -> String {
    format!("#temp_{}_{}", table, Uuid::new_v4().simple())
}

/// Staging DDL: one column per filtered mapping entry with its declared type
/// verbatim, and a composite primary key over the key columns.
pub fn build_staging_table_ddl(schema: &str, staging_table: &str, columns: &[ColumnMapping]) -> String {
    let column_defs = columns
        .iter()
        .map(|c| format!("[{}] {}", c.name_in_database, c.data_type))
        .collect::<Vec<_>>()
        .join(", ");
    let key_columns = columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| format!("[{}]", c.name_in_database))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE {}.[{}]({}, PRIMARY KEY ({}))",
        schema, staging_table, column_defs, key_columns
    )
}

/// The single set-based merge: update the target from the staging table,
/// joined on every key column.
pub fn build_merge_statement(
    schema: &str,
    table: &str,
    staging_table: &str,
    columns: &[ColumnMapping],
) -> String {
    let setters = columns
        .iter()
        .filter(|c| !c.is_primary_key)
        .map(|c| format!("[{0}] = TEMP.[{0}]", c.name_in_database))
        .collect::<Vec<_>>()
        .join(",");
    let filter = columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| format!("ORIG.[{0}] = TEMP.[{0}]", c.name_in_database))
        .collect::<Vec<_>>()
        .join(" and ");
    format!(
        "UPDATE [{0}].[{1}]\n                SET\n                    {4}\n                FROM\n                    [{0}].[{1}] ORIG\n                INNER JOIN\n                     [{0}].[{2}] TEMP\n                ON\n                    {3}",
        schema, table, staging_table, filter, setters
    )
}

pub fn build_drop_table(schema: &str, staging_table: &str) -> String {
    format!("DROP TABLE {}.[{}]", schema, staging_table)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::information::extract_query_information;

    fn query_info(schema: &str, table: &str, where_sql: &str) -> QueryInformation {
        QueryInformation {
            schema: schema.to_owned(),
            table: table.to_owned(),
            alias: "[Extent1]".to_owned(),
            where_sql: where_sql.to_owned(),
        }
    }

    #[test]
    fn delete_query_renders_exactly() {
        let info = query_info("dbo", "Users", "WHERE [Id] = 5");
        assert_eq!(
            build_delete_query(&info),
            "DELETE FROM [dbo].[Users] WHERE [Id] = 5"
        );
    }

    #[test]
    fn update_query_renders_exactly() {
        let predicate = query_info("dbo", "Users", "WHERE [Id] = 5");
        let modification = query_info("dbo", "Users", "WHERE [Name] = 'x' AND [Id] = 5");
        assert_eq!(
            build_update_query(&predicate, &modification),
            "UPDATE [dbo].[Users] SET [Name] = 'x' WHERE [Id] = 5"
        );
    }

    #[test]
    fn update_query_without_trailing_predicate_in_modification() {
        let predicate = query_info("dbo", "Users", "WHERE [Id] = 1");
        let modification = query_info("dbo", "Users", "WHERE [Age] = 42");
        assert_eq!(
            build_update_query(&predicate, &modification),
            "UPDATE [dbo].[Users] SET [Age] = 42 WHERE [Id] = 1"
        );
    }

    #[test]
    fn update_query_flows_from_extraction() {
        let predicate = extract_query_information(
            "SELECT [e].[Id] FROM [dbo].[Users] AS [e] WHERE [e].[Id] = 5",
        )
        .unwrap();
        let modification = extract_query_information(
            "SELECT [e].[Id] FROM [dbo].[Users] AS [e] WHERE [e].[Name] = 'x' AND [e].[Id] = 5",
        )
        .unwrap();
        assert_eq!(
            build_update_query(&predicate, &modification),
            "UPDATE [dbo].[Users] SET [Name] = 'x' WHERE [Id] = 5"
        );
    }

    #[test]
    fn rewrite_assignment_corpus() {
        let cases = [
            // plain assignment
            ("[Name] = 'x'", "[Name] = 'x'"),
            // comparator spelled differently by the renderer
            ("[Age] >= 12", "[Age] = 12"),
            // unbalanced trailing parenthesis left by the renderer
            ("[Total] = ([Price] * 2))", "[Total] = ([Price] * 2)"),
            ("[Name] = LOWER([Name]))", "[Name] = LOWER([Name])"),
            // balanced parentheses are left alone
            ("[Name] = LOWER([Name])", "[Name] = LOWER([Name])"),
            // no bracketed column: sides of a `=` are reversed
            ("'x' = Name", "Name = 'x'"),
        ];
        for (input, expected) in cases {
            assert_eq!(rewrite_assignment(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn fix_parentheses_corpus() {
        let cases = [
            ("'x'", "'x'"),
            (" 'x' ", "'x'"),
            ("([A] + 1)", "([A] + 1)"),
            ("([A] + 1))", "([A] + 1)"),
            ("([A] + 1)) )", "([A] + 1)"),
            ("LOWER([Name])))", "LOWER([Name])"),
        ];
        for (input, expected) in cases {
            assert_eq!(fix_parentheses(input), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn staging_names_are_unique_and_session_scoped() {
        let a = staging_table_name("Users");
        let b = staging_table_name("Users");
        assert!(a.starts_with("#temp_Users_"));
        assert_ne!(a, b);
    }

    #[test]
    fn staging_ddl_uses_types_verbatim() {
        let columns = vec![
            ColumnMapping::new("id", "Id", "int").primary_key(),
            ColumnMapping::new("name", "Name", "nvarchar(255)"),
        ];
        assert_eq!(
            build_staging_table_ddl("dbo", "#temp_Users_x", &columns),
            "CREATE TABLE dbo.[#temp_Users_x]([Id] int, [Name] nvarchar(255), PRIMARY KEY ([Id]))"
        );
    }

    #[test]
    fn merge_statement_joins_on_every_key() {
        let columns = vec![
            ColumnMapping::new("id", "Id", "int").primary_key(),
            ColumnMapping::new("tenant", "TenantId", "int").primary_key(),
            ColumnMapping::new("name", "Name", "nvarchar(255)"),
        ];
        let merge = build_merge_statement("dbo", "Users", "#temp_Users_x", &columns);
        assert!(merge.contains("[Name] = TEMP.[Name]"));
        assert!(merge.contains("ORIG.[Id] = TEMP.[Id]"));
        assert!(merge.contains("ORIG.[TenantId] = TEMP.[TenantId]"));
        assert!(merge.contains("INNER JOIN"));
        assert!(!merge.contains("[Id] = TEMP.[Id],"));
    }

    #[test]
    fn destination_table_handles_missing_schema() {
        assert_eq!(destination_table("dbo", "Users"), "[dbo].[Users]");
        assert_eq!(destination_table("", "Users"), "[Users]");
    }
}
