//!
//! Administrative utilities. Simple wrappers outside the bulk-mutation
//! core.
//!
use crate::driver::mssql::MssqlConnection;
use crate::errors::{Result, VolleyError};
use crate::param::Params;
use crate::sql::mssql::quote_identifier;

/// Drop a database even while other connections hold it open: switch to the
/// `master` catalog, force single-user mode rolling back open work, then
/// drop. The name defaults to the connection's configured database.
pub fn force_drop_database(conn: &mut MssqlConnection, name: Option<&str>) -> Result<()> {
    let name = match name {
        Some(name) => name.to_owned(),
        None => conn.database().cloned().ok_or_else(|| {
            VolleyError::ConfigError(
                "No database name supplied and none configured on the connection".to_string(),
            )
        })?,
    };
    let target = quote_identifier(&name);
    let client = conn.ensure_open()?;
    client.simple_query("USE [master];")?;
    client.simple_query(&format!(
        "ALTER DATABASE {} SET SINGLE_USER WITH ROLLBACK IMMEDIATE;",
        target
    ))?;
    client.simple_query(&format!("DROP DATABASE {};", target))?;
    tracing::debug!("dropped database {}", name);
    Ok(())
}

/// The database the connection currently talks to.
pub fn get_database_name(conn: &mut MssqlConnection) -> Result<Option<String>> {
    let rows = conn.query("SELECT DB_NAME() AS [name]", Params::None)?;
    Ok(rows
        .iter()
        .next()
        .and_then(|row| row.get("name"))
        .and_then(|v| v.as_str().map(ToString::to_string)))
}
