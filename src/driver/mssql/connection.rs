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
use std::any::Any;

use crate::config::VolleyConfig;
use crate::data::Rows;
use crate::driver::mssql::{decode_rows, to_sql_params, SyncSqlClient};
use crate::driver::{DriverType, StoreConnection};
use crate::errors::{Result, VolleyError};
use crate::param::Params;

/// A SQL Server store connection. Opens lazily: an operation that receives a
/// closed connection opens it, and nothing in this crate ever closes a
/// connection it did not open (dropping the value closes the socket).
pub struct MssqlConnection {
    config: VolleyConfig,
    client: Option<SyncSqlClient>,
}

impl MssqlConnection {
    /// Create the connection without touching the network yet.
    pub fn connect_lazy(config: VolleyConfig) -> Result<Self> {
        if config.platform() != DriverType::Mssql {
            return Err(VolleyError::ConfigError(
                "Database type mismatch: expected SQL Server".to_string(),
            ));
        }
        Ok(MssqlConnection {
            config,
            client: None,
        })
    }

    /// Create the connection and open it immediately.
    pub fn connect(config: VolleyConfig) -> Result<Self> {
        let mut conn = Self::connect_lazy(config)?;
        conn.ensure_open()?;
        Ok(conn)
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &VolleyConfig {
        &self.config
    }

    pub fn database(&self) -> Option<&String> {
        self.config.db_name()
    }

    /// The open client, connecting first if necessary.
    pub fn ensure_open(&mut self) -> Result<&mut SyncSqlClient> {
        if self.client.is_none() {
            let tiberius_config = self.config.to_tiberius_config()?;
            self.client = Some(SyncSqlClient::connect(tiberius_config)?);
        }
        Ok(self.client.as_mut().expect("client just opened"))
    }

    pub fn execute(&mut self, sql: &str, params: Params) -> Result<u64> {
        let timeout = Some(self.config.execute_timeout());
        let client = self.ensure_open()?;
        let params = to_sql_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> =
            params.iter().map(|p| &**p as &dyn tiberius::ToSql).collect();
        client.execute(sql, &param_refs, timeout)
    }

    pub fn query(&mut self, sql: &str, params: Params) -> Result<Rows> {
        let timeout = Some(self.config.execute_timeout());
        let client = self.ensure_open()?;
        let params = to_sql_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> =
            params.iter().map(|p| &**p as &dyn tiberius::ToSql).collect();
        let rows = client.query(sql, &param_refs, timeout)?;
        decode_rows(rows)
    }

    /// Start a transaction on this connection.
    pub fn start_transaction(&mut self) -> Result<()> {
        self.ensure_open()?.simple_query("BEGIN TRANSACTION;")?;
        Ok(())
    }

    pub fn commit_transaction(&mut self) -> Result<()> {
        self.ensure_open()?.simple_query("COMMIT TRANSACTION;")?;
        Ok(())
    }

    pub fn rollback_transaction(&mut self) -> Result<()> {
        self.ensure_open()?.simple_query("ROLLBACK TRANSACTION;")?;
        Ok(())
    }
}

impl StoreConnection for MssqlConnection {
    fn driver_type(&self) -> DriverType {
        DriverType::Mssql
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Mssql Connection Manager
pub struct MssqlConnectionManager {
    config: tiberius::Config,
}

impl MssqlConnectionManager {
    pub fn new(cfg: &VolleyConfig) -> Result<Self> {
        if cfg.platform() != DriverType::Mssql {
            return Err(VolleyError::ConfigError(
                "Database type mismatch: expected SQL Server".to_string(),
            ));
        }
        Ok(Self {
            config: cfg.to_tiberius_config()?,
        })
    }
}

impl r2d2::ManageConnection for MssqlConnectionManager {
    type Connection = SyncSqlClient;
    type Error = VolleyError;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        SyncSqlClient::connect(self.config.clone())
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        let _result = conn.execute("SELECT 1", &[], None)?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

pub type MssqlPool = r2d2::Pool<MssqlConnectionManager>;
pub type PooledMssqlConnection = r2d2::PooledConnection<MssqlConnectionManager>;

/// Initialize the SQL Server connection pool
pub fn init_mssql_pool(cfg: &VolleyConfig) -> Result<MssqlPool> {
    let manager = MssqlConnectionManager::new(cfg)?;

    let pool = r2d2::Pool::builder()
        .connection_timeout(cfg.connection_timeout())
        .min_idle(cfg.min_idle())
        .max_size(cfg.max_size())
        .build(manager)
        .map_err(|e| {
            VolleyError::DatabaseError(format!(
                "Failed to create SQL Server connection pool: {}",
                e
            ))
        })?;

    let mut conn = pool.get().map_err(|e| {
        VolleyError::DatabaseError(format!("Failed to get connection from pool: {}", e))
    })?;

    conn.query("SELECT 1", &[], None).map_err(|e| {
        VolleyError::DatabaseError(format!("SQL Server connection test failed: {}", e))
    })?;

    Ok(pool)
}
