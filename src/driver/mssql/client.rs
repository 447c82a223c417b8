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
use std::time::Duration;

use tiberius::{SqlBulkCopyOptions, ToSql, TokenRow};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::errors::{Result, VolleyError};

/// Synchronous SQL Server client wrapper. Every call blocks the caller's
/// thread on a current-thread runtime until the server answers.
pub struct SyncSqlClient {
    runtime: Runtime,
    client: tiberius::Client<Compat<TcpStream>>,
}

impl SyncSqlClient {
    /// Connect to the server described by `config`.
    pub fn connect(config: tiberius::Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| VolleyError::TokioError(format!("Failed to create runtime: {}", e)))?;

        let client = runtime.block_on(async {
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| VolleyError::TokioError(format!("TCP connection failed: {}", e)))?;

            tcp.set_nodelay(true)
                .map_err(|e| VolleyError::TokioError(format!("Failed to set TCP no delay: {}", e)))?;

            tiberius::Client::connect(config, tcp.compat())
                .await
                .map_err(|e| {
                    VolleyError::DatabaseError(format!("Database connection failed: {}", e))
                })
        })?;

        Ok(Self { runtime, client })
    }

    pub fn query(
        &mut self,
        sql: &str,
        params: &[&dyn ToSql],
        timeout: Option<Duration>,
    ) -> Result<Vec<tiberius::Row>> {
        let Self { runtime, client } = self;
        runtime.block_on(async {
            let fut = async {
                let stream = client
                    .query(sql, params)
                    .await
                    .map_err(|e| VolleyError::DatabaseError(format!("Query failed: {}", e)))?;
                stream
                    .into_first_result()
                    .await
                    .map_err(|e| VolleyError::DatabaseError(format!("Failed to get result: {}", e)))
            };
            run_with_timeout(sql, timeout, fut).await
        })
    }

    pub fn simple_query(&mut self, sql: &str) -> Result<Vec<tiberius::Row>> {
        let Self { runtime, client } = self;
        runtime.block_on(async {
            let stream = client
                .simple_query(sql)
                .await
                .map_err(|e| VolleyError::DatabaseError(format!("Simple query failed: {}", e)))?;
            stream
                .into_first_result()
                .await
                .map_err(|e| VolleyError::DatabaseError(format!("Failed to get result: {}", e)))
        })
    }

    /// Execute a statement, returning the total number of affected rows.
    pub fn execute(
        &mut self,
        sql: &str,
        params: &[&dyn ToSql],
        timeout: Option<Duration>,
    ) -> Result<u64> {
        let Self { runtime, client } = self;
        runtime.block_on(async {
            let fut = async {
                let result = client
                    .execute(sql, params)
                    .await
                    .map_err(|e| VolleyError::DatabaseError(format!("Execute failed: {}", e)))?;
                Ok(result.total())
            };
            run_with_timeout(sql, timeout, fut).await
        })
    }

    /// Stream rows into the bulk-load channel. The destination columns are
    /// mapped by explicit name; copy options pass through verbatim. Returns
    /// the number of rows the server acknowledged.
    pub fn bulk_insert(
        &mut self,
        table: &str,
        column_names: &[&str],
        options: SqlBulkCopyOptions,
        rows: &mut dyn Iterator<Item = TokenRow<'static>>,
        timeout: Option<Duration>,
    ) -> Result<u64> {
        let Self { runtime, client } = self;
        runtime.block_on(async {
            let fut = async {
                let mut request = client
                    .bulk_insert_with_options(table, column_names, options, &[])
                    .await
                    .map_err(|e| {
                        VolleyError::DatabaseError(format!("Bulk load rejected: {}", e))
                    })?;
                for row in rows {
                    request.send(row).await.map_err(|e| {
                        VolleyError::DatabaseError(format!("Bulk load row rejected: {}", e))
                    })?;
                }
                let result = request.finalize().await.map_err(|e| {
                    VolleyError::DatabaseError(format!("Bulk load failed: {}", e))
                })?;
                Ok(result.total())
            };
            run_with_timeout(table, timeout, fut).await
        })
    }
}

async fn run_with_timeout<T>(
    context: &str,
    timeout: Option<Duration>,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match timeout {
        Some(duration) => tokio::time::timeout(duration, fut).await.map_err(|_| {
            VolleyError::ExecuteTimeout(format!(
                "Operation timed out after {}s: {}",
                duration.as_secs(),
                context
            ))
        })?,
        None => fut.await,
    }
}
