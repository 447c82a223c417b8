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
//! The SQL Server provider: bulk insert through the TDS bulk-load channel
//! and bulk update through the staging-table merge protocol.
use tiberius::TokenRow;

use crate::config::{BulkOptions, DEFAULT_BATCH_SIZE};
use crate::driver::mssql::{to_token_row, MssqlConnection};
use crate::driver::{DriverType, StoreConnection};
use crate::errors::{Result, VolleyError};
use crate::information::QueryInformation;
use crate::mapping::ColumnMapping;
use crate::provider::QueryProvider;
use crate::reader::{ProjectedSource, RowSource};
use crate::sql::mssql::{
    build_delete_query, build_drop_table, build_merge_statement, build_staging_table_ddl,
    build_update_query, destination_table, staging_table_name,
};
use crate::value::Value;

pub struct SqlServerProvider;

impl SqlServerProvider {
    pub fn new() -> Self {
        SqlServerProvider
    }
}

impl Default for SqlServerProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn as_mssql_connection(conn: &mut dyn StoreConnection) -> Result<&mut MssqlConnection> {
    conn.as_any_mut()
        .downcast_mut::<MssqlConnection>()
        .ok_or_else(|| {
            VolleyError::UnsupportedOperation(
                "Connection is not a SQL Server connection".to_string(),
            )
        })
}

/// Hands at most `remaining` rows of the underlying source to one bulk-load
/// request, converting each to wire format on the way out.
struct BatchRows<'a> {
    first: Option<Vec<Value>>,
    source: &'a mut dyn RowSource,
    columns: &'a [ColumnMapping],
    remaining: usize,
}

impl Iterator for BatchRows<'_> {
    type Item = TokenRow<'static>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let values = self.first.take().or_else(|| self.source.next_row())?;
        self.remaining -= 1;
        Some(to_token_row(values, self.columns))
    }
}

impl QueryProvider for SqlServerProvider {
    fn can_delete(&self) -> bool {
        true
    }

    fn can_update(&self) -> bool {
        true
    }

    fn can_insert(&self) -> bool {
        true
    }

    fn can_bulk_update(&self) -> bool {
        true
    }

    fn can_handle(&self, conn: &dyn StoreConnection) -> bool {
        conn.driver_type() == DriverType::Mssql
    }

    fn delete_query(&self, query_info: &QueryInformation) -> String {
        build_delete_query(query_info)
    }

    fn update_query(
        &self,
        predicate_info: &QueryInformation,
        modification_info: &QueryInformation,
    ) -> String {
        build_update_query(predicate_info, modification_info)
    }

    fn insert_items(
        &self,
        source: &mut dyn RowSource,
        schema: &str,
        table: &str,
        columns: &[ColumnMapping],
        conn: &mut dyn StoreConnection,
        options: &BulkOptions,
    ) -> Result<u64> {
        if source.field_count() != columns.len() {
            return Err(VolleyError::MissingField(format!(
                "Row source yields {} fields but {} columns are mapped",
                source.field_count(),
                columns.len()
            )));
        }
        let connection = as_mssql_connection(conn)?;
        let client = connection.ensure_open()?;

        let destination = destination_table(schema, table);
        let column_names: Vec<&str> = columns.iter().map(|c| c.name_in_database.as_str()).collect();
        let batch_size = if options.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            options.batch_size
        };
        let timeout = Some(options.execute_timeout);

        let mut total = 0u64;
        let mut carry = source.next_row();
        while carry.is_some() {
            let mut batch = BatchRows {
                first: carry.take(),
                source: &mut *source,
                columns,
                remaining: batch_size,
            };
            total += client.bulk_insert(
                &destination,
                &column_names,
                options.copy_options,
                &mut batch,
                timeout,
            )?;
            carry = source.next_row();
        }
        tracing::debug!("bulk insert into {}: {} rows", destination, total);
        Ok(total)
    }

    fn update_items(
        &self,
        source: &mut dyn RowSource,
        schema: &str,
        table: &str,
        columns: &[ColumnMapping],
        properties_to_update: &[String],
        conn: &mut dyn StoreConnection,
        options: &BulkOptions,
    ) -> Result<u64> {
        for property in properties_to_update {
            if !columns.iter().any(|c| c.name_on_object == *property) {
                return Err(VolleyError::MissingField(format!(
                    "Update specification references unmapped property `{}`",
                    property
                )));
            }
        }

        // The staging table holds only key columns and columns being set.
        let mut filtered: Vec<ColumnMapping> = Vec::new();
        let mut indices: Vec<usize> = Vec::new();
        for (i, column) in columns.iter().enumerate() {
            if column.is_primary_key || properties_to_update.contains(&column.name_on_object) {
                filtered.push(column.clone());
                indices.push(i);
            }
        }
        if !filtered.iter().any(|c| c.is_primary_key) {
            return Err(VolleyError::MissingField(
                "Bulk update requires at least one primary key column to join on".to_string(),
            ));
        }

        let staging_table = staging_table_name(table);
        let create = build_staging_table_ddl(schema, &staging_table, &filtered);
        let merge = build_merge_statement(schema, table, &staging_table, &filtered);
        let drop = build_drop_table(schema, &staging_table);
        let timeout = Some(options.execute_timeout);

        {
            let connection = as_mssql_connection(conn)?;
            let client = connection.ensure_open()?;
            tracing::debug!("creating staging table: {}", create);
            client.execute(&create, &[], timeout)?;
        }

        {
            let mut projected = ProjectedSource::new(source, indices);
            self.insert_items(&mut projected, schema, &staging_table, &filtered, conn, options)?;
        }

        let connection = as_mssql_connection(conn)?;
        let client = connection.ensure_open()?;
        tracing::debug!("merging staging table {} into {}", staging_table, table);
        let affected = client.execute(&merge, &[], timeout)?;
        client.execute(&drop, &[], timeout)?;
        Ok(affected)
    }

    fn execute_non_query(
        &self,
        conn: &mut dyn StoreConnection,
        sql: &str,
        options: &BulkOptions,
    ) -> Result<u64> {
        let connection = as_mssql_connection(conn)?;
        let timeout = Some(options.execute_timeout);
        let client = connection.ensure_open()?;
        tracing::debug!("executing generated statement: {}", sql);
        client.execute(sql, &[], timeout)
    }
}
