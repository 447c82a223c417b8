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
pub mod mssql;

pub use mssql::SqlServerProvider;

use crate::config::BulkOptions;
use crate::driver::StoreConnection;
use crate::errors::Result;
use crate::information::QueryInformation;
use crate::mapping::ColumnMapping;
use crate::reader::RowSource;

/// One backend's answer to "can this engine perform operation X here, and
/// how". Capability flags tell the facade which operations exist; the
/// remaining methods do the work against a connection the provider has
/// confirmed it `can_handle`.
pub trait QueryProvider: Send + Sync {
    fn can_delete(&self) -> bool;
    fn can_update(&self) -> bool;
    fn can_insert(&self) -> bool;
    fn can_bulk_update(&self) -> bool;

    /// True iff the connection's concrete backend is the one this provider
    /// specializes.
    fn can_handle(&self, conn: &dyn StoreConnection) -> bool;

    fn delete_query(&self, query_info: &QueryInformation) -> String;

    fn update_query(
        &self,
        predicate_info: &QueryInformation,
        modification_info: &QueryInformation,
    ) -> String;

    fn insert_items(
        &self,
        source: &mut dyn RowSource,
        schema: &str,
        table: &str,
        columns: &[ColumnMapping],
        conn: &mut dyn StoreConnection,
        options: &BulkOptions,
    ) -> Result<u64>;

    fn update_items(
        &self,
        source: &mut dyn RowSource,
        schema: &str,
        table: &str,
        columns: &[ColumnMapping],
        properties_to_update: &[String],
        conn: &mut dyn StoreConnection,
        options: &BulkOptions,
    ) -> Result<u64>;

    /// Run one generated DELETE/UPDATE statement, returning affected rows.
    fn execute_non_query(
        &self,
        conn: &mut dyn StoreConnection,
        sql: &str,
        options: &BulkOptions,
    ) -> Result<u64>;
}

/// Registered providers, first capable one wins. SQL Server is registered
/// out of the box.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn QueryProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry {
            providers: vec![Box::new(SqlServerProvider::new())],
        }
    }

    /// A registry with no providers at all; every operation goes to the
    /// fallback path.
    pub fn empty() -> Self {
        ProviderRegistry {
            providers: Vec::new(),
        }
    }

    pub fn register(&mut self, provider: Box<dyn QueryProvider>) {
        self.providers.push(provider);
    }

    pub fn provider_for(&self, conn: &dyn StoreConnection) -> Option<&dyn QueryProvider> {
        self.providers
            .iter()
            .find(|p| p.can_handle(conn))
            .map(|p| p.as_ref())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
