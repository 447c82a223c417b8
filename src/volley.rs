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
//! The caller facade: pick a capable provider per connection, or degrade to
//! the fallback path the way the generic object context would.
use crate::config::VolleyConfig;
use crate::driver::StoreConnection;
use crate::errors::{Result, VolleyError};
use crate::fallback::{self, DeleteFallback, ObjectContext, UpdateFallback};
use crate::information::extract_query_information;
use crate::mapping::{EntityMapping, UpdateSpecification};
use crate::provider::{ProviderRegistry, QueryProvider};
use crate::reader::EntityReader;

pub struct Volley {
    config: VolleyConfig,
    providers: ProviderRegistry,
}

impl Volley {
    pub fn new(config: VolleyConfig) -> Self {
        Volley {
            config,
            providers: ProviderRegistry::new(),
        }
    }

    /// A facade over a caller-assembled registry; `ProviderRegistry::empty`
    /// plus `disable_default_fallback` yields an engine that refuses
    /// everything, which is useful for surfacing misconfiguration.
    pub fn with_registry(config: VolleyConfig, providers: ProviderRegistry) -> Self {
        Volley { config, providers }
    }

    pub fn config(&self) -> &VolleyConfig {
        &self.config
    }

    pub fn register_provider(&mut self, provider: Box<dyn QueryProvider>) {
        self.providers.register(provider);
    }

    /// Stream `items` into the mapping's destination table through the
    /// bulk-load channel. Falls back to adding items one at a time through
    /// `fallback` when no registered provider can handle the connection.
    /// Inserting an empty collection is a no-op, not an error.
    pub fn insert_all<T>(
        &self,
        conn: &mut dyn StoreConnection,
        mapping: &EntityMapping<T>,
        items: &[T],
        fallback: Option<&mut dyn ObjectContext<T>>,
    ) -> Result<u64> {
        match self.providers.provider_for(&*conn) {
            Some(provider) if provider.can_insert() => {
                let columns = mapping.column_mappings();
                let mut reader = EntityReader::new(items.iter(), mapping);
                provider.insert_items(
                    &mut reader,
                    mapping.schema(),
                    mapping.table(),
                    &columns,
                    conn,
                    &self.config.bulk_options(),
                )
            }
            _ => fallback::default_insert_all(&self.config, fallback, items),
        }
    }

    /// Apply the update specification to every row whose primary key appears
    /// in `items`, as one staging-table merge. There is no per-row fallback
    /// for bulk updates; without a capable provider this fails.
    pub fn update_all<T>(
        &self,
        conn: &mut dyn StoreConnection,
        mapping: &EntityMapping<T>,
        items: &[T],
        specification: &UpdateSpecification<T>,
    ) -> Result<u64> {
        match self.providers.provider_for(&*conn) {
            Some(provider) if provider.can_bulk_update() => {
                let columns = mapping.column_mappings();
                let mut reader = EntityReader::new(items.iter(), mapping);
                provider.update_items(
                    &mut reader,
                    mapping.schema(),
                    mapping.table(),
                    &columns,
                    specification.properties(),
                    conn,
                    &self.config.bulk_options(),
                )
            }
            _ => Err(VolleyError::UnsupportedOperation(
                "No provider supporting the UpdateAll operation for this datasource was found"
                    .to_string(),
            )),
        }
    }

    /// Delete the rows matched by the compiled query trace, as one
    /// statement. The trace must carry a predicate for this to be anything
    /// other than a full-table delete; that guarantee is the caller's.
    pub fn delete_where<T>(
        &self,
        conn: &mut dyn StoreConnection,
        query_trace: &str,
        fallback: Option<DeleteFallback<'_, T>>,
    ) -> Result<u64> {
        match self.providers.provider_for(&*conn) {
            Some(provider) if provider.can_delete() => {
                let query_info = extract_query_information(query_trace)?;
                let sql = provider.delete_query(&query_info);
                provider.execute_non_query(conn, &sql, &self.config.bulk_options())
            }
            _ => fallback::default_delete(&self.config, fallback),
        }
    }

    /// Update the rows matched by the predicate trace with the assignment
    /// encoded in the modification trace, as one statement.
    pub fn update_where<T>(
        &self,
        conn: &mut dyn StoreConnection,
        predicate_trace: &str,
        modification_trace: &str,
        fallback: Option<UpdateFallback<'_, T>>,
    ) -> Result<u64> {
        match self.providers.provider_for(&*conn) {
            Some(provider) if provider.can_update() => {
                let predicate_info = extract_query_information(predicate_trace)?;
                let modification_info = extract_query_information(modification_trace)?;
                let sql = provider.update_query(&predicate_info, &modification_info);
                provider.execute_non_query(conn, &sql, &self.config.bulk_options())
            }
            _ => fallback::default_update(&self.config, fallback),
        }
    }
}
