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

pub mod mssql;

#[derive(Debug, Clone, PartialEq)]
pub enum DriverType {
    MySQL,
    Sqlite,
    Oracle,
    Postgres,
    Mssql,
    Unsupported,
}

impl Default for DriverType {
    fn default() -> Self {
        DriverType::Unsupported
    }
}

/// A store connection as seen by the provider registry. Providers announce
/// whether they can handle a connection through its driver type, then
/// downcast to their concrete connection to do the work.
pub trait StoreConnection: Any {
    fn driver_type(&self) -> DriverType;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
