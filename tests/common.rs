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
#![allow(dead_code)]
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use volley::{EntityMapping, ObjectContext, Result, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub age: Option<u8>,
    pub birthday: Option<NaiveDate>,
    pub headline: Option<NaiveDateTime>,
    pub gender: u8,
}

pub fn user_mapping() -> EntityMapping<User> {
    EntityMapping::<User>::builder("dbo", "t_system_user")
        .key("id", "id", "bigint", |u: &User| Value::from(u.id))
        .column("name", "name", "nvarchar(255)", |u: &User| {
            Value::from(u.name.clone())
        })
        .column("age", "age", "tinyint", |u: &User| {
            Value::from(u.age.map(|v| v as i8))
        })
        .column("birthday", "birthday", "date", |u: &User| {
            Value::from(u.birthday)
        })
        .column("headline", "headline", "datetime2", |u: &User| {
            Value::from(u.headline)
        })
        .column("gender", "gender", "tinyint", |u: &User| {
            Value::from(u.gender as i8)
        })
        .setter("age", |u: &mut User, v: Value| {
            u.age = v.as_i64().map(|n| n as u8);
        })
        .build()
        .expect("user mapping must build")
}

pub fn create_test_user(id: i64) -> User {
    User {
        id,
        name: Some(format!("NAME{}", Uuid::new_v4().simple())),
        age: Some(18),
        birthday: Some(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
        headline: NaiveDateTime::from_timestamp_opt(0, 0),
        gender: 1,
    }
}

/// In-memory object context standing in for the host layer's generic
/// context; adds stage until `save_changes`.
#[derive(Default)]
pub struct MemoryContext {
    pub items: Vec<User>,
    pub pending: Vec<User>,
    pub commits: usize,
}

impl ObjectContext<User> for MemoryContext {
    fn add(&mut self, item: &User) -> Result<()> {
        self.pending.push(item.clone());
        Ok(())
    }

    fn remove_where(&mut self, predicate: &dyn Fn(&User) -> bool) -> Result<u64> {
        let before = self.items.len();
        self.items.retain(|u| !predicate(u));
        Ok((before - self.items.len()) as u64)
    }

    fn mutate_where(
        &mut self,
        predicate: &dyn Fn(&User) -> bool,
        apply: &mut dyn FnMut(&mut User),
    ) -> Result<u64> {
        let mut count = 0;
        for item in self.items.iter_mut().filter(|u| predicate(u)) {
            apply(item);
            count += 1;
        }
        Ok(count)
    }

    fn save_changes(&mut self) -> Result<u64> {
        let count = self.pending.len() as u64;
        self.items.append(&mut self.pending);
        self.commits += 1;
        Ok(count)
    }
}
