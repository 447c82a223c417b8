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
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use volley::{
    build_delete_query, build_merge_statement, build_staging_table_ddl, build_update_query,
    extract_query_information, ColumnMapping,
};

pub fn bench_sql_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_generation");
    group.measurement_time(Duration::from_secs(3));

    let trace = "SELECT [Extent1].[Id] FROM [dbo].[Users] AS [Extent1] \
                 WHERE [Extent1].[Id] = 5 AND [Extent1].[Age] > 18";

    group.bench_function("extract_query_information", |b| {
        b.iter(|| black_box(extract_query_information(black_box(trace)).unwrap()));
    });

    let predicate = extract_query_information(trace).unwrap();
    let modification = extract_query_information(
        "SELECT [Extent1].[Id] FROM [dbo].[Users] AS [Extent1] \
         WHERE [Extent1].[Name] = 'x' AND [Extent1].[Id] = 5",
    )
    .unwrap();

    group.bench_function("build_delete_query", |b| {
        b.iter(|| black_box(build_delete_query(black_box(&predicate))));
    });

    group.bench_function("build_update_query", |b| {
        b.iter(|| black_box(build_update_query(black_box(&predicate), black_box(&modification))));
    });

    let columns = vec![
        ColumnMapping::new("id", "Id", "bigint").primary_key(),
        ColumnMapping::new("name", "Name", "nvarchar(255)"),
        ColumnMapping::new("age", "Age", "tinyint"),
    ];

    group.bench_function("staging_protocol_text", |b| {
        b.iter(|| {
            black_box(build_staging_table_ddl("dbo", "#temp_Users_x", &columns));
            black_box(build_merge_statement("dbo", "Users", "#temp_Users_x", &columns));
        });
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_secs(1))
        .sample_size(20);
    targets = bench_sql_generation
);

criterion_main!(benches);
