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
mod client;
mod connection;

pub use client::*;
pub use connection::*;

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tiberius::{ColumnData, ToSql, TokenRow};

use crate::data::{Row, Rows};
use crate::errors::Result;
use crate::mapping::ColumnMapping;
use crate::param::Params;
use crate::value::Value;

pub(crate) fn to_sql_params(params: Params) -> Vec<Box<dyn ToSql>> {
    params
        .into_values()
        .into_iter()
        .map(value_to_param)
        .collect()
}

fn value_to_param(val: Value) -> Box<dyn ToSql> {
    use tiberius::numeric::BigDecimal;
    match val {
        Value::Null => Box::new(Option::<String>::None),
        Value::Bool(v) => Box::new(v),
        Value::Tinyint(v) => Box::new(tinyint_to_unsigned(v)),
        Value::Smallint(v) => Box::new(v),
        Value::Int(v) => Box::new(v),
        Value::Bigint(v) => Box::new(v),
        Value::Float(v) => Box::new(v),
        Value::Double(v) => Box::new(v),
        Value::BigDecimal(v) => {
            let bd = BigDecimal::from_str(v.to_string().as_str()).unwrap_or_else(|_| BigDecimal::from(0));
            Box::new(bd)
        }
        Value::Char(v) => Box::new(format!("{}", v)),
        Value::Text(v) => Box::new(v),
        Value::Json(v) => Box::new(serde_json::to_string(&v).unwrap_or_default()),
        Value::Uuid(v) => Box::new(v),
        Value::Blob(v) => Box::new(v),
        Value::Date(v) => Box::new(v),
        Value::Time(v) => Box::new(v),
        Value::DateTime(v) => Box::new(v),
        Value::Timestamp(v) => Box::new(v),
    }
}

/// SQL Server tinyint is unsigned
fn tinyint_to_unsigned(v: i8) -> u8 {
    if v >= 0 {
        v as u8
    } else {
        (v as i16 + 256) as u8
    }
}

/// One row of owned wire data for the bulk-load channel, one value per
/// column in mapping order. Nulls are typed from the column's declared SQL
/// type.
pub(crate) fn to_token_row(values: Vec<Value>, columns: &[ColumnMapping]) -> TokenRow<'static> {
    let mut row = TokenRow::new();
    for (value, column) in values.into_iter().zip(columns.iter()) {
        row.push(value_to_column_data(value, &column.data_type));
    }
    row
}

pub(crate) fn value_to_column_data(value: Value, declared_type: &str) -> ColumnData<'static> {
    use tiberius::numeric::BigDecimal;
    match value {
        Value::Null => null_column_data(declared_type),
        Value::Bool(v) => ColumnData::Bit(Some(v)),
        Value::Tinyint(v) => ColumnData::U8(Some(tinyint_to_unsigned(v))),
        Value::Smallint(v) => ColumnData::I16(Some(v)),
        Value::Int(v) => ColumnData::I32(Some(v)),
        Value::Bigint(v) => ColumnData::I64(Some(v)),
        Value::Float(v) => ColumnData::F32(Some(v)),
        Value::Double(v) => ColumnData::F64(Some(v)),
        Value::BigDecimal(v) => {
            let bd = BigDecimal::from_str(v.to_string().as_str()).unwrap_or_else(|_| BigDecimal::from(0));
            owned_wire_data(bd.to_sql())
        }
        Value::Char(v) => ColumnData::String(Some(Cow::Owned(v.to_string()))),
        Value::Text(v) => ColumnData::String(Some(Cow::Owned(v))),
        Value::Json(v) => ColumnData::String(Some(Cow::Owned(
            serde_json::to_string(&v).unwrap_or_default(),
        ))),
        Value::Uuid(v) => ColumnData::Guid(Some(v)),
        Value::Blob(v) => ColumnData::Binary(Some(Cow::Owned(v))),
        Value::Date(v) => owned_wire_data(v.to_sql()),
        Value::Time(v) => owned_wire_data(v.to_sql()),
        Value::DateTime(v) => owned_wire_data(v.to_sql()),
        Value::Timestamp(v) => owned_wire_data(v.to_sql()),
    }
}

/// Re-wrap borrowed wire data whose payload is `Copy` into owned data. Only
/// the temporal and numeric encodings pass through here.
fn owned_wire_data(data: ColumnData<'_>) -> ColumnData<'static> {
    match data {
        ColumnData::Date(v) => ColumnData::Date(v),
        ColumnData::Time(v) => ColumnData::Time(v),
        ColumnData::SmallDateTime(v) => ColumnData::SmallDateTime(v),
        ColumnData::DateTime(v) => ColumnData::DateTime(v),
        ColumnData::DateTime2(v) => ColumnData::DateTime2(v),
        ColumnData::DateTimeOffset(v) => ColumnData::DateTimeOffset(v),
        ColumnData::Numeric(v) => ColumnData::Numeric(v),
        _ => ColumnData::String(None),
    }
}

/// The typed NULL for a declared SQL Server type; the bulk channel rejects
/// untyped nulls on non-string columns.
pub(crate) fn null_column_data(declared_type: &str) -> ColumnData<'static> {
    let lowered = declared_type.trim().to_ascii_lowercase();
    let keyword = lowered
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("");
    match keyword {
        "bit" => ColumnData::Bit(None),
        "tinyint" => ColumnData::U8(None),
        "smallint" => ColumnData::I16(None),
        "int" => ColumnData::I32(None),
        "bigint" => ColumnData::I64(None),
        "real" => ColumnData::F32(None),
        "float" => ColumnData::F64(None),
        "decimal" | "numeric" | "money" | "smallmoney" => ColumnData::Numeric(None),
        "uniqueidentifier" => ColumnData::Guid(None),
        "date" => ColumnData::Date(None),
        "time" => ColumnData::Time(None),
        "smalldatetime" => ColumnData::SmallDateTime(None),
        "datetime" => ColumnData::DateTime(None),
        "datetime2" => ColumnData::DateTime2(None),
        "datetimeoffset" => ColumnData::DateTimeOffset(None),
        "binary" | "varbinary" | "image" => ColumnData::Binary(None),
        _ => ColumnData::String(None),
    }
}

pub(crate) fn decode_rows(rows: Vec<tiberius::Row>) -> Result<Rows> {
    let mut records = Rows::new();
    if rows.is_empty() {
        return Ok(records);
    }
    let column_names: Vec<String> = rows[0]
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    for row in rows {
        let mut record = Vec::new();
        for i in 0..row.columns().len() {
            record.push(get_value_from_row(&row, i)?);
        }
        records.push(Row {
            columns: column_names.clone(),
            data: record,
        });
    }
    Ok(records)
}

fn get_value_from_row(row: &tiberius::Row, index: usize) -> Result<Value> {
    use tiberius::ColumnType;

    let column = &row.columns()[index];
    match column.column_type() {
        ColumnType::Bit | ColumnType::Bitn => {
            let val: Option<bool> = row.try_get(index)?;
            Ok(val.map(Value::Bool).unwrap_or(Value::Null))
        }
        ColumnType::Int1 => {
            let val: Option<u8> = row.try_get(index)?;
            Ok(val.map(|v| Value::Tinyint(v as i8)).unwrap_or(Value::Null))
        }
        ColumnType::Int2 => {
            let val: Option<i16> = row.try_get(index)?;
            Ok(val.map(Value::Smallint).unwrap_or(Value::Null))
        }
        ColumnType::Int4 => {
            let val: Option<i32> = row.try_get(index)?;
            Ok(val.map(Value::Int).unwrap_or(Value::Null))
        }
        ColumnType::Int8 => {
            let val: Option<i64> = row.try_get(index)?;
            Ok(val.map(Value::Bigint).unwrap_or(Value::Null))
        }
        ColumnType::Intn => {
            // Intn carries 1, 2, 4 or 8 bytes; try widest first
            if let Ok(val) = row.try_get::<i64, _>(index) {
                return Ok(val.map(Value::Bigint).unwrap_or(Value::Null));
            }
            if let Ok(val) = row.try_get::<i32, _>(index) {
                return Ok(val.map(Value::Int).unwrap_or(Value::Null));
            }
            if let Ok(val) = row.try_get::<i16, _>(index) {
                return Ok(val.map(Value::Smallint).unwrap_or(Value::Null));
            }
            let val: Option<u8> = row.try_get(index)?;
            Ok(val.map(|v| Value::Tinyint(v as i8)).unwrap_or(Value::Null))
        }
        ColumnType::Float4 => {
            let val: Option<f32> = row.try_get(index)?;
            Ok(val.map(Value::Float).unwrap_or(Value::Null))
        }
        ColumnType::Float8 => {
            let val: Option<f64> = row.try_get(index)?;
            Ok(val.map(Value::Double).unwrap_or(Value::Null))
        }
        ColumnType::Floatn => {
            // Floatn is 4 or 8 bytes
            if let Ok(val) = row.try_get::<f64, _>(index) {
                return Ok(val.map(Value::Double).unwrap_or(Value::Null));
            }
            let val: Option<f32> = row.try_get(index)?;
            Ok(val.map(Value::Float).unwrap_or(Value::Null))
        }
        ColumnType::Decimaln | ColumnType::Numericn => {
            let val: Option<tiberius::numeric::BigDecimal> = row.try_get(index)?;
            Ok(match val {
                Some(v) => match v.to_string().parse() {
                    Ok(bd) => Value::BigDecimal(bd),
                    Err(_) => Value::Text(v.to_string()),
                },
                None => Value::Null,
            })
        }
        ColumnType::Guid => {
            let val: Option<uuid::Uuid> = row.try_get(index)?;
            Ok(val.map(Value::Uuid).unwrap_or(Value::Null))
        }
        ColumnType::Daten => {
            let val: Option<NaiveDate> = row.try_get(index)?;
            Ok(val.map(Value::Date).unwrap_or(Value::Null))
        }
        ColumnType::Timen => {
            let val: Option<NaiveTime> = row.try_get(index)?;
            Ok(val.map(Value::Time).unwrap_or(Value::Null))
        }
        ColumnType::Datetime
        | ColumnType::Datetime4
        | ColumnType::Datetimen
        | ColumnType::Datetime2 => {
            let val: Option<NaiveDateTime> = row.try_get(index)?;
            Ok(val.map(Value::DateTime).unwrap_or(Value::Null))
        }
        ColumnType::DatetimeOffsetn => {
            let val: Option<DateTime<Utc>> = row.try_get(index)?;
            Ok(val.map(Value::Timestamp).unwrap_or(Value::Null))
        }
        ColumnType::BigVarBin | ColumnType::BigBinary | ColumnType::Image => {
            let val: Option<&[u8]> = row.try_get(index)?;
            Ok(val.map(|v| Value::Blob(v.to_vec())).unwrap_or(Value::Null))
        }
        _ => {
            let val: Option<&str> = row.try_get(index)?;
            Ok(val.map(|v| Value::Text(v.to_string())).unwrap_or(Value::Null))
        }
    }
}
