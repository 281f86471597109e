use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use std::str::FromStr;

/// Read a text column holding one of the domain enums
pub fn enum_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Read a text column holding serialized JSON
pub fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn to_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
