use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// JDBC type hint attached to columns and bound values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JdbcType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Nchar,
    Nvarchar,
    Clob,
    Nclob,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Date,
    Time,
    Timestamp,
    Other,
}

impl JdbcType {
    /// Large object types cannot take part in `SELECT DISTINCT` on most backends.
    pub fn is_unsupported_for_distinct(&self) -> bool {
        matches!(
            self,
            JdbcType::Blob
                | JdbcType::Clob
                | JdbcType::Nclob
                | JdbcType::LongVarBinary
                | JdbcType::LongVarchar
        )
    }

    pub fn is_character(&self) -> bool {
        matches!(
            self,
            JdbcType::Char
                | JdbcType::Varchar
                | JdbcType::LongVarchar
                | JdbcType::Nchar
                | JdbcType::Nvarchar
                | JdbcType::Clob
                | JdbcType::Nclob
        )
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            JdbcType::Bit => "BIT",
            JdbcType::Boolean => "BOOLEAN",
            JdbcType::TinyInt => "TINYINT",
            JdbcType::SmallInt => "SMALLINT",
            JdbcType::Integer => "INTEGER",
            JdbcType::BigInt => "BIGINT",
            JdbcType::Float => "FLOAT",
            JdbcType::Real => "REAL",
            JdbcType::Double => "DOUBLE",
            JdbcType::Numeric => "NUMERIC",
            JdbcType::Decimal => "DECIMAL",
            JdbcType::Char => "CHAR",
            JdbcType::Varchar => "VARCHAR",
            JdbcType::LongVarchar => "LONGVARCHAR",
            JdbcType::Nchar => "NCHAR",
            JdbcType::Nvarchar => "NVARCHAR",
            JdbcType::Clob => "CLOB",
            JdbcType::Nclob => "NCLOB",
            JdbcType::Binary => "BINARY",
            JdbcType::VarBinary => "VARBINARY",
            JdbcType::LongVarBinary => "LONGVARBINARY",
            JdbcType::Blob => "BLOB",
            JdbcType::Date => "DATE",
            JdbcType::Time => "TIME",
            JdbcType::Timestamp => "TIMESTAMP",
            JdbcType::Other => "OTHER",
        }
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl FromStr for JdbcType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let jdbc_type = match s.trim().to_uppercase().as_str() {
            "BIT" => JdbcType::Bit,
            "BOOLEAN" => JdbcType::Boolean,
            "TINYINT" => JdbcType::TinyInt,
            "SMALLINT" => JdbcType::SmallInt,
            "INTEGER" | "INT" => JdbcType::Integer,
            "BIGINT" => JdbcType::BigInt,
            "FLOAT" => JdbcType::Float,
            "REAL" => JdbcType::Real,
            "DOUBLE" => JdbcType::Double,
            "NUMERIC" => JdbcType::Numeric,
            "DECIMAL" => JdbcType::Decimal,
            "CHAR" => JdbcType::Char,
            "VARCHAR" => JdbcType::Varchar,
            "LONGVARCHAR" => JdbcType::LongVarchar,
            "NCHAR" => JdbcType::Nchar,
            "NVARCHAR" => JdbcType::Nvarchar,
            "CLOB" => JdbcType::Clob,
            "NCLOB" => JdbcType::Nclob,
            "BINARY" => JdbcType::Binary,
            "VARBINARY" => JdbcType::VarBinary,
            "LONGVARBINARY" => JdbcType::LongVarBinary,
            "BLOB" => JdbcType::Blob,
            "DATE" => JdbcType::Date,
            "TIME" => JdbcType::Time,
            "TIMESTAMP" => JdbcType::Timestamp,
            "OTHER" => JdbcType::Other,
            other => return Err(format!("Unknown JDBC type '{}'", other)),
        };
        Ok(jdbc_type)
    }
}

/// Identifier of a persistent object: the entity name plus a snapshot of its
/// primary key columns (column name -> value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectId {
    pub entity: String,
    pub snapshot: BTreeMap<String, Value>,
}

impl ObjectId {
    pub fn new(entity: impl Into<String>) -> Self {
        ObjectId {
            entity: entity.into(),
            snapshot: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.snapshot.insert(column.into(), value.into());
        self
    }

    pub fn value_for(&self, column: &str) -> Option<&Value> {
        self.snapshot.get(column)
    }

    pub fn is_compound(&self) -> bool {
        self.snapshot.len() > 1
    }
}

/// A literal or bound value flowing from the source expression to the bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    ObjectId(ObjectId),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type hint used when no column is available to borrow one from.
    pub fn default_jdbc_type(&self) -> JdbcType {
        match self {
            Value::Null => JdbcType::Other,
            Value::Bool(_) => JdbcType::Boolean,
            Value::Int(_) => JdbcType::Integer,
            Value::Float(_) => JdbcType::Double,
            Value::String(_) => JdbcType::Varchar,
            Value::Date(_) => JdbcType::Date,
            Value::Time(_) => JdbcType::Time,
            Value::Timestamp(_) => JdbcType::Timestamp,
            Value::ObjectId(_) | Value::List(_) => JdbcType::Other,
        }
    }

    /// Truthiness used by template conditionals.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Converts a JSON value (CLI input, YAML fixtures) into a bind value.
    ///
    /// Strings that look like ISO dates or timestamps become temporal values.
    /// Objects of the form `{"entity": .., "id": {..}}` become object ids.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => {
                if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    Value::Timestamp(ts)
                } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    Value::Date(date)
                } else {
                    Value::String(s.clone())
                }
            }
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let entity = map.get("entity").and_then(|e| e.as_str());
                let id = map.get("id").and_then(|id| id.as_object());
                match (entity, id) {
                    (Some(entity), Some(id)) => Value::ObjectId(ObjectId {
                        entity: entity.to_string(),
                        snapshot: id
                            .iter()
                            .map(|(k, v)| (k.clone(), Value::from_json(v)))
                            .collect(),
                    }),
                    _ => Value::String(json.to_string()),
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Date(d) => write!(f, "'{}'", d),
            Value::Time(t) => write!(f, "'{}'", t),
            Value::Timestamp(ts) => write!(f, "'{}'", ts),
            Value::ObjectId(id) => {
                write!(f, "<ObjectId:{}", id.entity)?;
                for (column, value) in &id.snapshot {
                    write!(f, ", {}={}", column, value)?;
                }
                write!(f, ">")
            }
            Value::List(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::ObjectId(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
