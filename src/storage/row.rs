use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use crate::sql::duration_literal;
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, PrimitiveDateTime};

/// ISO-8601 calendar date; years before 1 keep their sign and four digits.
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]");

/// A decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Text(String),
    SmallInt(i16),
    Int(i32),
    UInt(u32),
    Double(f64),
    Date(Date),
    DateTime(PrimitiveDateTime),
    Duration(Duration),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Date(v) => f.write_str(&v.format(DATE_FORMAT).map_err(|_| fmt::Error)?),
            Value::DateTime(v) => {
                f.write_str(&v.format(DATETIME_FORMAT).map_err(|_| fmt::Error)?)
            }
            Value::Duration(v) => f.write_str(&duration_literal(v)),
            Value::Bytes(v) => {
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::SmallInt(v) => serializer.serialize_i16(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::UInt(v) => serializer.serialize_u32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Bytes(v) => v.serialize(serializer),
            Value::Date(_) | Value::DateTime(_) | Value::Duration(_) => {
                serializer.collect_str(self)
            }
        }
    }
}

/// One decoded record, keyed by column name in schema order.
///
/// Columns sharing a name collapse into one entry: it keeps the position
/// of the first and the value of the last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub inner: IndexMap<String, Value>,
}

impl Record {
    pub fn with_capacity(n: usize) -> Self {
        Record {
            inner: IndexMap::with_capacity(n),
        }
    }

    pub fn insert(&mut self, column: String, value: Value) {
        self.inner.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.inner.get(column)
    }

    pub fn get_column(&self, column: &str) -> Option<String> {
        Some(self.inner.get(column)?.to_string())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.inner
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (k, v) in &self.inner {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn test_duplicate_names_keep_first_position_last_value() {
        let mut record = Record::default();
        record.insert("A".into(), Value::Int(1));
        record.insert("B".into(), Value::Int(2));
        record.insert("A".into(), Value::Int(3));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(record.get("A"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_display_forms() {
        let date = Date::from_calendar_date(2001, Month::February, 3).unwrap();
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Date(date).to_string(), "2001-02-03");
        assert_eq!(
            Value::DateTime(date.with_hms_milli(4, 5, 6, 7).unwrap()).to_string(),
            "2001-02-03T04:05:06.007"
        );
        assert_eq!(Value::Duration(Duration::seconds(3723)).to_string(), "1:02:03");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "dead");
    }

    #[test]
    fn test_dates_before_year_one() {
        let date = Date::from_calendar_date(-5, Month::March, 1).unwrap();
        assert_eq!(crate::storage::julian::day_to_date(1_719_293), date);
        assert_eq!(Value::Date(date).to_string(), "-0005-03-01");
        assert_eq!(
            serde_json::to_string(&Value::Date(date)).unwrap(),
            "\"-0005-03-01\""
        );
        let noon = date.with_hms_milli(12, 0, 0, 500).unwrap();
        assert_eq!(Value::DateTime(noon).to_string(), "-0005-03-01T12:00:00.500");

        let date = Date::from_calendar_date(33, Month::April, 3).unwrap();
        assert_eq!(Value::Date(date).to_string(), "0033-04-03");
    }

    #[test]
    fn test_time_renders_as_duration_literal() {
        let d = Duration::milliseconds(45_296_250);
        assert_eq!(Value::Duration(d).to_string(), duration_literal(&d));
        assert_eq!(Value::Duration(d).to_string(), "12:34:56.250");
    }

    #[test]
    fn test_serialize_record() {
        let mut record = Record::default();
        record.insert("ID".into(), Value::UInt(9));
        record.insert("NAME".into(), Value::Text("Ann".into()));
        record.insert("BORN".into(), Value::Null);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"ID":9,"NAME":"Ann","BORN":null}"#);
    }
}
