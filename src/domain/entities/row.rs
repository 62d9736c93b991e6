use std::borrow::Cow;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

static NULL_CELL: CellValue = CellValue::Null;

/// One scalar cell. Nested JSON arrays/objects are kept as their compact text.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// String form used for search, display and string ordering. Null reads as "".
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Bool(true) => Cow::Borrowed("true"),
            CellValue::Bool(false) => Cow::Borrowed("false"),
            CellValue::Number(number) => Cow::Owned(format_number(number)),
            CellValue::Text(text) => Cow::Borrowed(text.as_str()),
        }
    }

    /// Numeric reading with loose spreadsheet semantics: blank text reads as 0,
    /// booleans as 1/0, anything that does not parse to a finite float is not numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            CellValue::Number(number) => number.as_f64(),
            CellValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Some(0.0);
                }
                trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
            }
        }
    }

    pub fn is_yes(&self) -> bool {
        !self.is_null() && self.display_text().to_lowercase() == "yes"
    }
}

fn format_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 => {
            format!("{value:.0}")
        }
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(value) => CellValue::Bool(value),
            Value::Number(number) => CellValue::Number(number),
            Value::String(text) => CellValue::Text(text),
            nested @ (Value::Array(_) | Value::Object(_)) => CellValue::Text(nested.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(Number::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Bool(value) => serializer.serialize_bool(*value),
            CellValue::Number(number) => number.serialize(serializer),
            CellValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(CellValue::from)
    }
}

/// A record: column name to cell, in first-inserted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Exact match first, then a case-insensitive one.
    pub fn get_ignore_case(&self, column: &str) -> Option<&CellValue> {
        self.get(column).or_else(|| {
            let wanted = column.to_lowercase();
            self.cells
                .iter()
                .find(|(name, _)| name.to_lowercase() == wanted)
                .map(|(_, value)| value)
        })
    }

    /// Absent columns read as null.
    pub fn value(&self, column: &str) -> &CellValue {
        self.get(column).unwrap_or(&NULL_CELL)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Replaces the value in place, or appends the column when it is new.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        let idx = self.cells.iter().position(|(name, _)| name == column)?;
        Some(self.cells.remove(idx).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a row object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Row, A::Error> {
        let mut row = Row::new();
        while let Some((column, value)) = map.next_entry::<String, CellValue>()? {
            row.set(column, value);
        }
        Ok(row)
    }

    // Non-object entries read as empty rows.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Row, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Row::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Row, E> {
        Ok(Row::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Row, E> {
        Ok(Row::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Row, D::Error> {
        deserializer.deserialize_any(RowVisitor)
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Row, E> {
        Ok(Row::new())
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<Row, E> {
        Ok(Row::new())
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<Row, E> {
        Ok(Row::new())
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<Row, E> {
        Ok(Row::new())
    }

    fn visit_str<E: de::Error>(self, _value: &str) -> Result<Row, E> {
        Ok(Row::new())
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RowVisitor)
    }
}

/// The unit of persistence: every row, in order.
pub type Dataset = Vec<Row>;

/// Row written when the store is empty and placeholder seeding is enabled.
pub fn placeholder_dataset() -> Dataset {
    vec![Row::from_iter([
        ("LOCATION", "Sample Location"),
        ("PHONE", "123-456-7890"),
        ("CONTACT", "John Doe"),
    ])]
}
