use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::TIME_LAYOUT;
use crate::error::{FetchError, RetrieveError, RowField};

pub const ROW_ARITY: usize = 6;

/// Usage of one five-minute interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub start: NaiveDateTime,
    /// Seconds spent, truncated from the reported float.
    pub spent: i64,
    pub activity: String,
    pub category: String,
    /// Productivity score, usually -2..=2.
    pub productivity: i8,
    /// Third column of the interval report ("Number of People").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,
}

/// Everything one successful call returned, blobs included.
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub notes: Value,
    pub row_headers: Value,
    pub records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawResponse {
    #[serde(default)]
    pub notes: Value,
    #[serde(default)]
    pub row_headers: Value,
    #[serde(default, deserialize_with = "null_rows_as_empty")]
    pub rows: Vec<Vec<Value>>,
}

/// `null` for the whole list means no rows; a `null` row is an empty one
/// and fails the arity check in its turn.
fn null_rows_as_empty<'de, D>(deserializer: D) -> Result<Vec<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Option<Vec<Option<Vec<Value>>>> = Option::deserialize(deserializer)?;
    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// One row after its shape has been checked but before the start time
/// is parsed.
#[derive(Debug)]
pub(crate) struct RawRow {
    start: String,
    spent: f64,
    people: Value,
    activity: String,
    category: String,
    productivity: f64,
}

impl RawRow {
    pub(crate) fn parse(row: usize, values: Vec<Value>) -> Result<Self, FetchError> {
        let values: [Value; ROW_ARITY] =
            values
                .try_into()
                .map_err(|values: Vec<Value>| FetchError::RowLength {
                    row,
                    found: values.len(),
                })?;
        let [start, spent, people, activity, category, productivity] = values;

        Ok(Self {
            start: expect_string(row, RowField::Time, start)?,
            spent: expect_number(row, RowField::Duration, &spent)?,
            people,
            activity: expect_string(row, RowField::Activity, activity)?,
            category: expect_string(row, RowField::Category, category)?,
            productivity: expect_number(row, RowField::Productivity, &productivity)?,
        })
    }

    pub(crate) fn into_record(self, row: usize) -> Result<Record, FetchError> {
        let start = NaiveDateTime::parse_from_str(&self.start, TIME_LAYOUT).map_err(|source| {
            FetchError::Time {
                row,
                value: self.start.clone(),
                source,
            }
        })?;

        Ok(Record {
            start,
            spent: self.spent as i64,
            activity: self.activity,
            category: self.category,
            productivity: self.productivity as i8,
            people: self.people.as_f64().map(|n| n as u32),
        })
    }
}

fn expect_string(row: usize, field: RowField, value: Value) -> Result<String, FetchError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(FetchError::Field {
            row,
            field,
            found: describe(&other),
        }),
    }
}

fn expect_number(row: usize, field: RowField, value: &Value) -> Result<f64, FetchError> {
    value.as_f64().ok_or_else(|| FetchError::Field {
        row,
        field,
        found: describe(value),
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

/// Converts decoded rows in order.
///
/// Stops at the first bad row; the records before it travel back inside
/// the error.
pub fn parse_rows(rows: Vec<Vec<Value>>) -> Result<Vec<Record>, RetrieveError> {
    let mut records = Vec::with_capacity(rows.len());

    for (idx, values) in rows.into_iter().enumerate() {
        match RawRow::parse(idx, values).and_then(|raw| raw.into_record(idx)) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Stopping at row {} after {} records: {}", idx, records.len(), e);
                return Err(RetrieveError::new(e, records));
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn row(value: Value) -> Vec<Value> {
        value.as_array().cloned().unwrap()
    }

    #[test]
    fn test_well_formed_row() {
        let rows = vec![row(json!([
            "2023-05-01T10:00:00",
            300.0,
            "x",
            "Coding",
            "Software Development",
            2.0
        ]))];

        let records = parse_rows(rows).unwrap();
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        let expected = NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(rec.start, expected);
        assert_eq!(rec.spent, 300);
        assert_eq!(rec.activity, "Coding");
        assert_eq!(rec.category, "Software Development");
        assert_eq!(rec.productivity, 2);
        assert_eq!(rec.people, None);
    }

    #[test]
    fn test_truncates_duration_and_productivity() {
        let rows = vec![
            row(json!(["2023-05-01T10:00:00", 299.9, 1, "a", "b", -1.7])),
            row(json!(["2023-05-01T10:05:00", 12, 1, "c", "d", 0])),
        ];

        let records = parse_rows(rows).unwrap();
        assert_eq!(records[0].spent, 299);
        assert_eq!(records[0].productivity, -1);
        assert_eq!(records[0].people, Some(1));
        assert_eq!(records[1].spent, 12);
        assert_eq!(records[1].productivity, 0);
        assert_eq!(records[1].activity, "c");
    }

    #[test]
    fn test_wrong_arity_keeps_prior_records() {
        let rows = vec![
            row(json!(["2023-05-01T10:00:00", 60, 1, "a", "b", 1])),
            row(json!(["2023-05-01T10:05:00", 60, 1, "a", "b"])),
            row(json!(["2023-05-01T10:10:00", 60, 1, "a", "b", 1])),
        ];

        let err = parse_rows(rows).unwrap_err();
        assert_eq!(err.partial.len(), 1);
        assert!(matches!(
            err.error,
            FetchError::RowLength { row: 1, found: 5 }
        ));

        let too_long = vec![row(json!(["2023-05-01T10:00:00", 60, 1, "a", "b", 1, 7]))];
        let err = parse_rows(too_long).unwrap_err();
        assert!(err.partial.is_empty());
        assert!(matches!(err.error, FetchError::RowLength { found: 7, .. }));
    }

    #[test]
    fn test_null_rows_decode_as_empty() {
        let raw: RawResponse = serde_json::from_str(r#"{"rows": null}"#).unwrap();
        assert!(raw.rows.is_empty());

        let raw: RawResponse = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert!(raw.rows.is_empty());
    }

    #[test]
    fn test_null_row_keeps_prior_records() {
        let raw: RawResponse = serde_json::from_str(
            r#"{"rows": [["2023-05-01T10:00:00", 300, 1, "a", "b", 1], null]}"#,
        )
        .unwrap();
        assert_eq!(raw.rows.len(), 2);

        let err = parse_rows(raw.rows).unwrap_err();
        assert_eq!(err.partial.len(), 1);
        assert_eq!(err.partial[0].spent, 300);
        assert!(matches!(
            err.error,
            FetchError::RowLength { row: 1, found: 0 }
        ));
    }

    #[test]
    fn test_non_string_time() {
        let rows = vec![row(json!([1683, 60, 1, "a", "b", 1]))];
        let err = parse_rows(rows).unwrap_err();
        match err.error {
            FetchError::Field { row, field, ref found } => {
                assert_eq!(row, 0);
                assert_eq!(field, RowField::Time);
                assert_eq!(found, "number 1683");
            }
            ref other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().contains("parsing time wrong"));
    }

    #[test]
    fn test_unparseable_time() {
        let rows = vec![row(json!(["2023-05-01 10:00", 60, 1, "a", "b", 1]))];
        let err = parse_rows(rows).unwrap_err();
        assert!(matches!(err.error, FetchError::Time { row: 0, .. }));
        assert!(err.to_string().contains("2023-05-01 10:00"));
    }

    #[test]
    fn test_field_type_mismatches() {
        let cases = [
            (json!(["2023-05-01T10:00:00", "60", 1, "a", "b", 1]), RowField::Duration),
            (json!(["2023-05-01T10:00:00", 60, 1, 3, "b", 1]), RowField::Activity),
            (json!(["2023-05-01T10:00:00", 60, 1, "a", null, 1]), RowField::Category),
            (json!(["2023-05-01T10:00:00", 60, 1, "a", "b", "high"]), RowField::Productivity),
        ];

        for (value, expected) in cases {
            let err = parse_rows(vec![row(value)]).unwrap_err();
            match err.error {
                FetchError::Field { field, .. } => assert_eq!(field, expected),
                other => panic!("expected {} error, got {}", expected, other),
            }
        }
    }

    #[test]
    fn test_people_column_is_lenient() {
        let rows = vec![row(json!([
            "2023-05-01T10:00:00",
            60,
            {"path": "/doc"},
            "a",
            "b",
            1
        ]))];
        let records = parse_rows(rows).unwrap();
        assert_eq!(records[0].people, None);
    }
}
