//! Data preparation for the astronaut data set
//!
//! Turns a [`RawTable`] into an [`AstronautTable`]:
//! 1. validate that the required source fields exist
//! 2. rename source fields to canonical names
//! 3. drop rows without an id, a birthdate or a time in space
//! 4. coerce `time_in_space` (minutes) and the dates
//! 5. keep the first row per id
//! 6. sort by birthdate
//! 7. derive `time_in_space_days`, `alive`, `age` and `died_with_age`

use crate::common::data_structures::{AstronautRecord, AstronautTable};
use crate::parsing::{RawRecord, RawTable};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Source field name to canonical field name
pub const FIELD_MAPPING: [(&str, &str); 4] = [
    ("astronaut", "id"),
    ("astronautLabel", "name"),
    ("birthplaceLabel", "birthplace"),
    ("sex_or_genderLabel", "sex_or_gender"),
];

/// Source fields that must be present in the input schema, even if every value is null
pub const REQUIRED_FIELDS: [&str; 4] = ["astronaut", "birthdate", "date_of_death", "time_in_space"];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The input does not have the shape the analysis expects
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Input is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Errors that can occur during data preparation
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("Schema validation failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid {field} for astronaut {id}: {value} ({reason})")]
    InvalidValue {
        id: String,
        field: &'static str,
        value: String,
        reason: String,
    },
}

type Result<T> = core::result::Result<T, PrepareError>;

/// Checks that every field in [`REQUIRED_FIELDS`] appears in at least one record
pub fn validate_schema(raw: &RawTable) -> core::result::Result<(), SchemaError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !raw.has_field(field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingFields(missing))
    }
}

fn canonical_name(source: &str) -> Option<&'static str> {
    FIELD_MAPPING
        .iter()
        .find(|(from, _)| *from == source)
        .map(|(_, to)| *to)
}

/// Renames source fields to their canonical names; unlisted fields pass through
///
/// A renamed field takes precedence over a passthrough field of the same name
/// unless its value is null. This is how `sex_or_genderLabel` replaces the raw
/// `sex_or_gender` entity URI while the raw value still fills in when no label exists.
pub fn rename_fields(record: RawRecord) -> RawRecord {
    let mut renamed = RawRecord::new();
    for (key, value) in record {
        let (name, is_renamed) = match canonical_name(&key) {
            Some(canonical) => (canonical.to_string(), true),
            None => (key, false),
        };

        let replace = match renamed.get(&name) {
            None => true,
            Some(existing) => existing.is_null() || (is_renamed && !value.is_null()),
        };
        if replace {
            renamed.insert(name, value);
        }
    }
    renamed
}

/// Age in whole years on `on` for someone born on `born`
///
/// The year difference, minus one if the birthday has not come around yet that year.
pub fn calculate_age(born: NaiveDate, on: NaiveDate) -> i32 {
    let before_birthday = (on.month(), on.day()) < (born.month(), born.day());
    on.year() - born.year() - i32::from(before_birthday)
}

/// Parses a calendar date from an RFC 3339 timestamp or a plain date
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|timestamp| timestamp.date())
        })
}

/// Prepares the raw astronaut records for analysis
///
/// # Arguments
/// * `raw` - Records as loaded by [`crate::parsing`]
/// * `today` - Reference date used for the `age` column
///
/// # Returns
/// * `Ok(AstronautTable)` - Prepared table sorted by birthdate
/// * `Err(PrepareError)` - If the schema is incomplete or a value cannot be coerced
pub fn prepare(raw: RawTable, today: NaiveDate) -> Result<AstronautTable> {
    if let Err(error) = validate_schema(&raw) {
        warn!(fields = ?raw.field_names(), "input schema is incomplete");
        return Err(error.into());
    }

    let raw_count = raw.len();
    let mut seen_ids = HashSet::new();
    let mut records = Vec::with_capacity(raw_count);
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for fields in raw.into_records() {
        let Some(record) = prepare_record(rename_fields(fields), today)? else {
            dropped += 1;
            continue;
        };

        if !seen_ids.insert(record.id.clone()) {
            warn!(id = %record.id, "duplicate astronaut id, keeping the first occurrence");
            duplicates += 1;
            continue;
        }
        records.push(record);
    }

    // Stable, so rows sharing a birthdate keep input order.
    records.sort_by_key(|record| record.birthdate);

    info!(
        raw = raw_count,
        prepared = records.len(),
        dropped,
        duplicates,
        "prepared astronaut table"
    );
    Ok(AstronautTable::from_sorted_unique(records))
}

/// Coerces a single renamed record; `Ok(None)` means the row is excluded
fn prepare_record(mut fields: RawRecord, today: NaiveDate) -> Result<Option<AstronautRecord>> {
    let Some(id) = fields.remove("id").and_then(scalar_to_string) else {
        debug!("dropping record without an id");
        return Ok(None);
    };

    let Some(minutes) = parse_minutes(&id, fields.remove("time_in_space"))? else {
        debug!(%id, "dropping record without time in space");
        return Ok(None);
    };

    let Some(birthdate) = parse_birthdate(&id, fields.remove("birthdate"))? else {
        debug!(%id, "dropping record without birthdate");
        return Ok(None);
    };

    let date_of_death = match fields.remove("date_of_death") {
        Some(Value::String(text)) => {
            let parsed = parse_date(&text);
            if parsed.is_none() {
                debug!(%id, value = %text, "unparsable date of death, treating as alive");
            }
            parsed
        }
        None | Some(Value::Null) => None,
        Some(other) => {
            debug!(%id, value = %other, "date of death is not a string, treating as alive");
            None
        }
    };

    let time_in_space = TimeDelta::try_minutes(minutes).ok_or_else(|| PrepareError::InvalidValue {
        id: id.clone(),
        field: "time_in_space",
        value: minutes.to_string(),
        reason: "duration out of range".to_string(),
    })?;

    let name = fields.remove("name").and_then(scalar_to_string);
    let birthplace = fields.remove("birthplace").and_then(scalar_to_string);
    let sex_or_gender = fields.remove("sex_or_gender").and_then(scalar_to_string);

    Ok(Some(AstronautRecord {
        id,
        name,
        birthplace,
        sex_or_gender,
        birthdate,
        date_of_death,
        time_in_space,
        time_in_space_days: time_in_space.num_days(),
        alive: date_of_death.is_none(),
        age: calculate_age(birthdate, today),
        died_with_age: date_of_death.map(|died| calculate_age(birthdate, died)),
        extra: fields,
    }))
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn parse_minutes(id: &str, value: Option<Value>) -> Result<Option<i64>> {
    let invalid = |value: &Value, reason: &str| PrepareError::InvalidValue {
        id: id.to_string(),
        field: "time_in_space",
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let minutes = match &value {
        None | Some(Value::Null) => return Ok(None),
        Some(number @ Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(minutes), _) => minutes,
            (None, Some(minutes)) if minutes.is_finite() && minutes.abs() < i64::MAX as f64 => {
                minutes.trunc() as i64
            }
            _ => return Err(invalid(number, "not representable as whole minutes")),
        },
        Some(text @ Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| invalid(text, &e.to_string()))?,
        Some(other) => return Err(invalid(other, "expected a number of minutes")),
    };

    if minutes < 0 {
        return Err(PrepareError::InvalidValue {
            id: id.to_string(),
            field: "time_in_space",
            value: minutes.to_string(),
            reason: "time in space cannot be negative".to_string(),
        });
    }
    Ok(Some(minutes))
}

fn parse_birthdate(id: &str, value: Option<Value>) -> Result<Option<NaiveDate>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => match parse_date(&text) {
            Some(date) => Ok(Some(date)),
            None => Err(PrepareError::InvalidValue {
                id: id.to_string(),
                field: "birthdate",
                value: text,
                reason: "not a recognised date".to_string(),
            }),
        },
        Some(other) => Err(PrepareError::InvalidValue {
            id: id.to_string(),
            field: "birthdate",
            value: other.to_string(),
            reason: "expected a date string".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn raw(values: Vec<Value>) -> RawTable {
        RawTable::from_records(
            values
                .into_iter()
                .map(|value| match value {
                    Value::Object(record) => record,
                    other => panic!("not an object: {other}"),
                })
                .collect(),
        )
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    #[rstest]
    #[case(date(2000, 6, 15), date(2024, 6, 15), 24)]
    #[case(date(2000, 6, 15), date(2024, 6, 14), 23)]
    #[case(date(2000, 6, 15), date(2024, 7, 1), 24)]
    #[case(date(2000, 12, 31), date(2001, 1, 1), 0)]
    #[case(date(1960, 1, 1), date(2020, 1, 1), 60)]
    #[case(date(1960, 2, 29), date(2021, 2, 28), 60)]
    #[case(date(1960, 2, 29), date(2021, 3, 1), 61)]
    fn test_calculate_age(#[case] born: NaiveDate, #[case] on: NaiveDate, #[case] expected: i32) {
        assert_eq!(calculate_age(born, on), expected);
    }

    #[rstest]
    #[case("1934-03-09T00:00:00Z", Some(date(1934, 3, 9)))]
    #[case("1934-03-09", Some(date(1934, 3, 9)))]
    #[case("1934/03/09", Some(date(1934, 3, 9)))]
    #[case("1934-03-09T10:30:00", Some(date(1934, 3, 9)))]
    #[case(" 1934-03-09 ", Some(date(1934, 3, 9)))]
    #[case("http://www.wikidata.org/.well-known/genid/abc", None)]
    #[case("", None)]
    fn test_parse_date(#[case] text: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_date(text), expected);
    }

    #[test]
    fn test_rename_fields() {
        let record = json!({
            "astronaut": "Q1",
            "astronautLabel": "Jane Doe",
            "birthplaceLabel": "Ohio",
            "sex_or_gender": "http://www.wikidata.org/entity/Q6581072",
            "sex_or_genderLabel": "female",
            "birthdate": "1960-01-01"
        });
        let Value::Object(record) = record else { unreachable!() };

        let renamed = rename_fields(record);
        assert_eq!(renamed["id"], "Q1");
        assert_eq!(renamed["name"], "Jane Doe");
        assert_eq!(renamed["birthplace"], "Ohio");
        assert_eq!(renamed["sex_or_gender"], "female");
        assert_eq!(renamed["birthdate"], "1960-01-01");
        assert!(!renamed.contains_key("astronaut"));
        assert!(!renamed.contains_key("sex_or_genderLabel"));
    }

    #[test]
    fn test_rename_keeps_raw_gender_when_label_is_null() {
        let Value::Object(record) = json!({
            "sex_or_gender": "female",
            "sex_or_genderLabel": null
        }) else {
            unreachable!()
        };

        assert_eq!(rename_fields(record)["sex_or_gender"], "female");
    }

    #[test]
    fn test_validate_schema_reports_all_missing_fields() {
        let table = raw(vec![json!({"astronaut": "Q1", "birthdate": "1960-01-01"})]);

        let error = validate_schema(&table).unwrap_err();
        assert_eq!(
            error,
            SchemaError::MissingFields(vec![
                "date_of_death".to_string(),
                "time_in_space".to_string()
            ])
        );
    }

    #[test]
    fn test_validate_schema_accepts_null_fields() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": null,
            "date_of_death": null,
            "time_in_space": null
        })]);

        assert!(validate_schema(&table).is_ok());
    }

    #[test]
    fn test_prepare_fails_on_empty_input() {
        let result = prepare(RawTable::default(), today());
        assert!(matches!(result, Err(PrepareError::Schema(_))));
    }

    #[test]
    fn test_prepare_living_astronaut() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "astronautLabel": "Jane Doe",
            "sex_or_gender": "female",
            "birthdate": "1960-01-01",
            "date_of_death": null,
            "time_in_space": 600
        })]);

        let prepared = prepare(table, today()).unwrap();
        let record = prepared.get("Q1").unwrap();

        assert_eq!(record.id, "Q1");
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.sex_or_gender.as_deref(), Some("female"));
        assert_eq!(record.time_in_space, TimeDelta::minutes(600));
        assert_eq!(record.time_in_space_days, 0);
        assert!(record.alive);
        assert_eq!(record.age, 64);
        assert_eq!(record.died_with_age, None);
    }

    #[test]
    fn test_prepare_deceased_astronaut() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "astronautLabel": "Jane Doe",
            "sex_or_gender": "female",
            "birthdate": "1960-01-01",
            "date_of_death": "2020-01-01",
            "time_in_space": 2880
        })]);

        let prepared = prepare(table, today()).unwrap();
        let record = prepared.get("Q1").unwrap();

        assert_eq!(record.time_in_space_days, 2);
        assert!(!record.alive);
        assert_eq!(record.date_of_death, Some(date(2020, 1, 1)));
        assert_eq!(record.died_with_age, Some(60));
    }

    #[test]
    fn test_prepare_truncates_days() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": "1960-01-01",
            "date_of_death": null,
            "time_in_space": 2879
        })]);

        let prepared = prepare(table, today()).unwrap();
        assert_eq!(prepared.get("Q1").unwrap().time_in_space_days, 1);
    }

    #[test]
    fn test_prepare_drops_incomplete_rows_and_sorts() {
        let table = raw(vec![
            json!({"astronaut": "Q1", "birthdate": "1970-05-05", "date_of_death": null, "time_in_space": 100}),
            json!({"astronaut": "Q2", "birthdate": "1950-05-05", "date_of_death": null, "time_in_space": null}),
            json!({"astronaut": "Q3", "birthdate": "1940-05-05", "date_of_death": null}),
            json!({"astronaut": "Q4", "birthdate": null, "date_of_death": null, "time_in_space": 100}),
            json!({"astronaut": null, "birthdate": "1930-01-01", "date_of_death": null, "time_in_space": 100}),
            json!({"astronaut": "Q5", "birthdate": "1930-05-05T00:00:00Z", "date_of_death": null, "time_in_space": "200"}),
            json!({"astronaut": "Q6", "birthdate": "1960-05-05", "date_of_death": null, "time_in_space": 10.9}),
        ]);
        let raw_len = table.len();

        let prepared = prepare(table, today()).unwrap();
        assert!(prepared.len() <= raw_len);

        let ids: Vec<&str> = prepared.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["Q5", "Q6", "Q1"]);
        assert!(prepared
            .records()
            .windows(2)
            .all(|pair| pair[0].birthdate <= pair[1].birthdate));

        assert_eq!(prepared.get("Q5").unwrap().time_in_space, TimeDelta::minutes(200));
        assert_eq!(prepared.get("Q6").unwrap().time_in_space, TimeDelta::minutes(10));
        assert!(prepared.get("Q2").is_none());
    }

    #[test]
    fn test_prepare_keeps_first_duplicate() {
        let table = raw(vec![
            json!({"astronaut": "Q1", "birthplaceLabel": "Moscow", "birthdate": "1934-03-09", "date_of_death": null, "time_in_space": 108}),
            json!({"astronaut": "Q1", "birthplaceLabel": "Klushino", "birthdate": "1934-03-09", "date_of_death": null, "time_in_space": 108}),
        ]);

        let prepared = prepare(table, today()).unwrap();
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared.get("Q1").unwrap().birthplace.as_deref(), Some("Moscow"));
    }

    #[test]
    fn test_prepare_unparsable_death_date_means_alive() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": "1960-01-01",
            "date_of_death": "unknown",
            "time_in_space": 100
        })]);

        let record = prepare(table, today()).unwrap().get("Q1").cloned().unwrap();
        assert!(record.alive);
        assert_eq!(record.date_of_death, None);
        assert_eq!(record.died_with_age, None);
    }

    #[rstest]
    #[case(json!(1999))]
    #[case(json!(true))]
    #[case(json!({"year": 1999}))]
    fn test_prepare_non_string_death_date_means_alive(#[case] value: Value) {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": "1960-01-01",
            "date_of_death": value,
            "time_in_space": 100
        })]);

        let record = prepare(table, today()).unwrap().get("Q1").cloned().unwrap();
        assert!(record.alive);
        assert_eq!(record.date_of_death, None);
        assert_eq!(record.died_with_age, None);
    }

    #[test]
    fn test_prepare_passes_through_unmapped_fields() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": "1960-01-01",
            "date_of_death": null,
            "time_in_space": 100,
            "nationality": "DE"
        })]);

        let prepared = prepare(table, today()).unwrap();
        let record = prepared.get("Q1").unwrap();
        assert_eq!(record.extra.get("nationality"), Some(&json!("DE")));
        assert!(!record.extra.contains_key("birthdate"));
        assert!(!record.extra.contains_key("id"));
    }

    #[rstest]
    #[case(json!("ten"))]
    #[case(json!(-5))]
    #[case(json!(true))]
    #[case(json!([100]))]
    fn test_prepare_rejects_invalid_time_in_space(#[case] value: Value) {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": "1960-01-01",
            "date_of_death": null,
            "time_in_space": value
        })]);

        let result = prepare(table, today());
        assert!(matches!(
            result,
            Err(PrepareError::InvalidValue { field: "time_in_space", .. })
        ));
    }

    #[test]
    fn test_prepare_rejects_unparsable_birthdate() {
        let table = raw(vec![json!({
            "astronaut": "Q1",
            "birthdate": "sometime in the sixties",
            "date_of_death": null,
            "time_in_space": 100
        })]);

        let error = prepare(table, today()).unwrap_err();
        assert!(matches!(
            error,
            PrepareError::InvalidValue { field: "birthdate", ref id, .. } if id == "Q1"
        ));
    }

    #[test]
    fn test_alive_and_died_with_age_are_consistent() {
        let table = raw(vec![
            json!({"astronaut": "Q1", "birthdate": "1934-03-09", "date_of_death": "1968-03-27", "time_in_space": 108}),
            json!({"astronaut": "Q2", "birthdate": "1930-08-05", "date_of_death": "2012-08-25", "time_in_space": 12360}),
            json!({"astronaut": "Q3", "birthdate": "1978-09-28", "date_of_death": null, "time_in_space": 290000}),
        ]);

        let prepared = prepare(table, today()).unwrap();
        for record in &prepared {
            assert_eq!(record.alive, record.died_with_age.is_none());
            assert_eq!(record.alive, record.date_of_death.is_none());
            if let Some(died) = record.date_of_death {
                assert_eq!(record.died_with_age, Some(calculate_age(record.birthdate, died)));
            }
        }
        assert_eq!(prepared.get("Q1").unwrap().died_with_age, Some(34));
        assert_eq!(prepared.get("Q2").unwrap().died_with_age, Some(82));
        assert_eq!(prepared.get("Q3").unwrap().age, 45);

        let partition = prepared.partition_by_living_status();
        assert_eq!(partition.len(), prepared.len());
        assert_eq!(partition.alive_ages, vec![45]);
        assert_eq!(partition.death_ages, vec![82, 34]);
    }
}
