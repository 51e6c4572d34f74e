use chrono::{NaiveDate, TimeDelta};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single astronaut after preparation
#[derive(Debug, Clone, PartialEq)]
pub struct AstronautRecord {
    /// Unique identifier (the Wikidata entity URI in the published data set)
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Place of birth
    pub birthplace: Option<String>,
    /// Gender label, e.g. `male` or `female`
    pub sex_or_gender: Option<String>,
    pub birthdate: NaiveDate,
    /// `None` means the astronaut is presumed alive
    pub date_of_death: Option<NaiveDate>,
    /// Total time spent in space, minute precision
    pub time_in_space: TimeDelta,
    /// [`Self::time_in_space`] truncated to whole days
    pub time_in_space_days: i64,
    pub alive: bool,
    /// Age on the reference date of the run
    pub age: i32,
    /// Age on [`Self::date_of_death`]; `None` while alive
    pub died_with_age: Option<i32>,
    /// Source fields not consumed by preparation, keyed by their raw name
    pub extra: Map<String, Value>,
}

/// Ages split by living status
///
/// Every record of the table lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivingStatusPartition {
    /// Current ages of living astronauts
    pub alive_ages: Vec<i32>,
    /// Ages at death of deceased astronauts
    pub death_ages: Vec<i32>,
}

impl LivingStatusPartition {
    pub fn len(&self) -> usize {
        self.alive_ages.len() + self.death_ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive_ages.is_empty() && self.death_ages.is_empty()
    }
}

/// The prepared astronaut table
///
/// Records are sorted ascending by birthdate and indexed by their unique id.
/// The table is read-only once built.
#[derive(Debug, Clone, Default)]
pub struct AstronautTable {
    records: Vec<AstronautRecord>,
    index: HashMap<String, usize>,
}

impl AstronautTable {
    /// Builds the table from records that are already unique by id and sorted by birthdate
    pub(crate) fn from_sorted_unique(records: Vec<AstronautRecord>) -> Self {
        debug_assert!(records
            .windows(2)
            .all(|pair| pair[0].birthdate <= pair[1].birthdate));

        let index: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id.clone(), position))
            .collect();
        debug_assert_eq!(index.len(), records.len());

        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in birthdate order
    pub fn iter(&self) -> std::slice::Iter<'_, AstronautRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[AstronautRecord] {
        &self.records
    }

    /// Looks up a record by id
    pub fn get(&self, id: &str) -> Option<&AstronautRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Records whose `sex_or_gender` equals `label`, still in birthdate order
    pub fn by_sex_or_gender(&self, label: &str) -> Vec<&AstronautRecord> {
        self.records
            .iter()
            .filter(|record| record.sex_or_gender.as_deref() == Some(label))
            .collect()
    }

    /// Splits the table into current ages of the living and ages at death of the dead
    pub fn partition_by_living_status(&self) -> LivingStatusPartition {
        let mut partition = LivingStatusPartition::default();
        for record in &self.records {
            match record.died_with_age {
                None => partition.alive_ages.push(record.age),
                Some(age) => partition.death_ages.push(age),
            }
        }
        partition
    }
}

impl<'a> IntoIterator for &'a AstronautTable {
    type Item = &'a AstronautRecord;
    type IntoIter = std::slice::Iter<'a, AstronautRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
