//! Raw patient records and the labeled reference dataset.
//!
//! Incoming requests arrive as untyped strings (`RawInput`) so the validator
//! can report missing or non-numeric fields instead of failing at parse
//! time. Once validated, a `RawInput` parses into the typed `RawRecord`
//! consumed by the encoder and models.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Smoker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Smoker::Yes => "yes",
            Smoker::No => "no",
        }
    }
}

impl Region {
    /// All four regions, in the order used for reporting.
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    /// Baseline level for indicator encoding; it gets no explicit column.
    pub const BASELINE: Region = Region::Northeast;

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Northeast => "northeast",
            Region::Northwest => "northwest",
            Region::Southeast => "southeast",
            Region::Southwest => "southwest",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

impl FromStr for Smoker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Smoker::Yes),
            "no" => Ok(Smoker::No),
            other => Err(format!("unknown smoker value '{}'", other)),
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "northeast" => Ok(Region::Northeast),
            "northwest" => Ok(Region::Northwest),
            "southeast" => Ok(Region::Southeast),
            "southwest" => Ok(Region::Southwest),
            other => Err(format!("unknown region '{}'", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Smoker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six raw fields, in validator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Bmi,
    Children,
    Sex,
    Smoker,
    Region,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Age,
        Field::Bmi,
        Field::Children,
        Field::Sex,
        Field::Smoker,
        Field::Region,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Bmi => "bmi",
            Field::Children => "children",
            Field::Sex => "sex",
            Field::Smoker => "smoker",
            Field::Region => "region",
        }
    }
}

/// One incoming patient query before validation. All fields are optional
/// strings; the validator decides what is missing or malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInput {
    pub age: Option<String>,
    pub sex: Option<String>,
    pub bmi: Option<String>,
    pub children: Option<String>,
    pub smoker: Option<String>,
    pub region: Option<String>,
}

impl RawInput {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Age => &self.age,
            Field::Bmi => &self.bmi,
            Field::Children => &self.children,
            Field::Sex => &self.sex,
            Field::Smoker => &self.smoker,
            Field::Region => &self.region,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        match field {
            Field::Age => self.age = value,
            Field::Bmi => self.bmi = value,
            Field::Children => self.children = value,
            Field::Sex => self.sex = value,
            Field::Smoker => self.smoker = value,
            Field::Region => self.region = value,
        }
    }

    /// Parse into a typed record. Callers are expected to validate first;
    /// failures here surface as encoding errors because they indicate the
    /// pipeline was driven with an unvalidated record.
    pub fn parse(&self) -> Result<RawRecord, EncodingError> {
        let age = parse_integer(self.age.as_deref(), Field::Age)?;
        let bmi = parse_numeric(self.bmi.as_deref(), Field::Bmi)?;
        let children = parse_integer(self.children.as_deref(), Field::Children)?;
        let sex = parse_level::<Sex>(self.sex.as_deref(), Field::Sex)?;
        let smoker = parse_level::<Smoker>(self.smoker.as_deref(), Field::Smoker)?;
        let region = parse_level::<Region>(self.region.as_deref(), Field::Region)?;

        Ok(RawRecord {
            age,
            sex,
            bmi,
            children,
            smoker,
            region,
        })
    }
}

fn parse_numeric(value: Option<&str>, field: Field) -> Result<f64, EncodingError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EncodingError::MissingField(field.name().to_string()))?;
    raw.parse::<f64>().map_err(|_| EncodingError::NotNumeric {
        field: field.name().to_string(),
        value: raw.to_string(),
    })
}

// Integer fields parse as i64 directly so fractional input is rejected
// rather than truncated.
fn parse_integer(value: Option<&str>, field: Field) -> Result<i64, EncodingError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EncodingError::MissingField(field.name().to_string()))?;
    raw.parse::<i64>().map_err(|_| EncodingError::NotNumeric {
        field: field.name().to_string(),
        value: raw.to_string(),
    })
}

fn parse_level<T: FromStr>(value: Option<&str>, field: Field) -> Result<T, EncodingError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EncodingError::MissingField(field.name().to_string()))?;
    raw.parse::<T>().map_err(|_| EncodingError::UnknownLevel {
        field: field.name().to_string(),
        value: raw.to_string(),
    })
}

/// A validated, typed patient record. Immutable; lives for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub age: i64,
    pub sex: Sex,
    pub bmi: f64,
    pub children: i64,
    pub smoker: Smoker,
    pub region: Region,
}

impl RawRecord {
    /// One-line input echo used in prediction log records.
    pub fn summary(&self) -> String {
        format!(
            "age={} sex={} bmi={} children={} smoker={} region={}",
            self.age, self.sex, self.bmi, self.children, self.smoker, self.region
        )
    }
}

impl From<&RawRecord> for RawInput {
    fn from(record: &RawRecord) -> Self {
        RawInput {
            age: Some(record.age.to_string()),
            sex: Some(record.sex.as_str().to_string()),
            bmi: Some(record.bmi.to_string()),
            children: Some(record.children.to_string()),
            smoker: Some(record.smoker.as_str().to_string()),
            region: Some(record.region.as_str().to_string()),
        }
    }
}

/// One labeled row of the held-out reference dataset.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRow {
    pub record: RawRecord,
    pub charges: f64,
}

/// Held-out labeled dataset used only by metrics and explainability, never
/// for serving single predictions.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    pub rows: Vec<ReferenceRow>,
}

impl ReferenceDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a reference dataset CSV with the six raw columns plus `charges`.
pub fn read_reference_csv<P: AsRef<Path>>(path: P) -> Result<ReferenceDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open reference data: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read reference data header row")?
        .clone();

    let column = |name: &str| -> Result<usize> {
        find_column(&headers, name)
            .ok_or_else(|| anyhow!("Missing column '{}' in reference data", name))
    };

    let age_idx = column("age")?;
    let sex_idx = column("sex")?;
    let bmi_idx = column("bmi")?;
    let children_idx = column("children")?;
    let smoker_idx = column("smoker")?;
    let region_idx = column("region")?;
    let charges_idx = column("charges")?;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        let row = row_idx + 1;

        let raw = RawRecord {
            age: cell_f64(&record, age_idx, "age", row)? as i64,
            sex: cell(&record, sex_idx, "sex", row)?
                .parse::<Sex>()
                .map_err(|e| anyhow!("{} at row {}", e, row))?,
            bmi: cell_f64(&record, bmi_idx, "bmi", row)?,
            children: cell_f64(&record, children_idx, "children", row)? as i64,
            smoker: cell(&record, smoker_idx, "smoker", row)?
                .parse::<Smoker>()
                .map_err(|e| anyhow!("{} at row {}", e, row))?,
            region: cell(&record, region_idx, "region", row)?
                .parse::<Region>()
                .map_err(|e| anyhow!("{} at row {}", e, row))?,
        };
        let charges = cell_f64(&record, charges_idx, "charges", row)?;

        rows.push(ReferenceRow {
            record: raw,
            charges,
        });
    }

    Ok(ReferenceDataset { rows })
}

fn cell<'a>(record: &'a StringRecord, idx: usize, name: &str, row: usize) -> Result<&'a str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("Missing '{}' value at row {}", name, row))
}

fn cell_f64(record: &StringRecord, idx: usize, name: &str, row: usize) -> Result<f64> {
    cell(record, idx, name, row)?
        .parse::<f64>()
        .with_context(|| format!("Invalid '{}' at row {}", name, row))
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}
