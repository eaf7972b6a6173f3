//! County record loading, feature extraction, and z-score normalization
//!
//! The loader is the boundary where string-keyed tabular data becomes typed
//! [`CountyRecord`]s; everything downstream works on structured values. The
//! feature matrix convention throughout the crate is one row per feature and
//! one column per county.

use std::collections::HashMap;

use ndarray::Array2;
use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Area type value identifying county-level rows.
pub const AREA_TYPE_COUNTY: &str = "County";
/// Industry label for the all-industries aggregate.
pub const TOTAL_ALL_INDUSTRIES: &str = "10 Total, all industries";
/// Ownership category used for clustering.
pub const OWNERSHIP_PRIVATE: &str = "Private";

/// Feature row names, in matrix row order.
pub const FEATURE_NAMES: [&str; 3] = ["establishments", "employment", "weekly_wage"];
/// Number of feature rows.
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// One row of source data for a single county/industry/ownership slice.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyRecord {
    /// Area type label (e.g. "County", "State").
    pub area_type: String,
    /// Industry label (e.g. "10 Total, all industries").
    pub industry: String,
    /// Ownership category (e.g. "Private", "Federal Government").
    pub ownership: String,
    /// Numeric state FIPS code as a string (e.g. "24").
    pub state_fips: String,
    /// County code as a string; zero-padding is applied at extraction.
    pub county_code: String,
    /// Human-readable area name.
    pub area_name: String,
    /// Establishment count.
    pub establishments: f64,
    /// Average employment.
    pub employment: f64,
    /// Average weekly wage.
    pub weekly_wage: f64,
}

/// Lookup from state postal abbreviation to numeric state FIPS code.
///
/// The default table covers the 50 states plus DC; callers with their own
/// crosswalk data can build one from pairs instead.
#[derive(Debug, Clone)]
pub struct StateCrosswalk {
    codes: HashMap<String, String>,
}

const STATE_FIPS: [(&str, &str); 51] = [
    ("AL", "01"), ("AK", "02"), ("AZ", "04"), ("AR", "05"), ("CA", "06"),
    ("CO", "08"), ("CT", "09"), ("DE", "10"), ("DC", "11"), ("FL", "12"),
    ("GA", "13"), ("HI", "15"), ("ID", "16"), ("IL", "17"), ("IN", "18"),
    ("IA", "19"), ("KS", "20"), ("KY", "21"), ("LA", "22"), ("ME", "23"),
    ("MD", "24"), ("MA", "25"), ("MI", "26"), ("MN", "27"), ("MS", "28"),
    ("MO", "29"), ("MT", "30"), ("NE", "31"), ("NV", "32"), ("NH", "33"),
    ("NJ", "34"), ("NM", "35"), ("NY", "36"), ("NC", "37"), ("ND", "38"),
    ("OH", "39"), ("OK", "40"), ("OR", "41"), ("PA", "42"), ("RI", "44"),
    ("SC", "45"), ("SD", "46"), ("TN", "47"), ("TX", "48"), ("UT", "49"),
    ("VT", "50"), ("VA", "51"), ("WA", "53"), ("WV", "54"), ("WI", "55"),
    ("WY", "56"),
];

impl Default for StateCrosswalk {
    fn default() -> Self {
        Self::from_pairs(STATE_FIPS.iter().copied())
    }
}

impl StateCrosswalk {
    /// Build a crosswalk from (postal abbreviation, FIPS code) pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let codes = pairs
            .into_iter()
            .map(|(abbr, fips)| (abbr.to_ascii_uppercase(), fips.to_owned()))
            .collect();
        Self { codes }
    }

    /// Resolve a postal abbreviation to its FIPS code, case-insensitively.
    pub fn resolve(&self, postal: &str) -> Option<&str> {
        self.codes
            .get(&postal.to_ascii_uppercase())
            .map(String::as_str)
    }
}

/// Feature matrix for one state's counties, with parallel identifiers.
///
/// `raw` has shape (3, n): rows are establishments, employment, weekly wage;
/// columns follow the input order of `fips` and `names`.
#[derive(Debug, Clone)]
pub struct CountyFeatures {
    /// 5-character FIPS strings (2-digit state + 3-digit county).
    pub fips: Vec<String>,
    /// Area names in the same order as `fips`.
    pub names: Vec<String>,
    /// Raw feature matrix, shape (3, n).
    pub raw: Array2<f64>,
}

/// Load county/industry records from a CSV file.
///
/// Expected columns: `area_type`, `industry`, `ownership`, `state`, `county`,
/// `area_name`, `establishments`, `employment`, `weekly_wage`. Rows with a
/// missing value in any of these columns are dropped here so the core never
/// sees incomplete records.
pub fn load_records(file_path: &str) -> anyhow::Result<Vec<CountyRecord>> {
    let df = LazyCsvReader::new(file_path).finish()?
        .filter(
            col("area_type")
                .is_not_null()
                .and(col("industry").is_not_null())
                .and(col("ownership").is_not_null())
                .and(col("state").is_not_null())
                .and(col("county").is_not_null())
                .and(col("area_name").is_not_null())
                .and(col("establishments").is_not_null())
                .and(col("employment").is_not_null())
                .and(col("weekly_wage").is_not_null()),
        )
        .with_columns([
            // State and county codes are identifiers, not numbers; leading
            // zeros are restored at extraction.
            col("state").cast(DataType::Utf8),
            col("county").cast(DataType::Utf8),
        ])
        .collect()?;

    if df.height() == 0 {
        anyhow::bail!("no usable rows found in '{}'", file_path);
    }

    let area_types = utf8_column(&df, "area_type")?;
    let industries = utf8_column(&df, "industry")?;
    let ownerships = utf8_column(&df, "ownership")?;
    let states = utf8_column(&df, "state")?;
    let counties = utf8_column(&df, "county")?;
    let names = utf8_column(&df, "area_name")?;
    let establishments = f64_column(&df, "establishments")?;
    let employment = f64_column(&df, "employment")?;
    let weekly_wage = f64_column(&df, "weekly_wage")?;

    let records = (0..df.height())
        .map(|i| CountyRecord {
            area_type: area_types[i].clone(),
            industry: industries[i].clone(),
            ownership: ownerships[i].clone(),
            state_fips: states[i].clone(),
            county_code: counties[i].clone(),
            area_name: names[i].clone(),
            establishments: establishments[i],
            employment: employment[i],
            weekly_wage: weekly_wage[i],
        })
        .collect();

    Ok(records)
}

fn utf8_column(df: &DataFrame, name: &str) -> anyhow::Result<Vec<String>> {
    Ok(df
        .column(name)?
        .utf8()?
        .into_no_null_iter()
        .map(str::to_owned)
        .collect())
}

fn f64_column(df: &DataFrame, name: &str) -> anyhow::Result<Vec<f64>> {
    Ok(df
        .column(name)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_no_null_iter()
        .collect())
}

/// Select the clustering population for one state and build its feature matrix.
///
/// Keeps county-level, all-industries, private-ownership rows whose state
/// FIPS matches the requested postal code. County codes are zero-padded to 3
/// digits and state codes to 2 before the FIPS strings are formed. Input row
/// order is preserved.
pub fn extract_features(
    records: &[CountyRecord],
    state: &str,
    crosswalk: &StateCrosswalk,
) -> Result<CountyFeatures> {
    let state_fips = crosswalk
        .resolve(state)
        .ok_or_else(|| PipelineError::NoMatchingState(state.to_owned()))?;
    let want = format!("{:0>2}", state_fips);

    let selected: Vec<&CountyRecord> = records
        .iter()
        .filter(|r| {
            r.area_type == AREA_TYPE_COUNTY
                && r.industry == TOTAL_ALL_INDUSTRIES
                && r.ownership == OWNERSHIP_PRIVATE
                && format!("{:0>2}", r.state_fips) == want
        })
        .collect();

    if selected.is_empty() {
        return Err(PipelineError::EmptyDataset {
            state: state.to_owned(),
        });
    }

    let n = selected.len();
    let mut fips = Vec::with_capacity(n);
    let mut names = Vec::with_capacity(n);
    let mut raw = Array2::zeros((N_FEATURES, n));

    for (i, r) in selected.iter().enumerate() {
        fips.push(format!("{}{:0>3}", want, r.county_code));
        names.push(r.area_name.clone());
        raw[[0, i]] = r.establishments;
        raw[[1, i]] = r.employment;
        raw[[2, i]] = r.weekly_wage;
    }

    Ok(CountyFeatures { fips, names, raw })
}

/// Z-score each feature row independently to zero mean and unit variance.
///
/// Statistics are computed over the row's own values with the population
/// (divide-by-n) standard deviation. A zero-variance row is rejected with
/// [`PipelineError::DegenerateFeature`] rather than producing NaN.
pub fn normalize_features(raw: &Array2<f64>) -> Result<Array2<f64>> {
    if raw.ncols() == 0 {
        return Err(PipelineError::InvalidParameter(
            "feature matrix has no columns".to_owned(),
        ));
    }

    let mut normalized = raw.clone();
    for (idx, mut row) in normalized.outer_iter_mut().enumerate() {
        let n = row.len() as f64;
        let mean = row.sum() / n;
        let std = (row.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
        if std < 1e-12 {
            let feature = FEATURE_NAMES
                .get(idx)
                .map(|name| (*name).to_owned())
                .unwrap_or_else(|| format!("row {}", idx));
            return Err(PipelineError::DegenerateFeature { feature });
        }
        row.mapv_inplace(|x| (x - mean) / std);
    }

    Ok(normalized)
}
