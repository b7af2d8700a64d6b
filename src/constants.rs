//! Measure and header catalogs for the CMS SNF Quality Reporting Program
//! dataset. These lists are the pipeline's domain knowledge: snapshot
//! vintages spell the same semantic column half a dozen ways, and the
//! candidate lists below are consulted in order, first spelling present wins.

/// CMS provider-data dataset ID for the SNF Quality Reporting Program.
pub const DATASET_ID: &str = "fykj-qjee";

/// Metastore endpoint returning the dataset descriptor with download URLs.
pub const METASTORE_URL: &str =
    "https://data.cms.gov/provider-data/api/1/metastore/schemas/dataset/items";

/// Base URL for archived monthly snapshot CSVs.
pub const ARCHIVE_BASE_URL: &str =
    "https://data.cms.gov/provider-data/sites/default/files/archive";

/// Output file names, consumed by the external viewer.
pub const QUALITY_EXPORT: &str = "snf_multi_year_quality.csv";
pub const TREND_EXPORT: &str = "snf_trend_summary.csv";

/// Columns appended to every raw table on ingestion.
pub const SNAPSHOT_YEAR_COL: &str = "snapshot_year";
pub const SNAPSHOT_LABEL_COL: &str = "snapshot_label";

/// Label tag for the live API snapshot.
pub const LIVE_SNAPSHOT_LABEL: &str = "current_api";

/// Measure code -> human label, ordered by code. Rows with any other code
/// are dropped before pivoting.
pub const MEASURE_CATALOG: &[(&str, &str)] = &[
    ("S_004_01_PPR_PD_RSRR", "Preventable Readmission Rate"),
    ("S_005_02_DTC_RS_RATE", "Discharge to Community Rate"),
    ("S_006_01_MSPB_SCORE", "Medicare Spending Per Beneficiary (MSPB)"),
    ("S_007_02_OBS_RATE", "Medication Review Rate"),
    ("S_013_02_OBS_RATE", "Fall with Major Injury Rate"),
    ("S_024_05_OBS_RATE", "Self-Care at Discharge"),
    ("S_025_05_OBS_RATE", "Mobility at Discharge"),
    ("S_038_02_ADJ_RATE", "Pressure Ulcer Rate"),
    ("S_039_01_HAI_RS_RATE", "Healthcare-Associated Infection Rate"),
];

/// Look up the human label for a measure code.
pub fn measure_label(code: &str) -> Option<&'static str> {
    MEASURE_CATALOG
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// One canonical facility field and its known header spellings across
/// snapshot vintages. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
}

/// Canonical facility attribute fields. `provider_id` is mandatory for the
/// facility derivation; every other field is optional.
pub const FACILITY_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "provider_id",
        candidates: &[
            "CMS Certification Number (CCN)",
            "Federal Provider Number",
            "Provider Number",
            "provider_number",
        ],
    },
    FieldSpec {
        name: "facility_name",
        candidates: &[
            "Provider Name",
            "Facility Name",
            "facility_name",
            "provider_name",
        ],
    },
    FieldSpec {
        name: "address",
        candidates: &["Address Line 1", "Address", "address", "Street Address"],
    },
    FieldSpec {
        name: "city",
        candidates: &["City/Town", "City", "city"],
    },
    FieldSpec {
        name: "state",
        candidates: &["State", "state", "Provider State"],
    },
    FieldSpec {
        name: "zip_code",
        candidates: &["ZIP Code", "zip_code", "Zip Code", "zip"],
    },
    FieldSpec {
        name: "county_name",
        candidates: &["County/Parish", "County Name", "county_name", "County", "county"],
    },
    FieldSpec {
        name: "phone_number",
        candidates: &[
            "Telephone Number",
            "Phone Number",
            "phone_number",
            "Phone",
            "phone",
        ],
    },
];

/// County-like headers accepted by the geographic filter (case-insensitive).
pub const COUNTY_FILTER_HEADERS: &[&str] = &["county name", "county/parish", "county"];

/// State-like headers accepted by the geographic filter (case-insensitive).
pub const STATE_FILTER_HEADERS: &[&str] = &["provider state", "state"];

/// Preferred exact header spellings for the measure pivot.
pub const MEASURE_CODE_HEADER: &str = "Measure Code";
pub const PROVIDER_CCN_HEADER: &str = "CMS Certification Number (CCN)";
pub const SCORE_HEADER: &str = "Score";
