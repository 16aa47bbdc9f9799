use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;

/// Visa sponsorship status of a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sponsorship {
    OffersSponsorship,
    DoesNotOfferSponsorship,
    CitizenshipRequired,
    #[default]
    NotSpecified,
}

impl Sponsorship {
    /// Maps the listing feed's free-text label. Unknown labels are `NotSpecified`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Offers Sponsorship" => Sponsorship::OffersSponsorship,
            "Does Not Offer Sponsorship" => Sponsorship::DoesNotOfferSponsorship,
            "U.S. Citizenship is Required" => Sponsorship::CitizenshipRequired,
            _ => Sponsorship::NotSpecified,
        }
    }

    /// The label as stored in the `sponsorship` column.
    pub fn label(self) -> &'static str {
        match self {
            Sponsorship::OffersSponsorship => "Offers Sponsorship",
            Sponsorship::DoesNotOfferSponsorship => "Does Not Offer Sponsorship",
            Sponsorship::CitizenshipRequired => "U.S. Citizenship is Required",
            Sponsorship::NotSpecified => "Other",
        }
    }
}

/// Raw `internships` row. JSONB columns are left untyped here and validated in
/// `JobRecord::from`.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: String,
    pub active: Option<bool>,
    pub company_name: Option<String>,
    pub date_posted: Option<i64>,
    pub date_updated: Option<i64>,
    pub is_visible: Option<bool>,
    pub locations: Option<Value>,
    pub season: Option<String>,
    pub sponsorship: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub keywords: Option<Value>,
}

/// One job posting, as the matching core sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub locations: Vec<String>,
    pub season: String,
    pub sponsorship: Sponsorship,
    /// The posting's own tags, independent of the skill taxonomy.
    pub keywords: Vec<String>,
    pub date_posted: Option<DateTime<Utc>>,
    pub active: bool,
    pub is_visible: bool,
    pub url: String,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        let locations = parse_string_list(row.locations, &row.id, "locations");
        let keywords = parse_string_list(row.keywords, &row.id, "keywords");

        Self {
            title: row
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Internship Position".to_string()),
            company: row
                .company_name
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Company".to_string()),
            locations,
            season: row.season.unwrap_or_else(|| "Not specified".to_string()),
            sponsorship: row
                .sponsorship
                .as_deref()
                .map(Sponsorship::from_label)
                .unwrap_or_default(),
            keywords,
            date_posted: row.date_posted.and_then(|s| DateTime::from_timestamp(s, 0)),
            active: row.active.unwrap_or(false),
            is_visible: row.is_visible.unwrap_or(false),
            url: row.url.unwrap_or_default(),
            id: row.id,
        }
    }
}

/// A posting as delivered by the external listings feed, plus the keywords the
/// sync run attaches before storing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_posted: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_updated: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_visible: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sponsorship: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

impl Listing {
    /// The later of the posted and updated timestamps (unix seconds).
    pub fn latest_timestamp(&self) -> i64 {
        self.date_posted.max(self.date_updated)
    }
}

/// The feed sends explicit `null` for missing values.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a JSONB list column that may hold an array, an object (values are taken),
/// or a JSON-encoded string of either. Non-string items are dropped.
fn parse_string_list(value: Option<Value>, job_id: &str, column: &str) -> Vec<String> {
    let value = match value {
        None | Some(Value::Null) => return vec![],
        Some(Value::String(encoded)) => {
            if encoded.trim().is_empty() {
                return vec![];
            }
            match serde_json::from_str::<Value>(&encoded) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!("Failed to parse {column} for internship {job_id}: {e}");
                    return vec![];
                }
            }
        }
        Some(other) => other,
    };

    let items: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            warn!("Unexpected {column} shape for internship {job_id}: {other}");
            return vec![];
        }
    };

    items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}
