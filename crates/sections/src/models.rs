//! Typed resume sections and their validating constructors.
//!
//! Each `validate` returns the normalized value (trimmed strings, lowercased
//! email) on success. Advisory issues ride along as warnings; anything of
//! severity `error` turns the whole result into a `Failure`.
//!
//! Field names inside list items are item-relative (`"name"`,
//! `"startDate"`); basics uses full dot-paths (`"basics.email"`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use resumeforge_collection::HasId;
use resumeforge_core::{ValidationError, ValidationResult, codes};
use resumeforge_validation::validate_related_fields;

/// List-shaped section stored under [`SECTION`](SectionItem::SECTION).
pub trait SectionItem:
    HasId + Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const SECTION: &'static str;

    fn validate(&self) -> ValidationResult<Self>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country_code: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Basics {
    pub name: String,
    pub label: String,
    pub email: String,
    pub phone: String,
    pub url: String,
    pub summary: String,
    pub location: Location,
}

impl Basics {
    pub const SECTION: &'static str = "basics";

    pub fn validate(&self) -> ValidationResult<Basics> {
        let mut value = self.clone();
        value.name = value.name.trim().to_string();
        value.email = value.email.trim().to_ascii_lowercase();
        value.location.postal_code = value.location.postal_code.trim().to_string();

        let mut issues = Vec::new();
        issues.extend(required("basics.name", &value.name));

        if !value.email.is_empty() && !is_email(&value.email) {
            issues.push(
                ValidationError::new(
                    codes::INVALID_FORMAT,
                    "Email address is not valid",
                    "basics.email",
                )
                .with_i18n("validation.email.invalid")
                .with_i18n_param("value", value.email.clone())
                .with_suggestion("Use the form name@example.com"),
            );
        }

        let postal = &value.location.postal_code;
        if !postal.is_empty() && !is_postal_code(postal) {
            issues.push(
                ValidationError::warning(
                    codes::INVALID_FORMAT,
                    "Postal code looks unusual",
                    "basics.location.postalCode",
                )
                .with_i18n("validation.postalCode.unusual"),
            );
        }

        ValidationResult::success_with_warnings(value, issues)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub position: String,
    pub url: String,
    pub start_date: String,
    pub end_date: String,
    pub summary: String,
    pub highlights: Vec<String>,
}

impl SectionItem for WorkEntry {
    const SECTION: &'static str = "work";

    fn validate(&self) -> ValidationResult<Self> {
        let mut value = self.clone();
        value.name = value.name.trim().to_string();
        value.position = value.position.trim().to_string();

        let mut issues = Vec::new();
        issues.extend(required("name", &value.name));
        issues.extend(required("position", &value.position));
        issues.extend(date_issues(&value.start_date, &value.end_date));
        ValidationResult::success_with_warnings(value, issues)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub institution: String,
    pub area: String,
    pub study_type: String,
    pub start_date: String,
    pub end_date: String,
    pub score: String,
    pub courses: Vec<String>,
}

impl SectionItem for EducationEntry {
    const SECTION: &'static str = "education";

    fn validate(&self) -> ValidationResult<Self> {
        let mut value = self.clone();
        value.institution = value.institution.trim().to_string();

        let mut issues = Vec::new();
        issues.extend(required("institution", &value.institution));
        issues.extend(date_issues(&value.start_date, &value.end_date));
        ValidationResult::success_with_warnings(value, issues)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub level: String,
    pub keywords: Vec<String>,
}

impl SectionItem for SkillEntry {
    const SECTION: &'static str = "skills";

    fn validate(&self) -> ValidationResult<Self> {
        let mut value = self.clone();
        value.name = value.name.trim().to_string();
        value.keywords = value
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let mut issues = Vec::new();
        issues.extend(required("name", &value.name));
        if value.keywords.is_empty() {
            issues.push(
                ValidationError::warning(codes::REQUIRED, "Add a few keywords to this skill", "keywords")
                    .with_i18n("validation.skill.keywords"),
            );
        }
        ValidationResult::success_with_warnings(value, issues)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwardEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub awarder: String,
    pub summary: String,
}

impl SectionItem for AwardEntry {
    const SECTION: &'static str = "awards";

    fn validate(&self) -> ValidationResult<Self> {
        let mut value = self.clone();
        value.title = value.title.trim().to_string();

        let mut issues = Vec::new();
        issues.extend(required("title", &value.title));
        issues.extend(date_format("date", &value.date));
        ValidationResult::success_with_warnings(value, issues)
    }
}

macro_rules! impl_has_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HasId for $ty {
                fn id(&self) -> Option<&str> {
                    self.id.as_deref()
                }

                fn set_id(&mut self, id: String) {
                    self.id = Some(id);
                }
            }
        )*
    };
}

impl_has_id!(WorkEntry, EducationEntry, SkillEntry, AwardEntry);

/// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; partial dates start the period.
pub fn parse_partial_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    match raw.len() {
        4 if raw.bytes().all(|b| b.is_ascii_digit()) => {
            raw.parse().ok().and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        }
        7 => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok(),
        10 => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
        _ => None,
    }
}

fn required(field: &str, value: &str) -> Option<ValidationError> {
    value.is_empty().then(|| ValidationError::required(field))
}

fn date_format(field: &str, value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() || parse_partial_date(value).is_some() {
        return None;
    }
    Some(
        ValidationError::new(codes::INVALID_FORMAT, "Date is not valid", field)
            .with_i18n("validation.date.invalid")
            .with_i18n_param("value", value)
            .with_suggestion("Use YYYY, YYYY-MM or YYYY-MM-DD"),
    )
}

fn date_issues(start: &str, end: &str) -> Vec<ValidationError> {
    let mut issues: Vec<_> = date_format("startDate", start)
        .into_iter()
        .chain(date_format("endDate", end))
        .collect();

    let range = (parse_partial_date(start), parse_partial_date(end));
    issues.extend(
        validate_related_fields(
            &["startDate", "endDate"],
            |range: &(Option<NaiveDate>, Option<NaiveDate>)| {
                matches!(range, (Some(start), Some(end)) if end < start)
            },
            "Start date must be before end date",
            &range,
        )
        .into_iter()
        .map(|e| e.with_i18n("validation.date.order")),
    );
    issues
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn is_postal_code(value: &str) -> bool {
    (3..=10).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
}
