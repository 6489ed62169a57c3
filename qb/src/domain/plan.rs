//! Plan-generation request and the multi-page setup form that builds it

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default study hour when the user doesn't pick one (evening)
pub const DEFAULT_PREF_TIME: u8 = 18;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation failures while filling the setup form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("already on the first page")]
    FirstPage,

    #[error("already on the last page")]
    LastPage,
}

impl FormError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Body of `POST /api/generate_plan`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub role: String,

    #[serde(default)]
    pub goal: String,

    #[serde(default)]
    pub job_description: Option<String>,

    /// Study hours per day
    pub hours: f32,

    pub start_date: NaiveDate,

    pub interview_date: NaiveDate,

    #[serde(default)]
    pub use_cal: bool,

    /// Preferred study hour, 24-hour clock
    pub pref_time: u8,
}

impl PlanRequest {
    /// Same checks the backend applies, so bad input fails before a stream opens
    pub fn validate(&self) -> Result<(), FormError> {
        debug!(role = %self.role, "PlanRequest::validate: called");
        if self.role.trim().is_empty() {
            return Err(FormError::Missing("role"));
        }
        if !(self.hours > 0.0 && self.hours <= 24.0) {
            return Err(FormError::invalid("hours", "must be greater than 0 and at most 24"));
        }
        if self.pref_time > 23 {
            return Err(FormError::invalid("pref_time", "must be an hour between 0 and 23"));
        }
        if self.interview_date < self.start_date {
            return Err(FormError::invalid("interview_date", "must not be before the start date"));
        }
        Ok(())
    }

    /// Days between start and interview
    pub fn days_available(&self) -> i64 {
        (self.interview_date - self.start_date).num_days()
    }
}

/// Pages of the setup form, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPage {
    Profile,
    Schedule,
    Calendar,
}

impl FormPage {
    /// Field names collected on this page
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Profile => &["role", "goal", "job_description"],
            Self::Schedule => &["hours", "start_date", "interview_date"],
            Self::Calendar => &["use_cal", "pref_time"],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Profile => "Character Setup",
            Self::Schedule => "Schedule",
            Self::Calendar => "Calendar",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Profile => Some(Self::Schedule),
            Self::Schedule => Some(Self::Calendar),
            Self::Calendar => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            Self::Profile => None,
            Self::Schedule => Some(Self::Profile),
            Self::Calendar => Some(Self::Schedule),
        }
    }
}

/// Page-by-page setup form; a page must validate before moving forward
#[derive(Debug, Clone)]
pub struct SetupForm {
    page: FormPage,
    pub role: String,
    pub goal: String,
    pub job_description: Option<String>,
    pub hours: Option<f32>,
    pub start_date: Option<NaiveDate>,
    pub interview_date: Option<NaiveDate>,
    pub use_cal: bool,
    pub pref_time: u8,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self {
            page: FormPage::Profile,
            role: String::new(),
            goal: String::new(),
            job_description: None,
            hours: None,
            start_date: None,
            interview_date: None,
            use_cal: false,
            pref_time: DEFAULT_PREF_TIME,
        }
    }
}

impl SetupForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a role already filled in (e.g. from config)
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn page(&self) -> FormPage {
        self.page
    }

    /// Set a field from raw user input; blank input clears optional fields
    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        debug!(%field, "SetupForm::set: called");
        let value = raw.trim();
        match field {
            "role" => self.role = value.to_string(),
            "goal" => self.goal = value.to_string(),
            "job_description" => {
                self.job_description = (!value.is_empty()).then(|| value.to_string());
            }
            "hours" => {
                let hours = value
                    .parse::<f32>()
                    .map_err(|e| FormError::invalid("hours", e.to_string()))?;
                self.hours = Some(hours);
            }
            "start_date" => self.start_date = Some(parse_date("start_date", value)?),
            "interview_date" => self.interview_date = Some(parse_date("interview_date", value)?),
            "use_cal" => self.use_cal = parse_bool(value)?,
            "pref_time" => {
                if value.is_empty() {
                    self.pref_time = DEFAULT_PREF_TIME;
                } else {
                    self.pref_time = value
                        .parse::<u8>()
                        .map_err(|e| FormError::invalid("pref_time", e.to_string()))?;
                }
            }
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Validate the current page and move to the next one
    pub fn next(&mut self) -> Result<FormPage, FormError> {
        debug!(page = ?self.page, "SetupForm::next: called");
        self.validate_page(self.page)?;
        let next = self.page.next().ok_or(FormError::LastPage)?;
        self.page = next;
        Ok(next)
    }

    /// Go back one page; never validates
    pub fn back(&mut self) -> Result<FormPage, FormError> {
        debug!(page = ?self.page, "SetupForm::back: called");
        let prev = self.page.prev().ok_or(FormError::FirstPage)?;
        self.page = prev;
        Ok(prev)
    }

    /// Validate every page and build the request
    pub fn finish(&self) -> Result<PlanRequest, FormError> {
        debug!("SetupForm::finish: called");
        for page in [FormPage::Profile, FormPage::Schedule, FormPage::Calendar] {
            self.validate_page(page)?;
        }

        let request = PlanRequest {
            role: self.role.clone(),
            goal: self.goal.clone(),
            job_description: self.job_description.clone(),
            hours: self.hours.ok_or(FormError::Missing("hours"))?,
            start_date: self.start_date.ok_or(FormError::Missing("start_date"))?,
            interview_date: self.interview_date.ok_or(FormError::Missing("interview_date"))?,
            use_cal: self.use_cal,
            pref_time: self.pref_time,
        };
        request.validate()?;
        Ok(request)
    }

    fn validate_page(&self, page: FormPage) -> Result<(), FormError> {
        match page {
            FormPage::Profile => {
                if self.role.trim().is_empty() {
                    return Err(FormError::Missing("role"));
                }
            }
            FormPage::Schedule => {
                let hours = self.hours.ok_or(FormError::Missing("hours"))?;
                if !(hours > 0.0 && hours <= 24.0) {
                    return Err(FormError::invalid("hours", "must be greater than 0 and at most 24"));
                }
                let start = self.start_date.ok_or(FormError::Missing("start_date"))?;
                let interview = self.interview_date.ok_or(FormError::Missing("interview_date"))?;
                if interview < start {
                    return Err(FormError::invalid("interview_date", "must not be before the start date"));
                }
            }
            FormPage::Calendar => {
                if self.pref_time > 23 {
                    return Err(FormError::invalid("pref_time", "must be an hour between 0 and 23"));
                }
            }
        }
        Ok(())
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| FormError::invalid(field, e.to_string()))
}

fn parse_bool(value: &str) -> Result<bool, FormError> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "" | "n" | "no" | "false" | "0" => Ok(false),
        other => Err(FormError::invalid("use_cal", format!("expected yes or no, got '{}'", other))),
    }
}

/// Response of `GET /api/connect_calendar`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarLink {
    #[serde(default)]
    pub auth_url: Option<String>,
}
