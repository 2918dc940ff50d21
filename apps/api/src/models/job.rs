//! Job and requirement rows, plus the classification enums shared with the
//! JD extraction schema.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Standardized role classification for a job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobRole {
    #[serde(rename = "Analytics Engineer")]
    AnalyticsEngineer,
    #[serde(rename = "Business Analyst")]
    BusinessAnalyst,
    #[serde(rename = "Business Intelligence Engineer")]
    BusinessIntelligenceEngineer,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "Data Engineer")]
    DataEngineer,
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
}

impl JobRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobRole::AnalyticsEngineer => "Analytics Engineer",
            JobRole::BusinessAnalyst => "Business Analyst",
            JobRole::BusinessIntelligenceEngineer => "Business Intelligence Engineer",
            JobRole::DataAnalyst => "Data Analyst",
            JobRole::DataEngineer => "Data Engineer",
            JobRole::SoftwareEngineer => "Software Engineer",
        }
    }
}

impl fmt::Display for JobRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Analytics Engineer" => Ok(JobRole::AnalyticsEngineer),
            "Business Analyst" => Ok(JobRole::BusinessAnalyst),
            "Business Intelligence Engineer" => Ok(JobRole::BusinessIntelligenceEngineer),
            "Data Analyst" => Ok(JobRole::DataAnalyst),
            "Data Engineer" => Ok(JobRole::DataEngineer),
            "Software Engineer" => Ok(JobRole::SoftwareEngineer),
            other => Err(format!("unknown job role: {other}")),
        }
    }
}

/// Seniority designation as it appears in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobLevel {
    I,
    II,
    III,
    Senior,
}

impl JobLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobLevel::I => "I",
            JobLevel::II => "II",
            JobLevel::III => "III",
            JobLevel::Senior => "Senior",
        }
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(JobLevel::I),
            "II" => Ok(JobLevel::II),
            "III" => Ok(JobLevel::III),
            "Senior" => Ok(JobLevel::Senior),
            other => Err(format!("unknown job level: {other}")),
        }
    }
}

/// Work arrangement for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkSetting {
    #[serde(rename = "On-site")]
    OnSite,
    Hybrid,
    Remote,
}

impl WorkSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkSetting::OnSite => "On-site",
            WorkSetting::Hybrid => "Hybrid",
            WorkSetting::Remote => "Remote",
        }
    }
}

impl fmt::Display for WorkSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job listing persisted from a parsed job description.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company: String,
    pub listing_job_title: String,
    /// The job description exactly as provided; interview prep re-reads it.
    pub raw_text: String,
    pub role: String,
    pub specialization: Option<String>,
    pub level: String,
    pub location: Option<String>,
    pub work_setting: String,
    pub min_experience_years: Option<i32>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One extracted requirement belonging to a job. Created in a single batch
/// with its job; never mutated individually afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub text: String,
    pub keywords: Json<Vec<String>>,
    pub relevance: f64,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Tracking record created once per successful generation run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applied_at: DateTime<Utc>,
}
