use serde::Serialize;
use std::fmt;

use super::{UploadMode, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportValue {
    Count(usize),
    AverageGb(f64),
    Users(Vec<User>),
}

/// Result of one metric, ready to print or hand to a report sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub title: String,
    pub message: String,
    pub value: ReportValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<UploadMode>,
}

impl MetricsReport {
    /// `label` names the population, e.g. "registered" or "free".
    pub fn user_count(label: &str, count: usize) -> Self {
        Self {
            title: format!("{} users report", label),
            message: format!("there are {} total {} users", count, label),
            value: ReportValue::Count(count),
            mode: None,
        }
    }

    /// Same wording as [`MetricsReport::user_count`], but carries the users
    /// themselves in the order they were found.
    pub fn user_list(label: &str, users: Vec<User>) -> Self {
        Self {
            title: format!("{} users report", label),
            message: format!("there are {} total {} users", users.len(), label),
            value: ReportValue::Users(users),
            mode: None,
        }
    }

    pub fn active_count(label: &str, count: usize, window_hours: u32) -> Self {
        Self {
            title: format!("active {} report", label),
            message: format!(
                "there are {} {} active in the last {} hours",
                count, label, window_hours
            ),
            value: ReportValue::Count(count),
            mode: None,
        }
    }

    pub fn upload_count(count: usize, mode: UploadMode) -> Self {
        let message = match mode {
            UploadMode::Unique => format!("there are {} total unique uploads", count),
            UploadMode::All => format!("there are {} total uploads", count),
        };

        Self {
            title: "upload count report".to_string(),
            message,
            value: ReportValue::Count(count),
            mode: Some(mode),
        }
    }

    pub fn average_upload_size(gigabytes: f64, mode: UploadMode) -> Self {
        Self {
            title: "upload size report".to_string(),
            message: format!(
                "the {} average size of uploads is {} gigabytes",
                mode, gigabytes
            ),
            value: ReportValue::AverageGb(gigabytes),
            mode: Some(mode),
        }
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
