//! Wire types for the Do-it backend API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed set of categories partitioning tasks for filtered display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Freelance,
    Work,
}

impl Category {
    /// Returns all categories for iteration (e.g., in pickers).
    pub fn all() -> &'static [Category] {
        &[Category::Personal, Category::Freelance, Category::Work]
    }

    /// Returns the wire/display name for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Freelance => "Freelance",
            Category::Work => "Work",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "freelance" => Ok(Category::Freelance),
            "work" => Ok(Category::Work),
            _ => Err(format!("Unknown category: {value}")),
        }
    }
}

/// A task record as served by the backend.
///
/// Identity is backend-assigned; the client never generates ids. `time` is
/// an opaque point in time, stored and displayed but never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-assigned identifier. The Mongo-backed service serves `_id`;
    /// both spellings are accepted.
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub category: Category,
    pub time: DateTime<Utc>,
}

/// Client-side input for task creation.
///
/// The backend assigns the id; the initial completion flag is set by the
/// store when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub category: Category,
    pub time: DateTime<Utc>,
}

/// Request body for POST `/api/tasks`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateTaskRequest<'a> {
    pub title: &'a str,
    pub completed: bool,
    pub category: Category,
    pub time: DateTime<Utc>,
}

/// Response body for GET `/api/users/status`.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionStatusResponse {
    pub authenticated: bool,
}

/// Response body for GET `/api/users/setup2FA`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorSetup {
    /// Data-URL QR payload to scan with an authenticator app.
    #[serde(rename = "qrCode")]
    pub qr_code: String,
}

/// Response body for POST `/api/users/verify2FA`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorVerify {
    pub message: String,
}
