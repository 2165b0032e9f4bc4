use serde::{Deserialize, Serialize};

/// A survey, poll or form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    pub status: String,
    #[serde(rename = "_subtype")]
    pub survey_type: String,
    pub created_on: String,
    pub modified_on: String,
}
