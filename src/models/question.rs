use super::LocalizedText;
use serde::{Deserialize, Serialize};

/// A question on a survey page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyQuestion {
    pub id: i64,
    pub page: i64,
    pub title: LocalizedText,
    /// Specific question kind (`radio`, `checkbox`, `textbox`, ...).
    #[serde(rename = "type")]
    pub subtype: Option<String>,
    /// Broad kind (`Question`, `Decorative`, `Action`).
    pub base_type: Option<String>,
    #[serde(alias = "shortName")]
    pub shortname: Option<String>,
    pub section_id: i64,
    pub properties: Option<QuestionProperties>,
    pub options: Vec<QuestionOption>,
}

/// Display and validation settings of a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionProperties {
    pub option_sort: bool,
    pub required: bool,
    pub hidden: bool,
    pub orientation: Option<String>,
    pub question_description: Option<LocalizedText>,
}

/// One selectable answer of a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionOption {
    pub id: i64,
    #[serde(alias = "shortName")]
    pub shortname: Option<String>,
    pub value: Option<String>,
    pub title: LocalizedText,
}
