use serde::{Deserialize, Serialize};

/// A distribution campaign (link, email, ...) of a survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyCampaign {
    pub id: i64,
    pub name: String,
    #[serde(rename = "_subtype")]
    pub campaign_type: String,
    pub status: String,
    pub uri: Option<String>,
    pub language: Option<String>,
    pub datecreated: Option<String>,
    pub datemodified: Option<String>,
}

/// An invitation or reminder message of an email campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailMessage {
    pub id: i64,
    #[serde(rename = "_subtype")]
    pub message_type: String,
    pub subject: Option<String>,
    pub from: Option<EmailFrom>,
    pub replies: Option<String>,
    pub messagetext: Option<String>,
}

/// Sender of an email message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailFrom {
    pub name: Option<String>,
    pub email: Option<String>,
}
