//! Plain data records exchanged with the API.
//!
//! Field names follow the wire format where it is readable and are renamed
//! where it is not (`sfirstname` becomes `first_name`). Every record
//! tolerates missing fields.

mod campaign;
mod contact;
mod localized;
mod question;
mod response;
mod survey;

pub use campaign::{EmailFrom, EmailMessage, SurveyCampaign};
pub use contact::{Contact, ContactListEntry};
pub use localized::LocalizedText;
pub use question::{QuestionOption, QuestionProperties, SurveyQuestion};
pub use response::{Answer, SurveyResponse};
pub use survey::Survey;

use serde::Deserialize;

/// Acknowledgement returned directly by mutating calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiResult {
    /// Whether the service applied the change.
    pub result_ok: bool,
    /// The id of the created or updated object, when reported.
    pub id: Option<i64>,
    /// Explanation sent along with a failure.
    pub message: Option<String>,
}

impl ApiResult {
    /// The id of a successful acknowledgement.
    pub fn created_id(&self) -> Option<i64> {
        self.id.filter(|_| self.result_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_id_requires_ok() {
        let ok: ApiResult = serde_json::from_str(r#"{"result_ok":true,"id":88}"#).unwrap();
        let failed: ApiResult =
            serde_json::from_str(r#"{"result_ok":false,"id":88,"message":"Duplicate"}"#).unwrap();

        assert_eq!(ok.created_id(), Some(88));
        assert_eq!(failed.created_id(), None);
        assert_eq!(failed.message.as_deref(), Some("Duplicate"));
    }
}
