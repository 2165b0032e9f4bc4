use crate::query::{Param, QueryParams};
use serde::{Deserialize, Serialize};

/// A contact of an email campaign.
///
/// When sent, `email`, `first_name`, `last_name` and `organization` are
/// always included (blank if unset) so the service clears stale values;
/// the other fields are sent only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub id: i64,
    #[serde(rename = "semailaddress")]
    pub email: Option<String>,
    #[serde(rename = "sfirstname")]
    pub first_name: Option<String>,
    #[serde(rename = "slastname")]
    pub last_name: Option<String>,
    #[serde(rename = "sorganization")]
    pub organization: Option<String>,
    #[serde(rename = "sdepartment")]
    pub department: Option<String>,
    #[serde(rename = "stitle")]
    pub title: Option<String>,
    #[serde(rename = "sbusinessphone")]
    pub business_phone: Option<String>,
    #[serde(rename = "shomephone")]
    pub home_phone: Option<String>,
    #[serde(rename = "swebaddress")]
    pub web_address: Option<String>,
    #[serde(rename = "scustomfield1")]
    pub custom_field1: Option<String>,
    #[serde(rename = "scustomfield2")]
    pub custom_field2: Option<String>,
    #[serde(rename = "scustomfield3")]
    pub custom_field3: Option<String>,
    #[serde(rename = "scustomfield4")]
    pub custom_field4: Option<String>,
    #[serde(rename = "scustomfield5")]
    pub custom_field5: Option<String>,
}

impl QueryParams for Contact {
    fn query_params(&self) -> Vec<Param> {
        vec![
            Param::required("semailaddress", self.email.as_deref()),
            Param::required("sfirstname", self.first_name.as_deref()),
            Param::required("slastname", self.last_name.as_deref()),
            Param::required("sorganization", self.organization.as_deref()),
            Param::optional("sdepartment", self.department.as_deref()),
            Param::optional("stitle", self.title.as_deref()),
            Param::optional("sbusinessphone", self.business_phone.as_deref()),
            Param::optional("shomephone", self.home_phone.as_deref()),
            Param::optional("swebaddress", self.web_address.as_deref()),
            Param::optional("scustomfield1", self.custom_field1.as_deref()),
            Param::optional("scustomfield2", self.custom_field2.as_deref()),
            Param::optional("scustomfield3", self.custom_field3.as_deref()),
            Param::optional("scustomfield4", self.custom_field4.as_deref()),
            Param::optional("scustomfield5", self.custom_field5.as_deref()),
        ]
    }
}

/// An entry of an account-level contact list.
///
/// Custom fields are sent as `custom[<key>]`, in the order given; entries
/// without a value are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactListEntry {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
    pub custom_fields: Vec<(String, Option<String>)>,
}

impl QueryParams for ContactListEntry {
    fn query_params(&self) -> Vec<Param> {
        let mut params = vec![
            Param::required("semailaddress", Some(self.email.as_str())),
            Param::optional("sfirstname", self.first_name.as_deref()),
            Param::optional("slastname", self.last_name.as_deref()),
            Param::optional("sorganization", self.organization.as_deref()),
        ];
        params.extend(
            self.custom_fields
                .iter()
                .map(|(key, value)| Param::optional(format!("custom[{}]", key), value.as_deref())),
        );
        params
    }
}
