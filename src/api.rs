//! Per-entity convenience methods on [`Client`].
//!
//! Each method names its endpoint and envelope shape and leaves paging,
//! retries and unwrapping to the engine.

use crate::client::Client;
use crate::models::{
    ApiResult, Contact, ContactListEntry, EmailMessage, Survey, SurveyCampaign, SurveyQuestion,
    SurveyResponse,
};
use crate::pagination::PageRequest;
use crate::query::Endpoint;
use crate::Result;
use http::Method;

impl Client {
    // Questions and responses

    /// Lists the questions of a survey.
    pub async fn get_questions(
        &self,
        survey_id: i64,
        pages: PageRequest,
    ) -> Result<Vec<SurveyQuestion>> {
        let endpoint = Endpoint::get(format!("survey/{}/surveyquestion", survey_id));
        Ok(self.fetch_pages(&endpoint, pages).await?.into_records())
    }

    /// Lists the responses submitted to a survey.
    pub async fn get_responses(
        &self,
        survey_id: i64,
        pages: PageRequest,
    ) -> Result<Vec<SurveyResponse>> {
        let endpoint = Endpoint::get(format!("survey/{}/surveyresponse", survey_id));
        Ok(self.fetch_pages(&endpoint, pages).await?.into_records())
    }

    // Surveys

    /// Lists every survey of the account.
    pub async fn get_all_surveys(&self, pages: PageRequest) -> Result<Vec<Survey>> {
        Ok(self
            .fetch_pages(&Endpoint::get("survey"), pages)
            .await?
            .into_records())
    }

    /// Fetches one survey.
    pub async fn get_survey(&self, survey_id: i64) -> Result<Survey> {
        self.fetch_one(&Endpoint::get(format!("survey/{}", survey_id)))
            .await
    }

    /// Creates a survey and returns its id.
    pub async fn create_survey(&self, title: &str) -> Result<i64> {
        let endpoint = Endpoint::new(Method::PUT, "survey")
            .param("type", "survey")
            .required("title", Some(title));
        let survey: Survey = self.fetch_one(&endpoint).await?;
        Ok(survey.id)
    }

    /// Deletes a survey. Returns `false` if the service declined.
    pub async fn delete_survey(&self, survey_id: i64) -> Result<bool> {
        let endpoint = Endpoint::new(Method::DELETE, format!("survey/{}", survey_id));
        self.acknowledge(&endpoint).await
    }

    // Campaigns

    /// Lists the campaigns of a survey.
    pub async fn get_campaigns(
        &self,
        survey_id: i64,
        pages: PageRequest,
    ) -> Result<Vec<SurveyCampaign>> {
        let endpoint = Endpoint::get(format!("survey/{}/surveycampaign", survey_id));
        Ok(self.fetch_pages(&endpoint, pages).await?.into_records())
    }

    /// Fetches one campaign.
    pub async fn get_campaign(&self, survey_id: i64, campaign_id: i64) -> Result<SurveyCampaign> {
        let endpoint = Endpoint::get(format!(
            "survey/{}/surveycampaign/{}",
            survey_id, campaign_id
        ));
        self.fetch_one(&endpoint).await
    }

    /// Creates an email campaign and returns its id.
    ///
    /// With `master_campaign_id`, the new campaign is a copy of that one.
    pub async fn create_campaign(
        &self,
        survey_id: i64,
        name: &str,
        master_campaign_id: Option<i64>,
    ) -> Result<i64> {
        let endpoint = match master_campaign_id.filter(|id| *id > 0) {
            Some(master) => Endpoint::new(
                Method::POST,
                format!("survey/{}/surveycampaign/{}", survey_id, master),
            )
            .required("name", Some(name))
            .param("copy", true),
            None => Endpoint::new(Method::PUT, format!("survey/{}/surveycampaign", survey_id))
                .param("type", "email")
                .required("name", Some(name)),
        };

        let campaign: SurveyCampaign = self.fetch_one(&endpoint).await?;
        Ok(campaign.id)
    }

    /// Updates the name and status of a campaign.
    pub async fn update_campaign(&self, survey_id: i64, campaign: &SurveyCampaign) -> Result<bool> {
        let endpoint = Endpoint::new(
            Method::POST,
            format!("survey/{}/surveycampaign/{}", survey_id, campaign.id),
        )
        .optional("name", Some(campaign.name.as_str()))
        .optional("status", Some(campaign.status.as_str()));
        self.acknowledge(&endpoint).await
    }

    /// Deletes a campaign.
    pub async fn delete_campaign(&self, survey_id: i64, campaign_id: i64) -> Result<bool> {
        let endpoint = Endpoint::new(
            Method::DELETE,
            format!("survey/{}/surveycampaign/{}", survey_id, campaign_id),
        );
        self.acknowledge(&endpoint).await
    }

    // Email messages

    /// Lists the messages of an email campaign.
    pub async fn get_email_messages(
        &self,
        survey_id: i64,
        campaign_id: i64,
    ) -> Result<Vec<EmailMessage>> {
        let endpoint = Endpoint::get(format!(
            "survey/{}/surveycampaign/{}/emailmessage",
            survey_id, campaign_id
        ));
        Ok(self
            .fetch_pages(&endpoint, PageRequest::All)
            .await?
            .into_records())
    }

    /// Updates the sender of an email message.
    pub async fn update_email_message(
        &self,
        survey_id: i64,
        campaign_id: i64,
        message: &EmailMessage,
    ) -> Result<bool> {
        let from = message.from.clone().unwrap_or_default();
        let endpoint = Endpoint::new(
            Method::POST,
            format!(
                "survey/{}/surveycampaign/{}/emailmessage/{}",
                survey_id, campaign_id, message.id
            ),
        )
        .optional("from[name]", from.name)
        .optional("from[email]", from.email);
        self.acknowledge(&endpoint).await
    }

    // Contacts

    /// Adds a contact to an email campaign and returns its id.
    ///
    /// Returns `None` if the service declined.
    pub async fn create_contact(
        &self,
        survey_id: i64,
        campaign_id: i64,
        contact: &Contact,
    ) -> Result<Option<i64>> {
        let endpoint = Endpoint::new(
            Method::PUT,
            format!("survey/{}/surveycampaign/{}/contact/", survey_id, campaign_id),
        )
        .with_params(contact);
        let result: ApiResult = self.fetch_direct(&endpoint).await?;
        Ok(result.created_id())
    }

    /// Updates a contact of an email campaign, identified by `contact.id`.
    pub async fn update_contact(
        &self,
        survey_id: i64,
        campaign_id: i64,
        contact: &Contact,
    ) -> Result<bool> {
        let endpoint = Endpoint::new(
            Method::POST,
            format!(
                "survey/{}/surveycampaign/{}/contact/{}",
                survey_id, campaign_id, contact.id
            ),
        )
        .with_params(contact);
        self.acknowledge(&endpoint).await
    }

    /// Removes a contact from an email campaign.
    pub async fn delete_contact(
        &self,
        survey_id: i64,
        campaign_id: i64,
        contact_id: i64,
    ) -> Result<bool> {
        let endpoint = Endpoint::new(
            Method::DELETE,
            format!(
                "survey/{}/surveycampaign/{}/contact/{}",
                survey_id, campaign_id, contact_id
            ),
        );
        self.acknowledge(&endpoint).await
    }

    /// Lists the contacts of an email campaign.
    pub async fn get_campaign_contacts(
        &self,
        survey_id: i64,
        campaign_id: i64,
    ) -> Result<Vec<Contact>> {
        let endpoint = Endpoint::get(format!(
            "survey/{}/surveycampaign/{}/contact",
            survey_id, campaign_id
        ));
        Ok(self
            .fetch_pages(&endpoint, PageRequest::All)
            .await?
            .into_records())
    }

    /// Adds or updates an entry of an account contact list.
    pub async fn update_contact_list(
        &self,
        contact_list_id: i64,
        entry: &ContactListEntry,
    ) -> Result<bool> {
        let endpoint = Endpoint::new(Method::POST, format!("contactlist/{}", contact_list_id))
            .with_params(entry);
        self.acknowledge(&endpoint).await
    }

    async fn acknowledge(&self, endpoint: &Endpoint) -> Result<bool> {
        let result: ApiResult = self.fetch_direct(endpoint).await?;
        Ok(result.result_ok)
    }
}
