use anyhow::{Result, anyhow};
use log::info;
use serde::Serialize;
use std::time::Duration;

use crate::models::{JobData, User};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// Dashboard-side application record, in the API's own vocabulary
/// (`title` becomes `position`, `company` becomes `company_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationPayload {
    pub position: String,
    pub company_name: String,
    pub url: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
}

impl ApplicationPayload {
    pub fn from_job(job: &JobData) -> Self {
        Self {
            position: job.title.clone(),
            company_name: job.company.clone(),
            url: job.url.clone(),
            status: "applied".to_string(),
            priority: "medium".to_string(),
            notes: String::new(),
        }
    }
}

/// Forwards extracted jobs to the dashboard API. Collaborator boundary: a
/// failed save never feeds back into extraction state.
pub struct SaveGateway {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl SaveGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn save(&self, job: &JobData, user: &User) -> Result<()> {
        let payload = ApplicationPayload::from_job(job);
        let endpoint = format!("{}/api/application", self.base_url.trim_end_matches('/'));

        let mut request = self.client.post(&endpoint).json(&payload);
        if let Some(token) = &user.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to save application: {} returned {}",
                endpoint,
                response.status()
            ));
        }

        info!(
            "saved application \"{}\" at {} for {}",
            payload.position, payload.company_name, user.email
        );
        Ok(())
    }
}
