use async_trait::async_trait;
use reqwest::{StatusCode, Url, header::ACCEPT};
use tracing::{debug, info};

use super::types::ApiResponse;
use super::{ApiKeyPool, ReputationError, ReputationReport, ReputationSource};
use crate::config::ReputationSettings;
use crate::domain::normalize_fqdn;
use crate::errlog::ErrorLog;

/// VerifyMail client: one bounded request per check, no retry.
pub struct ReputationClient {
    http: reqwest::Client,
    base_url: Url,
    keys: ApiKeyPool,
    log: ErrorLog,
}

impl ReputationClient {
    pub fn new(
        settings: &ReputationSettings,
        keys: ApiKeyPool,
        log: ErrorLog,
    ) -> Result<Self, ReputationError> {
        let raw = settings.base_url.trim();
        let base_url = Url::parse(raw).map_err(|err| ReputationError::base_url(raw, err))?;
        if base_url.cannot_be_a_base() {
            return Err(ReputationError::base_url(raw, "URL cannot be a base"));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|source| ReputationError::ClientInit { source })?;
        Ok(Self {
            http,
            base_url,
            keys,
            log,
        })
    }

    pub fn keys(&self) -> &ApiKeyPool {
        &self.keys
    }

    /// Queries the API for `domain` and reports every failure class distinctly.
    pub async fn lookup(&self, domain: &str) -> Result<ReputationReport, ReputationError> {
        if self.keys.is_empty() {
            return Err(ReputationError::NoKeys);
        }
        let ascii = normalize_fqdn(domain).map_err(|source| ReputationError::InvalidDomain {
            domain: domain.to_string(),
            source,
        })?;
        let key = self.keys.next_key().ok_or(ReputationError::NoKeys)?;
        let url = self.endpoint(&ascii, key)?;

        let request_id = request_id();
        debug!(%request_id, domain = %ascii, "checking domain with VerifyMail API");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ReputationError::Network {
                source: err.without_url(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ReputationError::RateLimited);
        }
        if !status.is_success() {
            return Err(ReputationError::Status {
                status: status.as_u16(),
            });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|err| ReputationError::Decode {
                source: err.without_url(),
            })?;
        let report = ReputationReport::from(body);
        info!(
            %request_id,
            domain = %ascii,
            disposable = report.is_disposable,
            privacy = report.is_privacy,
            "VerifyMail API response received"
        );
        Ok(report)
    }

    fn endpoint(&self, domain: &str, key: &str) -> Result<Url, ReputationError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReputationError::base_url(self.base_url.as_str(), "URL cannot be a base"))?
            .pop_if_empty()
            .push(domain);
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }
}

#[async_trait]
impl ReputationSource for ReputationClient {
    fn is_available(&self) -> bool {
        !self.keys.is_empty()
    }

    async fn check_domain(&self, domain: &str) -> Option<ReputationReport> {
        match self.lookup(domain).await {
            Ok(report) => Some(report),
            Err(ReputationError::NoKeys) => {
                debug!("no VerifyMail API keys available");
                None
            }
            Err(err) => {
                self.log
                    .record(format!("VerifyMail API error for domain {domain}: {err}"))
                    .await;
                None
            }
        }
    }
}

fn request_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
