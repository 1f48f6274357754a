use serde::{Deserialize, Serialize};

pub const DEFAULT_API_SOURCE: &str = "VerifyMail API";

/// Subset of the VerifyMail response the classifier relies on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiResponse {
    pub disposable: Option<bool>,
    pub privacy: Option<bool>,
    pub email_provider: Option<String>,
    pub related_domains: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReputationReport {
    pub is_disposable: bool,
    pub is_privacy: bool,
    /// Provider name when reported, [`DEFAULT_API_SOURCE`] otherwise.
    pub source: String,
    pub email_provider: Option<String>,
    pub related_domains: Vec<String>,
}

impl From<ApiResponse> for ReputationReport {
    fn from(body: ApiResponse) -> Self {
        let email_provider = body
            .email_provider
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        Self {
            is_disposable: body.disposable == Some(true),
            is_privacy: body.privacy == Some(true),
            source: email_provider
                .clone()
                .unwrap_or_else(|| DEFAULT_API_SOURCE.to_string()),
            email_provider,
            related_domains: body.related_domains.unwrap_or_default(),
        }
    }
}
