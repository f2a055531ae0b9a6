use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

/// Paths of the backend endpoints.
///
/// Each value is either an absolute URL or a path relative to the base
/// URL of the configuration. Missing keys fall back to the conventional
/// path of the same name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Lists the documents of a topic. `/<document id>` is appended to
    /// fetch the metadata of a single document.
    pub get_topic_document_list: String,
    /// Sends a chat message.
    pub send_message: String,
    /// Creates a support ticket.
    pub create_ticket: String,
    /// Lists the suggested prompts.
    pub get_prompts: String,
    /// Shares a question and its answer.
    pub share_questions_chat: String,
    /// Deletes the stored chat of a document.
    pub delete_chat: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            get_topic_document_list: "/get_topic_document_list".to_owned(),
            send_message: "/send_message".to_owned(),
            create_ticket: "/create_ticket".to_owned(),
            get_prompts: "/get_prompts".to_owned(),
            share_questions_chat: "/share_questions_chat".to_owned(),
            delete_chat: "/delete_chat".to_owned(),
        }
    }
}

impl Endpoints {
    /// Reads the endpoints from the JSON configuration of the web app,
    /// which keeps them under a top-level `endpoints` key.
    pub fn from_app_config(json: &str) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        struct AppConfig {
            #[serde(default)]
            endpoints: Endpoints,
        }

        let config: AppConfig = serde_json::from_str(json)?;
        Ok(config.endpoints)
    }
}

/// Builder for [`HttpBackendConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HttpBackendConfigBuilder {
    base_url: String,
    user_email: Option<String>,
    endpoints: Option<Endpoints>,
}

impl HttpBackendConfigBuilder {
    /// Creates a builder for the backend at `base_url`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            user_email: None,
            endpoints: None,
        }
    }

    /// Sets the email of the signed-in user, sent along with document
    /// lookups and chat deletions.
    #[inline]
    pub fn with_user_email<S: Into<String>>(mut self, user_email: S) -> Self {
        self.user_email = Some(user_email.into());
        self
    }

    /// Sets custom endpoint paths.
    #[inline]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            user_email: self.user_email.unwrap_or_default(),
            endpoints: self.endpoints.unwrap_or_default(),
        }
    }
}

impl Debug for HttpBackendConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackendConfigBuilder")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email.as_deref().map(mask_email))
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Configuration for the HTTP backend.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HttpBackendConfig {
    pub(crate) base_url: String,
    pub(crate) user_email: String,
    pub(crate) endpoints: Endpoints,
}

impl HttpBackendConfig {
    /// Resolves an endpoint against the base URL.
    pub(crate) fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://")
        {
            endpoint.to_owned()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
        }
    }
}

impl Debug for HttpBackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackendConfig")
            .field("base_url", &self.base_url)
            .field("user_email", &mask_email(&self.user_email))
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Keeps the first character of the local part and the domain.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from);
            format!("{}***@{domain}", first.unwrap_or_default())
        }
        None if email.is_empty() => String::new(),
        None => "<redacted>".to_owned(),
    }
}
