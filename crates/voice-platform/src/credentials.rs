//! Session credential provider.
//!
//! Posts the requested session parameters to the host's session endpoint,
//! which mints an ephemeral client secret with the vendor API key.

use async_trait::async_trait;
use gloo_net::http::Request;

use voice_core::ports::CredentialPort;
use voice_types::{
    AgentError, Result,
    session::{SessionCredential, SessionRequest},
};

pub struct HttpCredentialProvider {
    endpoint: String,
    request: SessionRequest,
}

impl HttpCredentialProvider {
    pub fn new(endpoint: impl Into<String>, request: SessionRequest) -> Self {
        Self {
            endpoint: endpoint.into(),
            request,
        }
    }
}

#[async_trait(?Send)]
impl CredentialPort for HttpCredentialProvider {
    async fn create_session(&self) -> Result<SessionCredential> {
        let response = Request::post(&self.endpoint)
            .json(&self.request)
            .map_err(|e| AgentError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        if !response.ok() {
            log::warn!("Session endpoint returned HTTP {}", response.status());
            return Err(AgentError::Credential(
                "Unable to create realtime session".to_string(),
            ));
        }

        let credential: SessionCredential = response
            .json()
            .await
            .map_err(|e| AgentError::Credential(e.to_string()))?;
        log::info!("Minted realtime session for {}", credential.model);
        Ok(credential)
    }
}
