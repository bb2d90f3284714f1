use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

use super::{MessageStore, Result, StoreError};
use crate::server::{ErrorBody, MessageBody};

/// Talks to a remote `/api/message` endpoint.
pub struct HttpMessageStore {
    client: Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct SetResponse {
    success: bool,
}

impl HttpMessageStore {
    pub fn new(endpoint: Url) -> Self {
        Self { client: Client::new(), endpoint }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(StoreError::Status { status: status.as_u16(), message })
    }
}

#[async_trait]
impl MessageStore for HttpMessageStore {
    async fn get(&self) -> Result<String> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let body: MessageBody = Self::check(response).await?.json().await?;
        Ok(body.message)
    }

    async fn set(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&MessageBody { message: message.to_string() })
            .send()
            .await?;
        let body: SetResponse = Self::check(response).await?.json().await?;
        if body.success {
            Ok(())
        } else {
            Err(StoreError::Status { status: 200, message: "write not acknowledged".into() })
        }
    }
}
