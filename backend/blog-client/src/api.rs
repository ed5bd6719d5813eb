//! Remote calls against the blog API

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{Comment, DeletionReceipt, Post};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

/// Operations the client performs against the server.
///
/// Mutating calls take the session token explicitly.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn get_post(&self, post_id: Uuid) -> Result<Post>;

    async fn create_post(&self, token: &str, title: &str, body: &str) -> Result<Post>;

    async fn edit_post(
        &self,
        token: &str,
        post_id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Post>;

    async fn delete_post(&self, token: &str, post_id: Uuid) -> Result<DeletionReceipt>;

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    async fn create_comment(&self, token: &str, post_id: Uuid, body: &str) -> Result<Comment>;

    async fn update_comment(&self, token: &str, comment_id: Uuid, body: &str) -> Result<Comment>;

    async fn delete_comment(&self, token: &str, comment_id: Uuid) -> Result<()>;

    async fn purge_comments(&self, token: &str, post_id: Uuid) -> Result<DeletionReceipt>;
}

/// [`BlogApi`] over HTTP
pub struct HttpBlogApi {
    client: Client,
    base_url: String,
    token_header: String,
}

impl HttpBlogApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_header: config.token_header,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(self.token_header.as_str(), token)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "blog API request failed");
            ClientError::from(e)
        })?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "blog API rejected request");
        return Err(ClientError::rejected(status.as_u16(), &body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl BlogApi for HttpBlogApi {
    async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.send(self.client.get(self.url(&format!("/posts/{}", post_id))))
            .await
    }

    async fn create_post(&self, token: &str, title: &str, body: &str) -> Result<Post> {
        let req = self
            .client
            .post(self.url("/posts"))
            .json(&json!({ "title": title, "body": body }));
        self.send(self.authed(req, token)).await
    }

    async fn edit_post(
        &self,
        token: &str,
        post_id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Post> {
        let req = self
            .client
            .put(self.url(&format!("/posts/{}", post_id)))
            .json(&json!({ "title": title, "body": body }));
        self.send(self.authed(req, token)).await
    }

    async fn delete_post(&self, token: &str, post_id: Uuid) -> Result<DeletionReceipt> {
        let req = self.client.delete(self.url(&format!("/posts/{}", post_id)));
        self.send(self.authed(req, token)).await
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.send(
            self.client
                .get(self.url(&format!("/posts/{}/comments", post_id))),
        )
        .await
    }

    async fn create_comment(&self, token: &str, post_id: Uuid, body: &str) -> Result<Comment> {
        let req = self
            .client
            .post(self.url(&format!("/posts/{}/comments", post_id)))
            .json(&json!({ "body": body }));
        self.send(self.authed(req, token)).await
    }

    async fn update_comment(&self, token: &str, comment_id: Uuid, body: &str) -> Result<Comment> {
        let req = self
            .client
            .put(self.url(&format!("/comments/{}", comment_id)))
            .json(&json!({ "body": body }));
        self.send(self.authed(req, token)).await
    }

    async fn delete_comment(&self, token: &str, comment_id: Uuid) -> Result<()> {
        let req = self
            .client
            .delete(self.url(&format!("/comments/{}", comment_id)));
        let _: serde_json::Value = self.send(self.authed(req, token)).await?;
        Ok(())
    }

    async fn purge_comments(&self, token: &str, post_id: Uuid) -> Result<DeletionReceipt> {
        let req = self
            .client
            .delete(self.url(&format!("/posts/{}/comments", post_id)));
        self.send(self.authed(req, token)).await
    }
}
