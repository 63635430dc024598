use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use super::envelope::{ErrorBody, UploadBody};
use super::{AssetFile, RemoteClient, RemoteError, UploadResult, UploadTarget};
use crate::config::ApiConfig;

/// reqwest-backed client for the CMS REST backend.
pub struct HttpRemote {
    base_url: Url,
    client: Client,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(config: &ApiConfig) -> Result<Self, RemoteError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            token: config.token.clone(),
        })
    }

    /// Append a collection path and optional id to the base URL.
    /// The id always lands in a single, percent-encoded segment.
    fn endpoint(&self, path: &str, id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request, returning the body on 2xx and a decoded `Server` error otherwise.
    async fn execute(&self, req: RequestBuilder) -> Result<Bytes, RemoteError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message: ErrorBody::message_from(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn list(&self, path: &str) -> Result<Vec<Value>, RemoteError> {
        let url = self.endpoint(path, None)?;
        let body = self.execute(self.client.get(url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_by_id(&self, path: &str, id: &str) -> Result<Value, RemoteError> {
        let url = self.endpoint(path, Some(id))?;
        let body = self.execute(self.client.get(url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn create(&self, path: &str, body: Value) -> Result<Value, RemoteError> {
        let url = self.endpoint(path, None)?;
        let body = self.execute(self.client.post(url).json(&body)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn update_partial(
        &self,
        path: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, RemoteError> {
        let url = self.endpoint(path, Some(id))?;
        let body = self.execute(self.client.patch(url).json(&body)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), RemoteError> {
        let url = self.endpoint(path, Some(id))?;
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        target: &UploadTarget,
        file: AssetFile,
    ) -> Result<UploadResult, RemoteError> {
        let url = self.endpoint(target.path(), None)?;

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| RemoteError::InvalidFile(format!("{}: {e}", file.content_type)))?;

        let mut form = Form::new().part("file", part);
        if let UploadTarget::PostImages { post_id } = target {
            form = form.text("postId", post_id.clone());
        }

        let body = self.execute(self.client.post(url).multipart(form)).await?;
        let upload: UploadBody = serde_json::from_slice(&body)?;
        Ok(UploadResult {
            url: upload.into_url(),
        })
    }
}
