use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::ApiError;

pub struct ClinicApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ClinicApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.has_token().then(|| config.api_token.clone()),
        })
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("API token contains invalid header characters, sending anonymously"),
            }
        }

        headers
    }

    fn build(&self, method: Method, path: &str, query: &[(&str, String)], body: Option<Value>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(ApiError::from_status(status.as_u16(), error_text));
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            query: &[(&str, String)], body: Option<Value>)
                            -> Result<T, ApiError>
    where T: DeserializeOwned {
        let response = self.send(self.build(method, path, query, body)).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Same as [`request`](Self::request) but ignores whatever the server sends back.
    pub async fn request_unit(&self, method: Method, path: &str,
                              query: &[(&str, String)], body: Option<Value>)
                              -> Result<(), ApiError> {
        let response = self.send(self.build(method, path, query, body)).await?;
        let _ = response.bytes().await?;
        Ok(())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
