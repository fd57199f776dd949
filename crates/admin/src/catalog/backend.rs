//! Products API transport.
//!
//! [`ProductsApi`] is the seam between the cached catalog and the network.
//! [`HttpProductsApi`] talks to the REST backend with `reqwest`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use teslo_core::{ImageFile, ListQuery, Product, ProductPayload, ProductsResponse};

use super::CatalogError;
use crate::config::CatalogConfig;

/// Raw, uncached access to the products API.
#[async_trait]
pub trait ProductsApi: Send + Sync + 'static {
    /// `GET /products?limit&offset&gender`
    async fn list_products(&self, query: &ListQuery) -> Result<ProductsResponse, CatalogError>;

    /// `GET /products/{idOrSlug}`
    async fn get_product(&self, id_or_slug: &str) -> Result<Product, CatalogError>;

    /// `POST /products`
    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, CatalogError>;

    /// `PATCH /products/{id}`
    async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<Product, CatalogError>;

    /// `POST /files/product`, returning the stored file name.
    async fn upload_image(&self, file: &ImageFile) -> Result<String, CatalogError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_name: String,
}

/// [`ProductsApi`] over HTTP.
#[derive(Clone)]
pub struct HttpProductsApi {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<SecretString>,
}

impl HttpProductsApi {
    /// Create a client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode a JSON body from a success response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, CatalogError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Products API returned non-success status"
            );
            return Err(CatalogError::Status {
                status,
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse products API response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl ProductsApi for HttpProductsApi {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn list_products(&self, query: &ListQuery) -> Result<ProductsResponse, CatalogError> {
        let request = self
            .client
            .get(self.url("/products"))
            .query(&query.to_query_pairs());
        self.execute(request, &format!("products {query}")).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id_or_slug: &str) -> Result<Product, CatalogError> {
        let request = self.client.get(self.url(&format!("/products/{id_or_slug}")));
        self.execute(request, &format!("product {id_or_slug}")).await
    }

    #[instrument(skip(self, payload))]
    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, CatalogError> {
        let request = self.client.post(self.url("/products")).json(payload);
        self.execute(request, "products endpoint").await
    }

    #[instrument(skip(self, payload))]
    async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<Product, CatalogError> {
        let request = self
            .client
            .patch(self.url(&format!("/products/{id}")))
            .json(payload);
        self.execute(request, &format!("product {id}")).await
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    async fn upload_image(&self, file: &ImageFile) -> Result<String, CatalogError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let request = self
            .client
            .post(self.url("/files/product"))
            .multipart(form);
        let response: UploadResponse = self.execute(request, "files endpoint").await?;

        Ok(response.file_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = CatalogConfig::new("http://localhost:3000/api/").unwrap();
        let api = HttpProductsApi::new(&config).unwrap();
        assert_eq!(
            api.url("/products/abc"),
            "http://localhost:3000/api/products/abc"
        );
    }

    #[test]
    fn test_upload_response_field_name() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"fileName":"a1b2.jpg","secureUrl":"http://x/a1b2.jpg"}"#)
                .unwrap();
        assert_eq!(response.file_name, "a1b2.jpg");
    }
}
