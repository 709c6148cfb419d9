use crate::models::Company;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the company catalog API
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Parameters of one `GET /companies` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    pub limit: u32,
    pub search: Option<String>,
    pub location: Option<String>,
    pub space_type: Option<String>,
}

impl CatalogQuery {
    /// Query string in the order the listing page sends it
    pub fn to_query_string(&self) -> String {
        let mut query = format!("limit={}", self.limit);

        let params = [
            ("search", &self.search),
            ("location", &self.location),
            ("type", &self.space_type),
        ];
        for (name, value) in params {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push_str(&format!("&{}={}", name, urlencoding::encode(value)));
            }
        }

        query
    }
}

/// Company catalog API client
///
/// The catalog owns the company documents; this service only reads them.
pub struct CatalogClient {
    base_url: String,
    page_limit: u32,
    client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(base_url: String, timeout: Duration, page_limit: u32) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            page_limit,
            client,
        })
    }

    /// Build the catalog query for a listing search
    pub fn query(
        &self,
        search: Option<&str>,
        location: Option<&str>,
        space_type: Option<&str>,
    ) -> CatalogQuery {
        CatalogQuery {
            limit: self.page_limit,
            search: search.map(str::to_string),
            location: location.map(str::to_string),
            space_type: space_type.map(str::to_string),
        }
    }

    /// Fetch companies for a query
    ///
    /// Records that fail to decode are skipped rather than failing the page.
    pub async fn fetch_companies(&self, query: &CatalogQuery) -> Result<Vec<Company>, CatalogError> {
        let url = format!(
            "{}/companies?{}",
            self.base_url.trim_end_matches('/'),
            query.to_query_string()
        );

        tracing::debug!("Fetching companies from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Catalog request failed: {} - {}", status, body);
            return Err(CatalogError::ApiError(format!(
                "Failed to fetch companies: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        let documents = match json {
            Value::Array(items) => items,
            Value::Object(mut body) => match body.remove("companies") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(CatalogError::InvalidResponse(
                        "Missing companies array".into(),
                    ))
                }
            },
            _ => {
                return Err(CatalogError::InvalidResponse(
                    "Expected an object or array".into(),
                ))
            }
        };

        let total = documents.len();
        let companies: Vec<Company> = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Company>(doc) {
                Ok(company) => Some(company),
                Err(e) => {
                    tracing::warn!("Skipping undecodable company record: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} companies ({} records)", companies.len(), total);

        Ok(companies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encoding() {
        let query = CatalogQuery {
            limit: 15,
            search: Some("modular kitchen".into()),
            location: Some("Bengaluru".into()),
            space_type: Some("Residential".into()),
        };

        assert_eq!(
            query.to_query_string(),
            "limit=15&search=modular%20kitchen&location=Bengaluru&type=Residential"
        );
    }

    #[test]
    fn test_query_string_skips_empty_params() {
        let query = CatalogQuery {
            limit: 10,
            search: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(query.to_query_string(), "limit=10");
    }

    #[tokio::test]
    async fn test_fetch_companies_from_wrapped_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/companies")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("limit".into(), "15".into()),
                mockito::Matcher::UrlEncoded("type".into(), "Residential".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"companies":[{"_id":"a1","name":"Studio Nine","assured":"true"},{"_id":"b2","name":"Casa"}],"totalPages":1}"#,
            )
            .create_async()
            .await;

        let client = CatalogClient::new(server.url(), Duration::from_secs(5), 15).unwrap();
        let query = client.query(None, None, Some("Residential"));
        let companies = client.fetch_companies(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(companies.len(), 2);
        assert!(companies[0].assured);
        assert_eq!(companies[1].name.as_deref(), Some("Casa"));
    }

    #[tokio::test]
    async fn test_fetch_companies_skips_bad_records() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/companies")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"name":"Good"}, 42]"#)
            .create_async()
            .await;

        let client = CatalogClient::new(server.url(), Duration::from_secs(5), 10).unwrap();
        let companies = client.fetch_companies(&client.query(None, None, None)).await.unwrap();

        assert_eq!(companies.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_companies_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/companies")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = CatalogClient::new(server.url(), Duration::from_secs(5), 10).unwrap();
        let result = client.fetch_companies(&client.query(None, None, None)).await;

        assert!(matches!(result, Err(CatalogError::ApiError(_))));
    }
}
