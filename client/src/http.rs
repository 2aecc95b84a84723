use crate::config::{ClientConfig, RouteSet};
use crate::error::{ApiError, ErrorBody};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// HTTP access to the prediction service rooted at one base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
    routes: RouteSet,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = parse_base(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| ApiError::Network {
                url: base.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base,
            routes: config.routes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn routes(&self) -> RouteSet {
        self.routes
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest(format!("base url {} cannot be a base", self.base)))?;
            path.pop_if_empty();
            for seg in segments {
                path.push(seg);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let req = self.http.request(Method::GET, url.clone()).query(query);
        self.send(url, req).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.http.request(Method::POST, url.clone()).json(body);
        self.send(url, req).await
    }

    async fn send<T: DeserializeOwned>(&self, url: Url, req: RequestBuilder) -> Result<T, ApiError> {
        let req = req.build().map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;
        let url = req.url().to_string();
        log::debug!("{} {}", req.method(), url);

        let resp = self
            .http
            .execute(req)
            .await
            .map_err(|source| ApiError::Network {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|source| ApiError::Network {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            let body = ErrorBody::from_text(&text);
            log::warn!("{url} -> HTTP {}: {body}", status.as_u16());
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<T>(&text).map_err(|source| {
            log::warn!("{url} -> malformed body: {source}");
            ApiError::Malformed { url, source }
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidRequest(format!("base url {raw:?}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidRequest(format!(
            "base url {raw:?} must be an http(s) url"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn segments_are_appended_and_encoded() {
        let c = client("http://localhost:8000");
        let url = c.url(&["api", "stocks", "ENEL.MI"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/stocks/ENEL.MI");

        let url = c.url(&["api", "stocks", "A/B C"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/stocks/A%2FB%20C");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let c = client("http://localhost:3000/api/");
        let url = c.url(&["predictions", "latest"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/predictions/latest");
    }

    #[test]
    fn non_http_base_is_rejected() {
        for bad in ["localhost:8000", "ftp://host", "not a url"] {
            let err = ApiClient::new(&ClientConfig::new(bad)).unwrap_err();
            assert!(matches!(err, ApiError::InvalidRequest(_)), "{bad}: {err:?}");
        }
    }
}
