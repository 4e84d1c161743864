//! Fragment fetching over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::NavigationConfig;
use crate::protocol::{DynamicMode, DYNAMIC_PARAM, PAGE_PARAM};
use crate::state::{ArchiveQuery, PaginationState};
use crate::{Error, Result};

/// Identifies one navigation request; responses carrying an older id are stale
pub type RequestId = Uuid;

/// A fragment fetch issued by the navigation controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRequest {
    pub request_id: RequestId,
    pub target_page: u32,
    pub query: ArchiveQuery,
    pub mode: DynamicMode,
}

impl FragmentRequest {
    /// Plain page fetch within the current archive
    pub fn new(target_page: u32, query: ArchiveQuery) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            target_page,
            query,
            mode: DynamicMode::Fragment,
        }
    }

    /// Fetch that also asks for fresh pagination state, for a changed query
    pub fn with_state(target_page: u32, query: ArchiveQuery) -> Self {
        Self {
            mode: DynamicMode::Init,
            ..Self::new(target_page, query)
        }
    }
}

/// A fetched fragment, split into listing markup and optional embedded state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub html: String,
    pub state: Option<PaginationState>,
}

impl Fragment {
    pub fn parse(body: &str) -> Result<Self> {
        let state = PaginationState::from_bootstrap_html(body)?;
        let html = if state.is_some() {
            PaginationState::strip_bootstrap(body)
        } else {
            body.to_string()
        };
        Ok(Self { html, state })
    }
}

#[async_trait]
pub trait FragmentFetcher: Send + Sync {
    /// Listing fragment for one page
    async fn fetch(&self, request: &FragmentRequest) -> Result<Fragment>;

    /// First page plus bootstrap state, used once when the archive is entered
    async fn fetch_bootstrap(&self, query: &ArchiveQuery, page: u32) -> Result<Fragment>;
}

pub struct HttpFragmentClient {
    client: Client,
    archive_url: Url,
    timeout: Option<Duration>,
}

impl HttpFragmentClient {
    pub fn new(config: &NavigationConfig) -> Result<Self> {
        let archive_url = Url::parse(&config.archive_url)?;
        let timeout = (config.request_timeout_secs > 0)
            .then(|| Duration::from_secs(config.request_timeout_secs));

        let mut builder = Client::builder()
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            archive_url,
            timeout,
        })
    }

    pub fn archive_url(&self) -> &Url {
        &self.archive_url
    }

    /// Archive URL carrying the filter terms, page and fragment flag
    pub fn fragment_url(&self, query: &ArchiveQuery, page: u32, mode: DynamicMode) -> Url {
        let mut url = self.archive_url.clone();
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                if key != DYNAMIC_PARAM && key != PAGE_PARAM {
                    pairs.append_pair(key, value);
                }
            }
            pairs.append_pair(PAGE_PARAM, &page.to_string());
            pairs.append_pair(DYNAMIC_PARAM, mode.as_value());
        }
        url
    }

    async fn get(&self, url: Url) -> Result<String> {
        debug!("Fetching fragment {}", url);
        let response = self.client.get(url).send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchStatus(status.as_u16()));
        }
        response.text().await.map_err(|e| self.map_error(e))
    }

    fn map_error(&self, e: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if e.is_timeout() => Error::Timeout(timeout.as_millis() as u64),
            _ => Error::Http(e),
        }
    }
}

#[async_trait]
impl FragmentFetcher for HttpFragmentClient {
    async fn fetch(&self, request: &FragmentRequest) -> Result<Fragment> {
        let url = self.fragment_url(&request.query, request.target_page, request.mode);
        Fragment::parse(&self.get(url).await?)
    }

    async fn fetch_bootstrap(&self, query: &ArchiveQuery, page: u32) -> Result<Fragment> {
        let url = self.fragment_url(query, page, DynamicMode::Init);
        let fragment = Fragment::parse(&self.get(url).await?)?;
        if fragment.state.is_none() {
            return Err(Error::MissingBootstrap);
        }
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> HttpFragmentClient {
        let config = NavigationConfig {
            archive_url: url.to_string(),
            ..Default::default()
        };
        HttpFragmentClient::new(&config).unwrap()
    }

    #[test]
    fn test_fragment_url_carries_terms_and_flag() {
        let client = client("http://example.test/blog/?page=7");
        let mut query = ArchiveQuery::new();
        query.insert("s".into(), "hello world".into());
        query.insert("dynamic".into(), "init".into());

        let url = client.fragment_url(&query, 3, DynamicMode::Fragment);
        assert_eq!(
            url.as_str(),
            "http://example.test/blog/?s=hello+world&page=3&dynamic=1"
        );

        let url = client.fragment_url(&ArchiveQuery::new(), 1, DynamicMode::Init);
        assert_eq!(url.as_str(), "http://example.test/blog/?page=1&dynamic=init");
    }

    #[test]
    fn test_invalid_archive_url() {
        let config = NavigationConfig {
            archive_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpFragmentClient::new(&config),
            Err(Error::UrlParse(_))
        ));
    }

    #[test]
    fn test_fragment_parse_splits_bootstrap() {
        let state = PaginationState::new(1, 2, ArchiveQuery::new(), vec!["a".into(), "b".into()])
            .unwrap();
        let body = format!("<p>x</p>{}", state.to_bootstrap_script().unwrap());

        let fragment = Fragment::parse(&body).unwrap();
        assert_eq!(fragment.html, "<p>x</p>");
        assert_eq!(fragment.state, Some(state));

        let plain = Fragment::parse("<p>y</p>").unwrap();
        assert_eq!(plain.html, "<p>y</p>");
        assert!(plain.state.is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = FragmentRequest::new(2, ArchiveQuery::new());
        let b = FragmentRequest::new(2, ArchiveQuery::new());
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.mode, DynamicMode::Fragment);
        assert_eq!(FragmentRequest::with_state(1, ArchiveQuery::new()).mode, DynamicMode::Init);
    }
}
