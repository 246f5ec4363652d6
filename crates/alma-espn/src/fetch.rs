//! The [`Fetch`] seam between the pipeline and the network.

use std::time::Duration;

use serde_json::Value;

use crate::{Error, FetchError, Result};

/// Anything that can GET a URL and hand back its JSON body.
///
/// Every request the pipeline makes goes through this trait, so tests can
/// substitute a scripted implementation and count calls per URL.
pub trait Fetch {
  async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
  async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
    (**self).get_json(url).await
  }
}

/// A [`Fetch`] backed by a `reqwest` client with a per-request timeout and
/// a fixed `User-Agent`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(user_agent)
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client })
  }
}

impl Fetch for HttpFetcher {
  async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
    let response = self.client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url:    url.to_string(),
        status: status.as_u16(),
      });
    }
    response
      .json::<Value>()
      .await
      .map_err(|e| FetchError::Decode {
        url:    url.to_string(),
        reason: e.to_string(),
      })
  }
}
