//! The `reqwest` implementation of [`Transport`].

use super::*;

/// Plain HTTP transport used for PDF downloads.
pub struct HttpTransport {
  /// Internal web client, configured with the user agent, timeout and redirect policy.
  client: reqwest::Client,
}

impl HttpTransport {
  /// Creates a transport configured from `settings`.
  pub fn new(settings: &Settings) -> Result<Self, ScholarError> {
    Ok(Self { client: build_client(settings)? })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get(&self, url: &Url) -> Result<Vec<u8>, ScholarError> {
    debug!("GET {url}");
    let response = self.client.get(url.clone()).send().await?;
    trace!("Response from {}: {} (final url {})", url, response.status(), response.url());
    Ok(response.bytes().await?.to_vec())
  }
}
