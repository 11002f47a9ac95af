use crate::{RegistryBackend, RemoteConfig, RemoteError, USER_AGENT};
use std::io::Read;
use std::time::Duration;

/// HTTP registry backend.
///
/// Expects a static file layout under the configured base URL:
/// - `GET /registry.json`: the manifest
/// - `GET /<file name>`: one component file body
///
/// Every request is bounded by `RemoteConfig::timeout_secs`.
pub struct HttpBackend {
    config: RemoteConfig,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(config: RemoteConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .build()
            .into();
        Self { config, agent }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn manifest_url(&self) -> String {
        format!("{}/registry.json", self.config.url)
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/{}", self.config.url, name.trim_start_matches('/'))
    }

    fn do_get(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let mut req = self.agent.get(url).header("User-Agent", USER_AGENT);
        if let Some(ref token) = self.config.auth_token {
            req = req.header("Authorization", &format!("Bearer {token}"));
        }
        let resp = match req.call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(RemoteError::NotFound(url.to_owned()));
            }
            Err(ureq::Error::StatusCode(code)) => {
                return Err(RemoteError::Http(format!("HTTP {code} for {url}")));
            }
            Err(e) => {
                return Err(RemoteError::Http(format!("{url}: {e}")));
            }
        };

        let code = resp.status().as_u16();
        if code == 404 {
            return Err(RemoteError::NotFound(url.to_owned()));
        }
        if !(200..300).contains(&code) {
            return Err(RemoteError::Http(format!("HTTP {code} for {url}")));
        }

        let mut reader = resp.into_body().into_reader();
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .map_err(|e| RemoteError::Http(format!("{url}: {e}")))?;
        Ok(body)
    }
}

impl RegistryBackend for HttpBackend {
    fn get_manifest(&self) -> Result<Vec<u8>, RemoteError> {
        let url = self.manifest_url();
        tracing::debug!("GET {url}");
        self.do_get(&url)
    }

    fn get_file(&self, name: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.file_url(name);
        tracing::debug!("GET {url}");
        self.do_get(&url)
    }
}
