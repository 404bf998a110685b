use std::time::Duration;

use reqwest::Url;
use tracing::{debug, instrument, warn};

use super::normalize::normalize;
use super::types::{Certificate, FieldWarning, LookupResult, RawCertificate};
use crate::error::{CrtShError, Result};
use crate::validation::validate_query_domain;

pub const DEFAULT_BASE_URL: &str = "https://crt.sh";
pub const DEFAULT_USER_AGENT: &str = "Mozilla";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Certificates and field warnings from a successful lookup
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub certificates: Vec<Certificate>,
    pub warnings: Vec<FieldWarning>,
}

/// Client for the crt.sh certificate-transparency search
#[derive(Debug, Clone)]
pub struct CrtShClient {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    system_proxy: bool,
}

impl Default for CrtShClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CrtShClient {
    /// Create a new CrtShClient with default settings
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            system_proxy: true,
        }
    }

    /// Set the timeout for the whole request/response round trip
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the client at another crt.sh-compatible endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` and connect directly
    pub fn without_system_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the search URL, e.g. `https://crt.sh/?q=%25.example.com&output=json`
    pub fn query_url(&self, domain: &str) -> Result<Url> {
        let base = format!("{}/", self.base_url);
        let query = format!("%.{}", domain);

        Url::parse_with_params(&base, &[("q", query.as_str()), ("output", "json")])
            .map_err(|e| CrtShError::RequestBuild(format!("{}: {}", base, e)))
    }

    /// Look up certificates for a domain, folding any failure into the result
    pub async fn lookup(&self, domain: &str) -> LookupResult {
        let result = LookupResult::new(domain, self.timeout);

        match self.fetch(domain).await {
            Ok(normalized) => LookupResult {
                certificates: normalized.certificates,
                warnings: normalized.warnings,
                ..result
            },
            Err(e) => {
                warn!(domain = %domain, error = %e, "crt.sh lookup failed");
                result.fail(e.detailed_message())
            }
        }
    }

    /// Look up certificates for a domain
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn fetch(&self, domain: &str) -> Result<Normalized> {
        let domain = validate_query_domain(domain)?;
        let url = self.query_url(&domain)?;

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if !self.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| CrtShError::RequestBuild(e.to_string()))?;

        debug!(url = %url, "Querying crt.sh");

        let response = client
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrtShError::HttpStatus(status));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                CrtShError::BodyRead(e)
            }
        })?;

        let raw: Vec<RawCertificate> = serde_json::from_slice(&body)?;
        let (certificates, warnings) = normalize(raw);

        debug!(
            certificates = certificates.len(),
            skipped_timestamps = warnings.len(),
            "crt.sh response normalized"
        );

        Ok(Normalized {
            certificates,
            warnings,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> CrtShError {
        if e.is_timeout() {
            self.timeout_error()
        } else if e.is_builder() {
            CrtShError::RequestBuild(e.to_string())
        } else {
            CrtShError::Transport(e)
        }
    }

    fn timeout_error(&self) -> CrtShError {
        CrtShError::Timeout(format!(
            "crt.sh did not respond within {:?}",
            self.timeout
        ))
    }
}

/// Look up certificates for `domain` with a timeout in whole seconds
pub async fn get(domain: &str, timeout_secs: u64) -> LookupResult {
    CrtShClient::new()
        .with_timeout(Duration::from_secs(timeout_secs))
        .lookup(domain)
        .await
}

/// Blocking form of [`get`] for synchronous callers
///
/// Drives its own single-threaded runtime. Called from within an async
/// context it returns a failed result instead of blocking the runtime.
pub fn get_blocking(domain: &str, timeout_secs: u64) -> LookupResult {
    if tokio::runtime::Handle::try_current().is_ok() {
        return LookupResult::new(domain, Duration::from_secs(timeout_secs)).fail(
            CrtShError::Runtime(
                "get_blocking called from within an async runtime; use get instead".to_string(),
            )
            .to_string(),
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build();

    match runtime {
        Ok(rt) => rt.block_on(get(domain, timeout_secs)),
        Err(e) => LookupResult::new(domain, Duration::from_secs(timeout_secs))
            .fail(CrtShError::Runtime(e.to_string()).to_string()),
    }
}
