use url::Url;

use super::cookies::CookiePolicy;
use crate::error::Error;

/// Cookie names of the three session credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CredentialNames {
    pub(crate) access: String,
    pub(crate) refresh: String,
    pub(crate) csrf: String,
}

impl Default for CredentialNames {
    fn default() -> Self {
        Self {
            access: "access".into(),
            refresh: "refresh".into(),
            csrf: "csrftoken".into(),
        }
    }
}

/// Gateway configuration, fixed at construction.
///
/// Required field (`base_url`) is a constructor parameter. Everything else has
/// a default matching the Gas World backend and can be overridden with the
/// `with_*` methods.
///
/// ```rust,ignore
/// use gas_world_client::GatewayConfig;
///
/// let config = GatewayConfig::new("http://127.0.0.1:8000/api/v1/".parse()?)
///     .with_login_route("/signin")
///     .with_coalesced_refresh(false);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    pub(crate) base_url: Url,
    pub(crate) with_credentials: bool,
    pub(crate) refresh_path: String,
    pub(crate) logout_path: String,
    pub(crate) login_route: String,
    pub(crate) csrf_header: String,
    pub(crate) names: CredentialNames,
    pub(crate) access_policy: CookiePolicy,
    pub(crate) refresh_policy: CookiePolicy,
    pub(crate) coalesce_refresh: bool,
}

impl GatewayConfig {
    /// Create a configuration for the backend rooted at `base_url`.
    ///
    /// The base is normalised to end with `/` so relative paths resolve
    /// under the versioned API prefix.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: normalize_base(base_url),
            with_credentials: true,
            refresh_path: "token/refresh/".into(),
            logout_path: "logout/".into(),
            login_route: "/login".into(),
            csrf_header: "X-CSRFToken".into(),
            names: CredentialNames::default(),
            access_policy: CookiePolicy::access_default(),
            refresh_policy: CookiePolicy::refresh_default(),
            coalesce_refresh: true,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `GAS_API_BASE_URL`: backend origin plus API prefix
    ///
    /// # Optional env vars
    /// - `GAS_API_WITH_CREDENTIALS`: keep server cookies between requests (default `true`)
    /// - `GAS_API_REFRESH_PATH`: token refresh endpoint
    /// - `GAS_API_LOGOUT_PATH`: logout endpoint
    /// - `GAS_API_LOGIN_ROUTE`: route navigated to when the session cannot be renewed
    /// - `GAS_API_SECURE_COOKIES`: mark stored tokens `Secure`
    /// - `GAS_API_COALESCE_REFRESH`: share one refresh between concurrent 401s
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is missing or invalid, or a
    /// boolean variable holds something other than `1`/`0`/`true`/`false`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base = lookup("GAS_API_BASE_URL")
            .ok_or_else(|| Error::Config("GAS_API_BASE_URL is required".into()))?;
        let base_url: Url = base
            .parse()
            .map_err(|e| Error::Config(format!("GAS_API_BASE_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Some(v) = lookup("GAS_API_WITH_CREDENTIALS") {
            config = config.with_credentials(parse_flag("GAS_API_WITH_CREDENTIALS", &v)?);
        }
        if let Some(path) = lookup("GAS_API_REFRESH_PATH") {
            config = config.with_refresh_path(path);
        }
        if let Some(path) = lookup("GAS_API_LOGOUT_PATH") {
            config = config.with_logout_path(path);
        }
        if let Some(route) = lookup("GAS_API_LOGIN_ROUTE") {
            config = config.with_login_route(route);
        }
        if let Some(v) = lookup("GAS_API_SECURE_COOKIES") {
            config = config.with_secure_cookies(parse_flag("GAS_API_SECURE_COOKIES", &v)?);
        }
        if let Some(v) = lookup("GAS_API_COALESCE_REFRESH") {
            config = config.with_coalesced_refresh(parse_flag("GAS_API_COALESCE_REFRESH", &v)?);
        }

        Ok(config)
    }

    /// Share cookies set by the backend across requests (`withCredentials`).
    #[must_use]
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    #[must_use]
    pub fn with_csrf_header(mut self, header: impl Into<String>) -> Self {
        self.csrf_header = header.into();
        self
    }

    /// Override the cookie names of the access, refresh and anti-forgery tokens.
    #[must_use]
    pub fn with_cookie_names(
        mut self,
        access: impl Into<String>,
        refresh: impl Into<String>,
        csrf: impl Into<String>,
    ) -> Self {
        self.names = CredentialNames {
            access: access.into(),
            refresh: refresh.into(),
            csrf: csrf.into(),
        };
        self
    }

    #[must_use]
    pub fn with_access_policy(mut self, policy: CookiePolicy) -> Self {
        self.access_policy = policy;
        self
    }

    #[must_use]
    pub fn with_refresh_policy(mut self, policy: CookiePolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Set the `Secure` attribute on both stored tokens.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.access_policy.secure = secure;
        self.refresh_policy.secure = secure;
        self
    }

    /// Let concurrent 401s share one in-flight refresh (default `true`).
    ///
    /// With `false`, every failing request refreshes on its own.
    #[must_use]
    pub fn with_coalesced_refresh(mut self, enabled: bool) -> Self {
        self.coalesce_refresh = enabled;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    #[must_use]
    pub fn csrf_header(&self) -> &str {
        &self.csrf_header
    }

    #[must_use]
    pub fn access_cookie_name(&self) -> &str {
        &self.names.access
    }

    #[must_use]
    pub fn refresh_cookie_name(&self) -> &str {
        &self.names.refresh
    }

    #[must_use]
    pub fn csrf_cookie_name(&self) -> &str {
        &self.names.csrf
    }

    /// Resolve `path` against the base URL. A leading `/` is ignored.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(Error::Config(format!(
            "{key}: expected 1/0/true/false, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base() -> Url {
        "http://127.0.0.1:8000/api/v1".parse().unwrap()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = GatewayConfig::new(base());
        assert_eq!(config.base_url().as_str(), "http://127.0.0.1:8000/api/v1/");
    }

    #[test]
    fn endpoint_keeps_api_prefix_for_absolute_paths() {
        let config = GatewayConfig::new(base());
        assert_eq!(
            config.endpoint("/stations").unwrap().as_str(),
            "http://127.0.0.1:8000/api/v1/stations"
        );
        assert_eq!(
            config.endpoint("manager/5/change_password").unwrap().as_str(),
            "http://127.0.0.1:8000/api/v1/manager/5/change_password"
        );
    }

    #[test]
    fn defaults_match_backend() {
        let config = GatewayConfig::new(base());
        assert!(config.with_credentials);
        assert!(config.coalesce_refresh);
        assert_eq!(config.refresh_path(), "token/refresh/");
        assert_eq!(config.login_route(), "/login");
        assert_eq!(config.csrf_header(), "X-CSRFToken");
        assert_eq!(config.access_cookie_name(), "access");
        assert_eq!(config.refresh_cookie_name(), "refresh");
        assert_eq!(config.csrf_cookie_name(), "csrftoken");
    }

    #[test]
    fn secure_cookies_applies_to_both_tokens() {
        let config = GatewayConfig::new(base()).with_secure_cookies(true);
        assert!(config.access_policy.secure);
        assert!(config.refresh_policy.secure);
    }

    #[test]
    fn from_lookup_requires_base_url() {
        let err = GatewayConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("GAS_API_BASE_URL")));
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GAS_API_BASE_URL", "https://gas.example.com/api/v1/"),
            ("GAS_API_LOGIN_ROUTE", "/signin"),
            ("GAS_API_COALESCE_REFRESH", "false"),
            ("GAS_API_WITH_CREDENTIALS", "0"),
        ]);
        let config =
            GatewayConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.base_url().host_str(), Some("gas.example.com"));
        assert_eq!(config.login_route(), "/signin");
        assert!(!config.coalesce_refresh);
        assert!(!config.with_credentials);
    }

    #[test]
    fn from_lookup_rejects_bad_flag() {
        let err = GatewayConfig::from_lookup(|k| match k {
            "GAS_API_BASE_URL" => Some("http://localhost/api/v1/".into()),
            "GAS_API_SECURE_COOKIES" => Some("yes".into()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("GAS_API_SECURE_COOKIES")));
    }
}
