use cookie::{Cookie, Expiration, SameSite};
use reqwest::header::{HeaderMap, SET_COOKIE};
use time::{Duration, OffsetDateTime};

/// Expiry and cross-site policy applied when a token is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// `None` keeps the entry until it is removed explicitly.
    pub max_age: Option<Duration>,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookiePolicy {
    /// One day, not secure, `SameSite=Lax`.
    #[must_use]
    pub fn access_default() -> Self {
        Self {
            max_age: Some(Duration::days(1)),
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Seven days, not secure, `SameSite=Lax`.
    #[must_use]
    pub fn refresh_default() -> Self {
        Self {
            max_age: Some(Duration::days(7)),
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

/// Build a credential cookie carrying `value` under `policy`.
pub(crate) fn credential_cookie(name: &str, value: &str, policy: &CookiePolicy) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .secure(policy.secure)
        .same_site(policy.same_site)
        .path("/");
    if let Some(max_age) = policy.max_age {
        builder = builder.max_age(max_age);
    }
    builder.build()
}

/// Replace a relative `Max-Age` with an absolute expiry so the entry keeps
/// its deadline across reloads.
pub(crate) fn pin_expiry(mut cookie: Cookie<'static>, now: OffsetDateTime) -> Cookie<'static> {
    if let Some(max_age) = cookie.max_age() {
        cookie.set_expires(Expiration::DateTime(now + max_age));
        cookie.set_max_age(None);
    }
    cookie
}

pub(crate) fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
}

/// Find the cookie named `name` among the response's `Set-Cookie` headers.
pub(crate) fn find_set_cookie(headers: &HeaderMap, name: &str) -> Option<Cookie<'static>> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw.to_string()).ok())
        .find(|c| c.name() == name)
        .map(Cookie::into_owned)
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn credential_cookie_applies_policy() {
        let cookie = credential_cookie("access", "tok", &CookiePolicy::access_default());
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.max_age(), Some(Duration::days(1)));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn pinned_cookie_has_absolute_expiry() {
        let now = OffsetDateTime::now_utc();
        let cookie = pin_expiry(
            credential_cookie("refresh", "r", &CookiePolicy::refresh_default()),
            now,
        );
        assert_eq!(cookie.max_age(), None);
        assert_eq!(cookie.expires_datetime(), Some(now + Duration::days(7)));
        assert!(!is_expired(&cookie, now));
        assert!(is_expired(&cookie, now + Duration::days(8)));
    }

    #[test]
    fn session_cookie_never_expires() {
        let policy = CookiePolicy {
            max_age: None,
            ..CookiePolicy::access_default()
        };
        let cookie = pin_expiry(credential_cookie("access", "a", &policy), OffsetDateTime::now_utc());
        assert!(!is_expired(&cookie, OffsetDateTime::now_utc() + Duration::days(365)));
    }

    #[test]
    fn finds_named_set_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("sessionid=abc; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("csrftoken=xyz; Max-Age=31449600; Path=/; SameSite=Lax"),
        );

        let cookie = find_set_cookie(&headers, "csrftoken").unwrap();
        assert_eq!(cookie.value(), "xyz");
        assert!(find_set_cookie(&headers, "access").is_none());
    }
}
