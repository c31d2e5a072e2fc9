//! Portal login session.
//!
//! The portal authenticates with a cookie obtained from its login form.
//! Whether a session is still alive can only be told by requesting a
//! protected page: an expired session is redirected to the login page.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::cookie::Jar;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::request::{Endpoint, PortalUrls};

/// Portal account credentials.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// An authenticated session: an HTTP client with its own cookie jar.
///
/// Sessions are never patched; a re-login builds a new one.
struct Session {
    http: reqwest::Client,
    /// Last time the portal accepted this session
    validated: Instant,
}

/// Owns the session and keeps it valid.
///
/// Only the request serializer holds a `SessionManager`, so the session
/// needs no locking.
pub(crate) struct SessionManager {
    credentials: Credentials,
    urls: PortalUrls,
    timeout: Duration,
    max_age: Duration,
    session: Session,
    last_endpoint: Option<Endpoint>,
}

impl SessionManager {
    /// Log in and return a manager holding the fresh session.
    pub(crate) async fn login(
        credentials: Credentials,
        urls: PortalUrls,
        timeout: Duration,
        max_age: Duration,
    ) -> Result<Self, AuthError> {
        let session = establish(&credentials, &urls, timeout).await?;

        Ok(Self {
            credentials,
            urls,
            timeout,
            max_age,
            session,
            last_endpoint: None,
        })
    }

    /// HTTP client carrying the current session cookies.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.session.http
    }

    pub(crate) fn url(&self, endpoint: Endpoint) -> &Url {
        self.urls.get(endpoint)
    }

    /// Make sure the session is usable for `target`.
    ///
    /// The session is probed when the target differs from the previous one,
    /// when the portal has been idle for longer than the maximum session
    /// age, or when the session was last validated longer ago than that.
    /// A failed probe triggers a full re-login.
    ///
    /// Returns whether any request was sent to the portal.
    pub(crate) async fn ensure_valid(
        &mut self,
        target: Endpoint,
        idle: Duration,
    ) -> Result<bool, AuthError> {
        let endpoint_changed = self.last_endpoint != Some(target);
        let session_age = self.session.validated.elapsed();
        if !endpoint_changed && idle <= self.max_age && session_age <= self.max_age {
            return Ok(false);
        }

        debug!(
            ?target,
            endpoint_changed,
            idle_secs = idle.as_secs(),
            session_age_secs = session_age.as_secs(),
            "checking portal session"
        );

        let url = self.urls.get(target);
        match probe(&self.session.http, url).await? {
            Ok(()) => self.session.validated = Instant::now(),
            Err(landed) => {
                info!(%landed, "portal session expired, logging in again");
                self.session = establish(&self.credentials, &self.urls, self.timeout)
                    .await
                    .inspect_err(|e| warn!(error = %e, "re-login failed"))?;
            }
        }

        self.last_endpoint = Some(target);
        Ok(true)
    }
}

/// Log in with a fresh cookie jar.
async fn establish(
    credentials: &Credentials,
    urls: &PortalUrls,
    timeout: Duration,
) -> Result<Session, AuthError> {
    info!(username = credentials.username(), "logging in to portal");

    let http = reqwest::Client::builder()
        .cookie_provider(Arc::new(Jar::default()))
        .timeout(timeout)
        .build()?;

    // Any request to the login page hands out an anonymous session cookie
    http.get(urls.get(Endpoint::Login).clone()).send().await?;

    let validation = http
        .post(urls.get(Endpoint::Login).clone())
        .form(&[
            ("jmeno", credentials.username.as_str()),
            ("heslo", credentials.password.as_str()),
        ])
        .send()
        .await?;

    let status = validation.status();
    if !status.is_success() {
        return Err(AuthError::Status {
            status: status.as_u16(),
        });
    }

    let expected = urls.get(Endpoint::Locomotive);
    if let Err(landed) = probe(&http, expected).await? {
        return Err(AuthError::Rejected {
            expected: expected.to_string(),
            landed: landed.to_string(),
        });
    }

    debug!("logged in to portal");
    Ok(Session {
        http,
        validated: Instant::now(),
    })
}

/// Open a protected page; `Err` carries the URL we were sent to instead.
async fn probe(http: &reqwest::Client, page: &Url) -> Result<Result<(), Url>, AuthError> {
    debug!(%page, "probing portal session");
    let response = http.get(page.clone()).send().await?;
    let landed = response.url();

    if landed == page {
        Ok(Ok(()))
    } else {
        Ok(Err(landed.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COOKIE: &str = "ASP.NET_SessionId=abc123";

    async fn mount_login(server: &MockServer, login_posts: u64) {
        Mock::given(method("GET"))
            .and(path("/Login/Login"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", format!("{COOKIE}; Path=/")),
            )
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/Login/Login"))
            .and(body_string_contains("jmeno=user"))
            .and(body_string_contains("heslo=secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(login_posts)
            .mount(server)
            .await;
    }

    async fn mount_protected(server: &MockServer, page: &str) {
        Mock::given(method("GET"))
            .and(path(page))
            .and(header("cookie", COOKIE))
            .respond_with(ResponseTemplate::new(200).set_body_string("dotaz"))
            .mount(server)
            .await;
    }

    async fn mount_redirect_to_login(server: &MockServer, page: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/Login/Login"))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(server)
            .await;
    }

    fn credentials() -> Credentials {
        Credentials::new("user", "secret")
    }

    async fn manager(server: &MockServer) -> Result<SessionManager, AuthError> {
        manager_with_max_age(server, Duration::from_secs(3600)).await
    }

    async fn manager_with_max_age(
        server: &MockServer,
        max_age: Duration,
    ) -> Result<SessionManager, AuthError> {
        let urls = PortalUrls::new(&server.uri()).unwrap();
        SessionManager::login(credentials(), urls, Duration::from_secs(5), max_age).await
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn login_then_probe_succeeds() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        mount_protected(&server, "/Dotazy/D1320").await;

        let manager = manager(&server).await.unwrap();
        let page = manager.url(Endpoint::Locomotive).clone();
        let probed = probe(manager.http(), &page).await.unwrap();
        assert!(probed.is_ok());
    }

    #[tokio::test]
    async fn redirect_to_login_is_rejected() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        mount_redirect_to_login(&server, "/Dotazy/D1320", 10).await;

        let err = manager(&server).await.err().unwrap();
        match err {
            AuthError::Rejected { expected, landed } => {
                assert!(expected.ends_with("/Dotazy/D1320"));
                assert!(landed.ends_with("/Login/Login"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Login/Login"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Login/Login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = manager(&server).await.err().unwrap();
        assert!(matches!(err, AuthError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn same_endpoint_skips_probe() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/Dotazy/D1320"))
            .respond_with(ResponseTemplate::new(200))
            // one probe at login, one on first use
            .expect(2)
            .mount(&server)
            .await;

        let mut manager = manager(&server).await.unwrap();
        manager
            .ensure_valid(Endpoint::Locomotive, Duration::ZERO)
            .await
            .unwrap();
        manager
            .ensure_valid(Endpoint::Locomotive, Duration::from_secs(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn long_idle_forces_probe() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/Dotazy/D1320"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let mut manager = manager(&server).await.unwrap();
        manager
            .ensure_valid(Endpoint::Locomotive, Duration::ZERO)
            .await
            .unwrap();
        manager
            .ensure_valid(Endpoint::Locomotive, Duration::from_secs(3601))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn busy_session_is_revalidated_after_max_age() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/Dotazy/D1320"))
            .respond_with(ResponseTemplate::new(200))
            // login, first use, and once the session outlives its max age
            .expect(3)
            .mount(&server)
            .await;

        let mut manager = manager_with_max_age(&server, Duration::from_millis(250))
            .await
            .unwrap();
        assert!(
            manager
                .ensure_valid(Endpoint::Locomotive, Duration::ZERO)
                .await
                .unwrap()
        );

        // never idle for long, but the session keeps ageing
        let mut probes = 0;
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if manager
                .ensure_valid(Endpoint::Locomotive, Duration::from_millis(100))
                .await
                .unwrap()
            {
                probes += 1;
            }
        }
        assert_eq!(probes, 1);
    }

    #[tokio::test]
    async fn expired_session_logs_in_again() {
        let server = MockServer::start().await;
        mount_login(&server, 2).await;
        mount_protected(&server, "/Dotazy/D1320").await;
        mount_protected(&server, "/Dotazy/D2040").await;
        mount_redirect_to_login(&server, "/Dotazy/D2040", 1).await;

        let mut manager = manager(&server).await.unwrap();
        manager
            .ensure_valid(Endpoint::Train, Duration::ZERO)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_relogin_is_auth_error() {
        let server = MockServer::start().await;
        mount_login(&server, 2).await;
        // accepted once at login, redirected afterwards
        Mock::given(method("GET"))
            .and(path("/Dotazy/D1320"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        mount_redirect_to_login(&server, "/Dotazy/D1320", 10).await;

        let mut manager = manager(&server).await.unwrap();
        let err = manager
            .ensure_valid(Endpoint::Locomotive, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Rejected { .. }));
    }
}
