use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::RequestBuilder;
use tracing::{debug, warn};

use super::base::{AccountBackend, BackendConfig, BackendError, BackendReply};
use crate::auth::{normalize_base_url, UrlEncoding};

/// `AccountBackend` over HTTP. The client keeps no cookies; each call
/// carries only the cookie of the caller it is made for.
pub struct HttpAccountBackend {
    base_url: String,
    encoding: UrlEncoding,
    client: reqwest::Client,
}

impl HttpAccountBackend {
    pub fn new(config: &BackendConfig, encoding: UrlEncoding) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: normalize_base_url(&config.server_url).to_string(),
            encoding,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        request: RequestBuilder,
        cookie: Option<&str>,
    ) -> Result<BackendReply, BackendError> {
        let request = match cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        };
        decode_response(request.send().await?).await
    }

    async fn get(
        &self,
        path_and_query: &str,
        cookie: Option<&str>,
    ) -> Result<BackendReply, BackendError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        self.send(self.client.get(&url), cookie).await
    }
}

/// Non-2xx answers become `BackendError::Status`; anything else must be JSON.
async fn decode_response(response: reqwest::Response) -> Result<BackendReply, BackendError> {
    let status = response.status();
    let url = response.url().path().to_string();
    let set_cookies: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(
            event_name = "backend.response.status",
            event_domain = "backend",
            path = url.as_str(),
            status = status.as_u16(),
            "account backend answered with a non-success status"
        );
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }

    debug!("Account backend answered {} for {}", status, url);
    Ok(BackendReply {
        body: serde_json::from_str(&body)?,
        set_cookies,
    })
}

#[async_trait]
impl AccountBackend for HttpAccountBackend {
    async fn get_account(&self, cookie: Option<&str>) -> Result<BackendReply, BackendError> {
        self.get("/api/get-account", cookie).await
    }

    async fn get_users(
        &self,
        owner: &str,
        cookie: Option<&str>,
    ) -> Result<BackendReply, BackendError> {
        let path = format!("/api/get-users?owner={}", self.encoding.apply(owner));
        self.get(&path, cookie).await
    }

    async fn login(
        &self,
        code: &str,
        state: &str,
        cookie: Option<&str>,
    ) -> Result<BackendReply, BackendError> {
        debug!("Exchanging authorization code for state '{}'", state);
        let path = format!(
            "/api/login?code={}&state={}",
            self.encoding.apply(code),
            self.encoding.apply(state)
        );
        self.get(&path, cookie).await
    }

    async fn logout(&self, cookie: Option<&str>) -> Result<BackendReply, BackendError> {
        let url = format!("{}/api/logout", self.base_url);
        self.send(self.client.post(&url), cookie).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn backend_for(server: &Server, encoding: UrlEncoding) -> HttpAccountBackend {
        HttpAccountBackend::new(
            &BackendConfig {
                server_url: format!("{}/", server.url()),
            },
            encoding,
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn test_get_account() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/get-account")
            .match_header("cookie", "session_id=s1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok", "data": {"name": "alice"}}"#)
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        let account = backend.get_account(Some("session_id=s1")).await.unwrap();
        m.assert_async().await;
        assert_eq!(account.body["data"]["name"], "alice");
        assert!(account.set_cookies.is_empty());
    }

    #[tokio::test]
    async fn test_get_users_sends_owner() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/get-users")
            .match_query(Matcher::UrlEncoded("owner".into(), "org1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "alice"}, {"name": "bob"}]"#)
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        let users = backend.get_users("org1", None).await.unwrap();
        m.assert_async().await;
        assert_eq!(users.body.as_array().map(|u| u.len()), Some(2));
    }

    #[tokio::test]
    async fn test_percent_encoding_of_owner() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/get-users")
            .match_query(Matcher::UrlEncoded("owner".into(), "a&b".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Percent);
        let users = backend.get_users("a&b", None).await.unwrap();
        m.assert_async().await;
        assert_eq!(users.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_percent_encoding_of_code_and_state() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/login")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "a&b+c=d".into()),
                Matcher::UrlEncoded("state".into(), "my app&x".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Percent);
        let result = backend.login("a&b+c=d", "my app&x", None).await.unwrap();
        m.assert_async().await;
        assert_eq!(result.body["status"], "ok");
    }

    #[tokio::test]
    async fn test_login_returns_session_cookies_to_the_caller() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("GET", "/api/login")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "c0de".into()),
                Matcher::UrlEncoded("state".into(), "app1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("set-cookie", "session_id=s3ss10n; Path=/")
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        let result = backend.login("c0de", "app1", None).await.unwrap();
        login.assert_async().await;
        assert_eq!(result.body["status"], "ok");
        assert_eq!(result.set_cookies, vec!["session_id=s3ss10n; Path=/"]);
    }

    #[tokio::test]
    async fn test_session_is_not_kept_between_calls() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("GET", "/api/login")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("set-cookie", "session_id=s3ss10n; Path=/")
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;
        let anonymous = server
            .mock("GET", "/api/get-account")
            .match_header("cookie", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"status": "error", "msg": "Please sign in first"}"#)
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        backend.login("c0de", "app1", None).await.unwrap();
        let result = backend.get_account(None).await.unwrap();
        anonymous.assert_async().await;
        assert_eq!(result.body["status"], "error");
    }

    #[tokio::test]
    async fn test_logout_posts_with_cookie() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/logout")
            .match_header("cookie", "session_id=s1")
            .with_status(200)
            .with_header("set-cookie", "session_id=; Max-Age=0; Path=/")
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        let result = backend.logout(Some("session_id=s1")).await.unwrap();
        m.assert_async().await;
        assert_eq!(result.body["status"], "ok");
        assert_eq!(result.set_cookies.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/get-account")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        let result = backend.get_account(None).await;
        m.assert_async().await;
        match result {
            Err(BackendError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/logout")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let backend = backend_for(&server, UrlEncoding::Raw);
        assert!(matches!(
            backend.logout(None).await,
            Err(BackendError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_request_error() {
        let backend = HttpAccountBackend::new(
            &BackendConfig {
                server_url: "http://127.0.0.1:1".to_string(),
            },
            UrlEncoding::Raw,
        )
        .unwrap();
        assert!(matches!(
            backend.get_account(None).await,
            Err(BackendError::Request(_))
        ));
    }
}
