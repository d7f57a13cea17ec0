use crate::config::AppConfig;
use crate::event::AppEvent;
use crate::session::SessionStore;
use base64::Engine as _;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::runtime::{Handle, TryCurrentError};

pub mod types;

use types::{
    ApiError, Envelope, GenerationPayload, ImageAnalysis, LoginOk, LoginPayload, PosterArt,
    SloganOk,
};

pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Client for the remote generation service. Every call is dispatched onto
/// the tokio runtime and reports back through the app event channel; the
/// authenticated ones go through `dispatch`, which owns token attachment and
/// the single 401 re-authentication path.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<SessionStore>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
    requires_auth: bool,
}

impl ApiClient {
    pub fn new(
        config: &AppConfig,
        sessions: Arc<SessionStore>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, TryCurrentError> {
        let runtime_handle = Handle::try_current()?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sessions,
            tx,
            runtime_handle,
            requires_auth: config.requires_auth,
        })
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn login(&self, username: String, password: String) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let event = match client.login_call(&username, &password).await {
                Ok(()) => AppEvent::LoginSucceeded,
                Err(ApiError::Application(message)) => AppEvent::LoginRejected(message),
                Err(err) => {
                    log::warn!("login request failed: {err}");
                    AppEvent::LoginUnreachable
                }
            };
            let _ = client.tx.send(event);
        });
    }

    pub fn analyze_image(&self, path: PathBuf) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.analyze_image_call(&path).await;
            let _ = client.tx.send(AppEvent::AnalysisFinished(result));
        });
    }

    pub fn generate_slogan(&self, payload: GenerationPayload) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.slogan_call(&payload).await.map(|ok| ok.slogan);
            let _ = client.tx.send(AppEvent::SloganFinished(result));
        });
    }

    pub fn generate_poster(&self, payload: GenerationPayload) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.poster_call(&payload).await;
            let _ = client.tx.send(AppEvent::PosterFinished(result));
        });
    }

    pub fn download_poster(&self, url: String) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.download_call(&url).await;
            let _ = client.tx.send(AppEvent::DownloadFinished(result));
        });
    }

    /// Logs in against the unauthenticated endpoint (no gateway involved:
    /// there is no token to attach yet) and stores the returned token.
    async fn login_call(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let payload = LoginPayload {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint("/login"))
            .json(&payload)
            .send()
            .await?;
        let ok: LoginOk = read_envelope(response).await?;
        if let Err(err) = self.sessions.set(&ok.token) {
            log::warn!("failed to persist session token: {err}");
        }
        Ok(())
    }

    async fn analyze_image_call(&self, path: &Path) -> Result<ImageAnalysis, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ApiError::Application(format!("could not read {}: {err}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.jpg")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .dispatch(self.http.post(self.endpoint("/analyze-image")).multipart(form))
            .await?;
        read_envelope(response).await
    }

    async fn slogan_call(&self, payload: &GenerationPayload) -> Result<SloganOk, ApiError> {
        let response = self
            .dispatch(self.http.post(self.endpoint("/generate-slogan")).json(payload))
            .await?;
        read_envelope(response).await
    }

    async fn poster_call(&self, payload: &GenerationPayload) -> Result<PosterArt, ApiError> {
        let response = self
            .dispatch(self.http.post(self.endpoint("/generate-poster")).json(payload))
            .await?;
        read_envelope(response).await
    }

    /// The authenticated request gateway. Reads the session store at the
    /// moment of dispatch, attaches the token header unconditionally (empty
    /// when absent), and turns a 401 into the one central re-auth path:
    /// session cleared, login surface re-shown, `ApiError::Auth` to the
    /// caller. Never retries. Degrades to a pass-through when the service
    /// runs unauthenticated.
    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let request = if self.requires_auth {
            let token = self.sessions.token().unwrap_or_default();
            request.header(AUTH_HEADER, token)
        } else {
            request
        };

        let response = request.send().await?;
        if self.requires_auth && response.status() == StatusCode::UNAUTHORIZED {
            self.sessions.clear();
            let _ = self.tx.send(AppEvent::SessionExpired);
            return Err(ApiError::Auth);
        }
        Ok(response)
    }

    /// Saves a generated poster to the download directory. The original
    /// service returns either an http(s) URL or an inline
    /// `data:image/jpeg;base64,` payload.
    async fn download_call(&self, url: &str) -> Result<PathBuf, String> {
        let bytes = if let Some(raw) = url.strip_prefix("data:") {
            decode_data_url(raw)?
        } else {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|err| format!("download failed: {err}"))?;
            if !response.status().is_success() {
                return Err(format!("download failed: HTTP {}", response.status()));
            }
            response
                .bytes()
                .await
                .map_err(|err| format!("download failed: {err}"))?
                .to_vec()
        };

        let dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(format!("AdScribe_Ad_{}.jpg", timestamp_millis()));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| format!("failed to save poster: {err}"))?;
        Ok(path)
    }
}

async fn read_envelope<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    match response.json::<Envelope<T>>().await? {
        Envelope::Success(value) => Ok(value),
        Envelope::Error { error } => Err(ApiError::Application(error)),
    }
}

fn decode_data_url(raw: &str) -> Result<Vec<u8>, String> {
    let payload = raw
        .split_once("base64,")
        .map(|(_, data)| data)
        .ok_or_else(|| "unsupported data URL".to_string())?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|err| format!("invalid base64 image: {err}"))
}

fn timestamp_millis() -> u128 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis(),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc::Receiver;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn slogan_payload() -> GenerationPayload {
        GenerationPayload {
            business_type: "Cafe".to_string(),
            ad_type: "Catchy".to_string(),
            product_description: "A cozy coffee shop".to_string(),
            language: "English".to_string(),
            format: None,
        }
    }

    fn test_client(
        base_url: &str,
        requires_auth: bool,
    ) -> (
        ApiClient,
        Receiver<AppEvent>,
        Arc<SessionStore>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let sessions = Arc::new(SessionStore::open(dir.path().join("session.json")));
        let (tx, rx) = mpsc::channel();
        let config = AppConfig {
            api_base_url: base_url.to_string(),
            requires_auth,
            dictation_command: None,
        };
        let client = ApiClient::new(&config, Arc::clone(&sessions), tx)
            .expect("test runs inside a tokio runtime");
        (client, rx, sessions, dir)
    }

    #[tokio::test]
    async fn authenticated_call_sends_the_stored_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-slogan"))
            .and(header(AUTH_HEADER, "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "slogan": "Brew Happiness"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _rx, sessions, _dir) = test_client(&server.uri(), true);
        sessions.set("tok-1").expect("token should persist");

        let ok = client
            .slogan_call(&slogan_payload())
            .await
            .expect("call should succeed");
        assert_eq!(ok.slogan, "Brew Happiness");
    }

    #[tokio::test]
    async fn absent_token_still_sends_an_empty_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-slogan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "slogan": "Go"
            })))
            .mount(&server)
            .await;

        let (client, _rx, _sessions, _dir) = test_client(&server.uri(), true);
        client
            .slogan_call(&slogan_payload())
            .await
            .expect("call should succeed");

        let requests = server
            .received_requests()
            .await
            .expect("request recording enabled");
        assert_eq!(requests.len(), 1);
        let value = requests[0]
            .headers
            .get("x-auth-token")
            .expect("header should be attached even without a session");
        assert_eq!(value.to_str().expect("header should be ascii"), "");
    }

    #[tokio::test]
    async fn unauthorized_clears_the_session_and_emits_one_expiry_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-slogan"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (client, rx, sessions, _dir) = test_client(&server.uri(), true);
        sessions.set("stale").expect("token should persist");

        let err = client
            .slogan_call(&slogan_payload())
            .await
            .expect_err("401 should fail the call");
        assert!(matches!(err, ApiError::Auth));
        assert_eq!(sessions.token(), None);

        let event = rx.try_recv().expect("expiry event should be queued");
        assert!(matches!(event, AppEvent::SessionExpired));
        assert!(rx.try_recv().is_err(), "exactly one event per rejected call");
    }

    #[tokio::test]
    async fn application_error_envelope_surfaces_the_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-slogan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "error": "model overloaded"
            })))
            .mount(&server)
            .await;

        let (client, rx, sessions, _dir) = test_client(&server.uri(), true);
        sessions.set("tok-1").expect("token should persist");

        let err = client
            .slogan_call(&slogan_payload())
            .await
            .expect_err("error envelope should fail the call");
        match err {
            ApiError::Application(message) => assert_eq!(message, "model overloaded"),
            other => panic!("expected application error, got {other:?}"),
        }
        // An application error is not an auth failure: session survives.
        assert_eq!(sessions.token().as_deref(), Some("tok-1"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn transport_failure_maps_to_a_network_error() {
        let (client, rx, _sessions, _dir) = test_client("http://127.0.0.1:1", true);
        let err = client
            .slogan_call(&slogan_payload())
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, ApiError::Network(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn login_bypasses_the_gateway_and_stores_the_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "token": "fresh-token"
            })))
            .mount(&server)
            .await;

        let (client, _rx, sessions, dir) = test_client(&server.uri(), true);
        client
            .login_call("desi", "scribe")
            .await
            .expect("login should succeed");
        assert_eq!(sessions.token().as_deref(), Some("fresh-token"));

        let requests = server
            .received_requests()
            .await
            .expect("request recording enabled");
        assert!(
            requests[0].headers.get("x-auth-token").is_none(),
            "login carries no session header"
        );

        // The token survives a process restart.
        let reopened = SessionStore::open(dir.path().join("session.json"));
        assert_eq!(reopened.token().as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn rejected_login_surfaces_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "error": "Invalid credentials"
            })))
            .mount(&server)
            .await;

        let (client, _rx, sessions, _dir) = test_client(&server.uri(), true);
        let err = client
            .login_call("desi", "wrong")
            .await
            .expect_err("rejected login should fail");
        match err {
            ApiError::Application(message) => assert_eq!(message, "Invalid credentials"),
            other => panic!("expected application error, got {other:?}"),
        }
        assert_eq!(sessions.token(), None);
    }

    #[tokio::test]
    async fn pass_through_gateway_skips_token_and_401_interception() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-slogan"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "error": "nope"
            })))
            .mount(&server)
            .await;

        let (client, rx, sessions, _dir) = test_client(&server.uri(), false);
        sessions.set("ignored").expect("token should persist");

        let err = client
            .slogan_call(&slogan_payload())
            .await
            .expect_err("error envelope should fail the call");
        assert!(matches!(err, ApiError::Application(_)));
        assert_eq!(sessions.token().as_deref(), Some("ignored"));
        assert!(rx.try_recv().is_err());

        let requests = server
            .received_requests()
            .await
            .expect("request recording enabled");
        assert!(requests[0].headers.get("x-auth-token").is_none());
    }

    #[tokio::test]
    async fn analyze_image_uploads_the_file_as_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "business_type": "Cafe",
                "description": "A cozy coffee shop",
                "tone": "Professional"
            })))
            .mount(&server)
            .await;

        let (client, _rx, sessions, dir) = test_client(&server.uri(), true);
        sessions.set("tok-1").expect("token should persist");
        let image_path = dir.path().join("shopfront.jpg");
        tokio::fs::write(&image_path, b"not really a jpeg")
            .await
            .expect("fixture should write");

        let analysis = client
            .analyze_image_call(&image_path)
            .await
            .expect("analysis should succeed");
        assert_eq!(analysis.business_type, "Cafe");
        assert_eq!(analysis.tone.as_deref(), Some("Professional"));

        let requests = server
            .received_requests()
            .await
            .expect("request recording enabled");
        let content_type = requests[0]
            .headers
            .get("content-type")
            .expect("multipart content type")
            .to_str()
            .expect("header should be ascii");
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn poster_call_decodes_image_url_and_slogan() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-poster"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "image_url": "https://x/y.jpg",
                "slogan": "Brew Happiness"
            })))
            .mount(&server)
            .await;

        let (client, _rx, sessions, _dir) = test_client(&server.uri(), true);
        sessions.set("tok-1").expect("token should persist");

        let mut payload = slogan_payload();
        payload.format = Some("Square".to_string());
        let art = client
            .poster_call(&payload)
            .await
            .expect("poster should succeed");
        assert_eq!(art.image_url, "https://x/y.jpg");
        assert_eq!(art.slogan, "Brew Happiness");
    }

    #[test]
    fn data_urls_decode_to_their_image_bytes() {
        let bytes = decode_data_url("image/jpeg;base64,aGVsbG8=").expect("valid data url");
        assert_eq!(bytes, b"hello");

        assert!(decode_data_url("image/jpeg,plain").is_err());
        assert!(decode_data_url("image/jpeg;base64,!!!").is_err());
    }
}
