use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every service reply is a discriminated envelope: `status: "success"` with
/// the payload fields inline, or `status: "error"` with a message.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success(T),
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginOk {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ImageAnalysis {
    pub business_type: String,
    pub description: String,
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerationPayload {
    pub business_type: String,
    pub ad_type: String,
    pub product_description: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SloganOk {
    pub slogan: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PosterArt {
    pub image_url: String,
    pub slogan: String,
}

/// Failure taxonomy for remote calls. `Auth` is produced only by the
/// gateway, which has already cleared the session and re-shown the login
/// surface by the time a caller sees it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("session expired")]
    Auth,
    #[error("{0}")]
    Application(String),
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_decodes_the_inline_payload() {
        let raw = r#"{"status":"success","business_type":"Cafe","description":"A cozy coffee shop","tone":"Professional"}"#;
        let envelope: Envelope<ImageAnalysis> =
            serde_json::from_str(raw).expect("success envelope should decode");
        match envelope {
            Envelope::Success(analysis) => {
                assert_eq!(analysis.business_type, "Cafe");
                assert_eq!(analysis.description, "A cozy coffee shop");
                assert_eq!(analysis.tone.as_deref(), Some("Professional"));
            }
            Envelope::Error { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn error_envelope_carries_the_server_message() {
        let raw = r#"{"status":"error","error":"model overloaded"}"#;
        let envelope: Envelope<SloganOk> =
            serde_json::from_str(raw).expect("error envelope should decode");
        match envelope {
            Envelope::Error { error } => assert_eq!(error, "model overloaded"),
            Envelope::Success(_) => panic!("expected error"),
        }
    }

    #[test]
    fn unknown_status_fails_to_decode() {
        let raw = r#"{"status":"pending"}"#;
        assert!(serde_json::from_str::<Envelope<SloganOk>>(raw).is_err());
    }

    #[test]
    fn slogan_payload_omits_the_format_field() {
        let payload = GenerationPayload {
            business_type: "Cafe".to_string(),
            ad_type: "Catchy".to_string(),
            product_description: "A cozy coffee shop".to_string(),
            language: "English".to_string(),
            format: None,
        };
        let raw = serde_json::to_string(&payload).expect("payload should serialize");
        assert!(!raw.contains("format"));

        let with_format = GenerationPayload {
            format: Some("Square".to_string()),
            ..payload
        };
        let raw = serde_json::to_string(&with_format).expect("payload should serialize");
        assert!(raw.contains(r#""format":"Square""#));
    }
}
