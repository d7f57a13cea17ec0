use crate::api::types::{ApiError, ImageAnalysis, PosterArt};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum AppEvent {
    LoginSucceeded,
    LoginRejected(String),
    LoginUnreachable,
    SessionExpired,
    AnalysisFinished(Result<ImageAnalysis, ApiError>),
    SloganFinished(Result<String, ApiError>),
    PosterFinished(Result<PosterArt, ApiError>),
    DictationStarted,
    DictationTranscript(String),
    DictationEnded,
    DictationFailed(String),
    DownloadFinished(Result<PathBuf, String>),
}
