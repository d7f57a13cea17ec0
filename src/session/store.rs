use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

pub fn default_session_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".adscribe")
        .join("session.json")
}

/// Returns the persisted token, if any, plus a human-readable warning when
/// the file exists but cannot be used. A missing file is not a warning.
pub fn read_token(path: &Path) -> (Option<String>, Option<String>) {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return (None, None),
        Err(err) => {
            return (
                None,
                Some(format!("failed to read {}: {err}", path.display())),
            )
        }
    };

    match serde_json::from_slice::<SessionFile>(&data) {
        Ok(file) if !file.token.trim().is_empty() => (Some(file.token), None),
        Ok(_) => (None, None),
        Err(err) => (
            None,
            Some(format!("failed to parse {}: {err}", path.display())),
        ),
    }
}

pub fn write_token(path: &Path, token: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(&SessionFile {
        token: token.to_string(),
    })
    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&tmp_path, path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

pub fn remove_token(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
