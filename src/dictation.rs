use crate::chat::Language;
use crate::config::AppConfig;
use crate::event::AppEvent;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Voice capture through an external speech-to-text helper command. The
/// adapter exists only when the capability does: an unset command, an
/// unparseable one, or a missing binary all mean "no adapter", and the mic
/// control is never rendered.
///
/// Capture is single-shot: the helper listens for one utterance, prints the
/// transcript on stdout, and exits. Toggling during capture kills it.
pub struct DictationAdapter {
    command: Vec<String>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
    stop: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl DictationAdapter {
    pub fn detect(config: &AppConfig, tx: mpsc::Sender<AppEvent>) -> Option<Self> {
        let raw = config.dictation_command.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        let command = match shell_words::split(raw) {
            Ok(words) if !words.is_empty() => words,
            Ok(_) => return None,
            Err(err) => {
                log::warn!("ignoring malformed dictation_command: {err}");
                return None;
            }
        };

        if which::which(&command[0]).is_err() {
            log::info!(
                "dictation helper '{}' not found on PATH; voice input disabled",
                command[0]
            );
            return None;
        }

        let runtime_handle = Handle::try_current().ok()?;
        Some(Self {
            command,
            tx,
            runtime_handle,
            stop: Arc::new(Mutex::new(None)),
        })
    }

    /// Start capture with the locale mapped from the selected language, or
    /// stop the capture already running.
    pub fn toggle(&self, language: Language) {
        if self.stop_capture() {
            return;
        }
        self.start_capture(language);
    }

    fn stop_capture(&self) -> bool {
        match self.lock_stop().take() {
            // A closed sender belongs to a capture that already finished.
            Some(stop) if !stop.is_closed() => {
                let _ = stop.send(());
                true
            }
            _ => false,
        }
    }

    fn start_capture(&self, language: Language) {
        let args = command_for_locale(&self.command, language.locale());
        let (stop_tx, stop_rx) = oneshot::channel();
        *self.lock_stop() = Some(stop_tx);

        let tx = self.tx.clone();
        self.runtime_handle.spawn(run_capture(args, tx, stop_rx));
    }

    fn lock_stop(&self) -> MutexGuard<'_, Option<oneshot::Sender<()>>> {
        self.stop
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn run_capture(
    args: Vec<String>,
    tx: mpsc::Sender<AppEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut command = Command::new(&args[0]);
    command
        .args(&args[1..])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            let _ = tx.send(AppEvent::DictationFailed(format!(
                "failed to start dictation helper: {err}"
            )));
            return;
        }
    };
    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.start_kill();
        let _ = tx.send(AppEvent::DictationFailed(
            "dictation helper has no stdout".to_string(),
        ));
        return;
    };

    let _ = tx.send(AppEvent::DictationStarted);

    let mut transcript = String::new();
    let mut stopped = false;
    tokio::select! {
        _ = &mut stop_rx => {
            stopped = true;
            let _ = child.start_kill();
        }
        read = stdout.read_to_string(&mut transcript) => {
            if let Err(err) = read {
                log::warn!("failed to read dictation output: {err}");
            }
        }
    }
    let _ = child.wait().await;

    if !stopped {
        let text = transcript.trim();
        if !text.is_empty() {
            let _ = tx.send(AppEvent::DictationTranscript(text.to_string()));
        }
    }
    let _ = tx.send(AppEvent::DictationEnded);
}

fn command_for_locale(command: &[String], locale: &str) -> Vec<String> {
    let mut substituted = false;
    let mut args: Vec<String> = command
        .iter()
        .map(|arg| {
            if arg.contains("{locale}") {
                substituted = true;
                arg.replace("{locale}", locale)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        args.push(locale.to_string());
    }
    args
}
