use serde::Serialize;

/// Events sent from the pipeline worker to the shell.
///
/// The serialized form is the wire contract consumed by presentation shells:
/// a `type` tag plus a `message`, with `complete` also carrying the path of
/// the written file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Informational line, including recovered per-element warnings.
    Log { message: String },
    /// Stage transition announcement.
    Status { message: String },
    /// Successful run; the sole success exit.
    Complete { filepath: String, message: String },
    /// Terminal failure of the run.
    Error { message: String },
    /// Always emitted exactly once, whatever the outcome.
    Finished { message: String },
}

impl ProgressEvent {
    #[must_use]
    pub fn log(message: impl Into<String>) -> Self {
        ProgressEvent::Log {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(message: impl Into<String>) -> Self {
        ProgressEvent::Status {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        ProgressEvent::Error {
            message: message.into(),
        }
    }
}
