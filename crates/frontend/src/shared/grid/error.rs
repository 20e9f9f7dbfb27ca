use thiserror::Error;

/// Failures surfaced by a grid. None of them ends the controller: each one
/// becomes a [`Notice`] and the grid stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The request never completed.
    #[error("Errore di rete: {0}")]
    Network(String),
    /// The server answered with an error status or payload.
    #[error("{0}")]
    Rejected(String),
    #[error("Selezionare un periodo prima di continuare")]
    MissingPartition,
    /// Response body could not be understood.
    #[error("Risposta non valida: {0}")]
    Decode(String),
    /// Edit refused before reaching the server.
    #[error("{0}")]
    Refused(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Non-blocking banner shown above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Info => "alert alert--info",
            NoticeKind::Warning => "alert alert--warning",
            NoticeKind::Error => "alert alert--error",
        }
    }
}

impl From<&GridError> for Notice {
    fn from(error: &GridError) -> Self {
        let kind = match error {
            GridError::MissingPartition | GridError::Refused(_) => NoticeKind::Warning,
            _ => NoticeKind::Error,
        };
        Self {
            kind,
            text: error.to_string(),
        }
    }
}
