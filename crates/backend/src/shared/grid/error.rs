use axum::http::StatusCode;
use thiserror::Error;

/// Failures of a grid request, mapped to an HTTP status by the handlers.
#[derive(Debug, Error)]
pub enum GridQueryError {
    #[error("Griglia sconosciuta: {0}")]
    UnknownGrid(String),

    #[error("Colonna non valida: {0}")]
    UnknownColumn(String),

    #[error("Campo non modificabile: {0}")]
    ReadOnlyField(String),

    #[error("La griglia {0} e' in sola lettura")]
    ReadOnlyGrid(String),

    #[error("Parametri mancanti")]
    MissingParameters,

    #[error("Record non trovato")]
    RecordNotFound,

    #[error("Tabella {0} senza colonne")]
    EmptySchema(String),

    #[error("Errore database: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Errore esportazione: {0}")]
    Export(String),
}

impl GridQueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GridQueryError::UnknownGrid(_) | GridQueryError::RecordNotFound => {
                StatusCode::NOT_FOUND
            }
            GridQueryError::UnknownColumn(_)
            | GridQueryError::ReadOnlyField(_)
            | GridQueryError::ReadOnlyGrid(_)
            | GridQueryError::MissingParameters => StatusCode::BAD_REQUEST,
            GridQueryError::EmptySchema(_)
            | GridQueryError::Database(_)
            | GridQueryError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
