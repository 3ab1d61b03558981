use std::fmt::Display;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json};
use rocket::Request;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Petición inválida: {0}")]
    Decode(String),

    #[error("No se encontró un invitado con el id {0}")]
    GuestNotFound(String),

    #[error("No se encontró una familia con el id {0}")]
    FamilyNotFound(String),

    #[error("No se encontró un invitado ni una familia con el id {0}")]
    Unresolved(String),

    #[error("No se pudo guardar el cambio: {0}")]
    Write(#[source] diesel::result::Error),

    #[error("Error al consultar la base de datos: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Base de datos no disponible: {0}")]
    Unavailable(String),

    #[error("No se pudo generar el HTML: {0}")]
    Render(#[from] askama::Error),
}

impl Error {
    pub fn unavailable(err: impl Display) -> Self {
        Error::Unavailable(err.to_string())
    }

    pub fn status(&self) -> Status {
        match self {
            Error::Decode(_) => Status::BadRequest,
            Error::GuestNotFound(_) | Error::FamilyNotFound(_) | Error::Unresolved(_) => {
                Status::NotFound
            }
            Error::Write(_) | Error::Database(_) | Error::Render(_) => {
                Status::InternalServerError
            }
            Error::Unavailable(_) => Status::ServiceUnavailable,
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.class().is_server_error() {
            tracing::error!(error = %self, uri = %req.uri(), "request failed");
        } else {
            tracing::debug!(error = %self, uri = %req.uri(), "request rejected");
        }

        (status, Json(json!({ "message": self.to_string() }))).respond_to(req)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
