use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::catalog::LoadError, config, infra::error::InfraError};

/// Diagnostic chain attached to an error response for the request logger.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A failed request: the visitor sees `public_message`, the log sees the chain.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_error(source, status, error),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Failures that end the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Content(#[from] LoadError),
    #[error("{0} content warning(s) with --deny-warnings")]
    DeniedWarnings(usize),
    #[error("server error: {0}")]
    Server(String),
}

impl AppError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Process exit status: 2 for bad configuration, 3 for unusable content.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::Content(_) | AppError::DeniedWarnings(_) => 3,
            AppError::Infra(_) | AppError::Server(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_hide_the_chain_from_visitors() {
        let cause = LoadError::io(
            "content/site.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let response = HttpError::from_error(
            "tests",
            StatusCode::SERVICE_UNAVAILABLE,
            "Content temporarily unavailable",
            &cause,
        )
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(
            report.messages,
            [
                "failed to read content/site.toml: no such file",
                "no such file"
            ]
        );
    }

    #[test]
    fn exit_codes_separate_configuration_from_content() {
        let bad_config = AppError::from(config::LoadError::Invalid {
            key: "server.port",
            reason: "must be greater than zero".to_string(),
        });
        assert_eq!(bad_config.exit_code(), 2);

        let content = AppError::from(LoadError::malformed("site.toml", "bad"));
        assert_eq!(content.exit_code(), 3);
        assert_eq!(AppError::DeniedWarnings(4).exit_code(), 3);
        assert_eq!(AppError::server("bind failed").exit_code(), 1);
    }
}
