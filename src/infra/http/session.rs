//! Visitor session cookie.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::Response,
};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "folio_session";

/// The visitor's session id, freshly minted when the request carried none.
#[derive(Debug, Clone, Copy)]
pub struct VisitorSession {
    pub id: Uuid,
    is_new: bool,
}

impl VisitorSession {
    /// Set the cookie on `response` when the session was just created.
    pub fn attach(self, mut response: Response) -> Response {
        if self.is_new {
            let cookie = format!(
                "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
                self.id
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

impl<S> FromRequestParts<S> for VisitorSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let existing = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_id_from_cookie_header);

        Ok(match existing {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: Uuid::new_v4(),
                is_new: true,
            },
        })
    }
}

fn session_id_from_cookie_header(header: &str) -> Option<Uuid> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE)
            .then(|| Uuid::parse_str(value.trim()).ok())
            .flatten()
    })
}
