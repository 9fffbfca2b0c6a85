use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "cartSessionId";

const COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Cart session resolved from the `cartSessionId` cookie.
///
/// `Fresh` means no cookie came with the request and a token was minted for
/// it. Reads and adds accept a fresh session; quantity updates and removals
/// require an `Existing` one.
#[derive(Clone, Debug)]
pub enum CartSession {
    Existing(String),
    Fresh(String),
}

impl CartSession {
    pub fn id(&self) -> &str {
        match self {
            CartSession::Existing(id) | CartSession::Fresh(id) => id,
        }
    }
}

/// Resolves the session token and hands it to handlers as an extension.
/// A fresh token is only persisted (Set-Cookie) for GET and POST, the
/// verbs that are allowed to start a cart.
pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    let session = match req
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(read_session_cookie)
    {
        Some(id) => CartSession::Existing(id),
        None => CartSession::Fresh(Uuid::new_v4().to_string()),
    };

    let persist_cookie = matches!(session, CartSession::Fresh(_))
        && (*req.method() == Method::GET || *req.method() == Method::POST);

    req.extensions_mut().insert(session.clone());
    let mut response = next.run(req).await;

    if persist_cookie {
        let cookie = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
            SESSION_COOKIE,
            session.id(),
            COOKIE_MAX_AGE_SECS
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

fn read_session_cookie(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
