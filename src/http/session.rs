use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;

use crate::store::SessionId;

/// Session id carried by the request cookie, or a freshly minted one.
///
/// The flag is `true` when the id is new and the cookie must be set.
pub fn resolve_session(req: &HttpRequest, cookie_name: &str) -> (SessionId, bool) {
    match req
        .cookie(cookie_name)
        .and_then(|c| c.value().parse::<SessionId>().ok())
    {
        Some(id) => (id, false),
        None => (SessionId::generate(), true),
    }
}

pub fn session_cookie(cookie_name: &str, id: SessionId) -> Cookie<'static> {
    Cookie::build(cookie_name.to_string(), id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}
