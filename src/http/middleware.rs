use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage, HttpResponse};

use crate::reorder::REPEAT_ORDER_PARAM;
use super::session::{resolve_session, session_cookie};
use super::AppState;

/// First `repeat-order` value of a raw query string
pub fn repeat_order_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REPEAT_ORDER_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn apply_no_cache(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, must-revalidate, max-age=0, no-store, private"),
    );
    headers.insert(header::EXPIRES, HeaderValue::from_static("Wed, 11 Jan 1984 05:00:00 GMT"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
}

/// Runs the repeat-order action for every request.
///
/// Resolves the session (stored in request extensions for the pages), then
/// either short-circuits with a redirect to the cart or lets the page render.
pub async fn repeat_order_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
        return Ok(next.call(req).await?.map_into_boxed_body());
    };

    let cookie_name = state.config.session.cookie_name.clone();
    let (session_id, is_new) = resolve_session(req.request(), &cookie_name);
    req.extensions_mut().insert(session_id);

    let raw = repeat_order_param(req.query_string());
    let session = state.sessions.handle(session_id);
    let outcome = state.handler.handle(raw.as_deref(), &session, &session).await;

    let mut res = match outcome.redirect_location() {
        Some(location) => {
            tracing::debug!(session = %session_id, location, "Redirecting to cart");
            req.into_response(
                HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish(),
            )
        }
        None => next.call(req).await?.map_into_boxed_body(),
    };

    if outcome.requires_no_cache() {
        apply_no_cache(res.headers_mut());
    }

    if is_new {
        if let Err(e) = res.response_mut().add_cookie(&session_cookie(&cookie_name, session_id)) {
            tracing::warn!(error = %e, "Failed to set session cookie");
        }
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_extraction() {
        assert_eq!(repeat_order_param("repeat-order=42"), Some("42".to_string()));
        assert_eq!(repeat_order_param("a=1&repeat-order=42&b=2"), Some("42".to_string()));
        assert_eq!(repeat_order_param("repeat-order="), Some(String::new()));
        assert_eq!(repeat_order_param("repeat-order=%2042"), Some(" 42".to_string()));
        assert_eq!(repeat_order_param("repeat_order=42"), None);
        assert_eq!(repeat_order_param(""), None);
    }

    #[test]
    fn test_no_cache_headers() {
        let mut headers = HeaderMap::new();
        apply_no_cache(&mut headers);

        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "no-cache, must-revalidate, max-age=0, no-store, private"
        );
        assert_eq!(headers.get(header::EXPIRES).unwrap(), "Wed, 11 Jan 1984 05:00:00 GMT");
        assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    }
}
