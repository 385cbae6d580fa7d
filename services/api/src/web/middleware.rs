//! services/api/src/web/middleware.rs
//!
//! Profile resolution for the roadmap routes.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::warn;
use uuid::Uuid;

use crate::web::state::Profile;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware that reads the optional `x-user-id` header and stores the
/// resulting `Profile` in the request extensions.
///
/// A header that is present but not a UUID is rejected with 400 Bad Request.
pub async fn resolve_profile(mut req: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let profile = match req.headers().get(USER_ID_HEADER) {
        None => Profile(None),
        Some(value) => {
            let user_id = value
                .to_str()
                .ok()
                .and_then(|v| Uuid::parse_str(v.trim()).ok())
                .ok_or_else(|| {
                    warn!("Rejecting request with malformed {} header", USER_ID_HEADER);
                    (
                        StatusCode::BAD_REQUEST,
                        "Invalid x-user-id format".to_string(),
                    )
                })?;
            Profile(Some(user_id))
        }
    };

    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}
