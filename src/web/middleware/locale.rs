//! Message catalogue injection.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::sync::Arc;

use crate::i18n::Localizer;

/// Make the localizer available to extractors and middleware that reject
/// requests before a handler runs.
pub async fn inject_localizer(
    localizer: Arc<dyn Localizer>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(localizer);
    next.run(request).await
}
