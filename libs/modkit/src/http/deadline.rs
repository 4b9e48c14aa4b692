use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::context::RequestCtx;

/// Attach a fresh [`RequestCtx`] with the given timeout to every request.
///
/// The context's token is cancelled when the request finishes or when the
/// response future is dropped (client disconnect), so work still holding a
/// clone of the context observes the cancellation.
///
/// ```rust,ignore
/// router.route_layer(axum::middleware::from_fn_with_state(
///     Duration::from_millis(100),
///     modkit::with_deadline,
/// ))
/// ```
pub async fn with_deadline(
    State(timeout): State<Duration>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = RequestCtx::with_timeout(timeout);
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();
    req.extensions_mut().insert(ctx);
    next.run(req).await
}
