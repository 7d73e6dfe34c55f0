use axum::response::IntoResponse;

/// Plain-text greeting used as a trivial reachability check
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is reachable", body = String)),
    tag = "system"
)]
pub async fn index() -> impl IntoResponse {
    "Hello World"
}
