pub mod carts;
pub mod checkout;
pub mod orders;
pub mod vendors;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::{InfoBuilder, OpenApi};
use utoipa_axum::router::OpenApiRouter;

use crate::{app_state::AppState, swagger};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    carts::routes_with_openapi()
        .merge(checkout::routes_with_openapi())
        .merge(orders::routes_with_openapi())
        .merge(vendors::routes_with_openapi())
}

/// The API router plus its OpenAPI document.
pub fn api(state: AppState) -> (Router, OpenApi) {
    let (router, mut openapi) = routes_with_openapi().split_for_parts();
    openapi.info = InfoBuilder::new()
        .title("Marketplace Orders API")
        .version("1.0.0")
        .build();

    (router.with_state(state), openapi)
}

/// The full application: API, Swagger UI and the HTTP middleware stack.
pub fn app(state: AppState) -> Router {
    let (api, openapi) = api(state);

    Router::new()
        .merge(api)
        .merge(swagger::create_swagger_ui(openapi))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
