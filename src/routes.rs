use crate::{
    dispatch::{self, routes::reminder_routes, ErrorResponse, HealthResponse, RunSummary},
    state::AppState,
};
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        dispatch::dispatch_handlers::run_email_reminders,
        dispatch::dispatch_handlers::run_push_reminders,
        dispatch::dispatch_handlers::health,
    ),
    components(
        schemas(
            RunSummary,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "reminders", description = "Scheduled reminder dispatch"),
        (name = "health", description = "Service health")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(dispatch::health))
        .nest("/reminders", reminder_routes(state.clone()));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_run_errors() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        for path in ["/api/reminders/email/run", "/api/reminders/push/run"] {
            let responses = &doc["paths"][path]["post"]["responses"];
            for status in ["401", "500"] {
                assert_eq!(
                    responses[status]["content"]["application/json"]["schema"]["$ref"],
                    "#/components/schemas/ErrorResponse",
                    "{} {}",
                    path,
                    status
                );
            }
        }
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
