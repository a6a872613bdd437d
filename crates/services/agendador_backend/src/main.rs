// File: services/agendador_backend/src/main.rs
use agendador_common::{init_with_level, parse_level};
use agendador_config::load_config;
use agendador_gcal::handle::CalendarHandle;
use agendador_gcal::{routes as booking_routes, BookingEngine};
use axum::{routing::get, Router};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("agendador stopped: {}", err);
        eprintln!("agendador stopped: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Arc::new(load_config()?);
    init_with_level(parse_level(config.log_level.as_deref()));

    // The Google client is built on the first calendar call, not here.
    let calendar = Arc::new(CalendarHandle::lazy(config.google.clone()));
    let engine = Arc::new(BookingEngine::new(config.clone(), calendar)?);
    info!(
        "booking {} minute slots in {} ({} mode by default)",
        config.booking.duration_minutes, config.booking.time_zone, config.booking.availability_mode
    );

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Agendador API!" }))
        .merge(booking_routes(engine));

    #[allow(unused_mut)] // mutable only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use agendador_gcal::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Agendador API",
                version = "0.1.0",
                description = "Appointment availability and booking",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
