use crate::domain::PageRequest;
use crate::dto::{AssistanceDto, AttractionDto, LocalityDto};
use crate::error::CatalogError;
use crate::services::{AssistanceService, AttractionService, LocalityService};
use crate::storage::Storage;
use axum::{
    extract::{Path, Query},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;
use uuid::Uuid;

/// The single translation point from domain error kind to transport status
/// code. NotFound and InvalidArgument carry their message as a plain-text
/// body; everything else surfaces as a generic server error.
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match self {
            CatalogError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            CatalogError::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            other => {
                error!("Unhandled error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

struct AppServices {
    localities: LocalityService,
    assistances: AssistanceService,
    attractions: AttractionService,
}

type Services = Arc<AppServices>;

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
    size: Option<usize>,
    sort: Option<String>,
}

impl PageQuery {
    fn into_request(self, default_sort: &str) -> PageRequest {
        PageRequest::new(self.page, self.size, self.sort, default_sort)
    }
}

#[derive(Debug, Deserialize)]
struct AttractionListQuery {
    #[serde(rename = "type")]
    attraction_type: Option<String>,
    page: Option<usize>,
    size: Option<usize>,
    sort: Option<String>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "attractions-catalog",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// Locality handlers

async fn add_locality(
    Extension(services): Extension<Services>,
    Json(dto): Json<LocalityDto>,
) -> Result<Json<LocalityDto>, CatalogError> {
    services.localities.add(dto).await.map(Json)
}

async fn get_locality(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocalityDto>, CatalogError> {
    services.localities.get(id).await.map(Json)
}

async fn list_localities(
    Extension(services): Extension<Services>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, CatalogError> {
    let page = services
        .localities
        .list(query.into_request("name"))
        .await?;
    Ok(Json(page))
}

async fn update_locality(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(dto): Json<LocalityDto>,
) -> Result<Json<LocalityDto>, CatalogError> {
    services.localities.update(id, dto).await.map(Json)
}

async fn delete_locality(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogError> {
    services.localities.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Assistance handlers

async fn add_assistance(
    Extension(services): Extension<Services>,
    Json(dto): Json<AssistanceDto>,
) -> Result<Json<AssistanceDto>, CatalogError> {
    services.assistances.add(dto).await.map(Json)
}

async fn get_assistance(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssistanceDto>, CatalogError> {
    services.assistances.get(id).await.map(Json)
}

async fn list_assistances(
    Extension(services): Extension<Services>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, CatalogError> {
    let page = services
        .assistances
        .list(query.into_request("type"))
        .await?;
    Ok(Json(page))
}

async fn update_assistance(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AssistanceDto>,
) -> Result<Json<AssistanceDto>, CatalogError> {
    services.assistances.update(id, dto).await.map(Json)
}

async fn delete_assistance(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogError> {
    services.assistances.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Attraction handlers

async fn add_attraction(
    Extension(services): Extension<Services>,
    Json(dto): Json<AttractionDto>,
) -> Result<Json<AttractionDto>, CatalogError> {
    services.attractions.add(dto).await.map(Json)
}

async fn list_attractions(
    Extension(services): Extension<Services>,
    Query(query): Query<AttractionListQuery>,
) -> Result<impl IntoResponse, CatalogError> {
    let request = PageRequest::new(query.page, query.size, query.sort, "name");
    let page = services
        .attractions
        .list(query.attraction_type, request)
        .await?;
    Ok(Json(page))
}

async fn list_attractions_by_locality(
    Extension(services): Extension<Services>,
    Path(locality_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, CatalogError> {
    let page = services
        .attractions
        .list_by_locality(locality_id, query.into_request("name"))
        .await?;
    Ok(Json(page))
}

async fn update_attraction(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AttractionDto>,
) -> Result<Json<AttractionDto>, CatalogError> {
    services.attractions.update(id, dto).await.map(Json)
}

async fn delete_attraction(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogError> {
    services.attractions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the HTTP server with all routes
pub fn create_server(storage: Arc<dyn Storage>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let services = Arc::new(AppServices {
        localities: LocalityService::new(storage.clone()),
        assistances: AssistanceService::new(storage.clone()),
        attractions: AttractionService::new(storage),
    });

    Router::new()
        .route("/health", get(health))
        .route(
            "/localities",
            get(list_localities).post(add_locality),
        )
        .route(
            "/localities/:id",
            get(get_locality)
                .put(update_locality)
                .delete(delete_locality),
        )
        .route(
            "/assistances",
            get(list_assistances).post(add_assistance),
        )
        .route(
            "/assistances/:id",
            get(get_assistance)
                .put(update_assistance)
                .delete(delete_assistance),
        )
        .route(
            "/attractions",
            get(list_attractions).post(add_attraction),
        )
        .route(
            "/attractions/locality/:locality_id",
            get(list_attractions_by_locality),
        )
        .route(
            "/attractions/:id",
            axum::routing::put(update_attraction).delete(delete_attraction),
        )
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    storage: Arc<dyn Storage>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(storage);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
