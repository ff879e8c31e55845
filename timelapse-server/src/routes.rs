use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use geo::Point;
use serde::{Deserialize, Serialize};
use timelapse_core::animation::{TripSchedule, VehiclePosition, positions_at};
use timelapse_core::{NetworkGraph, PathEdge, Projection, RouteId, StopId, TripId};
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ErrorResponse};
use crate::projection::WebMercator;
use crate::state::SharedState;

pub fn create_router(
    state: SharedState,
    request_timeout: Duration,
    max_concurrent: usize,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/graph", get(graph_document))
        .route("/graph.geojson", get(graph_geojson))
        .route("/path", get(shortest_path))
        .route("/position", get(position))
        .route("/trips/positions", post(trip_positions))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout))
                .layer(request_limit(max_concurrent)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Caps in-flight requests across the whole router. `Router::layer` clones
/// the layer into every route, and the clones share one semaphore.
fn request_limit(max_concurrent: usize) -> GlobalConcurrencyLimitLayer {
    GlobalConcurrencyLimitLayer::new(max_concurrent)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

async fn health() -> &'static str {
    "OK"
}

async fn graph_document(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.document_json().to_owned(),
    )
}

async fn graph_geojson(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        state.geojson().to_owned(),
    )
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    from: StopId,
    to: StopId,
    route: RouteId,
}

#[derive(Debug, Serialize)]
struct PathResponse {
    edges: Vec<PathEdge>,
    cost: f64,
    length: f64,
    left_preferred_route: bool,
    feature: geojson::Feature,
}

/// Rejects ids the network does not know before they can reach the path cache
fn ensure_known(
    graph: &NetworkGraph,
    stops: [&StopId; 2],
    route: &RouteId,
) -> Result<(), ApiError> {
    if let Some(unknown) = stops
        .into_iter()
        .find(|stop| graph.node_by_stop_id(*stop).is_none())
    {
        return Err(ApiError::UnknownStop(unknown.clone()));
    }
    if !graph.has_route(route) {
        return Err(ApiError::UnknownRoute(route.clone()));
    }
    Ok(())
}

async fn shortest_path(
    State(state): State<SharedState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<PathResponse>, ApiError> {
    let mut graph = state.graph();
    ensure_known(&graph, [&query.from, &query.to], &query.route)?;

    let path = graph
        .shortest_path(&query.from, &query.to, &query.route)
        .ok_or_else(|| ApiError::NoPath {
            from: query.from.clone(),
            to: query.to.clone(),
        })?;

    Ok(Json(PathResponse {
        edges: path.edges.clone(),
        cost: path.cost,
        length: graph.path_length(&path),
        left_preferred_route: path.left_preferred_route,
        feature: graph.path_to_geojson(&path)?,
    }))
}

#[derive(Debug, Deserialize)]
struct PositionQuery {
    from: StopId,
    to: StopId,
    route: RouteId,
    fraction: f64,
}

#[derive(Debug, Serialize)]
struct PositionResponse {
    lon: f64,
    lat: f64,
    /// Web Mercator metres
    x: f64,
    y: f64,
}

impl PositionResponse {
    fn new(point: Point<f64>, projection: &WebMercator) -> Self {
        let planar = projection.project(point.0);
        Self {
            lon: point.x(),
            lat: point.y(),
            x: planar.x,
            y: planar.y,
        }
    }
}

async fn position(
    State(state): State<SharedState>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<PositionResponse>, ApiError> {
    if !(0.0..=1.0).contains(&query.fraction) {
        return Err(ApiError::BadRequest(format!(
            "fraction must lie in [0, 1], got {}",
            query.fraction
        )));
    }

    let mut graph = state.graph();
    ensure_known(&graph, [&query.from, &query.to], &query.route)?;

    let path = graph
        .shortest_path(&query.from, &query.to, &query.route)
        .ok_or_else(|| ApiError::NoPath {
            from: query.from.clone(),
            to: query.to.clone(),
        })?;

    let point = if path.is_empty() {
        graph
            .node_by_stop_id(&query.from)
            .map(|node| node.point)
            .ok_or_else(|| ApiError::UnknownStop(query.from.clone()))?
    } else {
        graph.interpolate_path(&path, query.fraction, &state.projection)
    };

    Ok(Json(PositionResponse::new(point, &state.projection)))
}

#[derive(Debug, Deserialize)]
struct TripPositionsRequest {
    time: f64,
    trips: Vec<TripSchedule>,
}

#[derive(Debug, Serialize)]
struct VehicleResponse {
    #[serde(rename = "tripID")]
    trip_id: TripId,
    #[serde(rename = "fromStopID")]
    from_stop: StopId,
    #[serde(rename = "toStopID")]
    to_stop: Option<StopId>,
    dwelling: bool,
    #[serde(flatten)]
    position: PositionResponse,
}

impl VehicleResponse {
    fn new(vehicle: VehiclePosition, projection: &WebMercator) -> Self {
        Self {
            dwelling: vehicle.is_dwelling(),
            position: PositionResponse::new(vehicle.point, projection),
            trip_id: vehicle.trip_id,
            from_stop: vehicle.from_stop,
            to_stop: vehicle.to_stop,
        }
    }
}

async fn trip_positions(
    State(state): State<SharedState>,
    Json(request): Json<TripPositionsRequest>,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    if !request.time.is_finite() {
        return Err(ApiError::BadRequest("time must be finite".to_string()));
    }

    let vehicles = {
        let mut graph = state.graph();
        positions_at(&mut graph, request.trips, request.time, &state.projection)
    };
    tracing::debug!(vehicles = vehicles.len(), time = request.time, "computed positions");

    Ok(Json(
        vehicles
            .into_iter()
            .map(|vehicle| VehicleResponse::new(vehicle, &state.projection))
            .collect(),
    ))
}
