use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use panel_optimizer::error::PackError;
use panel_optimizer::packer::{PackOptions, Packer, UnplaceablePolicy};
use panel_optimizer::types::{Layout, PanelInstance, PanelRequest, Rect, StockSheet};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    stock: Rect,
    panels: Vec<PanelRequest>,
    #[serde(default)]
    skip_unplaceable: bool,
}

#[derive(Serialize)]
struct OptimizeResponse {
    sheets: Vec<StockSheet>,
    stock: Rect,
    sheet_count: usize,
    panel_count: usize,
    waste_percent: f64,
    rejected: Vec<PanelInstance>,
}

impl From<Layout> for OptimizeResponse {
    fn from(layout: Layout) -> Self {
        Self {
            sheet_count: layout.sheet_count(),
            panel_count: layout.panel_count(),
            waste_percent: layout.total_waste_percent(),
            sheets: layout.sheets,
            stock: layout.stock,
            rejected: layout.rejected,
        }
    }
}

fn status_for(err: &PackError) -> StatusCode {
    match err {
        PackError::InvalidDimension { .. } => StatusCode::BAD_REQUEST,
        PackError::UnplaceablePanel { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    if req.panels.iter().any(|p| p.quantity == 0) {
        return Err((
            StatusCode::BAD_REQUEST,
            "panel quantity must be non-zero".to_string(),
        ));
    }

    // Each request gets its own sheet cache so results never depend on earlier requests
    let options = PackOptions {
        memoize: true,
        unplaceable: if req.skip_unplaceable {
            UnplaceablePolicy::Reject
        } else {
            UnplaceablePolicy::Fail
        },
    };
    let packer = Packer::new(req.stock, req.panels).with_options(options);

    let layout = tokio::task::spawn_blocking(move || packer.solve())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::warn!(error = %e, "optimize failed");
            (status_for(&e), e.to_string())
        })?;

    Ok(Json(layout.into()))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.expect("server error");
}
