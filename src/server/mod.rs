//! HTTP server with time-bounded page regeneration
//!
//! Pages are rendered on first request and reused until their revalidation
//! window elapses. Posts that were never pre-rendered are rendered while the
//! request waits. If regenerating a page fails, the previous snapshot keeps
//! being served.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{RevalidationCache, Snapshot};
use crate::content::PostPagination;
use crate::generator::{Generator, HOME_ROUTE};
use crate::helpers::post_path;
use crate::pages::{home, post, StaticProps};
use crate::prismic::{ContentError, ContentService};
use crate::templates::asset;
use crate::Site;

/// Shared server state
pub struct AppState {
    site: Site,
    service: Arc<dyn ContentService>,
    generator: Generator,
    cache: RevalidationCache,
}

impl AppState {
    pub fn new(site: &Site, service: Arc<dyn ContentService>) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            service,
            generator: Generator::new(site)?,
            cache: RevalidationCache::new(),
        })
    }

    pub fn cache(&self) -> &RevalidationCache {
        &self.cache
    }

    fn public_dir(&self) -> PathBuf {
        self.site.public_dir.clone()
    }
}

/// A freshly rendered route
enum Rendered {
    Page {
        html: String,
        revalidate: Option<Duration>,
    },
    NotFound,
}

impl Rendered {
    fn from_props<T>(
        props: StaticProps<T>,
        render: impl FnOnce(&T) -> Result<String>,
    ) -> Result<Self> {
        Ok(match props {
            StaticProps::Props { props, revalidate } => Rendered::Page {
                html: render(&props)?,
                revalidate,
            },
            StaticProps::NotFound => Rendered::NotFound,
        })
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(load_more_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(
    site: &Site,
    service: Arc<dyn ContentService>,
    ip: &str,
    port: u16,
) -> Result<()> {
    let state = Arc::new(AppState::new(site, service)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Pages regenerate at most every {}s.", site.config.revalidate);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve `route` from its snapshot, regenerating it when stale
async fn serve_route<F, Fut>(state: &AppState, route: &str, render: F) -> Response
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Rendered>>,
{
    if let Some(snapshot) = state.cache.get_fresh(route, Instant::now()).await {
        tracing::debug!("Serving snapshot of {}", route);
        return Html(snapshot.html.to_string()).into_response();
    }

    match render().await {
        Ok(Rendered::Page { html, revalidate }) => {
            tracing::info!("Regenerated {}", route);
            state
                .cache
                .insert(route, Snapshot::new(html.as_str(), Instant::now(), revalidate))
                .await;
            Html(html).into_response()
        }
        Ok(Rendered::NotFound) => {
            state.cache.remove(route).await;
            not_found(state)
        }
        Err(e) => {
            tracing::error!("Failed to render {}: {:#}", route, e);
            match state.cache.get(route).await {
                Some(stale) => {
                    tracing::warn!("Serving stale snapshot of {}", route);
                    Html(stale.html.to_string()).into_response()
                }
                None => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
            }
        }
    }
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    let (service, config, generator) = (state.service.as_ref(), &state.site.config, &state.generator);
    serve_route(&state, HOME_ROUTE, move || async move {
        let props = home::get_static_props(service, config).await?;
        Rendered::from_props(props, |p| generator.render_home(p))
    })
    .await
}

async fn post_handler(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    let route = post_path(&slug);
    let (service, config, generator) = (state.service.as_ref(), &state.site.config, &state.generator);
    let slug = slug.as_str();
    serve_route(&state, &route, move || async move {
        let props = post::get_static_props(service, config, slug).await?;
        Rendered::from_props(props, |p| generator.render_post(p))
    })
    .await
}

#[derive(Debug, Deserialize)]
struct LoadMoreQuery {
    cursor: Option<String>,
}

/// Follow a listing cursor and return the next page of cards as JSON
async fn load_more_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoadMoreQuery>,
) -> Response {
    let Some(cursor) = query.cursor.filter(|c| !c.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing cursor").into_response();
    };

    let page = state
        .service
        .fetch_page(&cursor)
        .await
        .and_then(PostPagination::from_page);

    match page {
        Ok(page) => Json(state.generator.cards(&page)).into_response(),
        Err(e @ (ContentError::ForeignCursor(_) | ContentError::InvalidUrl { .. })) => {
            tracing::warn!("Rejected cursor: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load more posts: {}", e);
            (StatusCode::BAD_GATEWAY, "failed to load more posts").into_response()
        }
    }
}

/// Serve embedded assets, then files from the public dir, then the 404 page
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    if let Some((content_type, body)) = asset(request.uri().path()) {
        return ([(header::CONTENT_TYPE, content_type)], body).into_response();
    }

    let mut service = ServeDir::new(state.public_dir());
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

fn not_found(state: &AppState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {:#}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
