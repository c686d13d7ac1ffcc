//! In-process mock of the fake-data REST API
//!
//! Serves seeded users and posts with the same observable behaviour as the
//! public service, so the built-in suites can run offline. Used by the
//! `restprobe-mock` binary and by the integration tests.

mod data;
mod handlers;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::common::{Error, Result};

pub use data::{Resource, Store, POSTS_PER_USER};
use handlers::SharedStore;

/// Build the router for the seeded data set
pub fn router() -> Router {
    router_with(Store::seeded())
}

/// Build the router over an explicit store
pub fn router_with(store: Store) -> Router {
    let state: SharedStore = Arc::new(store);
    Router::new()
        .merge(collection_routes(Resource::Users))
        .merge(collection_routes(Resource::Posts))
        .route("/users/:id/posts", get(handlers::user_posts))
        .fallback(handlers::fallback)
        .with_state(state)
}

fn collection_routes(resource: Resource) -> Router<SharedStore> {
    let collection = format!("/{}", resource.as_str());
    let item = format!("/{}/:id", resource.as_str());

    Router::new()
        .route(
            &collection,
            get(move |state: State<SharedStore>, query: Query<HashMap<String, String>>| {
                handlers::list(resource, state, query)
            })
            .post(move |state: State<SharedStore>, body: Bytes| {
                handlers::create(resource, state, body)
            }),
        )
        .route(
            &item,
            get(move |state: State<SharedStore>, id: Path<String>| {
                handlers::show(resource, state, id)
            })
            .put(move |state: State<SharedStore>, id: Path<String>, body: Bytes| {
                handlers::replace(resource, state, id, body)
            })
            .patch(move |state: State<SharedStore>, id: Path<String>, body: Bytes| {
                handlers::update(resource, state, id, body)
            })
            .delete(move |id: Path<String>| handlers::remove(resource, id))
            .post(handlers::fallback),
        )
}

/// A mock server running on a background task
///
/// The server is shut down when this handle is dropped.
pub struct MockServer {
    addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Bind to `addr` (use port 0 for an ephemeral port) and start serving
    pub async fn start(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "mock API listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router()).await {
                tracing::error!(error = %e, "mock API stopped");
            }
        });

        Ok(Self {
            addr,
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to point the runner at
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve until the background task exits
    pub async fn wait(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| Error::Internal(format!("mock server task failed: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
