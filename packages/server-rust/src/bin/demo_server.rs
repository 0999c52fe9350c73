//! Demo API exercising every middleware combination.
//!
//! ```text
//! ROUTEKIT_AUTH_SECRET=dev-secret cargo run --bin routekit-demo
//! ```

use std::sync::Arc;

use axum::extract::Path;
use axum::routing::get;
use axum::Json;
use clap::Parser;
use routekit_server::telemetry::init_tracing;
use routekit_server::{ApiInfo, ApiRouter, ApiServer, Context, Operation, ServerArgs, UserRole};
use serde_json::{json, Value};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_format);

    let (network, auth) = args.into_configs()?;

    let mut api = ApiRouter::new(
        ApiInfo {
            description: Some("Routes guarded by declarative operation descriptors".to_string()),
            ..ApiInfo::new("routekit demo", env!("CARGO_PKG_VERSION"))
        },
        Arc::new(auth),
    );

    api.get(
        "/health",
        Operation {
            summary: "Liveness probe".to_string(),
            tags: vec!["system".to_string()],
            ..Operation::default()
        },
        health,
    )
    .get(
        "/users/{id}",
        Operation {
            summary: "Fetch a user".to_string(),
            tags: vec!["users".to_string()],
            requires_auth: true,
            ..Operation::default()
        },
        get_user,
    )
    .post(
        "/jobs",
        Operation {
            summary: "Start a background job".to_string(),
            tags: vec!["jobs".to_string()],
            requires_auth: true,
            requires_job: true,
            allowed_roles: vec![UserRole::Admin, UserRole::SuperAdmin],
            ..Operation::default()
        },
        create_job,
    )
    .put(
        "/tenants/{id}",
        Operation {
            summary: "Update tenant settings".to_string(),
            tags: vec!["tenants".to_string()],
            requires_auth: true,
            requires_tenant: true,
            ..Operation::default()
        },
        update_tenant,
    );

    let (router, openapi) = api.into_parts();
    let openapi = Arc::new(openapi);
    let router = router.route(
        "/openapi.json",
        get(move || {
            let openapi = Arc::clone(&openapi);
            async move { Json(openapi.as_ref().clone()) }
        }),
    );

    let mut server = ApiServer::new(network);
    let port = server.start().await?;
    info!(port, "routekit demo listening");

    server
        .serve(router, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to listen for ctrl-c");
            }
            info!("shutdown signal received");
        })
        .await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_user(Path(id): Path<String>, Context(ctx): Context) -> Json<Value> {
    Json(json!({
        "id": id,
        "requested_by": ctx.subject(),
    }))
}

async fn create_job(Context(ctx): Context) -> Json<Value> {
    Json(json!({
        "job_id": ctx.job_id,
        "started_by": ctx.subject(),
    }))
}

async fn update_tenant(Path(id): Path<String>, Context(ctx): Context) -> Json<Value> {
    Json(json!({
        "tenant_id": id,
        "resolved_tenant": ctx.tenant_id,
    }))
}
