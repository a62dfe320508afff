//! Key server entry point.
//!
//! # Purpose
//! Wires configuration, the zone store and the HTTP routers, then starts the
//! public key listener, the metrics listener and (optionally) the internal
//! provisioning listener.
use anyhow::Context;
use keyserver::app::{AppState, build_provisioning_router, build_router};
use keyserver::config::{KeyServerConfig, ZoneSeed};
use keyserver::model::ZoneDefinition;
use keyserver::observability;
use keyserver::store::{ZoneStore, memory::InMemoryZoneStore};
use std::future::Future;
use std::sync::Arc;
use zonekeys::{AccessPolicy, KeyProjection, TokenPolicy, ZoneKeyRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = KeyServerConfig::from_env_or_yaml().context("key server config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: KeyServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("keyserver", &config.default_zone_id)?;
    let state = build_state(config.clone()).await?;
    tracing::info!(
        backend = state.store.backend_name(),
        default_zone = %state.default_zone_id,
        "zone store ready"
    );
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());

    let provisioning_task = if config.provisioning.enabled {
        if config.provisioning.token.is_none() {
            tracing::warn!("provisioning enabled without a token; all requests will be rejected");
        }
        let provisioning_addr = config.provisioning.bind_addr;
        let provisioning_app = build_provisioning_router(state.clone());
        Some(tokio::spawn(async move {
            tracing::info!(%provisioning_addr, "zone provisioning listening");
            match tokio::net::TcpListener::bind(provisioning_addr).await {
                Ok(listener) => {
                    let _ = axum::serve(listener, provisioning_app.into_make_service()).await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to bind provisioning listener");
                }
            }
        }))
    } else {
        None
    };

    let addr = config.bind_addr;
    tracing::info!(%addr, "key server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    if let Some(task) = &provisioning_task {
        task.abort();
    }
    let _ = metrics_task.await;
    if let Some(task) = provisioning_task {
        let _ = task.await;
    }
    Ok(())
}

async fn build_state(config: KeyServerConfig) -> anyhow::Result<AppState> {
    if config.signing_secret.is_none() {
        tracing::warn!(
            "KEYSERVER_SIGNING_SECRET not set; zones without keys fall back to the built-in secret"
        );
    }
    let store: Arc<dyn ZoneStore + Send + Sync> = Arc::new(InMemoryZoneStore::new());
    seed_zones(store.as_ref(), &config.default_zone_id, &config.zones).await?;

    let projection = KeyProjection::new(
        ZoneKeyRegistry::new(config.default_key_id.clone(), config.signing_secret()),
        AccessPolicy::new(config.key_authority.clone()),
    );

    Ok(AppState {
        api_version: "v1".to_string(),
        default_zone_id: config.default_zone_id,
        store,
        projection: Arc::new(projection),
        provisioning_enabled: config.provisioning.enabled,
        provisioning_token: config.provisioning.token,
    })
}

/// Load configured zones, then make sure the default zone exists.
async fn seed_zones(
    store: &(dyn ZoneStore + Send + Sync),
    default_zone_id: &str,
    seeds: &[ZoneSeed],
) -> anyhow::Result<()> {
    for seed in seeds {
        if let Some(active) = &seed.active_key_id {
            anyhow::ensure!(
                seed.keys.contains_key(active),
                "zone {}: active_key_id {active} is not a configured key",
                seed.zone_id
            );
        }
        let definition = ZoneDefinition {
            zone_id: seed.zone_id.clone(),
            name: seed.name.clone().unwrap_or_else(|| seed.zone_id.clone()),
            token_policy: TokenPolicy::new(seed.keys.clone(), seed.active_key_id.clone()),
        };
        if store.zone_exists(&seed.zone_id).await? {
            store.update_zone(definition).await?;
        } else {
            store.create_zone(definition).await?;
        }
        tracing::info!(zone_id = %seed.zone_id, key_count = seed.keys.len(), "zone seeded");
    }

    if !store.zone_exists(default_zone_id).await? {
        store
            .create_zone(ZoneDefinition {
                zone_id: default_zone_id.to_string(),
                name: default_zone_id.to_string(),
                token_policy: TokenPolicy::default(),
            })
            .await?;
        tracing::info!(zone_id = %default_zone_id, "default zone created");
    }
    Ok(())
}
