//! # Ki Auth Runtime
//!
//! Hosts a [`WalletAuthService`] inside the claim portal's process. The portal
//! owns request routing; it starts a [`RuntimeHandle`], hands
//! [`RuntimeHandle::service`] to its handlers and calls
//! [`RuntimeHandle::shutdown`] on exit.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Install logging
//! 3. Build the service over the in-memory nonce store and system clock
//! 4. Spawn the expired-nonce sweep, which runs until shutdown

pub mod config;
pub mod telemetry;

use crate::config::RuntimeConfig;
use anyhow::Context;
use ki_wallet_auth::{
    InMemoryNonceStore, NonceStore, SystemTimeSource, TimeSource, WalletAuthService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The service as hosted by this runtime.
pub type HostedService = WalletAuthService<Arc<InMemoryNonceStore>, SystemTimeSource>;

/// Build the hosted service from runtime configuration.
pub fn build_service(config: &RuntimeConfig) -> anyhow::Result<Arc<HostedService>> {
    let service = WalletAuthService::new(
        config.auth.clone(),
        Arc::new(InMemoryNonceStore::new()),
        SystemTimeSource,
    )?;
    Ok(Arc::new(service))
}

/// A running service and its background sweep.
pub struct RuntimeHandle {
    /// The service, for the host's request handlers.
    pub service: Arc<HostedService>,
    shutdown: watch::Sender<bool>,
    sweeper: JoinHandle<()>,
}

impl RuntimeHandle {
    /// Build the service and spawn the nonce sweeper on the current tokio runtime.
    pub fn start(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let service = build_service(config).context("Failed to build wallet auth service")?;
        info!(
            admins = config.auth.admin_wallets.len(),
            token_ttl_secs = config.auth.token_ttl_secs,
            nonce_ttl_secs = config.auth.nonce_ttl_secs,
            "Wallet auth service ready"
        );

        let (shutdown, shutdown_rx) = watch::channel(false);
        let sweeper = tokio::spawn(run_sweeper(
            Arc::clone(&service),
            config.sweep_interval,
            shutdown_rx,
        ));

        Ok(Self {
            service,
            shutdown,
            sweeper,
        })
    }

    /// Load configuration from the environment, install logging, then [`start`](Self::start).
    pub fn start_from_env() -> anyhow::Result<Self> {
        let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
        telemetry::init_tracing(&config.log_level, config.json_logs)
            .context("Failed to initialize logging")?;
        Self::start(&config)
    }

    /// Stop the sweeper and wait for it to finish.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down wallet auth runtime");
        // An Err means the sweeper already exited
        self.shutdown.send(true).ok();
        self.sweeper.await.context("Sweeper task panicked")?;
        Ok(())
    }
}

/// Periodically delete expired nonces until `shutdown` flips to `true`.
///
/// A failed sweep is logged and retried on the next tick; expired rows are
/// already unusable, so a missed sweep only delays reclaiming space.
pub async fn run_sweeper<S, T>(
    service: Arc<WalletAuthService<S, T>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: NonceStore + 'static,
    T: TimeSource + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(interval_secs = interval.as_secs(), "Nonce sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match service.sweep_now() {
                    Ok(removed) => debug!(removed, "Nonce sweep complete"),
                    Err(e) => warn!(error = %e, "Nonce sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Nonce sweeper stopped");
}
