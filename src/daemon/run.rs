use crate::core::gpu::{GpuBackend, NvmlBackend};
use crate::core::policy::HysteresisPolicy;
use crate::daemon::config::DaemonConfig;
use crate::daemon::scheduler::ControllerSet;
use anyhow::Result;
use tokio::{signal, sync::watch};
use tracing::{debug, error, info, warn};

pub async fn run_with_config(cfg: &DaemonConfig) -> Result<()> {
    info!(target: "memclockd::daemon", "memclockd v{} starting", env!("CARGO_PKG_VERSION"));

    let backend = NvmlBackend::init()?;
    let result = run_on_nvml(&backend, &cfg.policy).await;

    // Controllers are gone by now; the library can be released.
    if let Err(e) = backend.shutdown() {
        error!(target: "memclockd::daemon", "{:#}", e);
    }
    result
}

async fn run_on_nvml(backend: &NvmlBackend, policy: &HysteresisPolicy) -> Result<()> {
    info!(target: "memclockd::daemon", "NVML version: {}", backend.nvml_version()?);
    info!(target: "memclockd::daemon", "Driver version: {}", backend.driver_version()?);

    let (stop_tx, stop_rx) = watch::channel(false);
    debug!(target: "memclockd::daemon", "Setting signal handler");
    let signals = tokio::spawn(forward_stop(stop_signal(), stop_tx));

    let result = supervise(backend, policy, stop_rx).await;
    signals.abort();
    result
}

/// Builds the controller set, runs it until `shutdown` fires, then hands
/// every clock back to the driver.
pub async fn supervise<B: GpuBackend>(
    backend: &B,
    policy: &HysteresisPolicy,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut set = ControllerSet::build(backend, policy)?;

    info!(target: "memclockd::daemon", "memclockd started");
    set.run(shutdown).await;

    info!(target: "memclockd::daemon", "Exiting");
    set.close();
    Ok(())
}

/// Flips the stop flag once `signal` resolves to true. A false result means
/// nothing could be listened for; the flag is left alone and the sender kept
/// alive, so the loop runs until the process is killed.
async fn forward_stop(signal: impl Future<Output = bool>, stop: watch::Sender<bool>) {
    if signal.await {
        info!(target: "memclockd::daemon", "Shutdown signal received");
        let _ = stop.send(true);
    } else {
        warn!(target: "memclockd::daemon", "No stop signal can be received");
        std::future::pending::<()>().await;
    }
}

/// Resolves to true on SIGINT or SIGTERM, or to false when neither can be
/// listened for.
async fn stop_signal() -> bool {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal as unix_signal};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut term) => {
                let ctrl_c = tokio::select! {
                    res = signal::ctrl_c() => res,
                    received = term.recv() => return received.is_some(),
                };
                match ctrl_c {
                    Ok(()) => true,
                    Err(e) => {
                        error!(target: "memclockd::daemon", "Failed to listen for ctrl-c: {e}");
                        term.recv().await.is_some()
                    }
                }
            }
            Err(e) => {
                error!(target: "memclockd::daemon", "Failed to install SIGTERM handler: {e}");
                ctrl_c_received().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c_received().await
    }
}

async fn ctrl_c_received() -> bool {
    match signal::ctrl_c().await {
        Ok(()) => true,
        Err(e) => {
            error!(target: "memclockd::daemon", "Failed to listen for ctrl-c: {e}");
            false
        }
    }
}
