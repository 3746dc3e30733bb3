// Checker worker: probes the target on a fixed cadence and appends one
// sample per tick. Each probe-and-insert runs in its own task so a slow
// probe or insert never delays the next tick; a tick in flight when the
// next one fires is allowed to finish on its own.

use crate::models::Sample;
use crate::probe_repo::ProbeRepo;
use crate::results_repo::ResultsRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{Duration, interval};

/// Repos, counters, and shutdown for the worker.
pub struct WorkerDeps {
    pub probe_repo: Arc<ProbeRepo>,
    pub results_repo: Arc<ResultsRepo>,
    pub samples_inserted_total: Arc<AtomicU64>,
    pub insert_failures_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and labeling config.
pub struct WorkerConfig {
    pub interval_ms: u64,
    /// Label stamped on every sample this process writes.
    pub network_type: String,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        probe_repo,
        results_repo,
        samples_inserted_total,
        insert_failures_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        interval_ms,
        network_type,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let worker_span = tracing::span!(tracing::Level::DEBUG, "checker", interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let probe_repo = probe_repo.clone();
                    let results_repo = results_repo.clone();
                    let network_type = network_type.clone();
                    let inserted = samples_inserted_total.clone();
                    let failures = insert_failures_total.clone();
                    tokio::spawn(async move {
                        probe_and_insert(
                            &probe_repo,
                            &results_repo,
                            network_type,
                            &inserted,
                            &failures,
                        )
                        .await;
                    });
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Checker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        samples_inserted_total = samples_inserted_total.load(Ordering::Relaxed),
                        insert_failures_total = insert_failures_total.load(Ordering::Relaxed),
                        "app stats"
                    );
                }
            }
        }
    })
}

/// One tick: probe, build the sample, append it. An insert failure costs at
/// most this one sample; the next tick starts fresh.
async fn probe_and_insert(
    probe_repo: &ProbeRepo,
    results_repo: &ResultsRepo,
    network_type: String,
    samples_inserted_total: &AtomicU64,
    insert_failures_total: &AtomicU64,
) {
    let created_at = chrono::Utc::now().timestamp_millis();
    let outcome = probe_repo.probe().await;

    let sample = Sample {
        ok: outcome.alive,
        target_addr: probe_repo.target_addr().to_string(),
        network_type,
        packet_loss: outcome.packet_loss,
        latency: outcome.latency_ms,
        created_at,
    };

    tracing::debug!(
        ok = sample.ok,
        target = %sample.target_addr,
        network_type = %sample.network_type,
        packet_loss = sample.packet_loss,
        latency = ?sample.latency,
        "sample recorded"
    );

    match results_repo.insert_sample(&sample).await {
        Ok(()) => {
            samples_inserted_total.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            insert_failures_total.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, operation = "insert_sample", "sample insert failed");
        }
    }
}
