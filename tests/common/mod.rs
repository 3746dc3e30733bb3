// Shared test helpers

use pingwatch::models::Sample;
use pingwatch::results_repo::ResultsRepo;
use tempfile::TempDir;

/// Sample at `created_at_secs` (epoch seconds) with the given readings.
pub fn sample(created_at_secs: i64, network_type: &str, latency: Option<f64>, packet_loss: f64) -> Sample {
    Sample {
        ok: latency.is_some(),
        target_addr: "192.0.2.1".into(),
        network_type: network_type.into(),
        packet_loss,
        latency,
        created_at: created_at_secs * 1000,
    }
}

/// Fresh store on a tempfile database; the TempDir must outlive the repo.
pub async fn temp_repo(time_index: bool) -> (TempDir, ResultsRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.db");
    let repo = ResultsRepo::connect(path.to_str().unwrap(), 4, time_index)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}
