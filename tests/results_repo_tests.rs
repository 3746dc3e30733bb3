// ResultsRepo tests: connect, init, index toggling, insert, grouped aggregation

mod common;

use common::{sample, temp_repo};
use pingwatch::models::BucketWidth;
use pingwatch::results_repo::ResultsRepo;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn connect_and_init_twice_is_a_no_op() {
    let (_dir, repo) = temp_repo(true).await;
    // Second init is a no-op (IF NOT EXISTS)
    repo.init().await.unwrap();
}

#[tokio::test]
async fn index_toggle_is_idempotent_both_ways() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.db");
    let path_str = path.to_str().unwrap();

    // Enable on a fresh database, then enable again on restart.
    let repo = ResultsRepo::connect(path_str, 2, true).await.unwrap();
    repo.init().await.unwrap();
    repo.init().await.unwrap();
    drop(repo);

    // Disable an existing index, then disable again when already absent.
    let repo = ResultsRepo::connect(path_str, 2, false).await.unwrap();
    repo.init().await.unwrap();
    repo.init().await.unwrap();
}

#[tokio::test]
async fn insert_and_get_recent_round_trips_fields() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(1000, "home", Some(12.5), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1001, "home", None, 100.0))
        .await
        .unwrap();

    let recent = repo.get_recent_samples(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].created_at, 1_000_000);
    assert_eq!(recent[0].target_addr, "192.0.2.1");
    assert_eq!(recent[0].network_type, "home");
    assert_eq!(recent[0].latency, Some(12.5));
    assert!(recent[0].ok);
    assert_eq!(recent[1].latency, None);
    assert!(!recent[1].ok);
    assert_eq!(recent[1].packet_loss, 100.0);
}

#[tokio::test]
async fn aggregate_buckets_by_truncated_timestamp() {
    let (_dir, repo) = temp_repo(true).await;

    // start=1000, end=1010, target=5 -> 2s bins; one sample per second.
    for s in 1000..1010 {
        repo.insert_sample(&sample(s, "home", Some(10.0), 0.0))
            .await
            .unwrap();
    }

    let rows = repo
        .aggregate(1000, 1010, &BucketWidth::seconds(2), None)
        .await
        .unwrap();
    let buckets: Vec<i64> = rows.iter().map(|r| r.created_at).collect();
    assert_eq!(buckets, vec![1000, 1002, 1004, 1006, 1008]);
}

#[tokio::test]
async fn aggregate_means_skip_absent_latency_but_not_packet_loss() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(1000, "home", Some(10.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1001, "home", None, 10.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1002, "home", Some(30.0), 20.0))
        .await
        .unwrap();

    let rows = repo
        .aggregate(1000, 1010, &BucketWidth::seconds(20), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_at, 1000);
    assert_eq!(rows[0].packet_loss, 10.0);
    assert_eq!(rows[0].latency, Some(20.0));
}

#[tokio::test]
async fn aggregate_all_timeouts_reports_null_latency() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(1000, "home", None, 100.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1001, "home", None, 100.0))
        .await
        .unwrap();

    let rows = repo
        .aggregate(1000, 1001, &BucketWidth::seconds(10), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].latency, None);
    assert_eq!(rows[0].packet_loss, 100.0);
}

#[tokio::test]
async fn aggregate_fans_out_by_network_type_sorted() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(1000, "lte", Some(40.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1001, "home", Some(10.0), 0.0))
        .await
        .unwrap();

    let rows = repo
        .aggregate(1000, 1010, &BucketWidth::seconds(10), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    // Same bucket, dimension order is deterministic (ascending).
    assert_eq!(rows[0].network_type, "home");
    assert_eq!(rows[1].network_type, "lte");
    assert_eq!(rows[0].created_at, rows[1].created_at);
}

#[tokio::test]
async fn aggregate_dimension_filter_restricts_to_one_network_type() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(1000, "lte", Some(40.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1001, "home", Some(10.0), 0.0))
        .await
        .unwrap();

    let rows = repo
        .aggregate(1000, 1010, &BucketWidth::seconds(10), Some("lte"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].network_type, "lte");
    assert_eq!(rows[0].latency, Some(40.0));
}

#[tokio::test]
async fn aggregate_range_is_inclusive_on_both_ends() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(999, "home", Some(1.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1000, "home", Some(2.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1010, "home", Some(3.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1011, "home", Some(4.0), 0.0))
        .await
        .unwrap();

    let rows = repo
        .aggregate(1000, 1010, &BucketWidth::seconds(1), None)
        .await
        .unwrap();
    let buckets: Vec<i64> = rows.iter().map(|r| r.created_at).collect();
    assert_eq!(buckets, vec![1000, 1010]);
}

#[tokio::test]
async fn aggregate_skips_empty_buckets() {
    let (_dir, repo) = temp_repo(true).await;

    repo.insert_sample(&sample(1000, "home", Some(1.0), 0.0))
        .await
        .unwrap();
    repo.insert_sample(&sample(1008, "home", Some(2.0), 0.0))
        .await
        .unwrap();

    let rows = repo
        .aggregate(1000, 1010, &BucketWidth::seconds(2), None)
        .await
        .unwrap();
    let buckets: Vec<i64> = rows.iter().map(|r| r.created_at).collect();
    assert_eq!(buckets, vec![1000, 1008]);
}

#[tokio::test]
async fn aggregate_is_insert_order_independent() {
    let (_dir1, forward) = temp_repo(true).await;
    let (_dir2, reversed) = temp_repo(true).await;

    let samples = vec![
        sample(1000, "home", Some(10.0), 0.0),
        sample(1001, "lte", Some(50.0), 10.0),
        sample(1003, "home", None, 100.0),
        sample(1004, "lte", Some(70.0), 0.0),
    ];
    for s in &samples {
        forward.insert_sample(s).await.unwrap();
    }
    for s in samples.iter().rev() {
        reversed.insert_sample(s).await.unwrap();
    }

    let width = BucketWidth::seconds(2);
    let a = forward.aggregate(1000, 1010, &width, None).await.unwrap();
    let b = reversed.aggregate(1000, 1010, &width, None).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn aggregate_same_result_with_and_without_index() {
    let (_dir1, indexed) = temp_repo(true).await;
    let (_dir2, plain) = temp_repo(false).await;

    for s in [
        sample(1000, "home", Some(10.0), 0.0),
        sample(1002, "lte", None, 100.0),
        sample(1005, "home", Some(20.0), 5.0),
    ] {
        indexed.insert_sample(&s).await.unwrap();
        plain.insert_sample(&s).await.unwrap();
    }

    let width = BucketWidth::seconds(2);
    assert_eq!(
        indexed.aggregate(1000, 1010, &width, None).await.unwrap(),
        plain.aggregate(1000, 1010, &width, None).await.unwrap()
    );
}

#[tokio::test]
async fn concurrent_inserts_all_become_visible() {
    let (_dir, repo) = temp_repo(true).await;
    let repo = Arc::new(repo);

    let mut handles = Vec::new();
    for i in 0..20i64 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.insert_sample(&sample(2000 + i, "home", Some(i as f64), 0.0))
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    // One bucket per sample: loss or double counting would change the count
    // or the per-bucket means.
    let rows = repo
        .aggregate(2000, 2019, &BucketWidth::seconds(1), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 20);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.created_at, 2000 + i as i64);
        assert_eq!(row.latency, Some(i as f64));
    }
}
