mod common;

use common::{png, write_script, FakeCompressor};
use png_batch_optimizer::packager::{ARCHIVE_FILENAME, PNG_CONTENT_TYPE, ZIP_CONTENT_TYPE};
use png_batch_optimizer::{
    BatchError, BatchOptimizer, CompressionOutcome, Config, ExternalCompressor, FailureReason,
    OutputShape, UploadItem,
};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use zip::ZipArchive;

fn optimizer(compressor: FakeCompressor) -> BatchOptimizer<FakeCompressor> {
    BatchOptimizer::with_compressor(Config::default(), compressor)
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

fn archive_entries(body: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(body)).unwrap();
    (0..archive.len())
        .map(|index| {
            let mut entry = archive.by_index(index).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

#[tokio::test]
async fn test_single_item_compressed() {
    let optimizer = optimizer(FakeCompressor::fixed_output(8_000));

    let payload = optimizer.optimize(vec![png("logo.png", 10_000)]).await.unwrap();

    assert_eq!(payload.filename, "logo.png");
    assert_eq!(payload.content_type, PNG_CONTENT_TYPE);
    assert_eq!(payload.body, vec![0xAB; 8_000]);

    let stats = &payload.stats[0];
    assert_eq!(stats.original_size, 10_000);
    assert_eq!(stats.final_size, 8_000);
    assert_eq!(stats.percent_reduction, 20.0);
    assert!(stats.used_compressed);
    assert_eq!(
        payload.stats_header().unwrap(),
        r#"[{"filename":"logo.png","original_size":10000,"final_size":8000,"percent_reduction":20.0,"used_compressed":true}]"#
    );
}

#[tokio::test]
async fn test_worse_output_keeps_original() {
    let optimizer = optimizer(FakeCompressor::fixed_output(600));
    let original = png("icon.png", 500);

    let payload = optimizer.optimize(vec![original.clone()]).await.unwrap();

    assert_eq!(payload.body, original.bytes);
    let stats = &payload.stats[0];
    assert_eq!(stats.original_size, 500);
    assert_eq!(stats.final_size, 500);
    assert_eq!(stats.percent_reduction, 0.0);
    assert!(!stats.used_compressed);
}

#[tokio::test]
async fn test_no_improvement_returns_original_bytes() {
    let optimizer = optimizer(FakeCompressor::new(|input| {
        CompressionOutcome::Compressed(input.iter().rev().copied().collect())
    }));
    let original = UploadItem::new("already.png", (0u8..=255).collect::<Vec<_>>());

    let payload = optimizer.optimize(vec![original.clone()]).await.unwrap();

    assert_eq!(payload.body, original.bytes);
    assert!(!payload.stats[0].used_compressed);
}

#[tokio::test]
async fn test_three_items_make_an_archive() {
    let optimizer = optimizer(FakeCompressor::new(|input| {
        CompressionOutcome::Compressed(input[..input.len() / 2].to_vec())
    }));

    let payload = optimizer
        .optimize(vec![png("c.png", 400), png("a.png", 200), png("b.png", 800)])
        .await
        .unwrap();

    assert_eq!(payload.filename, ARCHIVE_FILENAME);
    assert_eq!(payload.content_type, ZIP_CONTENT_TYPE);

    let names: Vec<_> = payload.stats.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(names, vec!["c.png", "a.png", "b.png"]);

    let entries = archive_entries(payload.body);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], ("c.png".to_string(), vec![0x89; 200]));
    assert_eq!(entries[1], ("a.png".to_string(), vec![0x89; 100]));
    assert_eq!(entries[2], ("b.png".to_string(), vec![0x89; 400]));
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let compressor = FakeCompressor::fixed_output(1);
    let optimizer = optimizer(compressor);

    let err = optimizer.run(Vec::new()).await.unwrap_err();

    assert!(matches!(err, BatchError::BatchEmpty));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_validation_never_invokes_compressor() {
    let root = TempDir::new().unwrap();
    let cases: Vec<Vec<UploadItem>> = vec![
        Vec::new(),
        (0..11).map(|i| png(&format!("{}.png", i), 10)).collect(),
        vec![png("a.png", 10), png("photo.jpg", 10)],
        vec![png("a.png", 10), UploadItem::new("empty.png", Vec::new())],
    ];

    for items in cases {
        let optimizer = BatchOptimizer::with_compressor(Config::default(), FakeCompressor::fixed_output(1))
            .with_workspace_root(root.path());
        assert!(optimizer.run(items).await.unwrap_err().is_client_error());
        assert_eq!(optimizer_calls(&optimizer), 0);
    }
    assert!(is_empty_dir(root.path()));
}

fn optimizer_calls(optimizer: &BatchOptimizer<FakeCompressor>) -> usize {
    optimizer.compressor().calls()
}

#[tokio::test]
async fn test_batch_too_large_uses_configured_maximum() {
    let config = Config {
        max_items: 2,
        ..Default::default()
    };
    let optimizer = BatchOptimizer::with_compressor(config, FakeCompressor::fixed_output(1));

    let err = optimizer
        .run(vec![png("a.png", 10), png("b.png", 10), png("c.png", 10)])
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::BatchTooLarge { count: 3, max: 2 }));
}

#[tokio::test]
async fn test_compression_failure_degrades_one_item() {
    let optimizer = optimizer(FakeCompressor::new(|input| {
        if input.len() == 300 {
            CompressionOutcome::Failed(FailureReason::ExitStatus { code: Some(99) })
        } else {
            CompressionOutcome::Compressed(vec![1; input.len() - 100])
        }
    }));

    let result = optimizer
        .run(vec![png("a.png", 200), png("b.png", 300), png("c.png", 400)])
        .await
        .unwrap();

    assert_eq!(result.shape, OutputShape::Archive);
    let stats = result.stats();
    assert_eq!(stats.len(), 3);
    assert!(stats[0].used_compressed);
    assert!(!stats[1].used_compressed);
    assert_eq!(stats[1].final_size, 300);
    assert_eq!(stats[1].percent_reduction, 0.0);
    assert!(stats[2].used_compressed);
    assert_eq!(stats[2].percent_reduction, 25.0);
    assert_eq!(result.items[1].winning_bytes, vec![0x89; 300]);
}

#[tokio::test]
async fn test_order_preserved_when_later_items_finish_first() {
    let config = Config {
        workers: 4,
        ..Default::default()
    };
    // larger inputs finish sooner
    let compressor = FakeCompressor::new(|input| CompressionOutcome::Compressed(vec![2; input.len() - 1]))
        .with_delay(|input| Duration::from_millis(200 - input.len() as u64 * 4));
    let optimizer = BatchOptimizer::with_compressor(config, compressor);

    let items: Vec<_> = (1..=4).map(|i| png(&format!("{}.png", i), i * 10)).collect();
    let result = optimizer.run(items).await.unwrap();

    let names: Vec<_> = result.items.iter().map(|item| item.filename().to_string()).collect();
    assert_eq!(names, vec!["1.png", "2.png", "3.png", "4.png"]);
    assert!(optimizer.compressor().max_in_flight() >= 2);
}

#[tokio::test]
async fn test_concurrency_is_bounded_by_workers() {
    let config = Config {
        workers: 2,
        ..Default::default()
    };
    let compressor =
        FakeCompressor::fixed_output(1).with_delay(|_| Duration::from_millis(20));
    let optimizer = BatchOptimizer::with_compressor(config, compressor);

    let items: Vec<_> = (0..6).map(|i| png(&format!("{}.png", i), 10)).collect();
    let result = optimizer.run(items).await.unwrap();

    assert_eq!(result.items.len(), 6);
    assert_eq!(optimizer.compressor().calls(), 6);
    assert!(optimizer.compressor().max_in_flight() <= 2);
}

#[tokio::test]
async fn test_workspace_removed_after_success() {
    let root = TempDir::new().unwrap();
    let optimizer = BatchOptimizer::with_compressor(Config::default(), FakeCompressor::fixed_output(5))
        .with_workspace_root(root.path());

    optimizer
        .optimize(vec![png("a.png", 10), png("b.png", 10)])
        .await
        .unwrap();

    assert!(is_empty_dir(root.path()));
}

#[tokio::test]
async fn test_workspace_removed_when_cancelled() {
    let root = TempDir::new().unwrap();
    let compressor = FakeCompressor::fixed_output(5).with_delay(|_| Duration::from_secs(30));
    let optimizer = BatchOptimizer::with_compressor(Config::default(), compressor)
        .with_workspace_root(root.path());

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        optimizer.run(vec![png("a.png", 10), png("b.png", 10)]),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(optimizer.compressor().calls(), 2);
    assert!(is_empty_dir(root.path()));
}

#[tokio::test]
async fn test_duplicate_filenames_are_all_packaged() {
    let optimizer = optimizer(FakeCompressor::fixed_output(3));

    let payload = optimizer
        .optimize(vec![png("same.png", 10), png("same.png", 20)])
        .await
        .unwrap();

    assert!(payload.stats.iter().all(|s| s.filename == "same.png"));
    let names: Vec<_> = archive_entries(payload.body).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["same.png", "same (2).png"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_external_compressor_end_to_end() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "head -c 8000 \"$5\" > \"$4\"\n");
    let config = Config {
        compressor: PathBuf::from("sh"),
        compressor_args: vec![script.to_string_lossy().into_owned()],
        ..Default::default()
    };
    let compressor = ExternalCompressor::new(&config);
    let root = TempDir::new().unwrap();
    let optimizer = BatchOptimizer::with_compressor(config, compressor).with_workspace_root(root.path());

    let payload = optimizer
        .optimize(vec![png("big.png", 10_000), png("small.png", 500)])
        .await
        .unwrap();

    assert_eq!(payload.stats[0].final_size, 8_000);
    assert_eq!(payload.stats[0].percent_reduction, 20.0);
    // the script copies small inputs unchanged, which is no improvement
    assert!(!payload.stats[1].used_compressed);
    assert_eq!(payload.stats[1].final_size, 500);
    assert!(is_empty_dir(root.path()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_external_compressor_failure_falls_back() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "exit 1\n");
    let config = Config {
        compressor: PathBuf::from("sh"),
        compressor_args: vec![script.to_string_lossy().into_owned()],
        ..Default::default()
    };
    let compressor = ExternalCompressor::new(&config);
    let optimizer = BatchOptimizer::with_compressor(config, compressor);

    let payload = optimizer.optimize(vec![png("a.png", 64)]).await.unwrap();

    assert_eq!(payload.body, vec![0x89; 64]);
    assert!(!payload.stats[0].used_compressed);
}
