mod common;

use common::FakeServer;
use kavita_updater::fetch::{fetch, http_client, ProgressReporter, BLOCK_SIZE};
use kavita_updater::UpdateError;

#[derive(Default)]
struct Recorder {
    reports: Vec<(u64, u64, u64)>,
    finished: bool,
}

impl ProgressReporter for Recorder {
    fn report(&mut self, blocks: u64, block_size: u64, total: u64) {
        self.reports.push((blocks, block_size, total));
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

#[test]
fn streams_body_and_reports_every_block() {
    let body: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let server = FakeServer::start(vec![("/asset.tar.gz", body.clone())]);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("asset.tar.gz");
    let client = http_client(None).unwrap();
    let mut rec = Recorder::default();

    let written = fetch(
        &client,
        &format!("{}/asset.tar.gz", server.base),
        &dest,
        &mut rec,
    )
    .unwrap();

    assert_eq!(written, 20_000);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    let bs = BLOCK_SIZE as u64;
    assert_eq!(
        rec.reports,
        vec![(0, bs, 20_000), (1, bs, 20_000), (2, bs, 20_000), (3, bs, 20_000)]
    );
    assert!(rec.finished);
}

#[test]
fn not_found_is_download_error() {
    let server = FakeServer::start(vec![]);
    let dir = tempfile::tempdir().unwrap();
    let client = http_client(Some(5)).unwrap();
    let mut rec = Recorder::default();

    let err = fetch(
        &client,
        &format!("{}/missing.tar.gz", server.base),
        &dir.path().join("x.tar.gz"),
        &mut rec,
    )
    .unwrap_err();

    match err {
        UpdateError::Download { reason, .. } => assert!(reason.contains("404")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(rec.reports.is_empty());
}
