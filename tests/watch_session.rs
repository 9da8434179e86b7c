use std::fs;
use std::path::Path;
use std::time::Duration;

use sha1::{Digest, Sha1};
use tempfile::TempDir;
use tokio::time::timeout;
use torwatch::{DirWatch, Event, InfoHash};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const HASH_C: &str = "cccccccccccccccccccccccccccccccccccccccc";

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn magnet_uri(hex: &str) -> String {
    format!("magnet:?xt=urn:btih:{hex}")
}

fn bstr(s: &str) -> String {
    format!("{}:{}", s.len(), s)
}

fn torrent_doc(name: &str) -> (Vec<u8>, InfoHash) {
    let info = format!(
        "d{}{}{}i16384e{}0:e",
        bstr("name"),
        bstr(name),
        bstr("piece length"),
        bstr("pieces"),
    );
    let doc = format!("d{}{}e", bstr("info"), info);
    let digest: [u8; 20] = Sha1::digest(info.as_bytes()).into();
    (doc.into_bytes(), InfoHash::new(digest))
}

async fn next_event(watch: &mut DirWatch) -> Event {
    timeout(Duration::from_secs(5), watch.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream closed early")
}

async fn assert_stream_ends(watch: &mut DirWatch) {
    let end = timeout(Duration::from_secs(5), watch.recv())
        .await
        .expect("timed out waiting for the stream to close");
    assert_eq!(end, None);
}

/// Land a complete file in the watched directory via a staging rename, so
/// the watcher never observes a half-written file: the only notification
/// for the final name is the rename itself.
fn place_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) {
    let staged = dir.join(format!("{name}.part"));
    fs::write(&staged, contents).unwrap();
    fs::rename(&staged, dir.join(name)).unwrap();
}

#[tokio::test]
async fn baseline_scan_reports_identities_present_at_startup() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("links.magnet"),
        format!("{}\n{}\n", magnet_uri(HASH_A), magnet_uri(HASH_B)),
    )
    .unwrap();

    let mut watch = DirWatch::new(tmp.path()).unwrap();

    let first = next_event(&mut watch).await;
    let second = next_event(&mut watch).await;
    assert!(matches!(first, Event::Added { .. }));
    assert!(matches!(second, Event::Added { .. }));

    let mut hashes = vec![first.info_hash().to_hex(), second.info_hash().to_hex()];
    hashes.sort();
    assert_eq!(hashes, vec![HASH_A.to_owned(), HASH_B.to_owned()]);
}

#[tokio::test]
async fn baseline_reports_descriptor_files_with_their_path() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("present.torrent");
    let (doc, hash) = torrent_doc("present");
    fs::write(&path, &doc).unwrap();

    let mut watch = DirWatch::new(tmp.path()).unwrap();

    match next_event(&mut watch).await {
        Event::Added {
            info_hash,
            magnet_uri,
            torrent_file_path,
        } => {
            assert_eq!(info_hash, hash);
            assert_eq!(magnet_uri, None);
            assert_eq!(torrent_file_path.as_deref(), Some(path.as_path()));
        }
        other => panic!("expected an addition, got {other:?}"),
    }
}

#[tokio::test]
async fn closing_immediately_still_delivers_the_baseline() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("links.magnet"), magnet_uri(HASH_A)).unwrap();

    let mut watch = DirWatch::new(tmp.path()).unwrap();
    watch.close().unwrap();

    let event = next_event(&mut watch).await;
    assert!(matches!(event, Event::Added { .. }));
    assert_eq!(event.info_hash().to_hex(), HASH_A);

    assert_stream_ends(&mut watch).await;
}

#[tokio::test]
async fn file_creation_and_removal_drive_events() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    let mut watch = DirWatch::new(tmp.path()).unwrap();

    place_file(tmp.path(), "one.magnet", magnet_uri(HASH_A));
    let added = next_event(&mut watch).await;
    assert!(matches!(added, Event::Added { .. }));
    assert_eq!(added.info_hash().to_hex(), HASH_A);

    fs::remove_file(tmp.path().join("one.magnet")).unwrap();
    let removed = next_event(&mut watch).await;
    assert_eq!(
        removed,
        Event::Removed {
            info_hash: InfoHash::from_hex(HASH_A).unwrap()
        }
    );

    watch.close().unwrap();
    assert_stream_ends(&mut watch).await;
}

#[tokio::test]
async fn in_place_edits_are_not_detected_until_the_next_trigger() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("one.magnet"), magnet_uri(HASH_A)).unwrap();

    let mut watch = DirWatch::new(tmp.path()).unwrap();
    assert_eq!(next_event(&mut watch).await.info_hash().to_hex(), HASH_A);

    // Rewriting the file in place only produces write notifications, which
    // do not trigger a rescan.
    fs::write(tmp.path().join("one.magnet"), magnet_uri(HASH_B)).unwrap();
    let quiet = timeout(Duration::from_millis(500), watch.recv()).await;
    assert!(quiet.is_err(), "in-place edit should not emit: {quiet:?}");

    // The next creation does trigger one, and the rescan also surfaces the
    // earlier edit: identity A is gone, identities B and C are new.
    place_file(tmp.path(), "two.magnet", magnet_uri(HASH_C));

    let first = next_event(&mut watch).await;
    assert_eq!(
        first,
        Event::Removed {
            info_hash: InfoHash::from_hex(HASH_A).unwrap()
        }
    );

    let mut added = vec![
        next_event(&mut watch).await.info_hash().to_hex(),
        next_event(&mut watch).await.info_hash().to_hex(),
    ];
    added.sort();
    assert_eq!(added, vec![HASH_B.to_owned(), HASH_C.to_owned()]);
}

#[tokio::test]
async fn closing_twice_is_a_no_op() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    let mut watch = DirWatch::new(tmp.path()).unwrap();

    watch.close().unwrap();
    watch.close().unwrap();
    assert_stream_ends(&mut watch).await;
}

#[tokio::test]
async fn construction_fails_when_the_directory_is_missing() {
    init_logs();
    let tmp = TempDir::new().unwrap();
    assert!(DirWatch::new(tmp.path().join("missing")).is_err());
}
