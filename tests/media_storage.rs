//! Filesystem media storage behavior: storing, reading back, deleting, and
//! refusing traversal paths.

use bytes::Bytes;
use mortar::infra::media::{MediaStorage, public_url};

#[tokio::test]
async fn store_read_delete_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = MediaStorage::new(tmp.path().to_path_buf()).unwrap();

    let stored = storage
        .store("Front Elevation.JPG", Bytes::from_static(b"fake image bytes"))
        .await
        .expect("stores");

    assert!(stored.stored_path.ends_with("front-elevation.jpg"));
    assert_eq!(stored.size_bytes, 16);
    assert_eq!(stored.checksum.len(), 64);

    let read_back = storage.read(&stored.stored_path).await.expect("reads");
    assert_eq!(read_back, Bytes::from_static(b"fake image bytes"));

    storage.delete(&stored.stored_path).await.expect("deletes");
    assert!(storage.read(&stored.stored_path).await.is_err());

    // Deleting an already-missing payload is success.
    storage
        .delete(&stored.stored_path)
        .await
        .expect("idempotent delete");
}

#[tokio::test]
async fn empty_payloads_are_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = MediaStorage::new(tmp.path().to_path_buf()).unwrap();

    assert!(storage.store("empty.png", Bytes::new()).await.is_err());
}

#[tokio::test]
async fn traversal_paths_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = MediaStorage::new(tmp.path().to_path_buf()).unwrap();

    assert!(storage.read("../outside.txt").await.is_err());
    assert!(storage.read("/etc/passwd").await.is_err());
}

#[test]
fn public_urls_respect_the_configured_base() {
    assert_eq!(public_url("/media", "2026/08/x.jpg"), "/media/2026/08/x.jpg");
    assert_eq!(
        public_url("https://cdn.example.com/assets", "x.jpg"),
        "https://cdn.example.com/assets/x.jpg"
    );
}
