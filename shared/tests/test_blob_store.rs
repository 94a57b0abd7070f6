use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use inkpost_shared::BlobStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doc {
    name: String,
    count: u32,
    tags: Vec<String>,
}

fn sample_doc() -> Doc {
    Doc {
        name: "sample".to_string(),
        count: 7,
        tags: vec!["a".to_string(), "b".to_string()],
    }
}

fn store(dir: &TempDir) -> BlobStore {
    BlobStore::local_only(dir.path()).expect("open local store")
}

#[tokio::test]
async fn seed_on_read_persists_default_once() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(&dir);

    let first = store.get_or_init("doc.json", sample_doc()).await;
    assert!(first.was_initialized);
    assert_eq!(first.value, sample_doc());

    // The default is now on disk; the second read must not re-seed.
    let second = store.get_or_init("doc.json", sample_doc()).await;
    assert!(!second.was_initialized);
    assert_eq!(second.value, sample_doc());
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(&dir);

    let doc = Doc {
        name: "updated".to_string(),
        count: 42,
        tags: vec!["x".to_string()],
    };
    store.write("doc.json", &doc).await;

    let read = store.get_or_init("doc.json", sample_doc()).await;
    assert!(!read.was_initialized);
    assert_eq!(read.value, doc);
}

#[tokio::test]
async fn delete_is_best_effort_and_idempotent() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(&dir);

    store.write("doc.json", &sample_doc()).await;
    store.delete("doc.json").await;

    let read = store.get_or_init("doc.json", sample_doc()).await;
    assert!(read.was_initialized, "document should be gone after delete");

    // Deleting an absent key is a no-op.
    store.delete("never-existed.json").await;
}

#[tokio::test]
async fn put_file_round_trips_with_content_type() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(&dir);

    let bytes = Bytes::from_static(b"\x89PNG fake image data");
    let url = store
        .put_file("123-abcdefghi.png", bytes.clone(), "image/png")
        .await
        .expect("store file");
    assert_eq!(url, "/uploads/123-abcdefghi.png");

    let file = store
        .get_file("123-abcdefghi.png")
        .await
        .expect("file present");
    assert_eq!(file.bytes, bytes);
    assert_eq!(file.content_type, "image/png");
}

#[tokio::test]
async fn get_file_reports_absence_as_none() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(&dir);
    assert!(store.get_file("missing.png").await.is_none());
}

#[tokio::test]
async fn uploads_live_apart_from_documents() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(&dir);

    store
        .put_file("doc.json", Bytes::from_static(b"not json"), "image/png")
        .await
        .expect("store file");

    // The JSON document under the same name is untouched.
    let read = store.get_or_init::<Doc>("doc.json", sample_doc()).await;
    assert!(read.was_initialized);
}
