use std::path::{Path, PathBuf};
use std::sync::Mutex;

use random_ipfs_nft_scripts::ipfs::{IpfsPinner, PinResponse};
use random_ipfs_nft_scripts::token_uri::{build_token_uris, fallback_token_uris, pup_template};

/// In-memory pinner that records what was pinned and hands out predictable
/// hashes, optionally failing after a set number of pins.
struct RecordingPinner {
    files: Mutex<Vec<PathBuf>>,
    documents: Mutex<Vec<(String, serde_json::Value)>>,
    fail_after: Option<usize>,
    counter: Mutex<usize>,
}

impl RecordingPinner {
    fn new() -> Self {
        Self {
            files: Mutex::new(Vec::new()),
            documents: Mutex::new(Vec::new()),
            fail_after: None,
            counter: Mutex::new(0),
        }
    }

    fn failing_after(pins: usize) -> Self {
        Self {
            fail_after: Some(pins),
            ..Self::new()
        }
    }

    fn next_pin(&self, kind: &str) -> anyhow::Result<PinResponse> {
        let mut counter = self.counter.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if *counter >= limit {
                anyhow::bail!("pin quota exhausted");
            }
        }
        *counter += 1;
        Ok(PinResponse {
            ipfs_hash: format!("Qm{kind}{counter:04}"),
            pin_size: 42,
            timestamp: "2023-01-01T00:00:00.000Z".to_owned(),
        })
    }

    fn pin_count(&self) -> usize {
        *self.counter.lock().unwrap()
    }
}

impl IpfsPinner for RecordingPinner {
    async fn pin_file(&self, path: &Path) -> anyhow::Result<PinResponse> {
        let response = self.next_pin("File")?;
        self.files.lock().unwrap().push(path.to_path_buf());
        Ok(response)
    }

    async fn pin_json(&self, name: &str, content: &serde_json::Value) -> anyhow::Result<PinResponse> {
        let response = self.next_pin("Json")?;
        self.documents
            .lock()
            .unwrap()
            .push((name.to_owned(), content.clone()));
        Ok(response)
    }
}

fn image_dir_with(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for name in names {
        std::fs::write(dir.path().join(name), b"\x89PNG\r\n\x1a\nfake").expect("Failed to write image");
    }
    dir
}

#[tokio::test]
async fn upload_produces_one_uri_per_image_in_filename_order() {
    let dir = image_dir_with(&["shiba-inu.png", "pug.png", "st-bernard.png"]);
    let pinner = RecordingPinner::new();

    let uris = build_token_uris(true, &pinner, dir.path(), &pup_template())
        .await
        .expect("Upload should succeed");

    assert_eq!(uris.len(), 3);
    assert!(uris.iter().all(|uri| uri.starts_with("ipfs://QmJson")));

    let files = pinner.files.lock().unwrap();
    let pinned_names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(pinned_names, vec!["pug.png", "shiba-inu.png", "st-bernard.png"]);

    let documents = pinner.documents.lock().unwrap();
    assert_eq!(documents.len(), 3);
    let (name, content) = &documents[0];
    assert_eq!(name, "pug");
    assert_eq!(content["description"], "An adorable pug pup!");
    assert!(content["image"]
        .as_str()
        .unwrap()
        .starts_with("ipfs://QmFile"));
}

#[tokio::test]
async fn disabled_upload_returns_fallback_and_ignores_directory() {
    let dir = image_dir_with(&["pug.png"]);
    let pinner = RecordingPinner::new();

    let uris = build_token_uris(false, &pinner, dir.path(), &pup_template())
        .await
        .expect("Fallback should succeed");

    assert_eq!(uris, fallback_token_uris());
    assert_eq!(pinner.pin_count(), 0);
}

#[tokio::test]
async fn disabled_upload_does_not_touch_missing_directory() {
    let pinner = RecordingPinner::new();

    let uris = build_token_uris(false, &pinner, Path::new("no/such/directory"), &pup_template())
        .await
        .expect("Fallback should not read the directory");

    assert_eq!(uris, fallback_token_uris());
}

#[tokio::test]
async fn failed_upload_aborts_with_no_partial_result() {
    let dir = image_dir_with(&["pug.png", "shiba-inu.png", "st-bernard.png"]);
    // Enough quota for the first image and its metadata plus one more file pin.
    let pinner = RecordingPinner::failing_after(3);

    let result = build_token_uris(true, &pinner, dir.path(), &pup_template()).await;

    assert!(result.is_err());
    assert_eq!(pinner.pin_count(), 3);
}

#[tokio::test]
async fn empty_directory_yields_empty_sequence() {
    let dir = image_dir_with(&[]);
    let pinner = RecordingPinner::new();

    let uris = build_token_uris(true, &pinner, dir.path(), &pup_template())
        .await
        .expect("Empty directory is not an error");

    assert!(uris.is_empty());
    assert_eq!(pinner.pin_count(), 0);
}
