#![allow(clippy::unwrap_used)]

// Integration tests for the document store: durability across reopen,
// mutation ordering, import merge semantics and failure isolation.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinSet;

use sitehub_core::{
    CoreError, DocumentStore, ErrorKind, ImportMode, MaintainerInput, SiteFilter, SiteInput,
    SitePatch, SiteType,
};

fn backing_file(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("sites.json")
}

async fn open(dir: &TempDir) -> DocumentStore {
    DocumentStore::open(backing_file(dir)).await.unwrap()
}

fn on_disk(dir: &TempDir) -> Value {
    serde_json::from_str(&fs::read_to_string(backing_file(dir)).unwrap()).unwrap()
}

fn patch(value: Value) -> SitePatch {
    serde_json::from_value(value).unwrap()
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test]
async fn open_creates_directory_and_empty_document() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;

    let disk = on_disk(&dir);
    assert_eq!(disk["version"], 1);
    assert_eq!(disk["sites"], json!([]));
    assert!(disk["updated_at"].as_str().unwrap().ends_with('Z'));
    assert!(store.list_sites(&SiteFilter::default()).is_empty());
}

#[tokio::test]
async fn corrupt_file_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    let path = backing_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{\"version\": 1, \"sites\": [").unwrap();

    let err = DocumentStore::open(&path).await.err().unwrap();
    assert!(matches!(err, CoreError::Corrupt { .. }));
    assert_eq!(err.kind(), ErrorKind::Fatal);
}

#[tokio::test]
async fn document_without_sites_opens_empty() {
    let dir = TempDir::new().unwrap();
    let path = backing_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"version":1,"updated_at":"2024-05-01T10:00:00.000Z"}"#).unwrap();

    let store = DocumentStore::open(&path).await.unwrap();
    assert!(store.export_data().sites.is_empty());
    store.create_site(SiteInput::new("A", "https://a.io")).await.unwrap();
    assert_eq!(on_disk(&dir)["sites"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn null_fields_in_backing_file_open_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = backing_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{"version":1,"updated_at":null,"sites":[
            {"id":"a","name":"A","url":"https://a.io","notes":null,"checkin_url":null}
        ]}"#,
    )
    .unwrap();

    let store = DocumentStore::open(&path).await.unwrap();
    let site = store.get_site("a").unwrap();
    assert_eq!(site.notes, "");
    assert_eq!(site.checkin_url, "");

    let updated = store
        .update_site("a", patch(json!({ "notes": "fixed" })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.notes, "fixed");
    assert_eq!(on_disk(&dir)["sites"][0]["notes"], "fixed");
    assert!(on_disk(&dir)["updated_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn site_without_name_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = backing_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"sites":[{"id":"a","url":"https://a.io"}]}"#).unwrap();

    let err = DocumentStore::open(&path).await.err().unwrap();
    assert!(matches!(err, CoreError::Corrupt { .. }));
}

#[tokio::test]
async fn stale_temp_file_is_ignored_and_removed() {
    let dir = TempDir::new().unwrap();
    let path = backing_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let tmp = path.with_file_name("sites.json.tmp");
    fs::write(&tmp, "{ truncated").unwrap();

    let store = DocumentStore::open(&path).await.unwrap();
    assert!(!tmp.exists());
    assert!(store.list_sites(&SiteFilter::default()).is_empty());
}

// ── CRUD ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_is_durable_across_reopen() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;

    let created = store
        .create_site(
            SiteInput {
                site_type: Some(SiteType::NewApi),
                api_key: Some("sk-1".into()),
                api_user_id: Some("42".into()),
                tags: Some(vec!["relay".into()]),
                ..SiteInput::new("Cloud Relay", "https://cloud.example.com")
            }
            .with_maintainers(&[MaintainerInput {
                name: "Ops".into(),
                ..MaintainerInput::default()
            }]),
        )
        .await
        .unwrap();
    assert!(created.id.as_str().starts_with("site_"));
    assert!(created.has_credentials());
    let exported = store.export_data();
    drop(store);

    let reopened = open(&dir).await;
    assert_eq!(reopened.export_data(), exported);
    assert_eq!(reopened.get_site(created.id.as_str()), Some(created));
}

#[tokio::test]
async fn create_ignores_caller_supplied_id() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;

    let first = store
        .create_site(SiteInput {
            id: Some("site_fixed".into()),
            ..SiteInput::new("A", "https://a.io")
        })
        .await
        .unwrap();
    assert_ne!(first.id, "site_fixed");
}

#[tokio::test]
async fn invalid_create_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let before = fs::read_to_string(backing_file(&dir)).unwrap();

    let err = store
        .create_site(SiteInput::new("", "https://x.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClientInput);
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = store
        .create_site(SiteInput::new("X", "not a url"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "url: url must be a valid URL");

    assert_eq!(fs::read_to_string(backing_file(&dir)).unwrap(), before);
    assert!(store.export_data().sites.is_empty());
}

#[tokio::test]
async fn partial_update_touches_only_named_fields() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let original = store
        .create_site(SiteInput {
            is_checkin: Some(true),
            tags: Some(vec!["a".into(), "b".into()]),
            notes: Some("before".into()),
            ..SiteInput::new("A", "https://a.io")
        })
        .await
        .unwrap();

    let updated = store
        .update_site(original.id.as_str(), patch(json!({ "notes": "hi" })))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.notes, "hi");
    assert!(updated.updated_at >= original.updated_at);
    let mut expected = original.clone();
    expected.notes = "hi".into();
    expected.updated_at = updated.updated_at;
    assert_eq!(updated, expected);
}

#[tokio::test]
async fn update_rejects_empty_required_fields() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let site = store
        .create_site(SiteInput::new("A", "https://a.io"))
        .await
        .unwrap();

    let err = store
        .update_site(site.id.as_str(), patch(json!({ "url": "   " })))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "url"));
    assert_eq!(store.get_site(site.id.as_str()), Some(site));
}

#[tokio::test]
async fn update_null_clears_credentials() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let site = store
        .create_site(SiteInput {
            site_type: Some(SiteType::NewApi),
            api_key: Some("sk".into()),
            api_user_id: Some("7".into()),
            ..SiteInput::new("A", "https://a.io")
        })
        .await
        .unwrap();

    let updated = store
        .update_site(
            site.id.as_str(),
            patch(json!({ "api_key": null, "api_user_id": null })),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.api_key, None);
    assert!(!updated.has_credentials());
}

#[tokio::test]
async fn missing_ids_do_not_write() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let before = store.export_data();

    assert_eq!(
        store
            .update_site("site_nope", patch(json!({ "notes": "x" })))
            .await
            .unwrap(),
        None
    );
    assert!(!store.delete_site("site_nope").await.unwrap());
    assert_eq!(store.export_data(), before);
}

#[tokio::test]
async fn delete_removes_site_durably() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let a = store.create_site(SiteInput::new("A", "https://a.io")).await.unwrap();
    let b = store.create_site(SiteInput::new("B", "https://b.io")).await.unwrap();

    assert!(store.delete_site(a.id.as_str()).await.unwrap());
    drop(store);

    let reopened = open(&dir).await;
    let ids: Vec<_> = reopened
        .list_sites(&SiteFilter::default())
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![b.id]);
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn filters_compose_with_and() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    for (name, url, checkin) in [
        ("Cloud A", "https://a.io", true),
        ("Cloud B", "https://b.io", false),
        ("Other", "https://cloud.example", true),
        ("Plain", "https://plain.io", true),
    ] {
        store
            .create_site(SiteInput {
                is_checkin: Some(checkin),
                ..SiteInput::new(name, url)
            })
            .await
            .unwrap();
    }

    let names: Vec<_> = store
        .list_sites(&SiteFilter::default().text("cloud").checkin(true))
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Cloud A", "Other"]);
}

#[tokio::test]
async fn reads_are_independent_copies() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let site = store.create_site(SiteInput::new("A", "https://a.io")).await.unwrap();

    let mut listed = store.list_sites(&SiteFilter::default());
    listed[0].name = "mutated".into();
    let mut exported = store.export_data();
    exported.sites.clear();

    assert_eq!(store.get_site(site.id.as_str()).unwrap().name, "A");
    assert_eq!(store.export_data().sites.len(), 1);
}

#[tokio::test]
async fn tags_are_sorted_and_unique() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    for tags in [vec!["beta", " alpha "], vec!["alpha", "gamma"]] {
        store
            .create_site(SiteInput {
                tags: Some(tags.into_iter().map(String::from).collect()),
                ..SiteInput::new("S", "https://s.io")
            })
            .await
            .unwrap();
    }
    assert_eq!(store.list_tags(), vec!["alpha", "beta", "gamma"]);
}

// ── Import / export ─────────────────────────────────────────────────

#[tokio::test]
async fn upsert_updates_matching_id_and_creates_the_rest() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let payload = json!({ "sites": [{ "id": "site_1", "name": "A", "url": "https://a.io" }] });

    let report = store.import_data(&payload, ImportMode::Upsert).await.unwrap();
    assert_eq!((report.created_sites, report.updated_sites), (1, 0));
    let created = store.get_site("site_1").unwrap();

    let payload = json!({ "sites": [{ "id": "site_1", "name": "A2", "url": "https://a.io" }] });
    let report = store.import_data(&payload, ImportMode::Upsert).await.unwrap();
    assert_eq!((report.created_sites, report.updated_sites), (0, 1));
    assert_eq!(report.imported_sites, 1);
    assert!(!report.replaced);

    let merged = store.get_site("site_1").unwrap();
    assert_eq!(merged.name, "A2");
    assert_eq!(merged.created_at, created.created_at);
    assert_eq!(store.export_data().sites.len(), 1);
}

#[tokio::test]
async fn replace_substitutes_the_whole_set() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    store.create_site(SiteInput::new("Old", "https://old.io")).await.unwrap();

    let payload = json!({ "sites": [
        { "id": "site_x", "name": " X ", "url": "https://x.io", "tags": ["t"] },
        { "name": "Y", "url": "https://y.io", "created_at": "2023-01-02T03:04:05.000Z" }
    ]});
    let report = store.import_data(&payload, ImportMode::Replace).await.unwrap();
    assert_eq!(report.created_sites, 2);
    assert_eq!(report.updated_sites, 0);
    assert!(report.replaced);

    let sites = store.list_sites(&SiteFilter::default());
    let names: Vec<_> = sites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["X", "Y"]);
    assert_eq!(sites[0].id, "site_x");
    assert_eq!(sites[1].created_at.to_string(), "2023-01-02T03:04:05.000Z");
}

#[tokio::test]
async fn invalid_record_rejects_the_whole_batch() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    store.create_site(SiteInput::new("Keep", "https://keep.io")).await.unwrap();
    let before = store.export_data();

    let payload = json!({ "sites": [
        { "name": "Fine", "url": "https://fine.io" },
        { "name": "", "url": "https://broken.io" }
    ]});
    for mode in [ImportMode::Upsert, ImportMode::Replace] {
        let err = store.import_data(&payload, mode).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "sites[1].name"));
    }

    let err = store
        .import_data(&json!({ "items": [] }), ImportMode::Upsert)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid import format: sites array required");
    assert_eq!(store.export_data(), before);
}

#[tokio::test]
async fn export_then_replace_round_trips_content() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    store
        .create_site(SiteInput {
            is_benefit: Some(true),
            benefit_url: Some("https://a.io/gift".into()),
            ..SiteInput::new("A", "https://a.io")
        })
        .await
        .unwrap();
    store.create_site(SiteInput::new("B", "https://b.io")).await.unwrap();

    let before = store.export_data();
    let payload = serde_json::to_value(&before).unwrap();
    store.import_data(&payload, ImportMode::Replace).await.unwrap();
    let after = store.export_data();

    assert_eq!(after.sites.len(), before.sites.len());
    for (old, new) in before.sites.iter().zip(&after.sites) {
        let mut new = new.clone();
        new.updated_at = old.updated_at;
        assert_eq!(&new, old);
    }
}

// ── Ordering & failure isolation ────────────────────────────────────

#[tokio::test]
async fn concurrent_creates_get_unique_ids_and_ordered_stamps() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;

    let mut tasks = JoinSet::new();
    for i in 0..40 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .create_site(SiteInput::new(format!("site {i}"), "https://s.io"))
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let sites = store.list_sites(&SiteFilter::default());
    let ids: HashSet<_> = sites.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids.len(), 40);
    assert!(sites.windows(2).all(|w| w[0].updated_at <= w[1].updated_at));

    drop(store);
    let reopened = open(&dir).await;
    assert_eq!(reopened.export_data().sites.len(), 40);
}

#[tokio::test]
async fn failed_persist_rolls_back_and_queue_continues() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let updates = store.subscribe();
    let before = store.export_data();

    // A directory squatting on the temp path makes the write fail.
    let blocker = backing_file(&dir).with_file_name("sites.json.tmp");
    fs::create_dir(&blocker).unwrap();

    let err = store
        .create_site(SiteInput::new("Lost", "https://lost.io"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(store.export_data(), before);
    assert!(!updates.has_changed().unwrap());

    fs::remove_dir(&blocker).unwrap();
    let kept = store
        .create_site(SiteInput::new("Kept", "https://kept.io"))
        .await
        .unwrap();
    assert!(updates.has_changed().unwrap());

    drop(store);
    let reopened = open(&dir).await;
    let names: Vec<_> = reopened
        .list_sites(&SiteFilter::default())
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec![kept.name]);
}

#[tokio::test]
async fn root_updated_at_never_moves_backwards() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let mut last = store.export_data().updated_at;

    for i in 0..5 {
        store
            .create_site(SiteInput::new(format!("S{i}"), "https://s.io"))
            .await
            .unwrap();
        let now = store.export_data().updated_at;
        assert!(now >= last);
        last = now;
    }
    assert_eq!(on_disk(&dir)["updated_at"], json!(last.to_string()));
}
