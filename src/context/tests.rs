//! Tests for the picker context: session switching, mirroring to both
//! backends, media and snapshots.

use super::*;
use crate::catalog::Coat;
use crate::persistence::keys;
use serde_json::Value;

struct Harness {
    ctx: PickerContext,
    local: Arc<MemoryLocalStore>,
    documents: Arc<MemoryDocumentStore>,
    objects: Arc<MemoryObjectStorage>,
}

async fn harness_with(config: CoreConfig) -> Harness {
    let local = Arc::new(MemoryLocalStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let objects = Arc::new(MemoryObjectStorage::new());
    let stores = Stores::local(local.clone()).with_remote(documents.clone(), objects.clone());
    let ctx = PickerContext::open(config, stores).await.unwrap().with_seed(42);
    Harness {
        ctx,
        local,
        documents,
        objects,
    }
}

async fn harness() -> Harness {
    harness_with(CoreConfig::default()).await
}

fn polish(name: &str, color: &str) -> Item {
    Item::Polish(Polish::new(name, "Brand", vec![color.to_string()], "creme"))
}

/// Two polishes and one glossy finisher.
async fn stock(ctx: &mut PickerContext) {
    ctx.add_item(polish("Red1", "red")).await.unwrap();
    ctx.add_item(polish("Blue1", "blue")).await.unwrap();
    ctx.add_item(Item::Finisher(Coat::new("Shine", "Brand", "glossy")))
        .await
        .unwrap();
}

async fn confirm_one(ctx: &mut PickerContext) -> Combination {
    let outcome = ctx.pick(&PickFilters::default()).unwrap();
    ctx.confirm(outcome.candidate).await.unwrap()
}

fn polish_names(ctx: &PickerContext) -> Vec<String> {
    ctx.catalog().polishes.iter().map(|p| p.name.clone()).collect()
}

fn stored_len(local: &MemoryLocalStore, key: &str) -> Option<usize> {
    local.get(key).and_then(|v| v.as_array().map(Vec::len))
}

async fn sign_in(h: &mut Harness, uid: &str) {
    h.ctx.on_session_changed(Some(UserIdentity::new(uid))).await.unwrap();
}

// ============================================================================
// Catalog and attributes
// ============================================================================

#[tokio::test]
async fn test_duplicate_add_leaves_catalog_unchanged() {
    let mut h = harness().await;
    h.ctx.add_item(polish("Big Apple Red", "red")).await.unwrap();
    let before = h.ctx.catalog().clone();

    let err = h.ctx.add_item(polish("Big Apple Red", "pink")).await.unwrap_err();

    assert!(matches!(err, PickerError::DuplicateItem { .. }));
    assert_eq!(h.ctx.catalog(), &before);
    assert_eq!(stored_len(&h.local, keys::POLISHES), Some(1));
}

#[tokio::test]
async fn test_catalog_mutations_mirror_to_local_store() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;

    h.ctx.remove_item(ItemCategory::Polish, "Blue1", "Brand").await.unwrap();
    h.ctx
        .update_polish(
            &ItemKey::new("Red1", "Brand"),
            Polish::new("Red2", "Brand", vec!["red".into()], "jelly"),
        )
        .await
        .unwrap();

    let stored = h.local.get(keys::POLISHES).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["name"], "Red2");
    assert_eq!(stored[0]["formula"], "jelly");
    assert_eq!(stored_len(&h.local, keys::FINISHERS), Some(1));
}

#[tokio::test]
async fn test_second_remove_custom_is_not_found() {
    let mut h = harness().await;
    let outcome = h.ctx.add_custom(AttributeKind::Color, " Teal ").await.unwrap();
    assert_eq!(outcome, AddOutcome::Added);
    assert!(h.ctx.attribute_values(AttributeKind::Color).contains(&"teal".to_string()));

    h.ctx.remove_custom(AttributeKind::Color, "teal").await.unwrap();
    let err = h.ctx.remove_custom(AttributeKind::Color, "teal").await.unwrap_err();

    assert!(matches!(err, PickerError::NotFound(_)));
    assert_eq!(h.local.get(keys::CUSTOM_COLORS), Some(serde_json::json!([])));
}

#[tokio::test]
async fn test_existing_custom_is_not_written() {
    let mut h = harness().await;
    let outcome = h.ctx.add_custom(AttributeKind::Color, "Red").await.unwrap();

    assert_eq!(outcome, AddOutcome::AlreadyExists);
    assert!(h.local.get(keys::CUSTOM_COLORS).is_none());
}

// ============================================================================
// Picking
// ============================================================================

#[tokio::test]
async fn test_picks_come_from_filtered_set() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    let filters = PickFilters {
        color: Some("red".into()),
        ..PickFilters::default()
    };

    for _ in 0..100 {
        let outcome = h.ctx.pick(&filters).unwrap();
        assert_eq!(outcome.candidate.polish.name, "Red1");
    }
}

#[tokio::test]
async fn test_no_finishers_always_fails() {
    let mut h = harness().await;
    h.ctx.add_item(polish("Red1", "red")).await.unwrap();

    for _ in 0..10 {
        assert_eq!(
            h.ctx.pick(&PickFilters::default()).unwrap_err(),
            PickerError::NoFinishers
        );
    }
}

#[tokio::test]
async fn test_candidates_are_not_persisted() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;

    let outcome = h.ctx.pick(&PickFilters::default()).unwrap();

    assert!(!outcome.candidate.used);
    assert!(h.ctx.history().is_empty());
    assert!(h.local.get(keys::USED_COMBINATIONS).is_none());
}

#[tokio::test]
async fn test_previously_used_detection() {
    let mut h = harness().await;
    h.ctx.add_item(polish("PolishX", "red")).await.unwrap();
    h.ctx.add_item(Item::Topper(Coat::new("TopperY", "Brand", "glitter")))
        .await
        .unwrap();
    h.ctx.add_item(Item::Finisher(Coat::new("Shine", "Brand", "glossy")))
        .await
        .unwrap();
    let with_topper = PickFilters {
        include_topper: true,
        ..PickFilters::default()
    };

    let first = h.ctx.pick(&with_topper).unwrap();
    assert!(first.previously_used.is_none());
    let worn = h.ctx.confirm(first.candidate).await.unwrap();

    let again = h.ctx.pick(&with_topper).unwrap();
    assert_eq!(again.previously_used.map(|c| c.id), Some(worn.id));

    let bare = h.ctx.pick(&PickFilters::default()).unwrap();
    assert!(bare.previously_used.is_none());

    let topped = h.ctx.add_topper(bare.candidate).unwrap();
    assert!(topped.previously_used.is_some());
}

#[tokio::test]
async fn test_confirm_is_idempotent() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    let outcome = h.ctx.pick(&PickFilters::default()).unwrap();

    let first = h.ctx.confirm(outcome.candidate.clone()).await.unwrap();
    let second = h.ctx.confirm(outcome.candidate).await.unwrap();

    assert!(first.used);
    assert_eq!(first, second);
    assert_eq!(h.ctx.history().len(), 1);
}

// ============================================================================
// History cap and sessions
// ============================================================================

#[tokio::test]
async fn test_anonymous_history_is_unbounded() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;

    for _ in 0..11 {
        confirm_one(&mut h.ctx).await;
    }

    assert_eq!(h.ctx.history().len(), 11);
    assert_eq!(stored_len(&h.local, keys::USED_COMBINATIONS), Some(11));
}

#[tokio::test]
async fn test_remote_history_drops_oldest_past_cap() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;

    let mut confirmed = Vec::new();
    for _ in 0..11 {
        confirmed.push(confirm_one(&mut h.ctx).await);
    }

    let doc = h.documents.get("u1").await.unwrap().unwrap();
    let recent = doc.recent_combinations.unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].id, confirmed[10].id);
    assert!(recent.iter().all(|c| c.id != confirmed[0].id));

    assert_eq!(h.ctx.history().len(), 10);
    assert!(h.ctx.history().get(&confirmed[0].id).is_none());
}

#[tokio::test]
async fn test_history_cap_releases_evicted_media() {
    let config = CoreConfig::from_json(r#"{"remoteHistoryCap": 1}"#).unwrap();
    let mut h = harness_with(config).await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;

    let first = confirm_one(&mut h.ctx).await;
    h.ctx
        .attach_media(&first.id, MediaUpload::new(MediaKind::Photo, vec![1], "a.jpg"))
        .await
        .unwrap();
    assert_eq!(h.objects.paths().len(), 1);

    let second = confirm_one(&mut h.ctx).await;

    assert!(h.objects.paths().is_empty());
    assert_eq!(h.ctx.history().len(), 1);
    assert!(h.ctx.history().get(&second.id).is_some());
    assert!(h.ctx.last_sync_error().is_none());
}

#[tokio::test]
async fn test_sign_in_shows_only_remote_data() {
    let mut h = harness().await;
    h.ctx.add_item(polish("Local Only", "red")).await.unwrap();

    let mut raw = serde_json::Map::new();
    raw.insert(
        "polishCollection".into(),
        serde_json::json!([{ "name": "Remote One", "brand": "Brand", "colors": ["blue"], "formula": "creme" }]),
    );
    h.documents.insert_raw("u1", raw).unwrap();

    sign_in(&mut h, "u1").await;
    assert!(h.ctx.session().is_authenticated());
    assert_eq!(polish_names(&h.ctx), vec!["Remote One".to_string()]);

    h.ctx.on_session_changed(None).await.unwrap();
    assert_eq!(polish_names(&h.ctx), vec!["Local Only".to_string()]);
}

#[tokio::test]
async fn test_switching_users_never_merges() {
    let mut h = harness().await;
    sign_in(&mut h, "alice").await;
    h.ctx.add_item(polish("Alice Red", "red")).await.unwrap();

    sign_in(&mut h, "bob").await;
    assert!(h.ctx.catalog().polishes.is_empty());

    sign_in(&mut h, "alice").await;
    assert_eq!(polish_names(&h.ctx), vec!["Alice Red".to_string()]);
}

#[tokio::test]
async fn test_same_user_again_does_not_reload() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    h.ctx.add_item(polish("Kept", "red")).await.unwrap();
    h.documents.fail_reads(true);

    let mut identity = UserIdentity::new("u1");
    identity.display_name = Some("Sam".into());
    h.ctx.on_session_changed(Some(identity.clone())).await.unwrap();

    assert_eq!(h.ctx.session(), &UserSession::Authenticated(identity));
    assert_eq!(polish_names(&h.ctx), vec!["Kept".to_string()]);
}

#[tokio::test]
async fn test_remote_load_failure_keeps_current_session() {
    let mut h = harness().await;
    h.ctx.add_item(polish("Local", "red")).await.unwrap();
    h.documents.fail_reads(true);

    let err = h
        .ctx
        .on_session_changed(Some(UserIdentity::new("u1")))
        .await
        .unwrap_err();

    assert!(matches!(err, PickerError::RemoteReadFailed(_)));
    assert!(!h.ctx.session().is_authenticated());
    assert_eq!(polish_names(&h.ctx), vec!["Local".to_string()]);
}

#[tokio::test]
async fn test_failed_sign_in_never_overwrites_remote_document() {
    let mut h = harness().await;
    let mut raw = serde_json::Map::new();
    raw.insert("customColors".into(), serde_json::json!(["teal", "coral"]));
    raw.insert(
        "polishCollection".into(),
        serde_json::json!([{ "name": "Remote One", "brand": "Brand", "colors": ["blue"], "formula": "creme" }]),
    );
    h.documents.insert_raw("u1", raw).unwrap();

    h.documents.fail_reads(true);
    assert!(h.ctx.on_session_changed(Some(UserIdentity::new("u1"))).await.is_err());
    h.documents.fail_reads(false);

    h.ctx.add_custom(AttributeKind::Color, "mint").await.unwrap();
    h.ctx.import_json(r#"{"nailPolishes": []}"#).await.unwrap();

    let untouched = h.documents.raw("u1").unwrap();
    assert_eq!(untouched["customColors"], serde_json::json!(["teal", "coral"]));
    assert_eq!(untouched["polishCollection"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        h.local.get(keys::custom(AttributeKind::Color)),
        Some(serde_json::json!(["mint"]))
    );

    sign_in(&mut h, "u1").await;
    assert_eq!(polish_names(&h.ctx), vec!["Remote One".to_string()]);
    h.ctx.add_custom(AttributeKind::Color, "mint").await.unwrap();

    let doc = h.documents.raw("u1").unwrap();
    assert_eq!(doc["customColors"], serde_json::json!(["teal", "coral", "mint"]));
}

#[tokio::test]
async fn test_sign_in_without_remote_stores_fails() {
    let stores = Stores::local(Arc::new(MemoryLocalStore::new()));
    let mut ctx = PickerContext::open(CoreConfig::default(), stores).await.unwrap();

    let err = ctx
        .on_session_changed(Some(UserIdentity::new("u1")))
        .await
        .unwrap_err();

    assert!(matches!(err, PickerError::RemoteReadFailed(_)));
    assert!(!ctx.session().is_authenticated());
}

#[tokio::test]
async fn test_remote_write_failure_is_not_rolled_back() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    h.documents.fail_writes(true);

    h.ctx.add_item(polish("Optimistic", "red")).await.unwrap();

    assert_eq!(polish_names(&h.ctx), vec!["Optimistic".to_string()]);
    assert!(matches!(
        h.ctx.last_sync_error(),
        Some(PickerError::RemoteWriteFailed(_))
    ));

    h.ctx.clear_sync_error();
    assert!(h.ctx.last_sync_error().is_none());
}

#[tokio::test]
async fn test_local_write_failure_is_recorded() {
    let mut h = harness().await;
    h.local.fail_writes(true);

    h.ctx.add_custom(AttributeKind::Brand, "Holo Taco").await.unwrap();

    assert_eq!(h.ctx.registry().custom_brands, vec!["Holo Taco".to_string()]);
    assert!(matches!(
        h.ctx.last_sync_error(),
        Some(PickerError::LocalStoreFailed(_))
    ));
}

// ============================================================================
// Media
// ============================================================================

#[tokio::test]
async fn test_local_media_is_inline() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    let combo = confirm_one(&mut h.ctx).await;

    let media = h
        .ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, b"hi".to_vec(), "a.png"))
        .await
        .unwrap();

    let expected = "data:image/png;base64,aGk=";
    assert_eq!(media, MediaRef::Inline(expected.into()));
    assert_eq!(h.ctx.history().get(&combo.id).unwrap().photo, Some(media));
    let photos = h.local.get(keys::COMBO_PHOTOS).unwrap();
    assert_eq!(photos[combo.id.as_str()], expected);

    h.ctx.delete_combination(&combo.id).await.unwrap();
    assert!(h.ctx.state().media.is_empty());
    assert_eq!(h.local.get(keys::COMBO_PHOTOS), Some(serde_json::json!({})));
}

#[tokio::test]
async fn test_detach_local_video() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    let combo = confirm_one(&mut h.ctx).await;
    h.ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Video, vec![0, 1], "clip.mp4"))
        .await
        .unwrap();
    assert!(h.ctx.state().media.contains_key(&format!("{}:video", combo.id)));

    h.ctx.detach_media(&combo.id, MediaKind::Video).await.unwrap();

    assert!(h.ctx.history().get(&combo.id).unwrap().video.is_none());
    assert!(h.ctx.state().media.is_empty());
}

#[tokio::test]
async fn test_detach_remote_photo() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;
    let combo = confirm_one(&mut h.ctx).await;
    h.ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, vec![1], "a.jpg"))
        .await
        .unwrap();
    assert_eq!(h.objects.paths().len(), 1);

    h.ctx.detach_media(&combo.id, MediaKind::Photo).await.unwrap();

    assert!(h.objects.paths().is_empty());
    assert!(h.ctx.history().get(&combo.id).unwrap().photo.is_none());
    let doc = h.documents.raw("u1").unwrap();
    assert!(doc["recentCombinations"][0].get("photo").is_none());
}

#[tokio::test]
async fn test_detach_remote_photo_survives_failed_delete() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;
    let combo = confirm_one(&mut h.ctx).await;
    h.ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, vec![1], "a.jpg"))
        .await
        .unwrap();
    h.objects.fail_deletes(true);

    h.ctx.detach_media(&combo.id, MediaKind::Photo).await.unwrap();

    assert!(h.ctx.history().get(&combo.id).unwrap().photo.is_none());
    assert!(h.ctx.last_sync_error().is_none());
    let doc = h.documents.get("u1").await.unwrap().unwrap();
    assert!(doc.recent_combinations.unwrap()[0].photo.is_none());
}

#[tokio::test]
async fn test_oversized_media_rejected_before_upload() {
    let config = CoreConfig::from_json(r#"{"media": {"photoMaxBytes": 4}}"#).unwrap();
    let mut h = harness_with(config).await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;
    let combo = confirm_one(&mut h.ctx).await;

    let err = h
        .ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, vec![0; 5], "a.jpg"))
        .await
        .unwrap_err();

    assert!(matches!(err, PickerError::FileTooLarge { size: 5, limit: 4, .. }));
    assert!(h.objects.paths().is_empty());
    assert!(h.ctx.history().get(&combo.id).unwrap().photo.is_none());
}

#[tokio::test]
async fn test_attach_to_missing_combination() {
    let mut h = harness().await;
    let err = h
        .ctx
        .attach_media(
            &CombinationId::from("missing"),
            MediaUpload::new(MediaKind::Photo, vec![1], "a.jpg"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PickerError::NotFound(_)));
}

#[tokio::test]
async fn test_remote_media_lifecycle() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;
    let combo = confirm_one(&mut h.ctx).await;

    let first = h
        .ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, vec![1], "a.jpg"))
        .await
        .unwrap();
    assert!(first.is_remote());

    let second = h
        .ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, vec![2], "b.jpg"))
        .await
        .unwrap();
    assert_eq!(h.objects.paths(), vec![second.remote_path().unwrap().to_string()]);

    let doc = h.documents.get("u1").await.unwrap().unwrap();
    assert_eq!(doc.recent_combinations.unwrap()[0].photo, Some(second.clone()));

    h.objects.fail_deletes(true);
    let removed = h.ctx.delete_combination(&combo.id).await.unwrap();
    assert_eq!(removed.photo, Some(second));
    assert!(h.ctx.history().is_empty());
    assert!(h.ctx.last_sync_error().is_none());
}

#[tokio::test]
async fn test_confirm_with_media_retry_after_upload_failure() {
    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    stock(&mut h.ctx).await;
    let candidate = h.ctx.pick(&PickFilters::default()).unwrap().candidate;
    let upload = MediaUpload::new(MediaKind::Photo, vec![9; 16], "nails.heic");

    h.objects.fail_uploads(true);
    let err = h
        .ctx
        .confirm_with_media(candidate.clone(), upload.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, PickerError::UploadFailed(_)));
    assert!(h.ctx.history().is_empty());

    h.objects.fail_uploads(false);
    let confirmed = h.ctx.confirm_with_media(candidate, upload).await.unwrap();

    assert!(confirmed.used);
    let path = confirmed.photo.as_ref().and_then(MediaRef::remote_path).unwrap();
    assert!(path.starts_with("users/u1/combination-photos/"));
    assert!(path.ends_with(".heic"));
    assert_eq!(h.ctx.history().len(), 1);
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn test_export_then_import_into_fresh_store() {
    let mut source = harness().await;
    stock(&mut source.ctx).await;
    source.ctx.add_custom(AttributeKind::Formula, "jelly").await.unwrap();
    let combo = confirm_one(&mut source.ctx).await;
    source
        .ctx
        .attach_media(&combo.id, MediaUpload::new(MediaKind::Photo, vec![7], "a.jpg"))
        .await
        .unwrap();
    let json = source.ctx.export_json().unwrap();

    let mut target = harness().await;
    target.ctx.import_json(&json).await.unwrap();
    assert_eq!(target.ctx.state(), source.ctx.state());

    let reopened = PickerContext::open(CoreConfig::default(), Stores::local(target.local.clone()))
        .await
        .unwrap();
    assert_eq!(reopened.state(), source.ctx.state());
}

#[tokio::test]
async fn test_export_has_date() {
    let h = harness().await;
    let value: Value = serde_json::from_str(&h.ctx.export_json().unwrap()).unwrap();

    assert!(value["exportDate"].is_string());
    assert_eq!(value["nailPolishes"], serde_json::json!([]));
}

#[tokio::test]
async fn test_malformed_import_changes_nothing() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    let before = h.ctx.state().clone();

    let err = h.ctx.import_json(r#"{"toppers": 3}"#).await.unwrap_err();

    assert!(matches!(err, PickerError::ImportFormatInvalid(_)));
    assert_eq!(h.ctx.state(), &before);
}

#[tokio::test]
async fn test_remote_import_respects_cap() {
    let mut source = harness().await;
    stock(&mut source.ctx).await;
    for _ in 0..12 {
        confirm_one(&mut source.ctx).await;
    }
    let json = source.ctx.export_json().unwrap();

    let mut h = harness().await;
    sign_in(&mut h, "u1").await;
    h.ctx.import_json(&json).await.unwrap();

    assert_eq!(h.ctx.history().len(), 10);
    let doc = h.documents.get("u1").await.unwrap().unwrap();
    assert_eq!(doc.polish_collection.unwrap().len(), 2);
    assert_eq!(doc.recent_combinations.unwrap().len(), 10);
}

#[tokio::test]
async fn test_reset_all() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    confirm_one(&mut h.ctx).await;

    h.ctx.reset_all().await;

    assert!(h.ctx.catalog().is_empty());
    assert!(h.ctx.history().is_empty());
    assert_eq!(stored_len(&h.local, keys::POLISHES), Some(0));
    assert_eq!(stored_len(&h.local, keys::USED_COMBINATIONS), Some(0));
}

#[tokio::test]
async fn test_stats_and_queries() {
    let mut h = harness().await;
    stock(&mut h.ctx).await;
    confirm_one(&mut h.ctx).await;

    let stats = h.ctx.stats();
    assert_eq!(stats.total_polishes, 2);
    assert_eq!(stats.total_finishers, 1);
    assert_eq!(stats.combinations_tried, 1);

    let blues = h.ctx.query_polishes(&PolishQuery {
        color: Some("BLUE".into()),
        ..PolishQuery::default()
    });
    assert_eq!(blues.len(), 1);
    assert_eq!(blues[0].name, "Blue1");

    let found = h.ctx.query_history(&HistoryQuery {
        text: Some("shine".into()),
        ..HistoryQuery::default()
    });
    assert_eq!(found.len(), 1);
}
