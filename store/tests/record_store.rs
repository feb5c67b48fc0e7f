#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Record store behaviour tests
//!
//! Exercise the public store API end to end over in-memory and SQLite
//! backends:
//! - round-trips and absence on a fresh store
//! - list appends, removals and idempotent clearing
//! - merge updates and the photo limit held by the caller-level policy
//! - fail-closed reads of corrupted, rejected and unavailable storage

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use halalmatches_store::{
    AgeRange, ChangeKind, Gender, IntroductionStatus, IslamicPractice, KeyValueBackend,
    ManualClock, MediaPolicy, MediaRejection, MemoryBackend, NewIntroduction, NewMediaReference,
    NewWaitlistEntry, PrayerFrequency, Profile, ProfilePatch, ProfileWaliStatus, RecordStore,
    SqliteBackend, StorageKey, UnavailableBackend, VideoReference, VideoSubmission, WaliPath,
    WaliStatusRecord, calculate_profile_completion, extract_video_id,
};
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap()
}

fn memory_store() -> (RecordStore<Arc<MemoryBackend>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let store = RecordStore::new(Arc::new(MemoryBackend::new())).with_clock(clock.clone());
    (store, clock)
}

fn populated_profile() -> Profile {
    let mut profile = Profile::new("1778405400000-abcdefghi", "2026-05-10T09:30:00.000Z");
    profile.name = Some("Maryam".to_string());
    profile.age = Some(26);
    profile.gender = Some(Gender::Female);
    profile.location = Some("Manchester".to_string());
    profile.prayer_frequency = Some(PrayerFrequency::FiveDaily);
    profile.islamic_practice = Some(IslamicPractice {
        prayer: Some("five-daily".to_string()),
        hijab_beard: Some("hijab".to_string()),
        quran_reading: None,
        sect: Some("sunni".to_string()),
    });
    profile.languages = Some(vec!["English".to_string(), "Arabic".to_string()]);
    profile.preferred_age_range = Some(AgeRange { min: 26, max: 34 });
    profile.wali_status = Some(ProfileWaliStatus::HasWali);
    profile
}

fn wali_record() -> WaliStatusRecord {
    WaliStatusRecord {
        path: WaliPath::Traditional,
        wali_name: Some("Ibrahim".to_string()),
        wali_relation: Some("father".to_string()),
        wali_contact: Some("+44 7700 900000".to_string()),
        verified: true,
        updated_at: "2026-05-10T09:30:00.000Z".to_string(),
    }
}

fn waitlist(email: &str) -> NewWaitlistEntry {
    NewWaitlistEntry {
        email: email.to_string(),
        gender: Gender::Male,
        country: "UK".to_string(),
        has_wali: true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip and absence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fresh_store_reads_absent_everywhere() {
    let (store, _) = memory_store();
    assert_eq!(store.get_profile(), None);
    assert_eq!(store.get_video(), None);
    assert_eq!(store.get_wali_status(), None);
    assert!(store.get_media().is_empty());
    assert!(store.get_introductions().is_empty());
    assert!(store.get_waitlist().is_empty());
    assert!(!store.dark_mode());
    assert!(!store.onboarding_completed());
    assert!(!store.google_connected());
}

#[test]
fn singleton_records_round_trip() {
    let (store, _) = memory_store();
    let profile = populated_profile();
    let video = VideoReference {
        video_id: "dQw4w9WgXcQ".to_string(),
        title: Some("Salaam".to_string()),
        added_at: "2026-05-10T09:30:00.000Z".to_string(),
    };

    store.save_profile(&profile);
    store.save_video(&video);
    store.save_wali_status(&wali_record());

    assert_eq!(store.get_profile(), Some(profile));
    assert_eq!(store.get_video(), Some(video));
    assert_eq!(store.get_wali_status(), Some(wali_record()));
}

#[test]
fn stored_json_uses_camel_case_keys() {
    let (store, _) = memory_store();
    store.save_wali_status(&wali_record());
    let raw = store
        .backend()
        .get_item("halalmatches_wali_status")
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["path"], "traditional");
    assert_eq!(value["waliName"], "Ibrahim");
    assert_eq!(value["updatedAt"], "2026-05-10T09:30:00.000Z");
}

#[test]
fn records_written_by_the_web_app_are_readable() {
    let (store, _) = memory_store();
    store
        .backend()
        .set_item(
            "halalmatches_introductions",
            r#"[{"id":"1-abc","recipientId":"a@example.com","recipientName":"a",
                "templateUsed":"standard","sentAt":"2026-01-01T00:00:00.000Z",
                "createdAt":"2026-01-01T00:00:00.000Z","status":"accepted"}]"#,
        )
        .unwrap();

    let intros = store.get_introductions();
    assert_eq!(intros.len(), 1);
    assert_eq!(intros[0].status, IntroductionStatus::Accepted);
    assert_eq!(intros[0].template_used.as_deref(), Some("standard"));
}

#[test]
fn web_app_profile_with_unselected_gender_is_still_scored() {
    let (store, _) = memory_store();
    store
        .backend()
        .set_item(
            "halalmatches_profile",
            r#"{"id":"p1","createdAt":"2026-01-01T00:00:00.000Z",
                "updatedAt":"2026-01-01T00:00:00.000Z","name":"Amina","age":27,
                "gender":"","location":"Leeds","education":"MSc","occupation":"Nurse",
                "aboutMe":"Kind","lookingFor":"Deen first",
                "islamicPractice":{"prayer":"five-daily"},"waliStatus":"has-wali"}"#,
        )
        .unwrap();

    let profile = store.get_profile().expect("profile with an empty select reads");
    assert_eq!(profile.gender, None);
    assert_eq!(calculate_profile_completion(&profile), 90);
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn appends_add_exactly_one_entry_with_id_and_timestamp() {
    let (store, clock) = memory_store();
    let before = store.add_introduction(NewIntroduction::to_recipient("one@example.com"));
    clock.advance(Duration::milliseconds(250));
    let after = store.add_introduction(NewIntroduction::to_recipient("two@example.com"));

    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after[..before.len()], before[..]);
    let added = &after[1];
    assert_eq!(added.recipient_name.as_deref(), Some("two"));
    assert_eq!(added.created_at, "2026-05-10T09:30:00.250Z");
    assert!(added.id.starts_with("1778405400250-"));
    assert_eq!(added.id.len(), "1778405400250-".len() + 9);
    assert_ne!(added.id, before[0].id);
}

#[test]
fn removal_keeps_other_entries_in_order() {
    let (store, _) = memory_store();
    for file_id in ["a", "b", "c", "b", "d"] {
        store.add_media(NewMediaReference::new(file_id));
    }

    let remaining = store.remove_media("b");
    let ids: Vec<&str> = remaining.iter().map(|m| m.file_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "d"]);
    assert_eq!(store.get_media(), remaining);

    // Unknown id is a no-op on contents
    assert_eq!(store.remove_media("zzz"), remaining);
}

#[test]
fn waitlist_accumulates_in_call_order() {
    let (store, clock) = memory_store();
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        store.add_to_waitlist(waitlist(email));
        clock.advance(Duration::seconds(2));
    }

    let entries = store.get_waitlist();
    let emails: Vec<&str> = entries.iter().map(|e| e.email.as_str()).collect();
    assert_eq!(emails, vec!["a@example.com", "b@example.com", "c@example.com"]);
    assert!(
        entries
            .windows(2)
            .all(|pair| pair[0].submitted_at <= pair[1].submitted_at)
    );
}

#[test]
fn clear_all_is_idempotent() {
    let (store, _) = memory_store();
    store.save_profile(&populated_profile());
    store.save_wali_status(&wali_record());
    store.add_media(NewMediaReference::new("a"));
    store.add_to_waitlist(waitlist("a@example.com"));
    store.set_dark_mode(true);
    store.set_google_connected(true);

    store.clear_all();
    let once = store.app_state();
    store.clear_all();
    let twice = store.app_state();

    assert_eq!(once, twice);
    assert_eq!(once, Default::default());
    assert!(store.get_waitlist().is_empty());
    assert!(store.backend().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Merge updates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn update_changes_only_patched_field_and_updated_at() {
    let (store, clock) = memory_store();
    let original = populated_profile();
    store.save_profile(&original);
    clock.advance(Duration::hours(1));

    let updated = store
        .update_profile(ProfilePatch {
            about_me: Some("x".to_string()),
            ..ProfilePatch::default()
        })
        .unwrap();

    let expected = Profile {
        about_me: Some("x".to_string()),
        updated_at: "2026-05-10T10:30:00.000Z".to_string(),
        ..original
    };
    assert_eq!(updated, expected);
    assert_eq!(store.get_profile(), Some(expected));
}

#[test]
fn update_deep_merges_islamic_practice() {
    let (store, _) = memory_store();
    store.save_profile(&populated_profile());

    let patch: ProfilePatch =
        serde_json::from_str(r#"{"islamicPractice":{"quranReading":"learning"}}"#).unwrap();
    let updated = store.update_profile(patch).unwrap();

    assert_eq!(
        updated.islamic_practice,
        Some(IslamicPractice {
            prayer: Some("five-daily".to_string()),
            hijab_beard: Some("hijab".to_string()),
            quran_reading: Some("learning".to_string()),
            sect: Some("sunni".to_string()),
        })
    );
}

#[test]
fn update_without_profile_writes_nothing() {
    let (store, _) = memory_store();
    let result = store.update_profile(ProfilePatch {
        name: Some("Ghost".to_string()),
        ..ProfilePatch::default()
    });
    assert_eq!(result, None);
    assert!(store.backend().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Caller-level policies
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn seventh_photo_is_rejected_and_list_stays_at_six() {
    let (store, _) = memory_store();
    let policy = MediaPolicy::default();
    for i in 0..6 {
        policy
            .add(
                &store,
                &format!("https://drive.google.com/file/d/photo{i}/view"),
                None,
            )
            .unwrap();
    }

    let err = policy
        .add(&store, "https://drive.google.com/file/d/photo6/view", None)
        .unwrap_err();
    assert_eq!(err, MediaRejection::LimitReached { limit: 6 });
    assert_eq!(store.get_media().len(), 6);

    let orders: Vec<u32> = store.get_media().iter().map(|m| m.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn video_url_and_bare_id_store_identical_ids() {
    let (url_store, _) = memory_store();
    let (bare_store, _) = memory_store();

    for (store, input) in [
        (&url_store, "https://www.youtube.com/watch?v=aB3_-x9Yz0Q"),
        (&bare_store, "aB3_-x9Yz0Q"),
    ] {
        VideoSubmission {
            input: input.to_string(),
            title: "Intro".to_string(),
            confirmed_unlisted: true,
        }
        .submit(store)
        .unwrap();
    }

    let from_url = url_store.get_video().unwrap().video_id;
    let from_bare = bare_store.get_video().unwrap().video_id;
    assert_eq!(from_url.as_bytes(), from_bare.as_bytes());
    assert_eq!(extract_video_id("aB3_-x9Yz0Q").unwrap(), from_url);
}

// ─────────────────────────────────────────────────────────────────────────────
// Fail-closed behaviour
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn corrupted_values_read_as_absent() {
    let (store, _) = memory_store();
    let backend = store.backend();
    backend.set_item("halalmatches_profile", "not json").unwrap();
    backend.set_item("halalmatches_drive_media", "{\"oops\":1}").unwrap();
    backend.set_item("halalmatches_wali_status", r#"{"path":"cousin"}"#).unwrap();

    assert_eq!(store.get_profile(), None);
    assert!(store.get_media().is_empty());
    assert_eq!(store.get_wali_status(), None);
    assert_eq!(store.app_state(), Default::default());
}

#[test]
fn append_keeps_entries_this_build_cannot_read() {
    let (store, _) = memory_store();
    store
        .backend()
        .set_item(
            "halalmatches_introductions",
            r#"[{"id":"1-abc","recipientId":"a@example.com","sentAt":"t","createdAt":"t","status":"accepted"},
                {"id":"2-def","recipientId":"b@example.com","sentAt":"t","createdAt":"t","status":"withdrawn"}]"#,
        )
        .unwrap();

    assert_eq!(store.get_introductions().len(), 1);
    let returned = store.add_introduction(NewIntroduction::to_recipient("c@example.com"));
    let ids: Vec<&str> = returned.iter().map(|i| i.recipient_id.as_str()).collect();
    assert_eq!(ids, vec!["a@example.com", "c@example.com"]);

    let raw = store
        .backend()
        .get_item("halalmatches_introductions")
        .unwrap()
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let statuses: Vec<&str> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["accepted", "withdrawn", "pending"]);
}

#[test]
fn append_never_replaces_an_unreadable_list() {
    let (store, _) = memory_store();
    store
        .backend()
        .set_item("halalmatches_drive_media", "{\"oops\":1}")
        .unwrap();

    assert!(store.add_media(NewMediaReference::new("file-a")).is_empty());
    assert_eq!(
        store
            .backend()
            .get_item("halalmatches_drive_media")
            .unwrap()
            .as_deref(),
        Some("{\"oops\":1}")
    );
}

#[test]
fn quota_rejection_drops_the_write_only() {
    let clock = Arc::new(ManualClock::new(start()));
    let store = RecordStore::new(MemoryBackend::with_quota(200)).with_clock(clock);
    store.add_to_waitlist(waitlist("first@example.com"));
    assert_eq!(store.get_waitlist().len(), 1);

    // Second append pushes the array past the quota
    let returned = store.add_to_waitlist(waitlist("second@example.com"));
    assert_eq!(returned.len(), 2);
    assert_eq!(store.get_waitlist().len(), 1);
    assert_eq!(store.get_waitlist()[0].email, "first@example.com");
}

#[test]
fn unavailable_storage_never_panics() {
    let store = RecordStore::new(UnavailableBackend);
    store.save_profile(&populated_profile());
    store.save_wali_status(&wali_record());
    store.add_introduction(NewIntroduction::to_recipient("x@example.com"));
    store.set_onboarding_completed(true);
    assert_eq!(store.update_profile(ProfilePatch::default()), None);
    store.remove_profile();
    store.clear_all();
    assert_eq!(store.app_state(), Default::default());
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared storage and durability
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn two_views_share_one_backend_and_last_write_wins() {
    let backend = Arc::new(MemoryBackend::new());
    let first = RecordStore::new(Arc::clone(&backend));
    let second = RecordStore::new(Arc::clone(&backend));

    let mut events = second.subscribe();

    first.set_dark_mode(true);
    assert!(second.dark_mode());

    // Nothing crosses views automatically; an embedding forwards it
    assert!(events.try_recv().is_err());
    second.notify_external_change("halalmatches_dark_mode", ChangeKind::Written);
    assert_eq!(events.try_recv().unwrap().key, StorageKey::DarkMode);

    first.add_media(NewMediaReference::new("from-first"));
    second.add_media(NewMediaReference::new("from-second"));
    assert_eq!(first.get_media().len(), 2);
}

#[test]
fn sqlite_backend_persists_across_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("store.db");

    {
        let store = RecordStore::new(SqliteBackend::open(&path).unwrap());
        store.save_profile(&populated_profile());
        store.add_introduction(NewIntroduction::to_recipient("a@example.com"));
        store.set_onboarding_completed(true);
    }

    let store = RecordStore::new(SqliteBackend::open(&path).unwrap());
    assert_eq!(store.get_profile(), Some(populated_profile()));
    assert_eq!(store.get_introductions().len(), 1);
    assert!(store.onboarding_completed());

    store.clear_all();
    assert!(store.backend().keys().unwrap().is_empty());
}
