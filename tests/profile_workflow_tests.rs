// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile load, media capture, and save.

use std::sync::Arc;
use yourverse::models::{MediaKind, PhotoSelection, ProfileForm, ProfileRecord};
use yourverse::workflow::capture::{self, RecorderState, MICROPHONE_DENIED};
use yourverse::workflow::saver::{self, NOT_LOGGED_IN, SAVE_LABEL, SAVING};
use yourverse::workflow::{loader, Control, Effect, EffectLog, Field, LoadMode};

mod common;
use common::{FakeMicrophone, Harness};

fn form() -> ProfileForm {
    ProfileForm {
        age: "36".to_string(),
        hobbies: "poetry".to_string(),
        skills: "mathematics".to_string(),
    }
}

fn photo() -> PhotoSelection {
    PhotoSelection::new("me.png", "image/png", b"\x89PNG".to_vec())
}

fn control_changes(log: &EffectLog, which: Control) -> Vec<(bool, Option<String>)> {
    log.effects()
        .into_iter()
        .filter_map(|e| match e {
            Effect::Control {
                control,
                enabled,
                label,
            } if control == which => Some((enabled, label)),
            _ => None,
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADER
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_load_populates_fields_and_media() {
    let harness = Harness::new();
    harness.profiles.insert(
        "uid-1",
        ProfileRecord {
            age: "36".to_string(),
            hobbies: "poetry".to_string(),
            skills: String::new(),
            photo_url: Some("https://cdn.test/me.png".to_string()),
            voice_url: Some("https://cdn.test/intro.webm".to_string()),
        },
    );
    let log = Arc::new(EffectLog::new());
    let ctx = harness.signed_in(&log, common::session("uid-1"));

    let redirect = loader::load_profile(&ctx, LoadMode::Edit).await;

    assert!(redirect.is_none());
    let effects = log.effects();
    assert_eq!(
        effects[0],
        Effect::Welcome {
            text: "Welcome, Ada!".to_string()
        }
    );
    assert!(effects.contains(&Effect::Field {
        field: Field::Age,
        value: "36".to_string()
    }));
    assert!(effects.contains(&Effect::Field {
        field: Field::Skills,
        value: String::new()
    }));
    assert!(effects.contains(&Effect::PhotoPreview {
        src: "https://cdn.test/me.png".to_string()
    }));
    assert!(effects.contains(&Effect::VoicePlayback {
        src: "https://cdn.test/intro.webm".to_string()
    }));
}

#[tokio::test]
async fn test_load_without_record_only_greets() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let ctx = harness.signed_in(&log, common::session("uid-2"));

    loader::load_profile(&ctx, LoadMode::Redirect).await;

    assert_eq!(
        log.effects(),
        vec![Effect::Welcome {
            text: "Welcome, Ada!".to_string()
        }]
    );
}

#[tokio::test]
async fn test_load_redirects_returning_user() {
    let harness = Harness::new();
    harness.profiles.insert(
        "uid-3",
        ProfileRecord {
            age: "40".to_string(),
            ..Default::default()
        },
    );
    let log = Arc::new(EffectLog::new());
    let ctx = harness.signed_in(&log, common::session("uid-3"));

    let redirect = loader::load_profile(&ctx, LoadMode::Redirect).await;

    assert!(redirect.is_some());
    assert_eq!(
        log.navigation(),
        Some(("/dashboard.html".to_string(), true))
    );
    assert!(!log
        .effects()
        .iter()
        .any(|e| matches!(e, Effect::Field { .. })));
}

#[tokio::test]
async fn test_load_redirect_mode_keeps_incomplete_profile_editable() {
    let harness = Harness::new();
    harness.profiles.insert(
        "uid-4",
        ProfileRecord {
            hobbies: "chess".to_string(),
            ..Default::default()
        },
    );
    let log = Arc::new(EffectLog::new());
    let ctx = harness.signed_in(&log, common::session("uid-4"));

    assert!(loader::load_profile(&ctx, LoadMode::Redirect)
        .await
        .is_none());
    assert_eq!(log.navigation(), None);
    assert!(log.effects().contains(&Effect::Field {
        field: Field::Hobbies,
        value: "chess".to_string()
    }));
}

#[tokio::test]
async fn test_load_error_is_swallowed() {
    let harness = Harness::new();
    harness.profiles.fail_on("get", "unavailable");
    let log = Arc::new(EffectLog::new());
    let ctx = harness.signed_in(&log, common::session("uid-5"));

    assert!(loader::load_profile(&ctx, LoadMode::Edit).await.is_none());
    assert_eq!(log.effects().len(), 1);
    assert!(log.alerts().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// CAPTURE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_select_photo_previews_without_upload() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));

    capture::select_photo(&mut ctx, photo());

    assert_eq!(
        log.effects(),
        vec![Effect::PhotoPreview {
            src: "data:image/png;base64,iVBORw==".to_string()
        }]
    );
    assert!(ctx.pending.photo.is_some());
    assert!(!harness.media.contains("profile_photos/uid-1/me.png"));
}

#[tokio::test]
async fn test_recording_cycle() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));
    let mic = FakeMicrophone { granted: true };

    // Chunks before start are ignored
    capture::push_chunk(&mut ctx, b"early");

    capture::start_recording(&mut ctx, &mic).await.unwrap();
    assert_eq!(ctx.recorder.state(), RecorderState::Recording);
    assert_eq!(control_changes(&log, Control::Record), vec![(false, None)]);
    assert_eq!(control_changes(&log, Control::Stop), vec![(true, None)]);

    capture::push_chunk(&mut ctx, b"ab");
    capture::push_chunk(&mut ctx, b"cd");
    let clip = capture::stop_recording(&mut ctx).unwrap();

    assert_eq!(clip.bytes, b"abcd");
    assert_eq!(clip.mime, "audio/webm");
    assert_eq!(ctx.recorder.state(), RecorderState::Idle);
    assert_eq!(ctx.pending.audio.as_ref(), Some(&clip));
    assert!(log.effects().contains(&Effect::VoicePlayback {
        src: clip.playback_url()
    }));
    assert_eq!(
        control_changes(&log, Control::Record),
        vec![(false, None), (true, None)]
    );

    // Stop while idle does nothing
    assert!(capture::stop_recording(&mut ctx).is_none());
}

#[tokio::test]
async fn test_new_take_discards_previous_recording() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));
    let mic = FakeMicrophone { granted: true };

    capture::start_recording(&mut ctx, &mic).await.unwrap();
    capture::push_chunk(&mut ctx, b"first");
    capture::stop_recording(&mut ctx);

    capture::start_recording(&mut ctx, &mic).await.unwrap();
    assert!(ctx.pending.audio.is_none());
    capture::push_chunk(&mut ctx, b"second");
    let clip = capture::stop_recording(&mut ctx).unwrap();

    assert_eq!(clip.bytes, b"second");
}

#[tokio::test]
async fn test_microphone_denied_stays_idle() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));
    let mic = FakeMicrophone { granted: false };

    assert!(capture::start_recording(&mut ctx, &mic).await.is_err());

    assert_eq!(ctx.recorder.state(), RecorderState::Idle);
    assert_eq!(log.alerts(), vec![MICROPHONE_DENIED]);
    assert!(control_changes(&log, Control::Record).is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// SAVER
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_save_without_session_alerts() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.page(&log);

    assert!(saver::save_profile(&mut ctx, &form()).await.is_err());

    assert_eq!(log.alerts(), vec![NOT_LOGGED_IN]);
    assert!(control_changes(&log, Control::Save).is_empty());
    assert_eq!(harness.profiles.write_count(), 0);
}

#[tokio::test]
async fn test_save_with_media_uploads_then_writes() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));
    let mic = FakeMicrophone { granted: true };

    capture::select_photo(&mut ctx, photo());
    capture::start_recording(&mut ctx, &mic).await.unwrap();
    capture::push_chunk(&mut ctx, b"voice");
    capture::stop_recording(&mut ctx);

    let update = saver::save_profile(&mut ctx, &form()).await.unwrap();

    assert_eq!(
        harness.media.object("profile_photos/uid-1/me.png"),
        Some(b"\x89PNG".to_vec())
    );
    assert_eq!(
        harness.media.object("voice_intros/uid-1/intro.webm"),
        Some(b"voice".to_vec())
    );

    let record = harness.profiles.snapshot("uid-1").unwrap();
    assert_eq!(record.age, "36");
    assert_eq!(
        record.photo_url.as_deref(),
        Some("memory://profile_photos/uid-1/me.png")
    );
    assert_eq!(
        record.voice_url.as_deref(),
        Some("memory://voice_intros/uid-1/intro.webm")
    );
    assert_eq!(update.photo_url, record.photo_url);

    assert_eq!(
        log.navigation(),
        Some(("/dashboard.html".to_string(), false))
    );
    assert_eq!(
        control_changes(&log, Control::Save),
        vec![
            (false, Some(SAVING.to_string())),
            (true, Some(SAVE_LABEL.to_string()))
        ]
    );
    assert!(ctx.pending.photo.is_none());
    assert!(ctx.pending.audio.is_none());
}

#[tokio::test]
async fn test_save_voice_only_keeps_existing_photo() {
    let harness = Harness::new();
    harness.profiles.insert(
        "uid-1",
        ProfileRecord {
            age: "30".to_string(),
            photo_url: Some("https://cdn.test/old.png".to_string()),
            ..Default::default()
        },
    );
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));
    let mic = FakeMicrophone { granted: true };

    capture::start_recording(&mut ctx, &mic).await.unwrap();
    capture::push_chunk(&mut ctx, b"hi");
    capture::stop_recording(&mut ctx);

    let update = saver::save_profile(&mut ctx, &form()).await.unwrap();

    assert!(update.photo_url.is_none());
    assert!(!update.field_paths().contains(&"photoURL"));

    let record = harness.profiles.snapshot("uid-1").unwrap();
    assert_eq!(record.photo_url.as_deref(), Some("https://cdn.test/old.png"));
    assert!(record.voice_url.is_some());
    assert_eq!(record.age, "36");
}

#[tokio::test]
async fn test_save_photo_failure_writes_nothing() {
    let harness = Harness::new();
    harness
        .media
        .fail_uploads(MediaKind::Image, "Firebase Storage: An unknown error occurred.");
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));

    capture::select_photo(&mut ctx, photo());
    let err = saver::save_profile(&mut ctx, &form()).await.unwrap_err();

    assert_eq!(err.code(), Some("storage/unknown"));
    assert_eq!(harness.profiles.write_count(), 0);
    assert!(harness.profiles.snapshot("uid-1").is_none());
    assert_eq!(
        log.alerts(),
        vec!["Error: Firebase Storage: An unknown error occurred."]
    );
    assert_eq!(log.navigation(), None);
    // Control restored even on failure
    assert_eq!(
        control_changes(&log, Control::Save).last(),
        Some(&(true, Some(SAVE_LABEL.to_string())))
    );
    // Pending photo kept for a retry
    assert!(ctx.pending.photo.is_some());
}

#[tokio::test]
async fn test_save_voice_failure_after_photo_writes_nothing() {
    let harness = Harness::new();
    harness.media.fail_uploads(MediaKind::Audio, "quota exceeded");
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));
    let mic = FakeMicrophone { granted: true };

    capture::select_photo(&mut ctx, photo());
    capture::start_recording(&mut ctx, &mic).await.unwrap();
    capture::push_chunk(&mut ctx, b"x");
    capture::stop_recording(&mut ctx);

    assert!(saver::save_profile(&mut ctx, &form()).await.is_err());
    assert_eq!(harness.profiles.write_count(), 0);
    assert_eq!(log.alerts(), vec!["Error: quota exceeded"]);
}

#[tokio::test]
async fn test_save_store_failure_alerts_and_restores_control() {
    let harness = Harness::new();
    harness.profiles.fail_on("merge", "permission denied");
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));

    assert!(saver::save_profile(&mut ctx, &form()).await.is_err());

    assert_eq!(log.alerts().len(), 1);
    assert!(log.alerts()[0].starts_with("Error: "));
    assert_eq!(
        control_changes(&log, Control::Save).last(),
        Some(&(true, Some(SAVE_LABEL.to_string())))
    );
}

#[tokio::test]
async fn test_save_scalar_only() {
    let harness = Harness::new();
    let log = Arc::new(EffectLog::new());
    let mut ctx = harness.signed_in(&log, common::session("uid-1"));

    saver::save_profile(&mut ctx, &form()).await.unwrap();

    let record = harness.profiles.snapshot("uid-1").unwrap();
    assert_eq!(record.hobbies, "poetry");
    assert!(record.photo_url.is_none());
    assert!(record.voice_url.is_none());
    assert_eq!(harness.profiles.write_count(), 1);
}
