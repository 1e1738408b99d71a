//! Microphone and upload lifecycle tests

mod common;

use common::{HarnessBuilder, MicMode};
use std::sync::atomic::Ordering;
use std::time::Duration;
use voiceflow::{RecordingState, VoiceFlowError};

#[test]
fn test_permission_denied_stays_idle() {
    let harness = HarnessBuilder::new().mic(MicMode::Deny).start();

    harness.handle.toggle_record().unwrap();

    let state = harness.wait_until(|s| s.error.is_some());
    assert_eq!(state.recording, RecordingState::Idle);
    assert_eq!(harness.device_holds(), 0);
    assert_eq!(harness.upload_calls.load(Ordering::SeqCst), 0);
    assert!(state.messages.is_empty());
}

#[test]
fn test_missing_device_reports_error() {
    let harness = HarnessBuilder::new().mic(MicMode::Missing).start();

    harness.handle.toggle_record().unwrap();

    let state = harness.wait_until(|s| s.error.is_some());
    assert_eq!(state.recording, RecordingState::Idle);
}

#[test]
fn test_upload_failure_releases_device_first() {
    let harness = HarnessBuilder::new()
        .upload(Err(VoiceFlowError::UploadFailed(
            "Server responded with 500 Internal Server Error".into(),
        )))
        .start();

    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_recording());
    assert_eq!(harness.device_holds(), 1);
    harness.handle.toggle_record().unwrap();

    let state = harness.wait_until(|s| s.recording == RecordingState::Error);
    assert!(state.error.is_some());
    assert!(state.messages.is_empty(), "Failed uploads never reach the log");
    assert!(state.draft.audio.is_none());
    assert_eq!(harness.device_holds(), 0);
    assert_eq!(
        *harness.holds_at_upload.lock(),
        vec![0],
        "Device should be released before the upload starts"
    );
    assert_eq!(harness.handle.media().live_count(), 0);
}

#[test]
fn test_empty_recording_skips_upload() {
    let harness = HarnessBuilder::new().mic(MicMode::Grant(Vec::new())).start();

    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_recording());
    harness.handle.toggle_record().unwrap();

    let state = harness.wait_until(|s| s.recording == RecordingState::Error);
    assert!(state.error.is_some());
    assert_eq!(harness.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.device_holds(), 0);
}

#[test]
fn test_recording_can_restart_after_error() {
    let harness = HarnessBuilder::new()
        .upload(Err(VoiceFlowError::UploadFailed("Request timed out".into())))
        .start();

    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_recording());
    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording == RecordingState::Error);

    harness.handle.toggle_record().unwrap();
    let state = harness.wait_until(|s| s.recording.is_recording());
    assert!(state.error.is_none(), "Starting again clears the previous error");
    assert_eq!(harness.device_holds(), 1);
}

#[test]
fn test_cancel_recording_releases_device() {
    let harness = HarnessBuilder::new().start();

    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_recording());
    harness.handle.cancel_recording().unwrap();

    let state = harness.wait_until(|s| s.recording == RecordingState::Idle);
    assert!(state.draft.audio.is_none());
    assert_eq!(harness.device_holds(), 0);
    assert_eq!(harness.upload_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_ignored_while_uploading() {
    let harness = HarnessBuilder::new().hold_uploads().start();

    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_recording());
    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_uploading());

    harness.handle.cancel_recording().unwrap();
    harness.settle();
    let state = harness.state();
    assert_eq!(state.recording, RecordingState::Uploading);
    assert_eq!(harness.device_holds(), 0);

    harness.release_upload();
    let state = harness.wait_until(|s| s.draft.audio.is_some());
    assert_eq!(state.recording, RecordingState::Ready);
    assert_eq!(harness.upload_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.handle.media().live_count(), 2);
}

#[test]
fn test_recording_stops_at_ceiling() {
    let harness = HarnessBuilder::new()
        .config(|c| c.with_max_recording_secs(1))
        .start();

    harness.handle.toggle_record().unwrap();
    let state = harness.wait_until(|s| s.recording.is_recording());
    assert_eq!(state.max_recording, Duration::from_secs(1));

    let state = harness.wait_until(|s| s.draft.audio.is_some());
    assert_eq!(state.recording, RecordingState::Ready);
    assert_eq!(harness.device_holds(), 0);
    assert_eq!(harness.upload_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_level_preview_while_recording() {
    let harness = HarnessBuilder::new().start();

    harness.handle.toggle_record().unwrap();
    let state = harness.wait_until(|s| !s.waveform.is_empty());
    assert!(state.level > 0.0);
    assert_eq!(state.hint_text, voiceflow::composer::HINT_RECORDING);
}
