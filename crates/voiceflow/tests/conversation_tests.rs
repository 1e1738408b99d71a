//! End-to-end conversation tests driving the core thread through its handle

mod common;

use common::{HarnessBuilder, MicMode};
use std::io::Write;
use std::time::Duration;
use voiceflow::session::{AUDIO_REPLY, IMAGE_REPLY, TEXT_REPLY};
use voiceflow::{MessageKind, RecordingState, Sender};

fn image_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
        .unwrap();
    file
}

#[test]
fn test_text_message_gets_delayed_reply() {
    let harness = HarnessBuilder::new()
        .delay(Duration::from_millis(400))
        .start();

    harness.handle.set_text("Hello").unwrap();
    harness.handle.submit().unwrap();

    let state = harness.wait_until(|s| !s.messages.is_empty());
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].sender, Sender::User);
    assert_eq!(state.messages[0].content, "Hello");
    assert!(state.is_pending(), "Typing indicator should show until the reply lands");
    assert!(state.draft.is_empty(), "Draft should reset after sending");

    let state = harness.wait_until(|s| s.messages.len() == 2);
    let reply = &state.messages[1];
    assert_eq!(reply.sender, Sender::Assistant);
    assert_eq!(reply.kind, MessageKind::Text);
    assert_eq!(reply.content, TEXT_REPLY);
    assert!(reply.timestamp >= state.messages[0].timestamp);
    assert!(state.placeholder.is_none());
}

#[test]
fn test_image_message_is_acknowledged() {
    let harness = HarnessBuilder::new().start();
    let file = image_file();

    harness.handle.pick_file(file.path()).unwrap();
    harness.wait_until(|s| s.draft.image.is_some());
    harness.handle.set_text("  a cat  ").unwrap();
    harness.handle.submit().unwrap();

    let state = harness.wait_until(|s| s.messages.len() == 2);
    let sent = &state.messages[0];
    assert_eq!(sent.kind, MessageKind::Image);
    assert_eq!(sent.content, "  a cat  ");
    let image = sent.media.as_ref().expect("image message carries media");
    assert!(harness.handle.media().contains(image));
    assert_eq!(state.messages[1].content, IMAGE_REPLY);
}

#[test]
fn test_non_image_file_is_rejected() {
    let harness = HarnessBuilder::new().start();
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();

    harness.handle.pick_file(file.path()).unwrap();

    let state = harness.wait_until(|s| s.error.is_some());
    assert!(state.draft.image.is_none());
    assert_eq!(harness.handle.media().live_count(), 0);
}

#[test]
fn test_empty_submit_is_noop() {
    let harness = HarnessBuilder::new().start();

    harness.handle.set_text("   ").unwrap();
    harness.handle.submit().unwrap();
    harness.settle();

    let state = harness.state();
    assert!(state.messages.is_empty());
    assert!(state.placeholder.is_none());
    assert!(!state.can_send);
    assert_eq!(state.draft.text, "   ", "Rejected submit should leave the draft alone");
}

#[test]
fn test_single_placeholder_while_replies_outstanding() {
    let harness = HarnessBuilder::new()
        .delay(Duration::from_millis(300))
        .start();

    for text in ["one", "two", "three"] {
        harness.handle.set_text(text).unwrap();
        harness.handle.submit().unwrap();
    }

    let state = harness.wait_until(|s| s.messages.len() == 3);
    assert_eq!(state.timeline().filter(|m| m.pending).count(), 1);

    let state = harness.wait_until(|s| s.messages.len() == 6);
    let senders: Vec<_> = state.messages.iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![
            Sender::User,
            Sender::User,
            Sender::User,
            Sender::Assistant,
            Sender::Assistant,
            Sender::Assistant
        ]
    );
    assert!(state.placeholder.is_none());
    assert!(state.messages.windows(2).all(|w| w[0].id < w[1].id));
}

#[test]
fn test_clear_history_releases_media() {
    let harness = HarnessBuilder::new()
        .config(|c| c.with_greeting(Some("Hi there".into())))
        .start();
    let file = image_file();

    harness.wait_until(|s| s.messages.len() == 1);
    harness.handle.pick_file(file.path()).unwrap();
    harness.wait_until(|s| s.draft.image.is_some());
    harness.handle.submit().unwrap();
    harness.wait_until(|s| s.messages.len() == 3);
    assert_eq!(harness.handle.media().live_count(), 1);

    harness.handle.clear_history().unwrap();

    let state = harness.wait_until(|s| s.messages.len() == 1);
    assert_eq!(state.messages[0].content, "Hi there");
    assert_eq!(harness.handle.media().live_count(), 0);
}

#[test]
fn test_recorded_audio_is_staged_then_sent() {
    let harness = HarnessBuilder::new().start();

    let state = harness.record_clip();
    assert_eq!(state.recording, RecordingState::Ready);
    assert_eq!(harness.device_holds(), 0);
    assert_eq!(harness.upload_calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    let uploaded = harness.uploaded.lock();
    assert_eq!(uploaded[0].file_name, "recorded_audio.wav");
    assert_eq!(uploaded[0].mime_type, "audio/wav");
    drop(uploaded);

    harness.handle.set_text("listen").unwrap();
    harness.handle.submit().unwrap();

    let state = harness.wait_until(|s| s.messages.len() == 2);
    let pair = {
        let sent = &state.messages[0];
        assert_eq!(sent.kind, MessageKind::Audio);
        assert_eq!(sent.content, "listen");
        sent.media.clone().expect("user audio")
    };
    let reply = &state.messages[1];
    assert_eq!(reply.kind, MessageKind::Audio);
    assert_eq!(reply.content, AUDIO_REPLY);
    let reply_media = reply.media.as_ref().expect("reply audio");
    assert_ne!(&pair, reply_media);
    let blob = harness.handle.media().get(reply_media).unwrap();
    assert_eq!(blob.mime_type, "audio/mpeg");
}

#[test]
fn test_image_takes_precedence_over_audio() {
    let harness = HarnessBuilder::new().start();
    let file = image_file();

    let state = harness.record_clip();
    let pair = state.draft.audio.clone().unwrap();
    harness.handle.pick_file(file.path()).unwrap();
    harness.wait_until(|s| s.draft.image.is_some());
    harness.handle.submit().unwrap();

    let state = harness.wait_until(|s| s.messages.len() == 2);
    assert_eq!(state.messages[0].kind, MessageKind::Image);
    assert_eq!(state.messages[1].content, IMAGE_REPLY);
    assert!(state.draft.is_empty());
    assert!(!harness.handle.media().contains(&pair.recording));
    assert!(!harness.handle.media().contains(&pair.reply));
}

#[test]
fn test_submit_while_recording_is_rejected() {
    let harness = HarnessBuilder::new().start();

    harness.handle.set_text("hold on").unwrap();
    harness.handle.toggle_record().unwrap();
    let state = harness.wait_until(|s| s.recording.is_recording());
    assert!(!state.can_send);

    harness.handle.submit().unwrap();
    harness.settle();

    let state = harness.state();
    assert!(state.messages.is_empty());
    assert_eq!(state.draft.text, "hold on");
}

#[test]
fn test_discard_audio_clears_draft() {
    let harness = HarnessBuilder::new().start();

    let state = harness.record_clip();
    let pair = state.draft.audio.clone().unwrap();
    harness.handle.discard_audio().unwrap();

    let state = harness.wait_until(|s| s.draft.audio.is_none());
    assert!(!state.can_send);
    assert!(!harness.handle.media().contains(&pair.recording));
    assert!(!harness.handle.media().contains(&pair.reply));
}

#[test]
fn test_shutdown_releases_device_and_media() {
    let harness = HarnessBuilder::new().mic(MicMode::Grant(common::speech())).start();
    let file = image_file();

    harness.handle.pick_file(file.path()).unwrap();
    harness.wait_until(|s| s.draft.image.is_some());
    harness.handle.toggle_record().unwrap();
    harness.wait_until(|s| s.recording.is_recording());
    assert_eq!(harness.device_holds(), 1);

    let holds = harness.holds.clone();
    let handle = harness.shutdown();

    assert_eq!(holds.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(handle.media().live_count(), 0);
    assert!(handle.state().is_shut_down());
}
