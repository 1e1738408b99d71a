//! Test doubles and a harness driving the orchestrator thread

#![allow(dead_code)]

use crossbeam_channel::Sender;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use voiceflow::audio::{AudioFormat, CaptureStream, Microphone};
use voiceflow::capture::{AudioUploader, EncodedAudio, UploadedAudio};
use voiceflow::{
    AppConfig, ChatState, Orchestrator, OrchestratorHandle, Result, SimulatedResponder,
    VoiceFlowError,
};

pub const WAIT: Duration = Duration::from_secs(5);

/// Device hold that decrements the shared counter when released
struct Hold(Arc<AtomicUsize>);

impl CaptureStream for Hold {
    fn format(&self) -> AudioFormat {
        AudioFormat::mono(16000)
    }
}

impl Drop for Hold {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub enum MicMode {
    /// Open succeeds and delivers these chunks
    Grant(Vec<Vec<f32>>),
    Deny,
    Missing,
}

pub struct ScriptedMicrophone {
    mode: MicMode,
    holds: Arc<AtomicUsize>,
}

impl Microphone for ScriptedMicrophone {
    fn open(&mut self, chunks: Sender<Vec<f32>>) -> Result<Box<dyn CaptureStream>> {
        match &self.mode {
            MicMode::Deny => Err(VoiceFlowError::DeviceAccessDenied("permission refused".into())),
            MicMode::Missing => Err(VoiceFlowError::DeviceUnavailable("no input device".into())),
            MicMode::Grant(script) => {
                for chunk in script {
                    let _ = chunks.try_send(chunk.clone());
                }
                self.holds.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Hold(self.holds.clone())))
            }
        }
    }
}

/// Uploader answering with a fixed outcome, recording the device holds seen
pub struct FakeUploader {
    outcome: Result<UploadedAudio>,
    holds: Arc<AtomicUsize>,
    gate: Option<Arc<Notify>>,
    pub calls: Arc<AtomicUsize>,
    pub holds_at_upload: Arc<Mutex<Vec<usize>>>,
    pub uploaded: Arc<Mutex<Vec<EncodedAudio>>>,
}

impl AudioUploader for FakeUploader {
    fn upload(&self, audio: EncodedAudio) -> BoxFuture<'static, Result<UploadedAudio>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.holds_at_upload
            .lock()
            .push(self.holds.load(Ordering::SeqCst));
        self.uploaded.lock().push(audio);
        let outcome = self.outcome.clone();
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            outcome
        }
        .boxed()
    }
}

pub fn reply_audio() -> UploadedAudio {
    UploadedAudio {
        bytes: vec![0xff, 0xfb, 0x90, 0x00],
        mime_type: "audio/mpeg".into(),
    }
}

pub fn speech() -> Vec<Vec<f32>> {
    vec![vec![0.25; 160]; 4]
}

pub struct HarnessBuilder {
    config: AppConfig,
    mic: MicMode,
    upload: Result<UploadedAudio>,
    gate: Option<Arc<Notify>>,
    delay: Duration,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default().with_greeting(None),
            mic: MicMode::Grant(speech()),
            upload: Ok(reply_audio()),
            gate: None,
            delay: Duration::from_millis(100),
        }
    }

    pub fn config(mut self, f: impl FnOnce(AppConfig) -> AppConfig) -> Self {
        self.config = f(self.config);
        self
    }

    pub fn mic(mut self, mode: MicMode) -> Self {
        self.mic = mode;
        self
    }

    pub fn upload(mut self, outcome: Result<UploadedAudio>) -> Self {
        self.upload = outcome;
        self
    }

    /// Park every upload until `Harness::release_upload` is called
    pub fn hold_uploads(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn start(self) -> Harness {
        let holds = Arc::new(AtomicUsize::new(0));
        let uploader = FakeUploader {
            outcome: self.upload,
            holds: holds.clone(),
            gate: self.gate.clone(),
            calls: Arc::new(AtomicUsize::new(0)),
            holds_at_upload: Arc::new(Mutex::new(Vec::new())),
            uploaded: Arc::new(Mutex::new(Vec::new())),
        };
        let calls = uploader.calls.clone();
        let holds_at_upload = uploader.holds_at_upload.clone();
        let uploaded = uploader.uploaded.clone();

        let (orchestrator, handle) = Orchestrator::new(self.config).unwrap();
        let join = orchestrator
            .with_microphone(Box::new(ScriptedMicrophone {
                mode: self.mic,
                holds: holds.clone(),
            }))
            .with_uploader(Arc::new(uploader))
            .with_responder(Box::new(SimulatedResponder::new(self.delay)))
            .start()
            .unwrap();

        Harness {
            handle,
            join: Some(join),
            gate: self.gate,
            holds,
            upload_calls: calls,
            holds_at_upload,
            uploaded,
        }
    }
}

pub struct Harness {
    pub handle: OrchestratorHandle,
    join: Option<JoinHandle<()>>,
    gate: Option<Arc<Notify>>,
    pub holds: Arc<AtomicUsize>,
    pub upload_calls: Arc<AtomicUsize>,
    pub holds_at_upload: Arc<Mutex<Vec<usize>>>,
    pub uploaded: Arc<Mutex<Vec<EncodedAudio>>>,
}

impl Harness {
    pub fn state(&self) -> ChatState {
        self.handle.state().snapshot()
    }

    /// Poll the published state until `pred` holds or `WAIT` passes
    pub fn wait_until(&self, pred: impl Fn(&ChatState) -> bool) -> ChatState {
        let deadline = Instant::now() + WAIT;
        loop {
            let state = self.state();
            if pred(&state) {
                return state;
            }
            if Instant::now() > deadline {
                panic!("condition not reached; last state: {:#?}", state);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Let the core process everything queued so far
    pub fn settle(&self) {
        std::thread::sleep(Duration::from_millis(150));
    }

    /// Let one parked upload complete
    pub fn release_upload(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn device_holds(&self) -> usize {
        self.holds.load(Ordering::SeqCst)
    }

    /// Record a clip and wait for the audio pair to be staged
    pub fn record_clip(&self) -> ChatState {
        self.handle.toggle_record().unwrap();
        self.wait_until(|s| s.recording.is_recording());
        self.handle.toggle_record().unwrap();
        self.wait_until(|s| s.draft.audio.is_some())
    }

    pub fn shutdown(mut self) -> OrchestratorHandle {
        self.stop();
        self.handle.clone()
    }

    fn stop(&mut self) {
        self.release_upload();
        let _ = self.handle.shutdown();
        if let Some(join) = self.join.take() {
            join.join().unwrap();
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.stop();
    }
}
