//! Microphone capture using cpal
//!
//! The default input device is looked up fresh for every recording so a
//! device plugged in after startup is picked up, and nothing is held between
//! recordings.

use super::device::{AudioFormat, CaptureStream, Microphone};
use crate::error::{Result, VoiceFlowError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BuildStreamError, DefaultStreamConfigError, Device, FromSample, PlayStreamError, Sample,
    SampleFormat, SizedSample, Stream, StreamConfig,
};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default system microphone
#[derive(Debug, Default)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }
}

impl Microphone for CpalMicrophone {
    fn open(&mut self, chunks: Sender<Vec<f32>>) -> Result<Box<dyn CaptureStream>> {
        let host = cpal::default_host();

        let device = host.default_input_device().ok_or_else(|| {
            VoiceFlowError::DeviceUnavailable("No input device available".into())
        })?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using input device: {}", device_name);

        let supported = device.default_input_config().map_err(config_error)?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        info!(
            "Audio config: {}Hz, {} channel(s), {:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, chunks)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, chunks)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, chunks)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &config, chunks)?,
            other => {
                return Err(VoiceFlowError::DeviceUnavailable(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream.play().map_err(play_error)?;
        info!("Microphone stream started");

        Ok(Box::new(CpalCapture {
            stream,
            format: AudioFormat::mono(config.sample_rate.0),
        }))
    }
}

/// Live cpal input stream; dropping it releases the device
struct CpalCapture {
    stream: Stream,
    format: AudioFormat,
}

impl CaptureStream for CpalCapture {
    fn format(&self) -> AudioFormat {
        self.format
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stream.pause() {
            debug!("Failed to pause input stream on release: {}", e);
        }
        info!("Microphone stream released");
    }
}

fn build_stream<T>(device: &Device, config: &StreamConfig, chunks: Sender<Vec<f32>>) -> Result<Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0 as usize;
    let sample_count = Arc::new(AtomicUsize::new(0));

    let err_fn = |err| {
        error!("Audio input stream error: {}", err);
    };

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // Down-mix to mono
                let samples: Vec<f32> = data
                    .chunks(channels)
                    .map(|frame| {
                        frame.iter().map(|s| s.to_sample::<f32>()).sum::<f32>() / channels as f32
                    })
                    .collect();

                let count = sample_count.fetch_add(samples.len(), Ordering::Relaxed);
                if sample_rate > 0 && count % sample_rate < samples.len() {
                    debug!(
                        "Audio captured: {} samples ({:.1}s)",
                        count + samples.len(),
                        (count + samples.len()) as f32 / sample_rate as f32
                    );
                }

                if let Err(e) = chunks.try_send(samples) {
                    warn!("Dropping audio chunk: {}", e);
                }
            },
            err_fn,
            None,
        )
        .map_err(build_error)
}

fn config_error(e: DefaultStreamConfigError) -> VoiceFlowError {
    match e {
        DefaultStreamConfigError::DeviceNotAvailable => {
            VoiceFlowError::DeviceUnavailable(e.to_string())
        }
        other => VoiceFlowError::DeviceAccessDenied(format!("Failed to get input config: {}", other)),
    }
}

fn build_error(e: BuildStreamError) -> VoiceFlowError {
    match e {
        BuildStreamError::DeviceNotAvailable => VoiceFlowError::DeviceUnavailable(e.to_string()),
        other => {
            VoiceFlowError::DeviceAccessDenied(format!("Failed to build input stream: {}", other))
        }
    }
}

fn play_error(e: PlayStreamError) -> VoiceFlowError {
    match e {
        PlayStreamError::DeviceNotAvailable => VoiceFlowError::DeviceUnavailable(e.to_string()),
        other => {
            VoiceFlowError::DeviceAccessDenied(format!("Failed to start input stream: {}", other))
        }
    }
}
