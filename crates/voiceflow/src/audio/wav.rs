use crate::error::{Result, VoiceFlowError};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

/// Encode f32 samples (range -1.0 to 1.0) as a 16-bit PCM WAV file in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(|e| {
            VoiceFlowError::AudioProcessingError(format!("Failed to create WAV writer: {}", e))
        })?;

        for &sample in samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16).map_err(|e| {
                VoiceFlowError::AudioProcessingError(format!("Failed to write sample: {}", e))
            })?;
        }

        writer.finalize().map_err(|e| {
            VoiceFlowError::AudioProcessingError(format!("Failed to finalize WAV data: {}", e))
        })?;
    }

    let bytes = cursor.into_inner();
    debug!(
        "Encoded {} samples at {}Hz into {} bytes of WAV",
        samples.len(),
        sample_rate,
        bytes.len()
    );
    Ok(bytes)
}
