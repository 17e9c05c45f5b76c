//! Microphone capture.
//!
//! cpal streams are not `Send`, so each recording runs on its own OS
//! thread that owns the stream for its whole lifetime. The session
//! handle talks to that thread over std channels; dropping the handle
//! stops the capture so the device is always released.
//!
//! Captured samples are downmixed to mono, encoded as 16-bit PCM WAV
//! and returned as a `data:audio/wav;base64,...` URI ready for the
//! transcription flow.

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use hound::{SampleFormat as WavSampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::domain::DomainError;
use crate::shared::data_uri;

pub struct MicRecorder;

impl MicRecorder {
    /// Start capturing from the default input device.
    pub fn start() -> Result<RecordingSession, DomainError> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (result_tx, result_rx) = mpsc::channel::<Result<String, DomainError>>();

        thread::spawn(move || {
            let result = capture(stop_rx);
            // Receiver may be gone if the session was dropped mid-error.
            let _ = result_tx.send(result);
        });

        Ok(RecordingSession {
            stop_tx,
            result_rx,
            finished: false,
        })
    }
}

/// Handle to an in-progress recording. Stop it with [`finish`], or drop
/// it to discard the capture.
///
/// [`finish`]: RecordingSession::finish
pub struct RecordingSession {
    stop_tx: mpsc::Sender<()>,
    result_rx: mpsc::Receiver<Result<String, DomainError>>,
    finished: bool,
}

impl RecordingSession {
    /// Stop the capture and return the recording as a data URI.
    ///
    /// Blocking; call from `spawn_blocking` in async context.
    pub fn finish(mut self) -> Result<String, DomainError> {
        self.finished = true;
        let _ = self.stop_tx.send(());
        self.result_rx
            .recv()
            .map_err(|_| DomainError::Device("recording thread exited unexpectedly".into()))?
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.stop_tx.send(());
        }
    }
}

fn capture(stop_rx: mpsc::Receiver<()>) -> Result<String, DomainError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| DomainError::Device("no input device available".into()))?;
    let config = device
        .default_input_config()
        .map_err(|e| DomainError::Device(format!("failed to query input config: {}", e)))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels();
    debug!(sample_rate, channels, format = ?config.sample_format(), "recording started");

    let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<f32>>();
    let err_fn = |e| debug!("input stream error: {}", e);

    let stream = match config.sample_format() {
        SampleFormat::F32 => device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = chunk_tx.send(data.to_vec());
                },
                err_fn,
                None,
            )
            .map_err(|e| DomainError::Device(format!("failed to open input stream: {}", e)))?,
        SampleFormat::I16 => device
            .build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let converted = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    let _ = chunk_tx.send(converted);
                },
                err_fn,
                None,
            )
            .map_err(|e| DomainError::Device(format!("failed to open input stream: {}", e)))?,
        other => {
            return Err(DomainError::Device(format!(
                "unsupported sample format: {:?}",
                other
            )));
        }
    };

    stream
        .play()
        .map_err(|e| DomainError::Device(format!("failed to start capture: {}", e)))?;

    // Block until the session asks us to stop (or is dropped).
    let _ = stop_rx.recv();
    drop(stream);

    let mut samples: Vec<f32> = Vec::new();
    while let Ok(chunk) = chunk_rx.try_recv() {
        samples.extend(chunk);
    }
    debug!(frames = samples.len() / channels as usize, "recording stopped");

    encode_wav(&samples, channels, sample_rate)
}

/// Downmix to mono and encode as 16-bit PCM WAV, base64-wrapped in a
/// data URI.
fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Result<String, DomainError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: WavSampleFormat::Int,
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buf, spec)
            .map_err(|e| DomainError::Device(format!("failed to encode WAV: {}", e)))?;
        for frame in samples.chunks(channels.max(1) as usize) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            let amplitude = (mono.clamp(-1.0, 1.0) * 32767.0) as i16;
            writer
                .write_sample(amplitude)
                .map_err(|e| DomainError::Device(format!("failed to encode WAV: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| DomainError::Device(format!("failed to encode WAV: {}", e)))?;
    }

    Ok(data_uri::encode("audio/wav", &buf.into_inner()))
}
