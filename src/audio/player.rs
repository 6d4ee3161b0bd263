// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Cue playback.
//!
//! Clips are downloaded once, decoded with symphonia and cached. Each play
//! request runs on its own thread, resamples the clip to the device rate
//! with rubato and drives a cpal output stream on the default device until
//! the clip ends.

use super::{Attempt, AudioCue};
use crate::config::AudioConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Failed to fetch clip: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Failed to decode clip: {0}")]
    Decode(String),

    #[error("Failed to resample clip: {0}")]
    Resample(String),

    #[error("No audio output device available")]
    NoDevice,

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Decoded interleaved PCM.
#[derive(Debug)]
pub struct Clip {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

type ClipCache = Arc<Mutex<HashMap<AudioCue, Arc<Clip>>>>;

/// Plays cues in the background.
pub struct AudioPlayer {
    http: reqwest::blocking::Client,
    config: AudioConfig,
    cache: ClipCache,
}

impl AudioPlayer {
    pub fn new(config: AudioConfig) -> Result<Self, PlaybackError> {
        Ok(Self {
            http: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
            config,
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Start playing `cue`; `on_failure` runs on the playback thread if it fails.
    pub fn play<F>(&self, cue: AudioCue, attempt: Attempt, on_failure: F)
    where
        F: FnOnce(PlaybackError) + Send + 'static,
    {
        let http = self.http.clone();
        let url = cue.url(&self.config).to_string();
        let volume = self.config.volume;
        let cache = Arc::clone(&self.cache);

        std::thread::spawn(move || {
            let result = load_clip(&http, &cache, cue, &url).and_then(|clip| play_clip(&clip, volume));
            match result {
                Ok(()) => log::debug!("Played {:?} cue ({:?})", cue, attempt),
                Err(e) => {
                    log::warn!("Audio playback failed: {}", e);
                    on_failure(e);
                }
            }
        });
    }
}

fn load_clip(
    http: &reqwest::blocking::Client,
    cache: &ClipCache,
    cue: AudioCue,
    url: &str,
) -> Result<Arc<Clip>, PlaybackError> {
    if let Some(clip) = cache.lock().ok().and_then(|c| c.get(&cue).cloned()) {
        return Ok(clip);
    }

    let bytes = http.get(url).send()?.error_for_status()?.bytes()?;
    let clip = Arc::new(decode_clip(bytes.to_vec())?);
    log::info!(
        "Loaded {:?} cue: {} samples at {} Hz, {} channels",
        cue,
        clip.samples.len(),
        clip.sample_rate,
        clip.channels
    );

    if let Ok(mut c) = cache.lock() {
        c.insert(cue, Arc::clone(&clip));
    }
    Ok(clip)
}

/// Decode an MP3 clip to interleaved f32 samples.
fn decode_clip(bytes: Vec<u8>) -> Result<Clip, PlaybackError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::Decode("No audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(PlaybackError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count() as u16);

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("Skipping corrupt packet: {}", e);
            }
            Err(e) => return Err(PlaybackError::Decode(e.to_string())),
        }
    }

    match (sample_rate, channels) {
        (Some(sample_rate), Some(channels)) if channels > 0 && !samples.is_empty() => Ok(Clip {
            samples,
            sample_rate,
            channels,
        }),
        _ => Err(PlaybackError::Decode("Clip contains no audio".to_string())),
    }
}

/// Play `clip` on the default output device, blocking until it finishes.
fn play_clip(clip: &Clip, volume: f32) -> Result<(), PlaybackError> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or(PlaybackError::NoDevice)?;
    let supported = device
        .default_output_config()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;
    let sample_format = supported.sample_format();
    let config = supported.config();

    let resampled = resample(&clip.samples, clip.channels, clip.sample_rate, config.sample_rate.0)?;
    let samples = remix(&resampled, clip.channels, config.channels, volume);
    let frames = samples.len() / config.channels.max(1) as usize;
    let duration = Duration::from_secs_f64(frames as f64 / config.sample_rate.0 as f64);
    let finished = Arc::new(AtomicBool::new(false));

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, Arc::clone(&finished)),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, Arc::clone(&finished)),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, Arc::clone(&finished)),
        other => Err(PlaybackError::Device(format!(
            "Unsupported sample format {:?}",
            other
        ))),
    }?;
    stream
        .play()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;

    let deadline = Instant::now() + duration + Duration::from_millis(500);
    while !finished.load(Ordering::Acquire) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    // Let the last buffer drain.
    std::thread::sleep(Duration::from_millis(100));
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
    finished: Arc<AtomicBool>,
) -> Result<cpal::Stream, PlaybackError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut position = 0usize;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for slot in data.iter_mut() {
                    let sample = samples.get(position).copied().unwrap_or(0.0);
                    *slot = T::from_sample(sample);
                    position += 1;
                }
                if position >= samples.len() {
                    finished.store(true, Ordering::Release);
                }
            },
            |e| log::warn!("Audio stream error: {}", e),
            None,
        )
        .map_err(|e| PlaybackError::Device(e.to_string()))
}

/// Convert interleaved samples from `src_rate` to `dst_rate`.
pub fn resample(samples: &[f32], channels: u16, src_rate: u32, dst_rate: u32) -> Result<Vec<f32>, PlaybackError> {
    if src_rate == dst_rate {
        return Ok(samples.to_vec());
    }
    if src_rate == 0 || dst_rate == 0 {
        return Err(PlaybackError::Resample(format!("invalid rate {} -> {}", src_rate, dst_rate)));
    }

    let planar = deinterleave(samples, channels);
    let frames = planar.first().map_or(0, Vec::len);
    if frames == 0 {
        return Ok(Vec::new());
    }

    log::debug!("Resampling {} frames from {} Hz to {} Hz", frames, src_rate, dst_rate);
    let mut resampler = FastFixedIn::<f32>::new(
        dst_rate as f64 / src_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        frames,
        planar.len(),
    )
    .map_err(|e| PlaybackError::Resample(e.to_string()))?;

    let output = resampler
        .process(&planar, None)
        .map_err(|e| PlaybackError::Resample(e.to_string()))?;
    Ok(interleave(&output))
}

/// Map interleaved samples onto another channel layout, scaled by `volume`.
///
/// Mono is duplicated to every output channel; downmixing to mono averages
/// the source channels.
pub fn remix(samples: &[f32], src_channels: u16, dst_channels: u16, volume: f32) -> Vec<f32> {
    let src_ch = src_channels.max(1) as usize;
    let dst_ch = dst_channels.max(1) as usize;

    let mut out = Vec::with_capacity(samples.len() / src_ch * dst_ch);
    for frame in samples.chunks_exact(src_ch) {
        for c in 0..dst_ch {
            let sample = if src_ch == 1 {
                frame[0]
            } else if dst_ch == 1 {
                frame.iter().sum::<f32>() / src_ch as f32
            } else {
                frame[c.min(src_ch - 1)]
            };
            out.push(sample * volume);
        }
    }
    out
}

fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
    let channels = channels.max(1) as usize;
    let mut planar = vec![Vec::with_capacity(samples.len() / channels); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, sample) in planar.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }
    planar
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(frames * planar.len());
    for i in 0..frames {
        out.extend(planar.iter().map(|channel| channel[i]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_untouched() {
        let samples = vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        assert_eq!(resample(&samples, 2, 44100, 44100).unwrap(), samples);
    }

    #[test]
    fn test_resample_to_device_rate() {
        let frames = 4410;
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let t = i as f32 / 44100.0;
            let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
            samples.push(sample);
            samples.push(sample);
        }

        let out = resample(&samples, 2, 44100, 48000).unwrap();
        let out_frames = out.len() / 2;
        assert!((4790..=4810).contains(&out_frames), "got {} frames", out_frames);
        assert!(out.iter().all(|s| s.abs() <= 0.6));
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 2, 44100, 48000).unwrap().is_empty());
    }

    #[test]
    fn test_deinterleave_and_back() {
        let planar = deinterleave(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);
        assert_eq!(planar, vec![vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]]);
        assert_eq!(interleave(&planar), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_remix_mono_to_stereo_with_volume() {
        assert_eq!(remix(&[0.5, 1.0], 1, 2, 0.5), vec![0.25, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn test_remix_stereo_to_mono_averages() {
        assert_eq!(remix(&[1.0, 0.0, 0.0, 1.0], 2, 1, 1.0), vec![0.5, 0.5]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_clip(b"definitely not an mp3".to_vec()),
            Err(PlaybackError::Decode(_))
        ));
    }
}
