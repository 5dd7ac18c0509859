//! Audio output using cpal
//!
//! Implements the port-per-block [`AudioOut`] contract on top of a cpal
//! output stream. Each open port owns one stream and a ring buffer of
//! 16-bit samples; the stream callback drains the ring buffer and maps the
//! source layout onto the device's channel count.
//!
//! Blocks arrive at the port's sample width and are converted to 16-bit
//! samples on the way into the ring buffer. Submitting a block blocks while
//! the ring buffer is full, and flushing blocks until the device has played
//! it out, so the device clock paces playback.

use crate::audio::port::AudioOut;
use crate::audio::types::{PortId, PortParams};
use crate::error::{PortError, PortOp};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sleep between checks while waiting on the ring buffer
const QUEUE_WAIT: Duration = Duration::from_millis(2);

struct OpenPort {
    id: PortId,
    params: PortParams,
    stream: Stream,
    producer: HeapProd<i16>,
    /// Set by the stream error callback
    error_flag: Arc<AtomicBool>,
    /// Completed data callbacks
    callbacks: Arc<AtomicU64>,
}

/// Audio output ports backed by a cpal device.
///
/// Only one port may be open at a time.
pub struct CpalAudioOut {
    device: Device,
    device_channels: u16,
    sample_format: SampleFormat,
    next_id: u32,
    port: Option<OpenPort>,
}

impl CpalAudioOut {
    /// Open an audio device for output.
    ///
    /// Falls back to the default device if `device_name` is not found.
    pub fn new(device_name: Option<&str>) -> Result<Self, PortError> {
        let host = cpal::default_host();
        let open_err = |msg: String| PortError::new(PortOp::Open, msg);

        let requested = match device_name {
            Some(name) => host
                .output_devices()
                .map_err(|e| open_err(format!("Failed to enumerate devices: {}", e)))?
                .find(|d| d.name().ok().as_deref() == Some(name)),
            None => None,
        };

        let device = match requested {
            Some(dev) => {
                info!("Found requested audio device: {}", device_name.unwrap_or_default());
                dev
            }
            None => {
                if let Some(name) = device_name {
                    warn!("Requested device '{}' not found, falling back to default device", name);
                }
                let dev = host
                    .default_output_device()
                    .ok_or_else(|| open_err("No default output device found".to_string()))?;
                info!(
                    "Using default audio device: {}",
                    dev.name().unwrap_or_else(|_| "Unknown".to_string())
                );
                dev
            }
        };

        let default_config = device
            .default_output_config()
            .map_err(|e| open_err(format!("Failed to get default config: {}", e)))?;

        debug!(
            "Device config: channels={}, format={:?}",
            default_config.channels(),
            default_config.sample_format()
        );

        Ok(Self {
            device,
            device_channels: default_config.channels(),
            sample_format: default_config.sample_format(),
            next_id: 0,
            port: None,
        })
    }

    fn port_mut(&mut self, id: PortId, op: PortOp) -> Result<&mut OpenPort, PortError> {
        match self.port.as_mut() {
            Some(port) if port.id == id => Ok(port),
            _ => Err(PortError::new(op, format!("Port {} is not open", id.0))),
        }
    }

    fn build_stream<T>(
        &self,
        config: &StreamConfig,
        source_channels: usize,
        mut consumer: HeapCons<i16>,
        error_flag: Arc<AtomicBool>,
        callbacks: Arc<AtomicU64>,
    ) -> Result<Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<i16>,
    {
        let device_channels = config.channels as usize;

        self.device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut source = [0i16; 2];
                for frame in data.chunks_mut(device_channels) {
                    // Underrun: play silence rather than split a frame
                    if consumer.occupied_len() < source_channels {
                        frame.fill(T::EQUILIBRIUM);
                        continue;
                    }
                    for slot in source.iter_mut().take(source_channels) {
                        *slot = consumer.try_pop().unwrap_or(0);
                    }
                    write_frame(frame, &source[..source_channels]);
                }
                callbacks.fetch_add(1, Ordering::Relaxed);
            },
            move |err| {
                error!("Audio stream error: {}", err);
                error_flag.store(true, Ordering::Relaxed);
            },
            None,
        )
    }
}

/// Wait until the device has played everything queued
///
/// Once `queued` reaches zero the last samples may still sit in the
/// device's period buffer; the callback after the one that took them
/// only runs once that buffer has been consumed.
fn drain(
    queued: impl Fn() -> usize,
    callbacks: &AtomicU64,
    error_flag: &AtomicBool,
) -> Result<(), PortError> {
    wait_until(error_flag, || queued() == 0)?;
    let target = callbacks.load(Ordering::Relaxed) + 2;
    wait_until(error_flag, || callbacks.load(Ordering::Relaxed) >= target)
}

fn wait_until(error_flag: &AtomicBool, done: impl Fn() -> bool) -> Result<(), PortError> {
    while !done() {
        if error_flag.load(Ordering::Relaxed) {
            return Err(PortError::new(PortOp::Flush, "stream error while draining"));
        }
        std::thread::sleep(QUEUE_WAIT);
    }
    Ok(())
}

/// Map one source frame (mono or stereo) onto a device frame
fn write_frame<T>(frame: &mut [T], source: &[i16])
where
    T: Sample + FromSample<i16>,
{
    match source {
        [mono] => frame.fill(T::from_sample(*mono)),
        [left, right] if frame.len() == 1 => {
            let mixed = ((*left as i32 + *right as i32) / 2) as i16;
            frame[0] = T::from_sample(mixed);
        }
        [left, right] => {
            frame[0] = T::from_sample(*left);
            frame[1] = T::from_sample(*right);
            frame[2..].fill(T::EQUILIBRIUM);
        }
        _ => frame.fill(T::EQUILIBRIUM),
    }
}

impl AudioOut for CpalAudioOut {
    fn open_port(&mut self, params: PortParams) -> Result<PortId, PortError> {
        if let Some(port) = &self.port {
            return Err(PortError::new(
                PortOp::Open,
                format!("Port {} is still open", port.id.0),
            ));
        }

        let source_channels = params.layout.channel_count() as usize;
        let config = StreamConfig {
            channels: self.device_channels,
            sample_rate: cpal::SampleRate(params.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = (params.sample_len as usize * source_channels).max(1);
        let (producer, consumer) = HeapRb::<i16>::new(capacity).split();
        let error_flag = Arc::new(AtomicBool::new(false));
        let callbacks = Arc::new(AtomicU64::new(0));

        let built = match self.sample_format {
            SampleFormat::F32 => {
                self.build_stream::<f32>(
                    &config,
                    source_channels,
                    consumer,
                    Arc::clone(&error_flag),
                    Arc::clone(&callbacks),
                )
            }
            SampleFormat::I16 => {
                self.build_stream::<i16>(
                    &config,
                    source_channels,
                    consumer,
                    Arc::clone(&error_flag),
                    Arc::clone(&callbacks),
                )
            }
            SampleFormat::U16 => {
                self.build_stream::<u16>(
                    &config,
                    source_channels,
                    consumer,
                    Arc::clone(&error_flag),
                    Arc::clone(&callbacks),
                )
            }
            sample_format => {
                return Err(PortError::new(
                    PortOp::Open,
                    format!("Unsupported sample format: {:?}", sample_format),
                ));
            }
        };

        let stream = built
            .map_err(|e| PortError::new(PortOp::Open, format!("Failed to build stream: {}", e)))?;
        stream
            .play()
            .map_err(|e| PortError::new(PortOp::Open, format!("Failed to start stream: {}", e)))?;

        let id = PortId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.port = Some(OpenPort {
            id,
            params,
            stream,
            producer,
            error_flag,
            callbacks,
        });

        debug!(
            "Opened port {}: sample_len={}, sample_rate={}, layout={:?}, width={:?}",
            id.0, params.sample_len, params.sample_rate, params.layout, params.width
        );
        Ok(id)
    }

    fn output(&mut self, id: PortId, block: Option<&[u8]>) -> Result<(), PortError> {
        let op = if block.is_some() { PortOp::Output } else { PortOp::Flush };
        let port = self.port_mut(id, op)?;

        let Some(block) = block else {
            let producer = &port.producer;
            return drain(|| producer.occupied_len(), &port.callbacks, &port.error_flag);
        };

        let expected = port.params.block_bytes();
        if block.len() != expected {
            return Err(PortError::new(
                op,
                format!("block is {} bytes, port expects {}", block.len(), expected),
            ));
        }

        let width = port.params.width;
        for sample in block.chunks_exact(width.bytes()) {
            let mut pending = width.to_i16(sample);
            while let Err(rejected) = port.producer.try_push(pending) {
                if port.error_flag.load(Ordering::Relaxed) {
                    return Err(PortError::new(op, "stream error while queueing"));
                }
                pending = rejected;
                std::thread::sleep(QUEUE_WAIT);
            }
        }
        Ok(())
    }

    fn release_port(&mut self, id: PortId) -> Result<(), PortError> {
        self.port_mut(id, PortOp::Release)?;
        if let Some(port) = self.port.take() {
            port.stream.pause().map_err(|e| {
                PortError::new(PortOp::Release, format!("Failed to pause stream: {}", e))
            })?;
            debug!("Released port {}", id.0);
        }
        Ok(())
    }
}

impl Drop for CpalAudioOut {
    fn drop(&mut self) {
        if let Some(port) = self.port.take() {
            let _ = port.stream.pause();
        }
    }
}
