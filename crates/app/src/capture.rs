use std::{
    path::Path,
    thread,
    time::{Duration, Instant},
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SizedSample, Stream, StreamConfig, SupportedStreamConfig,
};
use rand::{rngs::StdRng, SeedableRng};
use ring_visualiser_core::{
    config::{BUFFER_SIZE, SAMPLE_RATE, SCREEN_SIZE},
    AudioFeed, Canvas, MonoBlocker, MonotonicClock, Result, RingVizError, SharedVisualState,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Feeds the default input device into the shared state and renders into an
/// off-screen canvas until `seconds` elapse (or forever).
pub fn run_live(seconds: Option<u64>, snapshot: Option<&Path>) -> Result<()> {
    let shared = SharedVisualState::new();
    let clock = MonotonicClock::start();
    let feed = shared.producer(clock, StdRng::from_entropy());

    let _stream = open_input(feed)?;
    let renderer = shared.renderer(clock);
    let mut canvas = Canvas::new(SCREEN_SIZE, SCREEN_SIZE);

    let started = Instant::now();
    let mut last_report = Instant::now();
    loop {
        let stats = renderer.draw(&mut canvas)?;

        if last_report.elapsed() >= Duration::from_secs(1) {
            tracing::info!(
                radius = stats.radius,
                particles = stats.active_particles,
                "frame"
            );
            last_report = Instant::now();
        }

        if seconds.is_some_and(|limit| started.elapsed() >= Duration::from_secs(limit)) {
            break;
        }
        thread::sleep(FRAME_INTERVAL);
    }

    if let Some(path) = snapshot {
        canvas.save_png(path)?;
        tracing::info!(?path, "wrote snapshot");
    }
    Ok(())
}

/// Prefers a device config that can run at [`SAMPLE_RATE`], in whatever
/// channel layout the device offers. Falls back to the device default.
fn pick_input_config(device: &cpal::Device) -> Result<SupportedStreamConfig> {
    let wanted = cpal::SampleRate(SAMPLE_RATE);
    let matching = device.supported_input_configs().ok().and_then(|mut ranges| {
        ranges.find(|range| range.min_sample_rate() <= wanted && wanted <= range.max_sample_rate())
    });

    match matching {
        Some(range) => Ok(range.with_sample_rate(wanted)),
        None => {
            let fallback = device
                .default_input_config()
                .map_err(|err| RingVizError::msg(format!("input config: {err}")))?;
            tracing::warn!(
                wanted = SAMPLE_RATE,
                actual = fallback.sample_rate().0,
                "device cannot capture at the analysis rate; using its default"
            );
            Ok(fallback)
        }
    }
}

fn open_input(feed: AudioFeed<MonotonicClock, StdRng>) -> Result<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| RingVizError::msg("no default input device"))?;
    let supported = pick_input_config(&device)?;

    // Native channel count and host-chosen buffer size; the callback
    // downmixes and re-blocks.
    let stream_config: StreamConfig = supported.config();
    let channels = supported.channels() as usize;
    tracing::info!(
        device = %device.name().unwrap_or_default(),
        format = ?supported.sample_format(),
        sample_rate = stream_config.sample_rate.0,
        channels,
        "opening input stream"
    );

    let stream = match supported.sample_format() {
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, feed, channels)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, feed, channels)?,
        cpal::SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, feed, channels)?,
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, feed, channels)?,
        format => {
            return Err(RingVizError::msg(format!(
                "unsupported sample format '{format}'"
            )))
        }
    };

    stream
        .play()
        .map_err(|err| RingVizError::msg(format!("starting input stream: {err}")))?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut feed: AudioFeed<MonotonicClock, StdRng>,
    channels: usize,
) -> Result<Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let mut blocker = MonoBlocker::new(channels, BUFFER_SIZE);
    let mut scratch: Vec<i16> = Vec::with_capacity(BUFFER_SIZE * channels.max(1));

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                scratch.extend(data.iter().map(|&s| s.to_sample::<i16>()));

                blocker.push(&scratch, |block| {
                    if let Err(err) = feed.on_buffer(block) {
                        tracing::error!(%err, "dropping audio buffer");
                    }
                });
            },
            |err| tracing::error!(%err, "input stream error"),
            None,
        )
        .map_err(|err| RingVizError::msg(format!("building input stream: {err}")))?;

    Ok(stream)
}
