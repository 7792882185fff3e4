use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use rand::{rngs::StdRng, SeedableRng};
use ring_visualiser_core::{
    config::{BUFFER_SIZE, MAX_PARTICLES, SAMPLE_RATE, SCREEN_SIZE},
    Canvas, ManualClock, SharedVisualState, SignalGenerator,
};

#[test]
fn audio_thread_and_render_loop_share_state() {
    let shared = SharedVisualState::new();
    let clock = ManualClock::new();
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let mut feed = shared.producer(clock.clone(), StdRng::seed_from_u64(3));
        let clock = clock.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut signal = SignalGenerator::new(SAMPLE_RATE, BUFFER_SIZE);
            for _ in 0..400 {
                let block = signal.kick_train(180.0, 0.9, 0.01);
                feed.on_buffer(&block).unwrap();
                clock.advance(46);
            }
            done.store(true, Ordering::SeqCst);
            feed.onsets()
        })
    };

    let renderer = shared.renderer(clock.clone());
    let mut canvas = Canvas::new(SCREEN_SIZE, SCREEN_SIZE);
    let mut frames = 0;
    while !done.load(Ordering::SeqCst) || frames < 10 {
        renderer.draw(&mut canvas).unwrap();
        frames += 1;

        let state = shared.snapshot().unwrap();
        assert!((0.0..360.0).contains(&state.hue));
        assert!(state.particles.active_count() <= MAX_PARTICLES);
        for (_, particle) in state.particles.iter_active() {
            assert!((1..=49).contains(&particle.lifetime));
        }
    }

    let onsets = producer.join().unwrap();
    assert!(onsets > 1);
    assert_eq!(canvas.frames_presented(), frames);
}

#[test]
fn silence_shrinks_ring_past_center() {
    let shared = SharedVisualState::new();
    let clock = ManualClock::new();
    let mut feed = shared.producer(clock.clone(), StdRng::seed_from_u64(0));
    let renderer = shared.renderer(clock.clone());
    let mut canvas = Canvas::new(SCREEN_SIZE, SCREEN_SIZE);

    feed.on_buffer(&[0; BUFFER_SIZE]).unwrap();
    clock.set(5_000);
    let stats = renderer.draw(&mut canvas).unwrap();

    assert_eq!(stats.radius, -150.0);
    assert_eq!(stats.ring_points, 180);
    assert_eq!(stats.active_particles, 0);
}

#[test]
fn burst_of_beats_saturates_pool_without_error() {
    let shared = SharedVisualState::new();
    let clock = ManualClock::new();
    let mut feed = shared.producer(clock.clone(), StdRng::seed_from_u64(11));

    // Alternate silence and full scale so every loud buffer is an onset.
    let loud = vec![i16::MAX; BUFFER_SIZE];
    let quiet = vec![0; BUFFER_SIZE];
    for _ in 0..MAX_PARTICLES + 50 {
        feed.on_buffer(&quiet).unwrap();
        let frame = feed.on_buffer(&loud).unwrap();
        assert!(frame.onset);
    }

    let state = shared.snapshot().unwrap();
    assert_eq!(state.particles.active_count(), MAX_PARTICLES);
}
