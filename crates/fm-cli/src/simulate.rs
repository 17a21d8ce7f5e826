//! Simulated recording run: the simulator feeds the recorder on a fixed
//! cadence while the heartbeat chain follows the latest reading.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use fm_core::constants::DEFAULT_BPM;
use fm_core::{
    BiometricSimulator, BpmSource, HapticSynchronizer, Session, SessionRecorder, TracingDevice,
    VibrationDevice,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

pub struct Options {
    pub samples: u32,
    pub rate_ms: u64,
    pub tap_every: Option<u32>,
    pub haptics: bool,
}

pub async fn run(recorder: SessionRecorder, opts: Options) -> Result<Session> {
    let device: Arc<dyn VibrationDevice> = Arc::new(TracingDevice);
    let mut recorder = if opts.haptics {
        recorder.with_panic_alert(Arc::clone(&device))
    } else {
        recorder
    };
    let haptics = HapticSynchronizer::new(device, opts.haptics);

    let mut rng = SmallRng::from_os_rng();
    let mut sim = BiometricSimulator::new();
    let active = recorder.start_session(&mut rng);
    println!("recording:  {} ({})", active.name, active.id);

    let latest = Arc::new(AtomicU64::new(DEFAULT_BPM.to_bits()));
    let reader = Arc::clone(&latest);
    haptics.start_bpm_sync(BpmSource::producer(move || {
        f64::from_bits(reader.load(Ordering::SeqCst))
    }));

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);
    let mut ticker = tokio::time::interval(Duration::from_millis(opts.rate_ms));

    for i in 1..=opts.samples {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut interrupted => {
                eprintln!("interrupted; ending session early");
                break;
            }
        }

        if opts.tap_every.is_some_and(|k| k > 0 && i % k == 0) {
            sim.tap();
        }
        let reading = sim.step(&mut rng);
        latest.store(reading.bpm.to_bits(), Ordering::SeqCst);
        tracing::debug!(
            bpm = reading.bpm,
            stress = reading.stress,
            signal = %reading.signal,
            "sample"
        );

        if let Some(event) = recorder.record_data_point(reading.bpm, reading.stress) {
            println!(
                "PANIC       bpm {} stress {} [{}]",
                event.bpm, event.stress, reading.signal
            );
        }
    }

    haptics.stop();
    recorder
        .end_session()
        .ok_or_else(|| anyhow::anyhow!("session ended unexpectedly"))
}
