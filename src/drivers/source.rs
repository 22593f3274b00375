use std::panic::{self, AssertUnwindSafe};
use std::thread;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use crate::drivers::PipelineError;
/// One independently generated channel of intensity samples.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSequence {
    pub channel: usize,
    pub samples: Vec<f64>,
}
impl ChannelSequence {
    pub fn new(channel: usize, samples: Vec<f64>) -> Self {
        Self { channel, samples }
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
/// Stochastic process producing normalized samples in [-1, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseProcess {
    WhiteNoise,
    RandomWalk { step: f64 },
}
impl NoiseProcess {
    fn fill(&self, rng: &mut StdRng, len: usize) -> Vec<f64> {
        match *self {
            NoiseProcess::WhiteNoise => (0..len).map(|_| rng.gen_range(-1.0..=1.0)).collect(),
            NoiseProcess::RandomWalk { step } => {
                let half = step.abs() * 0.5;
                let mut value = 0.0f64;
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    if half > 0.0 {
                        value += rng.gen_range(-half..=half);
                    }
                    value = value.clamp(-1.0, 1.0);
                    out.push(value);
                }
                out
            }
        }
    }
}
/// Maps a normalized sample onto the intensity scale handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rescale {
    /// `[-1, 1]` onto `[min, max]`.
    Affine { min: f64, max: f64 },
    /// `|v| * scale`.
    Magnitude { scale: f64 },
}
impl Rescale {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Rescale::Affine { min, max } => min + ((value + 1.0) / 2.0) * (max - min),
            Rescale::Magnitude { scale } => value.abs() * scale,
        }
    }
}
/// Anything that can produce a channel sequence on demand.
///
/// Implementations are shared across the generation threads, so they must be `Sync`.
pub trait ChannelGenerator: Send + Sync {
    fn generate(&self, channel: usize, len: usize) -> Result<ChannelSequence, PipelineError>;
}
/// Seeded or entropy-backed synthetic source.
#[derive(Clone, Debug)]
pub struct SyntheticGenerator {
    pub process: NoiseProcess,
    pub rescale: Rescale,
    pub seed: Option<u64>,
}
impl SyntheticGenerator {
    pub fn new(process: NoiseProcess, rescale: Rescale, seed: Option<u64>) -> Self {
        Self {
            process,
            rescale,
            seed,
        }
    }
    fn rng_for(&self, channel: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(channel as u64)),
            None => StdRng::from_entropy(),
        }
    }
}
impl ChannelGenerator for SyntheticGenerator {
    fn generate(&self, channel: usize, len: usize) -> Result<ChannelSequence, PipelineError> {
        let mut rng = self.rng_for(channel);
        let mut samples = self.process.fill(&mut rng, len);
        for (idx, sample) in samples.iter_mut().enumerate() {
            *sample = self.rescale.apply(*sample);
            if !sample.is_finite() {
                return Err(PipelineError::Generation {
                    channel,
                    reason: format!("sample {idx} is not finite"),
                });
            }
        }
        Ok(ChannelSequence::new(channel, samples))
    }
}
/// Replays fixed per-channel data. Handy for tests and deterministic playback.
pub struct ManualGenerator {
    channels: Vec<Vec<f64>>,
}
impl ManualGenerator {
    pub fn new(channels: Vec<Vec<f64>>) -> Self {
        Self { channels }
    }
}
impl ChannelGenerator for ManualGenerator {
    fn generate(&self, channel: usize, len: usize) -> Result<ChannelSequence, PipelineError> {
        let data = self
            .channels
            .get(channel)
            .ok_or_else(|| PipelineError::Generation {
                channel,
                reason: "no data for channel".into(),
            })?;
        Ok(ChannelSequence::new(
            channel,
            data.iter().copied().take(len).collect(),
        ))
    }
}
/// Generates `channels` sequences of `len` samples on a bounded pool of scoped workers.
///
/// At most `available_parallelism()` workers run; worker `w` handles channels
/// `w, w + workers, ...`. All workers are joined before returning. On failure the
/// error of the lowest failing channel index is returned and no sequence escapes.
pub fn generate_channels<G: ChannelGenerator + ?Sized>(
    generator: &G,
    channels: usize,
    len: usize,
) -> Result<Vec<ChannelSequence>, PipelineError> {
    if channels == 0 || len == 0 {
        return Err(PipelineError::EmptyRequest {
            channels,
            samples: len,
        });
    }
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(channels);
    log::debug!("generating {channels} channels x {len} samples on {workers} workers");
    let mut slots: Vec<Option<Result<ChannelSequence, PipelineError>>> =
        (0..channels).map(|_| None).collect();
    thread::scope(|scope| -> Result<(), PipelineError> {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let handle = thread::Builder::new()
                .name(format!("generate-{worker}"))
                .spawn_scoped(scope, move || {
                    (worker..channels)
                        .step_by(workers)
                        .map(|channel| {
                            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                                generator.generate(channel, len)
                            }))
                            .unwrap_or(Err(PipelineError::GeneratorPanicked { channel }));
                            (channel, result)
                        })
                        .collect::<Vec<_>>()
                })
                .map_err(|err| PipelineError::WorkerSpawn(err.to_string()))?;
            handles.push((worker, handle));
        }
        for (worker, handle) in handles {
            let chunk = handle
                .join()
                .map_err(|_| PipelineError::GeneratorPanicked { channel: worker })?;
            for (channel, result) in chunk {
                slots[channel] = Some(result);
            }
        }
        Ok(())
    })?;
    slots
        .into_iter()
        .enumerate()
        .map(|(channel, slot)| slot.unwrap_or(Err(PipelineError::GeneratorPanicked { channel })))
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    struct FailingGenerator {
        fail_on: usize,
        calls: AtomicUsize,
    }
    impl ChannelGenerator for FailingGenerator {
        fn generate(&self, channel: usize, len: usize) -> Result<ChannelSequence, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if channel >= self.fail_on {
                return Err(PipelineError::Generation {
                    channel,
                    reason: "sensor offline".into(),
                });
            }
            Ok(ChannelSequence::new(channel, vec![0.0; len]))
        }
    }
    struct PanickingGenerator;
    impl ChannelGenerator for PanickingGenerator {
        fn generate(&self, channel: usize, _len: usize) -> Result<ChannelSequence, PipelineError> {
            if channel == 1 {
                panic!("boom");
            }
            Ok(ChannelSequence::new(channel, vec![1.0]))
        }
    }
    fn white(seed: u64) -> SyntheticGenerator {
        SyntheticGenerator::new(
            NoiseProcess::WhiteNoise,
            Rescale::Affine {
                min: 200.0,
                max: 1000.0,
            },
            Some(seed),
        )
    }
    #[test]
    fn affine_rescale_hits_range_ends() {
        let rescale = Rescale::Affine {
            min: 200.0,
            max: 1000.0,
        };
        assert_eq!(rescale.apply(-1.0), 200.0);
        assert_eq!(rescale.apply(1.0), 1000.0);
        assert_eq!(rescale.apply(0.0), 600.0);
        let mut prev = rescale.apply(-1.0);
        for i in 1..=200 {
            let v = -1.0 + i as f64 * 0.01;
            let next = rescale.apply(v);
            assert!(next >= prev);
            prev = next;
        }
    }
    #[test]
    fn magnitude_rescale_is_absolute() {
        let rescale = Rescale::Magnitude { scale: 100.0 };
        assert_eq!(rescale.apply(-0.5), 50.0);
        assert_eq!(rescale.apply(0.25), 25.0);
    }
    #[test]
    fn generates_requested_shape_in_channel_order() {
        let sequences = generate_channels(&white(7), 8, 1000).unwrap();
        assert_eq!(sequences.len(), 8);
        for (idx, seq) in sequences.iter().enumerate() {
            assert_eq!(seq.channel, idx);
            assert_eq!(seq.len(), 1000);
            assert!(seq.samples.iter().all(|v| (200.0..=1000.0).contains(v)));
        }
    }
    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_channels(&white(42), 3, 64).unwrap();
        let b = generate_channels(&white(42), 3, 64).unwrap();
        assert_eq!(a, b);
        assert_ne!(a[0].samples, a[1].samples);
    }
    #[test]
    fn random_walk_stays_in_normalized_range() {
        let generator = SyntheticGenerator::new(
            NoiseProcess::RandomWalk { step: 0.8 },
            Rescale::Magnitude { scale: 100.0 },
            Some(3),
        );
        let seq = generator.generate(0, 5000).unwrap();
        assert!(seq.samples.iter().all(|v| (0.0..=100.0).contains(v)));
    }
    #[test]
    fn non_finite_output_fails_generation() {
        let generator = SyntheticGenerator::new(
            NoiseProcess::WhiteNoise,
            Rescale::Magnitude { scale: f64::NAN },
            Some(1),
        );
        let err = generate_channels(&generator, 2, 4).unwrap_err();
        assert!(matches!(err, PipelineError::Generation { channel: 0, .. }));
    }
    #[test]
    fn first_failure_wins_after_all_tasks_join() {
        let generator = FailingGenerator {
            fail_on: 2,
            calls: AtomicUsize::new(0),
        };
        let err = generate_channels(&generator, 5, 10).unwrap_err();
        assert!(matches!(err, PipelineError::Generation { channel: 2, .. }));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
    }
    #[test]
    fn panicking_task_is_reported() {
        let err = generate_channels(&PanickingGenerator, 3, 1).unwrap_err();
        assert!(matches!(err, PipelineError::GeneratorPanicked { channel: 1 }));
    }
    #[test]
    fn huge_channel_count_runs_on_bounded_workers() {
        struct ThreadTracker {
            seen: Mutex<HashSet<thread::ThreadId>>,
        }
        impl ChannelGenerator for ThreadTracker {
            fn generate(&self, channel: usize, len: usize) -> Result<ChannelSequence, PipelineError> {
                self.seen.lock().unwrap().insert(thread::current().id());
                Ok(ChannelSequence::new(channel, vec![channel as f64; len]))
            }
        }
        let tracker = ThreadTracker {
            seen: Mutex::new(HashSet::new()),
        };
        let sequences = generate_channels(&tracker, 20_000, 4).unwrap();
        assert_eq!(sequences.len(), 20_000);
        assert!(sequences
            .iter()
            .enumerate()
            .all(|(idx, seq)| seq.channel == idx && seq.samples == vec![idx as f64; 4]));
        let cap = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert!(tracker.seen.lock().unwrap().len() <= cap);
    }
    #[test]
    fn empty_request_is_rejected() {
        assert!(matches!(
            generate_channels(&white(0), 0, 10),
            Err(PipelineError::EmptyRequest { .. })
        ));
        assert!(matches!(
            generate_channels(&white(0), 4, 0),
            Err(PipelineError::EmptyRequest { .. })
        ));
    }
}
