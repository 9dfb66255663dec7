//! Real audio output for the music scheduler (feature `audio`).
//!
//! One infinite rodio [`Source`] renders the whole mix: scheduled voices are
//! summed, scaled by the master gain, pushed through a `tanh` drive and a
//! resonant lowpass.  The number of samples rendered so far is the audio
//! clock reported by [`RodioSink::now`].

use std::f32::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::{OutputStream, OutputStreamHandle, Source};

use crate::error::AudioError;
use crate::music::{
    AudioSink, MixParams, MixRamp, NoiseBurst, Tone, Waveform, DRIVE, ENVELOPE_FLOOR, NOISE_ATTACK,
    NOISE_TAIL, TONE_ATTACK, TONE_TAIL,
};

pub const SAMPLE_RATE: u32 = 44_100;

/// Samples rendered between pulls from the shared queue.
const BLOCK: u64 = 128;

// ── Voices ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum Timbre {
    Osc { wave: Waveform, phase: f32, step: f32 },
    Noise { cutoff_hz: f32, prev_in: f32, prev_out: f32 },
}

/// One scheduled note, timed in samples.
#[derive(Clone, Copy, Debug)]
struct Voice {
    timbre: Timbre,
    start: u64,
    attack: u64,
    end: u64,
    stop: u64,
    peak: f32,
}

impl Voice {
    fn from_tone(tone: &Tone, rate: f32) -> Self {
        let freq = tone.freq_hz * 2f32.powf(tone.detune_cents / 1200.0);
        Self {
            timbre: Timbre::Osc {
                wave: tone.wave,
                phase: 0.0,
                step: freq / rate,
            },
            start: to_samples(tone.at, rate),
            attack: to_samples(TONE_ATTACK, rate).max(1),
            end: to_samples(tone.at + tone.duration, rate),
            stop: to_samples(tone.at + tone.duration + TONE_TAIL, rate),
            peak: tone.gain.max(ENVELOPE_FLOOR),
        }
    }

    fn from_noise(burst: &NoiseBurst, rate: f32) -> Self {
        Self {
            timbre: Timbre::Noise {
                cutoff_hz: burst.highpass_hz,
                prev_in: 0.0,
                prev_out: 0.0,
            },
            start: to_samples(burst.at, rate),
            attack: to_samples(NOISE_ATTACK, rate).max(1),
            end: to_samples(burst.at + burst.duration, rate),
            stop: to_samples(burst.at + burst.duration + NOISE_TAIL, rate),
            peak: burst.gain.max(ENVELOPE_FLOOR),
        }
    }

    /// Exponential rise from the floor to the peak, then exponential decay
    /// back to the floor by `end`.
    fn envelope(&self, n: u64) -> f32 {
        let since = n.saturating_sub(self.start);
        let ratio = self.peak / ENVELOPE_FLOOR;
        if since < self.attack {
            return ENVELOPE_FLOOR * ratio.powf(since as f32 / self.attack as f32);
        }
        let decay = self.end.saturating_sub(self.start + self.attack).max(1);
        let into = (since - self.attack).min(decay);
        self.peak * ratio.powf(-(into as f32) / decay as f32)
    }

    fn sample(&mut self, n: u64, rate: f32, rng: &mut StdRng) -> f32 {
        let env = self.envelope(n);
        let raw = match &mut self.timbre {
            Timbre::Osc { wave, phase, step } => {
                let v = oscillator(*wave, *phase);
                *phase = (*phase + *step).fract();
                v
            }
            Timbre::Noise { cutoff_hz, prev_in, prev_out } => {
                let span = self.end.saturating_sub(self.start).max(1);
                let fade = 1.0 - (n.saturating_sub(self.start) as f32 / span as f32).min(1.0);
                let x = rng.gen_range(-1.0f32..1.0) * fade;
                let rc = 1.0 / (2.0 * PI * *cutoff_hz);
                let a = rc / (rc + 1.0 / rate);
                let y = a * (*prev_out + x - *prev_in);
                *prev_in = x;
                *prev_out = y;
                y
            }
        };
        raw * env
    }
}

fn to_samples(seconds: f64, rate: f32) -> u64 {
    (seconds.max(0.0) * f64::from(rate)).round() as u64
}

fn oscillator(wave: Waveform, phase: f32) -> f32 {
    match wave {
        Waveform::Sine => (2.0 * PI * phase).sin(),
        Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

// ── Master bus ────────────────────────────────────────────────────────────────

/// RBJ lowpass biquad, direct form I.
#[derive(Clone, Copy, Debug, Default)]
struct Lowpass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Lowpass {
    fn tune(&mut self, cutoff_hz: f32, q: f32, rate: f32) {
        let w0 = 2.0 * PI * cutoff_hz.clamp(10.0, rate * 0.45) / rate;
        let alpha = w0.sin() / (2.0 * q.max(0.05));
        let cos = w0.cos();
        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cos) / 2.0 / a0;
        self.b1 = (1.0 - cos) / a0;
        self.b2 = self.b0;
        self.a1 = -2.0 * cos / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

#[derive(Debug)]
struct Queue {
    incoming: Vec<Voice>,
    ramp: MixRamp,
}

/// The rodio source that renders the mix.
struct Bus {
    queue: Arc<Mutex<Queue>>,
    clock: Arc<AtomicU64>,
    rate: f32,
    voices: Vec<Voice>,
    ramp: MixRamp,
    mix: MixParams,
    filter: Lowpass,
    rng: StdRng,
    n: u64,
}

impl Bus {
    fn refresh(&mut self) {
        if let Ok(mut queue) = self.queue.lock() {
            self.voices.append(&mut queue.incoming);
            self.ramp = queue.ramp;
        }
        let n = self.n;
        self.voices.retain(|v| v.stop > n);
        self.mix = self.ramp.value_at(n as f64 / f64::from(self.rate));
        self.filter.tune(self.mix.cutoff_hz, self.mix.resonance, self.rate);
    }
}

impl Iterator for Bus {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.n % BLOCK == 0 {
            self.refresh();
        }
        let n = self.n;
        let mut sum = 0.0;
        for voice in self.voices.iter_mut().filter(|v| v.start <= n && n < v.stop) {
            sum += voice.sample(n, self.rate, &mut self.rng);
        }
        let driven = (DRIVE * sum * self.mix.master_gain).tanh();
        let out = self.filter.process(driven);

        self.n += 1;
        self.clock.store(self.n, Ordering::Release);
        Some(out)
    }
}

impl Source for Bus {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.rate as u32
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// [`AudioSink`] playing through the default output device.
pub struct RodioSink {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    queue: Arc<Mutex<Queue>>,
    clock: Arc<AtomicU64>,
    rate: f32,
}

impl RodioSink {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

        let ramp = MixRamp::default();
        let queue = Arc::new(Mutex::new(Queue {
            incoming: Vec::new(),
            ramp,
        }));
        let clock = Arc::new(AtomicU64::new(0));
        let rate = SAMPLE_RATE as f32;

        let bus = Bus {
            queue: Arc::clone(&queue),
            clock: Arc::clone(&clock),
            rate,
            voices: Vec::new(),
            ramp,
            mix: MixParams::INITIAL,
            filter: Lowpass::default(),
            rng: StdRng::from_entropy(),
            n: 0,
        };
        handle
            .play_raw(bus)
            .map_err(|e| AudioError::Playback(e.to_string()))?;

        log::info!("audio output open at {SAMPLE_RATE} Hz");
        Ok(Self {
            _stream: stream,
            _handle: handle,
            queue,
            clock,
            rate,
        })
    }

    fn push(&mut self, voice: Voice) {
        match self.queue.lock() {
            Ok(mut queue) => queue.incoming.push(voice),
            Err(_) => log::warn!("audio queue poisoned, note dropped"),
        }
    }
}

impl AudioSink for RodioSink {
    fn now(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / f64::from(self.rate)
    }

    fn tone(&mut self, tone: Tone) {
        let voice = Voice::from_tone(&tone, self.rate);
        self.push(voice);
    }

    fn noise(&mut self, burst: NoiseBurst) {
        let voice = Voice::from_noise(&burst, self.rate);
        self.push(voice);
    }

    fn ramp_mix(&mut self, target: MixParams, at: f64, time_constant: f64) {
        match self.queue.lock() {
            Ok(mut queue) => queue.ramp.retarget(target, at, time_constant),
            Err(_) => log::warn!("audio queue poisoned, mix change dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_peaks_after_attack() {
        let tone = Tone {
            at: 0.0,
            midi: 69,
            freq_hz: 440.0,
            duration: 0.5,
            wave: Waveform::Sine,
            gain: 0.1,
            detune_cents: 0.0,
        };
        let v = Voice::from_tone(&tone, SAMPLE_RATE as f32);
        assert!((v.envelope(v.attack) - 0.1).abs() < 1e-4);
        assert!(v.envelope(v.end) <= ENVELOPE_FLOOR * 1.01);
        assert!(v.envelope(0) <= ENVELOPE_FLOOR * 1.01);
    }
}
