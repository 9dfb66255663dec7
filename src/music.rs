//! Procedural background music: a one-bar intro followed by a repeating
//! four-bar loop in A minor, with a faster and brighter "urgent" variant for
//! the second half of the boss fight.
//!
//! The scheduler never owns a thread.  It is polled from the frame loop,
//! writes a whole phrase ahead of the audio clock into an [`AudioSink`] and
//! arms a [`Wake`] for just before that phrase runs out.

use std::time::Instant;

use crate::clock::Wake;

// ── Timing ───────────────────────────────────────────────────────────────────

pub const NORMAL_BPM: f64 = 112.0;
pub const URGENT_BPM: f64 = 132.0;

/// How far past "now" the first note of a phrase may land.
const LOOKAHEAD: f64 = 0.06;
/// Gap kept between the end of the previous phrase and the next one.
const PHRASE_GAP: f64 = 0.01;
/// Wake this long before the scheduled audio runs out.
const WAKE_EARLY: f64 = 0.03;
/// Re-check interval while muted.
const MUTED_RECHECK: f64 = 0.12;

const INTRO_BEATS: f64 = 4.0;
const LOOP_BARS: usize = 4;
const BEATS_PER_BAR: f64 = 4.0;

// ── Voice shaping (consumed by sinks that synthesize) ────────────────────────

/// Envelope floor for exponential ramps.
pub const ENVELOPE_FLOOR: f32 = 0.0001;
pub const TONE_ATTACK: f64 = 0.015;
pub const NOISE_ATTACK: f64 = 0.005;
/// Oscillators keep running this long after their nominal end.
pub const TONE_TAIL: f64 = 0.03;
pub const NOISE_TAIL: f64 = 0.02;
pub const HAT_HIGHPASS_HZ: f32 = 5000.0;
/// Drive stage: `tanh(DRIVE * x)`.
pub const DRIVE: f32 = 1.2;
/// Time constant for mix parameter changes.
pub const MIX_TIME_CONSTANT: f64 = 0.08;

// ── Phrases ──────────────────────────────────────────────────────────────────

const INTRO_HOOK: [u8; 8] = [69, 72, 76, 74, 76, 72, 69, 69];
/// A2 on beat 0, E2 on beat 2.
const INTRO_BASS: [(f64, u8); 2] = [(0.0, 45), (2.0, 40)];

/// Am | F | G | Em
const CHORDS: [[u8; 3]; LOOP_BARS] = [[57, 60, 64], [53, 57, 60], [55, 59, 62], [52, 55, 59]];
const BASS_ROOTS: [u8; LOOP_BARS] = [45, 41, 43, 40];
const MOTIFS: [[u8; 8]; LOOP_BARS] = [
    [69, 72, 76, 74, 76, 72, 69, 69],
    [69, 72, 74, 72, 76, 74, 72, 69],
    [71, 74, 78, 76, 78, 74, 71, 71],
    [69, 72, 76, 74, 72, 69, 69, 69],
];

/// Frequency of a MIDI note in equal temperament (A4 = 69 = 440 Hz).
pub fn note_hz(midi: u8) -> f32 {
    440.0 * 2f32.powf((f32::from(midi) - 69.0) / 12.0)
}

pub fn beat_len(urgent: bool) -> f64 {
    60.0 / if urgent { URGENT_BPM } else { NORMAL_BPM }
}

// ── Events handed to the sink ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One oscillator note.  `at` is in the sink's clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub at: f64,
    pub midi: u8,
    pub freq_hz: f32,
    pub duration: f64,
    pub wave: Waveform,
    pub gain: f32,
    pub detune_cents: f32,
}

impl Tone {
    fn new(at: f64, midi: u8, duration: f64, wave: Waveform, gain: f32) -> Self {
        Self {
            at,
            midi,
            freq_hz: note_hz(midi),
            duration,
            wave,
            gain,
            detune_cents: 0.0,
        }
    }

    fn detuned(mut self, cents: f32) -> Self {
        self.detune_cents = cents;
        self
    }

    pub fn end(&self) -> f64 {
        self.at + self.duration
    }
}

/// A high-passed decaying noise hit (hi-hat).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseBurst {
    pub at: f64,
    pub duration: f64,
    pub gain: f32,
    pub highpass_hz: f32,
}

impl NoiseBurst {
    fn hat(at: f64, duration: f64, gain: f32) -> Self {
        Self {
            at,
            duration,
            gain,
            highpass_hz: HAT_HIGHPASS_HZ,
        }
    }
}

/// Master bus settings: lowpass cutoff and Q, then output gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixParams {
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub master_gain: f32,
}

impl MixParams {
    pub const INITIAL: MixParams = MixParams {
        cutoff_hz: 1050.0,
        resonance: 0.7,
        master_gain: 0.55,
    };
    pub const NORMAL: MixParams = MixParams {
        cutoff_hz: 1100.0,
        resonance: 0.7,
        master_gain: 0.55,
    };
    pub const URGENT: MixParams = MixParams {
        cutoff_hz: 2200.0,
        resonance: 1.1,
        master_gain: 0.62,
    };

    pub fn for_mode(urgent: bool) -> Self {
        if urgent {
            Self::URGENT
        } else {
            Self::NORMAL
        }
    }
}

/// Exponential approach of the mix parameters toward a target, starting
/// from whatever value was current when the ramp began.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixRamp {
    from: MixParams,
    to: MixParams,
    start: f64,
    time_constant: f64,
}

impl MixRamp {
    pub fn settled(params: MixParams) -> Self {
        Self {
            from: params,
            to: params,
            start: 0.0,
            time_constant: MIX_TIME_CONSTANT,
        }
    }

    pub fn target(&self) -> MixParams {
        self.to
    }

    /// Begin approaching `to` at time `at` from the value current then.
    pub fn retarget(&mut self, to: MixParams, at: f64, time_constant: f64) {
        self.from = self.value_at(at);
        self.to = to;
        self.start = at;
        self.time_constant = time_constant.max(1e-6);
    }

    pub fn value_at(&self, t: f64) -> MixParams {
        let elapsed = (t - self.start).max(0.0);
        let k = (-elapsed / self.time_constant).exp() as f32;
        let mix = |a: f32, b: f32| b + (a - b) * k;
        MixParams {
            cutoff_hz: mix(self.from.cutoff_hz, self.to.cutoff_hz),
            resonance: mix(self.from.resonance, self.to.resonance),
            master_gain: mix(self.from.master_gain, self.to.master_gain),
        }
    }
}

impl Default for MixRamp {
    fn default() -> Self {
        Self::settled(MixParams::INITIAL)
    }
}

// ── Sink ─────────────────────────────────────────────────────────────────────

/// The separately clocked audio device.  Events may be scheduled in the
/// future relative to [`AudioSink::now`].
pub trait AudioSink {
    /// Current time of the audio clock, in seconds.
    fn now(&self) -> f64;
    fn tone(&mut self, tone: Tone);
    fn noise(&mut self, burst: NoiseBurst);
    fn ramp_mix(&mut self, target: MixParams, at: f64, time_constant: f64);
}

/// Keeps time with the wall clock and discards everything.
#[derive(Debug)]
pub struct SilentSink {
    epoch: Instant,
}

impl SilentSink {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SilentSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for SilentSink {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
    fn tone(&mut self, _tone: Tone) {}
    fn noise(&mut self, _burst: NoiseBurst) {}
    fn ramp_mix(&mut self, _target: MixParams, _at: f64, _time_constant: f64) {}
}

// ── Scheduler ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct MusicScheduler {
    on: bool,
    playing: bool,
    boss_mode: bool,
    intro_done: bool,
    last_end: f64,
    wake: Wake,
}

impl Default for MusicScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicScheduler {
    pub fn new() -> Self {
        Self {
            on: true,
            playing: false,
            boss_mode: false,
            intro_done: false,
            last_end: 0.0,
            wake: Wake::default(),
        }
    }

    /// Music is enabled (not muted).
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn boss_mode(&self) -> bool {
        self.boss_mode
    }

    pub fn intro_done(&self) -> bool {
        self.intro_done
    }

    /// Audio-clock time at which the scheduled material runs out.
    pub fn scheduled_until(&self) -> f64 {
        self.last_end
    }

    pub fn next_wake(&self) -> Option<f64> {
        self.wake.deadline()
    }

    /// Begin playback with the intro.  No-op while already playing.
    pub fn start(&mut self, sink: &mut dyn AudioSink) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.intro_done = false;
        self.last_end = sink.now();
        log::debug!("music start at {:.3}", self.last_end);
        self.apply_mode(sink);
        self.schedule(sink);
    }

    /// Cancel the pending wake.  Notes already handed to the sink still play.
    pub fn stop(&mut self) {
        self.playing = false;
        self.wake.cancel();
    }

    /// Flip mute.  Unmuting starts playback if it never started; otherwise
    /// the next wake picks up where the phrase position left off.
    pub fn toggle(&mut self, sink: &mut dyn AudioSink) -> bool {
        self.on = !self.on;
        log::info!("music {}", if self.on { "on" } else { "off" });
        if self.on {
            self.start(sink);
        }
        self.on
    }

    /// Switch between normal and urgent mix.  Tempo follows on the next
    /// phrase; the mix starts ramping now.
    pub fn set_boss_mode(&mut self, urgent: bool, sink: &mut dyn AudioSink) {
        if self.boss_mode == urgent {
            return;
        }
        self.boss_mode = urgent;
        log::debug!("music urgent={urgent}");
        self.apply_mode(sink);
    }

    /// Run the scheduler if its wake is due.
    pub fn poll(&mut self, sink: &mut dyn AudioSink) {
        if self.wake.take_due(sink.now()) {
            self.schedule(sink);
        }
    }

    fn apply_mode(&self, sink: &mut dyn AudioSink) {
        sink.ramp_mix(MixParams::for_mode(self.boss_mode), sink.now(), MIX_TIME_CONSTANT);
    }

    fn schedule(&mut self, sink: &mut dyn AudioSink) {
        if !self.playing {
            return;
        }
        let now = sink.now();
        if !self.on {
            self.wake.arm(now + MUTED_RECHECK);
            return;
        }

        let beat = beat_len(self.boss_mode);
        self.apply_mode(sink);
        let t0 = (now + LOOKAHEAD).max(self.last_end + PHRASE_GAP);

        let len = if self.intro_done {
            schedule_loop(sink, t0, beat, self.boss_mode)
        } else {
            self.intro_done = true;
            schedule_intro(sink, t0, beat)
        };
        self.last_end = t0 + len;
        self.wake.arm(now + len - WAKE_EARLY);
    }
}

/// One bar: bass, hook and light hats.  Returns the phrase length.
fn schedule_intro(sink: &mut dyn AudioSink, t0: f64, beat: f64) -> f64 {
    let step = beat / 2.0;

    for (at_beat, midi) in INTRO_BASS {
        sink.tone(Tone::new(t0 + at_beat * beat, midi, beat * 1.95, Waveform::Square, 0.08));
    }

    for (i, &midi) in INTRO_HOOK.iter().enumerate() {
        let when = t0 + i as f64 * step;
        let detune = if i % 2 == 1 { -6.0 } else { 6.0 };
        sink.tone(Tone::new(when, midi, step * 0.9, Waveform::Triangle, 0.11).detuned(detune));
        if i % 2 == 0 {
            sink.noise(NoiseBurst::hat(when, step * 0.22, 0.018));
        }
    }

    beat * INTRO_BEATS
}

/// Four bars of chords, arpeggio, lead and hats.  Returns the phrase length.
fn schedule_loop(sink: &mut dyn AudioSink, t0: f64, beat: f64, urgent: bool) -> f64 {
    let step = beat / 2.0;
    let bar_len = beat * BEATS_PER_BAR;
    let pick = |normal: f32, loud: f32| if urgent { loud } else { normal };

    for (b, (chord, &root)) in CHORDS.iter().zip(BASS_ROOTS.iter()).enumerate() {
        let bar = t0 + b as f64 * bar_len;

        for at_beat in [0.0, 2.0] {
            sink.tone(Tone::new(bar + at_beat * beat, root, beat * 1.9, Waveform::Square, pick(0.085, 0.10)));
        }

        for i in 0..8 {
            let when = bar + i as f64 * step + 0.01;
            let midi = chord[i % 3] + 12;
            sink.tone(Tone::new(when, midi, step * 0.8, Waveform::Sine, pick(0.035, 0.045)));
        }

        let hat_gain = pick(0.020, 0.030);
        for (i, &midi) in MOTIFS[b].iter().enumerate() {
            let when = bar + i as f64 * step;
            let detune = if i % 2 == 1 { -8.0 } else { 8.0 };
            sink.tone(Tone::new(when, midi, step * 0.92, Waveform::Triangle, pick(0.115, 0.13)).detuned(detune));

            sink.noise(NoiseBurst::hat(when, step * 0.18, hat_gain));
            if urgent && i % 2 == 1 {
                sink.noise(NoiseBurst::hat(when + step * 0.5, step * 0.12, hat_gain * 0.75));
            }
        }

        if urgent {
            sink.tone(Tone::new(bar, chord[0] + 24, beat * 0.35, Waveform::Sawtooth, 0.05));
        }
    }

    LOOP_BARS as f64 * bar_len
}
