use terra_escape::music::*;

use approx::assert_relative_eq;

/// Records everything the scheduler hands to the device.  The clock only
/// moves when a test sets it.
#[derive(Default)]
struct RecordingSink {
    now: f64,
    tones: Vec<Tone>,
    noises: Vec<NoiseBurst>,
    ramps: Vec<(MixParams, f64, f64)>,
}

impl RecordingSink {
    fn at(now: f64) -> Self {
        Self { now, ..Default::default() }
    }

    fn clear(&mut self) {
        self.tones.clear();
        self.noises.clear();
        self.ramps.clear();
    }
}

impl AudioSink for RecordingSink {
    fn now(&self) -> f64 {
        self.now
    }
    fn tone(&mut self, tone: Tone) {
        self.tones.push(tone);
    }
    fn noise(&mut self, burst: NoiseBurst) {
        self.noises.push(burst);
    }
    fn ramp_mix(&mut self, target: MixParams, at: f64, time_constant: f64) {
        self.ramps.push((target, at, time_constant));
    }
}

/// Advance the sink to the pending wake and poll.
fn wake(music: &mut MusicScheduler, sink: &mut RecordingSink) {
    sink.now = music.next_wake().expect("wake armed");
    music.poll(sink);
}

// ── Intro ────────────────────────────────────────────────────────────────────

#[test]
fn start_schedules_the_intro_bar() {
    let mut sink = RecordingSink::at(10.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);

    let beat = beat_len(false);
    assert!(music.is_playing());
    assert!(music.intro_done());
    assert_eq!(sink.tones.len(), 10);
    assert_eq!(sink.noises.len(), 4);
    assert_relative_eq!(sink.tones[0].at, 10.06, epsilon = 1e-9);
    assert_relative_eq!(music.scheduled_until(), 10.06 + 4.0 * beat, epsilon = 1e-9);
    assert_relative_eq!(music.next_wake().unwrap_or(0.0), 10.0 + 4.0 * beat - 0.03, epsilon = 1e-9);
    assert!(sink.noises.iter().all(|n| n.highpass_hz == HAT_HIGHPASS_HZ));
}

#[test]
fn starting_twice_is_a_no_op() {
    let mut sink = RecordingSink::at(1.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    let wake_at = music.next_wake();
    sink.clear();

    music.start(&mut sink);
    assert!(sink.tones.is_empty());
    assert!(sink.noises.is_empty());
    assert_eq!(music.next_wake(), wake_at);
}

#[test]
fn poll_before_the_wake_does_nothing() {
    let mut sink = RecordingSink::at(0.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    sink.clear();

    sink.now = music.next_wake().unwrap_or(0.0) - 0.001;
    music.poll(&mut sink);
    assert!(sink.tones.is_empty());
    assert!(music.next_wake().is_some());
}

// ── Loop ─────────────────────────────────────────────────────────────────────

#[test]
fn normal_loop_follows_the_intro_without_a_gap() {
    let mut sink = RecordingSink::at(0.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    let intro_end = music.scheduled_until();
    sink.clear();

    wake(&mut music, &mut sink);
    let beat = beat_len(false);
    assert_eq!(sink.tones.len(), 72);
    assert_eq!(sink.noises.len(), 32);
    let first = sink.tones.iter().map(|t| t.at).fold(f64::INFINITY, f64::min);
    assert_relative_eq!(first, intro_end + 0.01, epsilon = 1e-9);
    assert_relative_eq!(music.scheduled_until(), intro_end + 0.01 + 16.0 * beat, epsilon = 1e-9);
    assert!(sink.tones.iter().all(|t| t.wave != Waveform::Sawtooth));
}

#[test]
fn consecutive_loops_keep_the_phrase_gap() {
    let mut sink = RecordingSink::at(0.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    wake(&mut music, &mut sink);
    let first_loop_end = music.scheduled_until();
    sink.clear();

    wake(&mut music, &mut sink);
    let first = sink.tones.iter().map(|t| t.at).fold(f64::INFINITY, f64::min);
    assert_relative_eq!(first, first_loop_end + 0.01, epsilon = 1e-9);
}

#[test]
fn urgent_loop_is_faster_and_busier() {
    let mut sink = RecordingSink::at(0.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    music.set_boss_mode(true, &mut sink);
    let intro_end = music.scheduled_until();
    sink.clear();

    wake(&mut music, &mut sink);
    let beat = 60.0 / 132.0;
    assert_relative_eq!(beat_len(true), beat);
    assert_eq!(sink.tones.len(), 76);
    assert_eq!(sink.noises.len(), 48);
    assert_eq!(sink.tones.iter().filter(|t| t.wave == Waveform::Sawtooth).count(), 4);
    assert_relative_eq!(music.scheduled_until(), intro_end + 0.01 + 16.0 * beat, epsilon = 1e-9);
}

#[test]
fn boss_mode_ramps_the_mix_only_on_change() {
    let mut sink = RecordingSink::at(5.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    sink.clear();

    music.set_boss_mode(false, &mut sink);
    assert!(sink.ramps.is_empty());

    music.set_boss_mode(true, &mut sink);
    assert!(music.boss_mode());
    assert_eq!(sink.ramps, vec![(MixParams::URGENT, 5.0, MIX_TIME_CONSTANT)]);

    music.set_boss_mode(true, &mut sink);
    assert_eq!(sink.ramps.len(), 1);

    music.set_boss_mode(false, &mut sink);
    assert_eq!(sink.ramps.last().map(|r| r.0), Some(MixParams::NORMAL));
}

// ── Mute / stop ──────────────────────────────────────────────────────────────

#[test]
fn muting_keeps_the_phrase_position() {
    let mut sink = RecordingSink::at(0.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    assert!(!music.toggle(&mut sink));
    sink.clear();

    let at = music.next_wake().unwrap_or(0.0);
    wake(&mut music, &mut sink);
    assert!(sink.tones.is_empty());
    assert!(sink.noises.is_empty());
    assert_relative_eq!(music.next_wake().unwrap_or(0.0), at + 0.12, epsilon = 1e-9);

    assert!(music.toggle(&mut sink));
    assert!(sink.tones.is_empty());
    wake(&mut music, &mut sink);
    assert_eq!(sink.tones.len(), 72);
}

#[test]
fn stop_cancels_the_wake() {
    let mut sink = RecordingSink::at(0.0);
    let mut music = MusicScheduler::new();
    music.start(&mut sink);
    music.stop();
    assert!(!music.is_playing());
    assert_eq!(music.next_wake(), None);

    sink.clear();
    sink.now = 100.0;
    music.poll(&mut sink);
    assert!(sink.tones.is_empty());
}

#[test]
fn unmuting_before_any_start_begins_with_the_intro() {
    let mut sink = RecordingSink::at(2.0);
    let mut music = MusicScheduler::new();
    assert!(music.is_on());
    assert!(!music.toggle(&mut sink));
    assert!(!music.is_playing());
    assert!(sink.tones.is_empty());

    assert!(music.toggle(&mut sink));
    assert!(music.is_playing());
    assert_eq!(sink.tones.len(), 10);
}

// ── Mix ramp ─────────────────────────────────────────────────────────────────

#[test]
fn mix_ramp_approaches_exponentially() {
    let mut ramp = MixRamp::default();
    assert_eq!(ramp.target(), MixParams::INITIAL);
    ramp.retarget(MixParams::URGENT, 0.0, MIX_TIME_CONSTANT);

    let one_tc = ramp.value_at(MIX_TIME_CONSTANT);
    let expected = 2200.0 + (1050.0 - 2200.0) * (-1.0f32).exp();
    assert_relative_eq!(one_tc.cutoff_hz, expected, epsilon = 0.5);
    assert!(ramp.value_at(0.01).cutoff_hz < 1200.0);
    assert_relative_eq!(ramp.value_at(2.0).master_gain, 0.62, epsilon = 1e-4);
}

#[test]
fn retarget_mid_ramp_does_not_snap() {
    let mut ramp = MixRamp::settled(MixParams::NORMAL);
    ramp.retarget(MixParams::URGENT, 0.0, MIX_TIME_CONSTANT);
    let midway = ramp.value_at(0.05);
    ramp.retarget(MixParams::NORMAL, 0.05, MIX_TIME_CONSTANT);
    assert_relative_eq!(ramp.value_at(0.05).cutoff_hz, midway.cutoff_hz, epsilon = 1e-3);
}
