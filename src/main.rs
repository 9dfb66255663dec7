mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use display::TermPainter;
use terra_escape::clock::FrameClock;
use terra_escape::compute::{
    init_state, nudge, pointer_down, pointer_move, pointer_up, restart, start_play, swap_character, tick,
};
use terra_escape::config::{StageTuning, DEFAULT_STAGE_PATH, STAGE_PATH_ENV};
use terra_escape::entities::{GameSession, GameStatus};
use terra_escape::events::GameEvent;
use terra_escape::geometry::format_clock;
use terra_escape::music::{AudioSink, MusicScheduler, SilentSink};
use terra_escape::render::draw_frame;
use terra_escape::stage::{Stage, StageOne};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// The terminal has a single mouse pointer.
const MOUSE_POINTER: u32 = 0;

/// Arrow-key steering speed in logical pixels per second.
const KEY_STEER_SPEED: f32 = 360.0;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 8;

const LOG_FILE: &str = "terra_escape.log";

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// -1, 0 or 1 depending on which of two opposing keys is held.
fn axis(key_frame: &HashMap<KeyCode, u64>, neg: KeyCode, pos: KeyCode, frame: u64) -> f32 {
    match (is_held(key_frame, &neg, frame), is_held(key_frame, &pos, frame)) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// The terminal owns stdout/stderr, so logs go to a file and only when
/// `RUST_LOG` asks for them.
fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let Ok(file) = File::create(LOG_FILE) else {
        return;
    };
    let _ = env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn load_tuning() -> StageTuning {
    let path = std::env::var(STAGE_PATH_ENV).unwrap_or_else(|_| DEFAULT_STAGE_PATH.to_string());
    StageTuning::load_or_default(path)
}

#[cfg(feature = "audio")]
fn open_audio() -> Box<dyn AudioSink> {
    match terra_escape::synth::RodioSink::open() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            log::warn!("{e}; music will be silent");
            Box::new(SilentSink::new())
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_audio() -> Box<dyn AudioSink> {
    Box::new(SilentSink::new())
}

// ── Input ─────────────────────────────────────────────────────────────────────

enum Control {
    Continue,
    Quit,
}

fn handle_key(
    code: KeyCode,
    modifiers: KeyModifiers,
    session: &mut GameSession,
    tuning: &StageTuning,
    music: &mut MusicScheduler,
    audio: &mut dyn AudioSink,
) -> Control {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Control::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Control::Quit,
        KeyCode::Char(' ') | KeyCode::Enter => {
            start_play(session);
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            swap_character(session);
        }
        KeyCode::Char('r') | KeyCode::Char('R') => restart(session, tuning),
        KeyCode::Char('m') | KeyCode::Char('M') => {
            music.toggle(audio);
        }
        _ => {}
    }
    Control::Continue
}

fn handle_mouse(mouse: MouseEvent, session: &mut GameSession, painter: &TermPainter) {
    let (x, y) = painter.viewport().to_logical(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => pointer_down(session, MOUSE_POINTER, x, y),
        MouseEventKind::Drag(MouseButton::Left) => pointer_move(session, MOUSE_POINTER, x, y),
        MouseEventKind::Up(MouseButton::Left) => pointer_up(session, MOUSE_POINTER),
        _ => {}
    }
}

fn controls_hint(session: &GameSession, music: &MusicScheduler) -> String {
    let bgm = if music.is_on() { "BGM: ON" } else { "BGM: OFF" };
    let who = session.player.character.label();
    match session.status {
        GameStatus::Title => format!("CLICK / SPACE : Start   M : {bgm}   Q : Quit"),
        GameStatus::Playing => format!(
            "DRAG / ARROWS : Move   S : Swap ({who})   R : Restart   M : {bgm}   Q : Quit   {}",
            format_clock(session.time_in_play)
        ),
        GameStatus::Won | GameStatus::Lost => format!("R : Restart   M : {bgm}   Q : Quit"),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, tuning: StageTuning) -> std::io::Result<()> {
    let mut stage = StageOne::new(tuning);
    let mut session = init_state(stage.tuning());
    let mut painter = TermPainter::new(&stage.tuning().letterbox_color);
    let mut audio = open_audio();
    let mut music = MusicScheduler::new();
    let mut clock = FrameClock::new();
    let mut rng = thread_rng();
    let epoch = Instant::now();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code.clone(), frame);
                        let control =
                            handle_key(code, modifiers, &mut session, stage.tuning(), &mut music, audio.as_mut());
                        if let Control::Quit = control {
                            music.stop();
                            return Ok(());
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code.clone(), frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(mouse) => handle_mouse(mouse, &mut session, &painter),
                _ => {}
            }
        }

        let dt = clock.advance(epoch.elapsed().as_secs_f64());

        // ── Held-key steering ─────────────────────────────────────────────────
        let step = KEY_STEER_SPEED * dt;
        let dx = step * axis(&key_frame, KeyCode::Left, KeyCode::Right, frame);
        let dy = step * axis(&key_frame, KeyCode::Up, KeyCode::Down, frame);
        if dx != 0.0 || dy != 0.0 {
            nudge(&mut session, dx, dy);
        }

        tick(&mut session, &mut stage, dt, &mut rng);

        for event in session.drain_events() {
            match event {
                GameEvent::Started => music.start(audio.as_mut()),
                GameEvent::Won(stats) => {
                    log::info!("clear: {} in {}", stats.score, format_clock(stats.elapsed))
                }
                other => log::debug!("{other:?}"),
            }
        }
        music.set_boss_mode(session.boss_urgent, audio.as_mut());
        music.poll(audio.as_mut());

        let (cols, rows) = terminal::size()?;
        painter.begin(cols, rows, &session.field);
        draw_frame(&mut painter, &session, &mut stage, dt);
        painter.present(out, &controls_hint(&session, &music))?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_logging();
    let tuning = load_tuning();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, tuning);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
