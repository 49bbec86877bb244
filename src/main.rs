//! Terminal Tile Merge runner (default binary).
//!
//! Uses crossterm for input and a framebuffer-based renderer. When enabled,
//! the remote-control adapter is polled once per frame.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use tracing::{info, warn};

use tile_merge::adapter::Adapter;
use tile_merge::config::{init_tracing, AppConfig};
use tile_merge::core::GameSnapshot;
use tile_merge::engine::GameRunner;
use tile_merge::input::{handle_key_event, should_quit, Cursor, KeyCommand};
use tile_merge::store::{FileStore, Storage};
use tile_merge::term::{
    AdapterStatusView, FrameBuffer, GameView, TermPresenter, TerminalRenderer, ViewModel, Viewport,
};
use tile_merge::types::{GameAction, SessionPhase};

const FRAME_MS: u64 = 16;

type Runner = GameRunner<FileStore, TermPresenter>;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    let _log_guard = init_tracing(config.log_path.as_deref())?;
    info!(seed = config.seed, data_dir = %config.data_dir.display(), "starting");

    let storage = Storage::new(FileStore::new(&config.data_dir));
    let mut runner = GameRunner::new(storage, TermPresenter::new(), config.seed);
    let sound = runner.settings().sound_enabled;
    runner.presenter_mut().set_bell(sound);

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "remote control unavailable");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut runner, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    info!(games = runner.stats().total_games, "exiting");
    result
}

fn run(term: &mut TerminalRenderer, runner: &mut Runner, mut adapter: Option<&mut Adapter>) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut cursor = Cursor::new();
    let mut snap = GameSnapshot::default();
    let mut last_sent: Option<GameSnapshot> = None;

    let frame = Duration::from_millis(FRAME_MS);
    let mut last_tick = Instant::now();

    loop {
        // Time.
        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        let elapsed_ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
        runner.advance(elapsed_ms);
        runner.presenter_mut().tick(elapsed_ms);

        // Remote commands, then stream the state if it moved.
        if let Some(adapter) = adapter.as_deref_mut() {
            adapter.pump(runner);
            runner.snapshot_into(&mut snap);
            snap.now_ms = 0;
            if last_sent != Some(snap) {
                adapter.broadcast(runner);
                last_sent = Some(snap);
            }
        }

        // Render.
        runner.snapshot_into(&mut snap);
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let presenter = runner.presenter();
        let model = ViewModel {
            snapshot: &snap,
            cursor: (snap.phase == SessionPhase::Running).then(|| cursor.index()),
            best_score: runner.stats().high_score,
            dark: runner.settings().dark_theme,
            flash: presenter.flash(),
            countdown: presenter.countdown(),
            report: presenter.report(),
            adapter: adapter.as_deref().map(|a| AdapterStatusView {
                port: a.port(),
                commands: a.commands_applied(),
            }),
        };
        view.render_into(&model, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        let mut bells = Vec::new();
        runner.presenter_mut().flush_bells(&mut bells)?;
        if !bells.is_empty() {
            term.write_raw(&bells)?;
        }

        // Input until the next frame.
        let timeout = frame.saturating_sub(last_tick.elapsed());
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(cmd) = handle_key_event(key) {
                    apply_key(runner, &mut cursor, cmd);
                }
            }
            Event::Resize(_, _) => term.invalidate(),
            _ => {}
        }
    }
}

fn apply_key(runner: &mut Runner, cursor: &mut Cursor, cmd: KeyCommand) {
    match cmd {
        KeyCommand::MoveCursor(dir) => cursor.step(dir),
        KeyCommand::Select => {
            runner.apply_action(GameAction::Select(cursor.index()));
        }
        KeyCommand::TogglePause => {
            runner.apply_action(GameAction::TogglePause);
        }
        KeyCommand::Restart => {
            runner.apply_action(GameAction::Restart);
        }
        KeyCommand::NewGame => {
            runner.start_with_countdown();
        }
        KeyCommand::SetDifficulty(difficulty) => {
            // Takes effect on the next start.
            runner.set_difficulty(difficulty);
            info!(difficulty = difficulty.as_str(), "difficulty selected");
        }
        KeyCommand::ToggleTheme => {
            let dark = !runner.settings().dark_theme;
            runner.set_dark_theme(dark);
        }
        KeyCommand::ToggleSound => {
            let on = !runner.settings().sound_enabled;
            runner.set_sound(on);
            runner.presenter_mut().set_bell(on);
        }
    }
}
