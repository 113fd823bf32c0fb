pub mod ui;

use crate::ui::{grid::cell_at, settings::SettingsForm};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flinch::{
    config::{ConfigStore, FileConfigStore},
    controller::{Controller, CursorMove, Screen},
    engine::RandomTargets,
    runtime::{CrosstermEventSource, FixedTicker, GridEvent, Runner},
    ConfigError, EngineError, ReactionTest, SessionConfig,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 50;

/// reaction speed test: find the odd arrow in the grid before time runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction speed test for the terminal. Each round hides one downward arrow among upward decoys; select it before the time limit. Flags override the saved settings for this run."
)]
pub struct Cli {
    /// number of grid rows
    #[clap(short = 'r', long)]
    rows: Option<usize>,

    /// number of grid columns
    #[clap(short = 'c', long)]
    cols: Option<usize>,

    /// seconds allowed to answer each round
    #[clap(short = 't', long)]
    time_limit: Option<f64>,

    /// number of rounds in a session
    #[clap(short = 'n', long)]
    rounds: Option<u32>,

    /// seconds of countdown before each round
    #[clap(long)]
    countdown: Option<u64>,

    /// milliseconds to wait between rounds
    #[clap(long)]
    cooldown: Option<u64>,

    /// seed the target picker for a reproducible session
    #[clap(long)]
    seed: Option<u64>,

    /// keep settings changed in the settings screen for this run only
    #[clap(long)]
    no_save: bool,
}

impl Cli {
    /// Applies the flags on top of `base`.
    fn session_config(&self, base: &SessionConfig) -> Result<SessionConfig, ConfigError> {
        SessionConfig::new(
            self.rows.unwrap_or(base.rows()),
            self.cols.unwrap_or(base.cols()),
            self.time_limit.unwrap_or(base.time_limit_secs()),
            self.rounds.unwrap_or(base.rounds_to_win()),
            self.countdown.unwrap_or(base.countdown_secs()),
            self.cooldown.unwrap_or(base.cooldown_millis()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Game,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    cli: Cli,
    controller: Controller,
    state: AppState,
    settings: SettingsForm,
    store: FileConfigStore,
    /// One-off message for the intro screen, e.g. a failed settings write.
    notice: Option<String>,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self, ConfigError> {
        let store = FileConfigStore::new();
        let config = cli.session_config(&store.load())?;
        let test = match cli.seed {
            Some(seed) => ReactionTest::with_targets(config, RandomTargets::with_seed(seed)),
            None => ReactionTest::new(config),
        };
        Ok(Self::with_parts(cli, test, store))
    }

    #[cfg(test)]
    fn with_test(cli: Cli, test: ReactionTest) -> Self {
        Self::with_parts(cli, test, FileConfigStore::new())
    }

    fn with_parts(cli: Cli, test: ReactionTest, store: FileConfigStore) -> Self {
        let settings = SettingsForm::new(test.config());
        Self {
            cli,
            controller: Controller::new(test),
            state: AppState::Game,
            settings,
            store,
            notice: None,
        }
    }

    fn open_settings(&mut self) {
        self.settings = SettingsForm::new(self.controller.config());
        self.state = AppState::Settings;
    }

    fn apply_settings(&mut self) {
        match self.controller.configure(self.settings.raw()) {
            Ok(()) => {
                self.notice = None;
                if !self.cli.no_save {
                    if let Err(err) = self.store.save(self.controller.config()) {
                        self.notice = Some(format!(
                            "settings not saved ({}): {}",
                            self.store.path().display(),
                            err
                        ));
                    }
                }
                self.state = AppState::Game;
            }
            Err(err) => self.settings.set_error(err.to_string()),
        }
    }

    fn on_tick(&mut self, now: Instant) -> Result<bool, EngineError> {
        self.controller.tick(now)
    }

    fn on_click(&mut self, column: u16, row: u16, area: Rect, now: Instant) -> Result<(), EngineError> {
        if self.state != AppState::Game || self.controller.screen() != Screen::Playing {
            return Ok(());
        }
        let cfg = self.controller.config();
        if let Some(cell) = cell_at(area, cfg.rows(), cfg.cols(), column, row) {
            self.controller.select(cell, now)?;
        }
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Result<Flow, EngineError> {
        if key.kind == KeyEventKind::Release {
            return Ok(Flow::Continue);
        }
        // ctrl+c to quit from anywhere
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Flow::Quit);
        }

        if self.state == AppState::Settings {
            match key.code {
                KeyCode::Esc => self.state = AppState::Game,
                KeyCode::Enter => self.apply_settings(),
                KeyCode::Up | KeyCode::BackTab => self.settings.prev_field(),
                KeyCode::Down | KeyCode::Tab => self.settings.next_field(),
                KeyCode::Backspace => self.settings.backspace(),
                KeyCode::Char(c) => self.settings.push_char(c),
                _ => {}
            }
            return Ok(Flow::Continue);
        }

        if key.code == KeyCode::Esc {
            return Ok(Flow::Quit);
        }

        match self.controller.screen() {
            Screen::Intro | Screen::Complete => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => {
                    self.notice = None;
                    self.controller.start(now)?
                }
                KeyCode::Char('s') => self.open_settings(),
                KeyCode::Char('q') => return Ok(Flow::Quit),
                _ => {}
            },
            Screen::Playing => match key.code {
                KeyCode::Left => self.controller.move_cursor(CursorMove::Left),
                KeyCode::Right => self.controller.move_cursor(CursorMove::Right),
                KeyCode::Up => self.controller.move_cursor(CursorMove::Up),
                KeyCode::Down => self.controller.move_cursor(CursorMove::Down),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.controller.select_cursor(now)?;
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let cell = c as usize - '1' as usize;
                    self.controller.select(cell, now)?;
                }
                _ => {}
            },
            Screen::Countdown | Screen::Cooldown => {}
        }
        Ok(Flow::Continue)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = match App::new(cli) {
        Ok(app) => app,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui(app, f))?;

        let event = runner.step();
        let now = Instant::now();
        match event {
            GridEvent::Tick => {
                app.on_tick(now)?;
            }
            GridEvent::Resize => {}
            GridEvent::Click { column, row } => {
                let size = terminal.size()?;
                app.on_click(column, row, Rect::new(0, 0, size.width, size.height), now)?;
            }
            GridEvent::Key(key) => {
                if app.on_key(key, now)? == Flow::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
