use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

/// Everything the front-end loop reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridEvent {
    Key(KeyEvent),
    /// Left click at a terminal column/row.
    Click { column: u16, row: u16 },
    Resize,
    Tick,
}

impl GridEvent {
    fn from_crossterm(ev: CtEvent) -> Option<Self> {
        match ev {
            CtEvent::Key(key) => Some(Self::Key(key)),
            CtEvent::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => Some(Self::Click { column, row }),
            CtEvent::Resize(_, _) => Some(Self::Resize),
            _ => None,
        }
    }
}

pub trait GridEventSource: Send + 'static {
    /// Waits up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GridEvent, RecvTimeoutError>;
}

/// Reads terminal input on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<GridEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(ev) => {
                    if let Some(ev) = GridEvent::from_crossterm(ev) {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GridEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GridEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless tests.
pub struct TestEventSource {
    rx: Receiver<GridEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GridEvent>) -> Self {
        Self { rx }
    }
}

impl GridEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GridEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Hands out one event per step; a quiet interval becomes a `Tick`, which
/// is when the front-end polls its timers.
pub struct Runner<E: GridEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GridEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn step(&self) -> GridEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GridEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(1)));

        assert!(matches!(runner.step(), GridEvent::Tick));
    }

    #[test]
    fn step_ticks_when_sender_is_gone() {
        let (tx, rx) = mpsc::channel::<GridEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(1)));

        assert!(matches!(runner.step(), GridEvent::Tick));
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GridEvent::Click { column: 4, row: 2 }).unwrap();
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(10)));

        match runner.step() {
            GridEvent::Click { column, row } => assert_eq!((column, row), (4, 2)),
            other => panic!("expected Click, got {:?}", other),
        }
    }

    #[test]
    fn crossterm_events_are_translated() {
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(
            GridEvent::from_crossterm(CtEvent::Key(key)),
            Some(GridEvent::Key(_))
        ));
        assert!(matches!(
            GridEvent::from_crossterm(CtEvent::Resize(80, 24)),
            Some(GridEvent::Resize)
        ));

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert!(matches!(
            GridEvent::from_crossterm(CtEvent::Mouse(click)),
            Some(GridEvent::Click { column: 10, row: 3 })
        ));

        let right = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            ..click
        };
        assert!(GridEvent::from_crossterm(CtEvent::Mouse(right)).is_none());
        assert!(GridEvent::from_crossterm(CtEvent::FocusGained).is_none());
    }
}
