pub mod grid;
pub mod settings;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use flinch::controller::Screen;
use flinch::format::format_elapsed;
use flinch::OutcomeKind;

use crate::{ui::grid::RoundLayout, App, AppState};

const TARGET_GLYPH: &str = "↓";
const DECOY_GLYPH: &str = "↑";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.state == AppState::Settings {
            (&self.settings).render(area, buf);
            return;
        }

        let now = Instant::now();
        match self.controller.screen() {
            Screen::Intro => render_intro(self, area, buf),
            Screen::Countdown => render_countdown(self, now, area, buf),
            Screen::Playing => render_round(self, now, area, buf),
            Screen::Cooldown => render_cooldown(self, area, buf),
            Screen::Complete => render_complete(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn outcome_style(kind: OutcomeKind) -> Style {
    let color = match kind {
        OutcomeKind::Correct => Color::Green,
        OutcomeKind::Wrong => Color::Red,
        OutcomeKind::Timeout => Color::Yellow,
    };
    bold().fg(color)
}

/// `rows` one-line strips vertically centred in `area`.
fn centered_rows(area: Rect, rows: u16, margin: u16) -> Vec<Rect> {
    let pad = area.height.saturating_sub(rows) / 2;
    let mut constraints = vec![Constraint::Length(pad)];
    constraints.extend(std::iter::repeat(Constraint::Length(1)).take(rows as usize));
    constraints.push(Constraint::Min(0));

    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(margin)
        .constraints(constraints)
        .split(area)[1..=rows as usize]
        .to_vec()
}

fn render_intro(app: &App, area: Rect, buf: &mut Buffer) {
    let cfg = app.controller.config();
    let rows = centered_rows(area, 9, grid::HORIZONTAL_MARGIN);

    Paragraph::new(Span::styled(
        "Reaction Speed Test",
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(rows[0], buf);

    Paragraph::new(format!(
        "Find the {} arrow among the {} as fast as you can.",
        TARGET_GLYPH, DECOY_GLYPH
    ))
    .alignment(Alignment::Center)
    .render(rows[2], buf);

    Paragraph::new(Span::styled(
        format!(
            "Grid {}x{} | Limit {}s | Rounds {} | Countdown {}s | Cooldown {}ms",
            cfg.rows(),
            cfg.cols(),
            cfg.time_limit_secs(),
            cfg.rounds_to_win(),
            cfg.countdown_secs(),
            cfg.cooldown_millis()
        ),
        italic().fg(Color::Gray),
    ))
    .alignment(Alignment::Center)
    .render(rows[4], buf);

    Paragraph::new(Span::styled(
        "(enter) start / (s)ettings / (esc)ape",
        italic(),
    ))
    .alignment(Alignment::Center)
    .render(rows[6], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(notice.as_str(), bold().fg(Color::Red)))
            .alignment(Alignment::Center)
            .render(rows[8], buf);
    }
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        app.controller.current_summary().status_line(),
        bold().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_countdown(app: &App, now: Instant, area: Rect, buf: &mut Buffer) {
    let layout = RoundLayout::new(area);
    render_status(app, layout.status, buf);

    let left = app.controller.countdown_remaining(now).unwrap_or(0);
    let rows = centered_rows(layout.grid, 1, 0);
    Paragraph::new(Span::styled(
        format!("Starting in {}...", left),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(rows[0], buf);
}

fn render_round(app: &App, now: Instant, area: Rect, buf: &mut Buffer) {
    let cfg = app.controller.config();
    let layout = RoundLayout::new(area);
    render_status(app, layout.status, buf);

    let target = app.controller.test().engine().target();
    let cells = grid::cell_rects(layout.grid, cfg.rows(), cfg.cols());
    for (idx, cell) in cells.iter().enumerate() {
        let glyph = if Some(idx) == target {
            TARGET_GLYPH
        } else {
            DECOY_GLYPH
        };
        let border_style = if idx == app.controller.cursor() {
            bold().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        let mut block = Block::default();
        let mut inner = *cell;
        if cell.height >= 3 && cell.width >= 3 {
            block = block.borders(Borders::ALL).border_style(border_style);
            inner = block.inner(*cell);
        }
        block.render(*cell, buf);

        let text_row = centered_rows(inner, 1, 0);
        let glyph_style = if idx == app.controller.cursor() {
            bold().add_modifier(Modifier::REVERSED)
        } else {
            bold()
        };
        Paragraph::new(Span::styled(glyph, glyph_style))
            .alignment(Alignment::Center)
            .render(text_row[0], buf);
    }

    if let Some(left) = app.controller.deadline_remaining(now) {
        Paragraph::new(Span::styled(
            format!("{:.1}", left.as_secs_f64()),
            bold().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(layout.timer, buf);
    }

    Paragraph::new(Span::styled(
        "(arrows) move / (enter) select / (1-9) pick / (esc)ape",
        italic(),
    ))
    .render(layout.legend, buf);
}

fn render_cooldown(app: &App, area: Rect, buf: &mut Buffer) {
    let layout = RoundLayout::new(area);
    render_status(app, layout.status, buf);

    if let Some(report) = app.controller.last_report() {
        let rows = centered_rows(layout.grid, 1, 0);
        Paragraph::new(Span::styled(report.result.as_str(), outcome_style(report.kind)))
            .alignment(Alignment::Center)
            .render(rows[0], buf);
    }
}

fn render_complete(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = app.controller.summary() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(grid::HORIZONTAL_MARGIN)
        .vertical_margin(grid::VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // score
            Constraint::Length(1), // stats
            Constraint::Min(1),    // history
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("🎉 Test Complete!", bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(summary.score_line(), bold()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let stats = match (summary.mean_correct_secs, summary.fastest_correct_secs) {
        (Some(avg), Some(best)) => format!(
            "avg {}   best {}   sd {:.3}",
            format_elapsed(avg),
            format_elapsed(best),
            summary.std_dev_correct_secs.unwrap_or_default()
        ),
        _ => String::from("no correct rounds"),
    };
    Paragraph::new(Span::styled(stats, italic().fg(Color::Magenta)))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let history: Vec<Line> = app
        .controller
        .test()
        .engine()
        .rounds()
        .iter()
        .zip(summary.history.iter())
        .map(|(round, line)| Line::from(Span::styled(line.as_str(), outcome_style(round.kind))))
        .collect();
    Paragraph::new(history)
        .block(Block::default().borders(Borders::TOP).title("Rounds"))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(r)estart / (s)ettings / (esc)ape",
        italic(),
    ))
    .render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use flinch::engine::ScriptedTargets;
    use flinch::{ReactionTest, SessionConfig};
    use std::time::Duration;

    fn create_test_app(countdown: u64, targets: &[usize]) -> App {
        let cli = crate::Cli::parse_from(["flinch", "--no-save"]);
        let config = SessionConfig::new(1, 5, 2.0, 2, countdown, 0).unwrap();
        let test = ReactionTest::with_targets(config, ScriptedTargets::new(targets.to_vec()));
        App::with_test(cli, test)
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_intro_screen() {
        let app = create_test_app(3, &[0]);
        let content = rendered(&app, 100, 24);
        assert!(content.contains("Reaction Speed Test"));
        assert!(content.contains("Rounds 2"));
    }

    #[test]
    fn test_intro_shows_notice() {
        let mut app = create_test_app(3, &[0]);
        assert!(!rendered(&app, 100, 24).contains("not saved"));

        app.notice = Some("settings not saved (/x/config.json): denied".to_string());
        let content = rendered(&app, 100, 24);
        assert!(content.contains("settings not saved"));
    }

    #[test]
    fn test_countdown_screen() {
        let mut app = create_test_app(3, &[0]);
        app.controller.start(Instant::now()).unwrap();
        let content = rendered(&app, 80, 24);
        assert!(content.contains("Starting in"));
        assert!(content.contains("Round 1 of 2"));
    }

    #[test]
    fn test_round_screen_shows_one_target() {
        let mut app = create_test_app(0, &[3]);
        app.controller.start(Instant::now()).unwrap();
        let content = rendered(&app, 80, 24);
        assert_eq!(content.matches(TARGET_GLYPH).count(), 1);
        assert_eq!(content.matches(DECOY_GLYPH).count(), 4);
    }

    #[test]
    fn test_cooldown_screen_shows_result() {
        let mut app = create_test_app(0, &[3, 1]);
        let now = Instant::now();
        app.controller.start(now).unwrap();
        app.controller.select(3, now + Duration::from_millis(400)).unwrap();
        let content = rendered(&app, 80, 24);
        assert!(content.contains("Correct!"));
    }

    #[test]
    fn test_complete_screen() {
        let mut app = create_test_app(0, &[3, 1]);
        let now = Instant::now();
        app.controller.start(now).unwrap();
        app.controller.select(3, now + Duration::from_millis(400)).unwrap();
        app.controller.tick(now + Duration::from_millis(500)).unwrap();
        app.controller.select(0, now + Duration::from_millis(900)).unwrap();

        let content = rendered(&app, 80, 24);
        assert!(content.contains("You got 1 out of 2 correct."));
        assert!(content.contains("Wrong!"));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let mut app = create_test_app(0, &[0]);
        app.controller.start(Instant::now()).unwrap();
        rendered(&app, 4, 2);
        rendered(&app, 1, 1);
    }
}
