use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use flinch::config::{field, RawConfig, SessionConfig};

/// Editable copy of the session settings. Nothing here is validated; the
/// whole form goes to `SessionConfig::validate` on submit.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    raw: RawConfig,
    focus: usize,
    error: Option<String>,
}

impl SettingsForm {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            raw: RawConfig::from(cfg),
            focus: 0,
            error: None,
        }
    }

    pub fn raw(&self) -> &RawConfig {
        &self.raw
    }

    pub fn focused_field(&self) -> &'static str {
        field::ALL[self.focus]
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % field::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + field::ALL.len() - 1) % field::ALL.len();
    }

    pub fn push_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.' || c == '-') {
            return;
        }
        let name = self.focused_field();
        let mut value = self.raw.get(name).unwrap_or_default().to_string();
        value.push(c);
        self.raw.set(name, value);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        let name = self.focused_field();
        let mut value = self.raw.get(name).unwrap_or_default().to_string();
        value.pop();
        self.raw.set(name, value);
        self.error = None;
    }
}

fn label(name: &str) -> &'static str {
    match name {
        field::ROWS => "Rows",
        field::COLS => "Columns",
        field::TIME_LIMIT => "Time limit (s)",
        field::ROUNDS => "Rounds",
        field::COUNTDOWN => "Countdown (s)",
        field::COOLDOWN => "Cooldown (ms)",
        _ => "?",
    }
}

impl Widget for &SettingsForm {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(field::ALL.len() as u16 + 2),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(area);

        Paragraph::new("Settings")
            .block(Block::default().borders(Borders::ALL))
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let lines: Vec<Line> = field::ALL
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let focused = idx == self.focus;
                let value = self.raw.get(name).unwrap_or_default();
                let value_style = if focused {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(if focused { "> " } else { "  " }),
                    Span::styled(format!("{:<16}", label(name)), Style::default().fg(Color::Gray)),
                    Span::styled(value.to_string(), value_style),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Session"))
            .render(chunks[1], buf);

        if let Some(error) = &self.error {
            Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        }

        Paragraph::new("(↑/↓) field / (enter) apply / (esc) back")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_starts_from_config() {
        let form = SettingsForm::new(&SessionConfig::default());
        assert_eq!(form.focused_field(), field::ROWS);
        assert_eq!(form.raw().get(field::COLS), Some("5"));
        assert_eq!(SessionConfig::validate(form.raw()), Ok(SessionConfig::default()));
    }

    #[test]
    fn editing_focused_field() {
        let mut form = SettingsForm::new(&SessionConfig::default());
        form.next_field();
        assert_eq!(form.focused_field(), field::COLS);

        form.backspace();
        assert_eq!(form.raw().get(field::COLS), Some(""));
        form.push_char('8');
        form.push_char('x');
        assert_eq!(form.raw().get(field::COLS), Some("8"));
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = SettingsForm::new(&SessionConfig::default());
        form.prev_field();
        assert_eq!(form.focused_field(), field::COOLDOWN);
        form.next_field();
        assert_eq!(form.focused_field(), field::ROWS);
    }

    #[test]
    fn editing_clears_error() {
        let mut form = SettingsForm::new(&SessionConfig::default());
        form.set_error("invalid cols: grid needs at least 2 cells so a decoy exists");
        assert!(form.error().is_some());
        form.push_char('1');
        assert!(form.error().is_none());
    }

    #[test]
    fn renders_fields_and_error() {
        let mut form = SettingsForm::new(&SessionConfig::default());
        form.set_error("invalid rows: missing value");
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);

        (&form).render(area, &mut buffer);

        let rendered = buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(rendered.contains("Columns"));
        assert!(rendered.contains("Cooldown (ms)"));
        assert!(rendered.contains("invalid rows"));
    }
}
