//! Interactive search TUI using ratatui.
//!
//! Search bar with live typing, result list, card detail pane and the
//! settings panel. Every key press goes through the settings store; the
//! session reacts on the next pump and results arrive asynchronously.

use std::io::{self, IsTerminal, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{info, warn};

use super::settings_panel::{PanelContext, PanelOutcome, SettingsPanel};
use crate::app::AppContext;
use crate::error::{Result, SpError};
use crate::render::{DisplayCard, document_id};
use crate::settings::share_link;

/// Focus state for TUI panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    List,
    Detail,
}

impl FocusPanel {
    const fn toggle(self) -> Self {
        match self {
            Self::List => Self::Detail,
            Self::Detail => Self::List,
        }
    }
}

/// Action to take after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Continue,
}

/// TUI application state.
pub struct SearchTui {
    app: AppContext,
    /// Result list selection
    list_state: ListState,
    /// Whether the search box receives key presses
    search_focused: bool,
    focus: FocusPanel,
    detail_scroll: u16,
    show_help: bool,
    /// Open settings panel, if any
    panel: Option<SettingsPanel>,
    status_message: Option<String>,
}

impl SearchTui {
    pub fn new(app: AppContext) -> Self {
        let panel = SettingsPanel::should_auto_open(app.store().settings()).then(SettingsPanel::new);
        Self {
            app,
            list_state: ListState::default(),
            search_focused: panel.is_none(),
            focus: FocusPanel::List,
            detail_scroll: 0,
            show_help: false,
            panel,
            status_message: None,
        }
    }

    /// Run the TUI main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let tick = Duration::from_millis(self.app.config.tui.tick_ms.max(10));
        loop {
            self.refresh();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code, key.modifiers) == Action::Quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Pump the app and keep the selection inside the result list.
    fn refresh(&mut self) {
        if self.app.pump() {
            let len = self.app.session().results().len();
            match self.list_state.selected() {
                _ if len == 0 => self.list_state.select(None),
                Some(i) if i >= len => self.list_state.select(Some(len - 1)),
                None => self.list_state.select(Some(0)),
                Some(_) => {}
            }
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Length(3), // Search bar
                Constraint::Min(10),   // Main content
                Constraint::Length(1), // Help bar
            ])
            .split(f.area());

        self.draw_title_bar(f, chunks[0]);
        self.draw_search_bar(f, chunks[1]);
        self.draw_main_content(f, chunks[2]);
        self.draw_help_bar(f, chunks[3]);

        if let Some(panel) = &self.panel {
            let session = self.app.session();
            panel.draw(
                f,
                PanelContext {
                    settings: self.app.store().settings(),
                    connectivity: session.connectivity(),
                    metadata: session.metadata(),
                },
            );
        }

        if self.show_help {
            self.draw_help_overlay(f);
        }
    }

    fn draw_title_bar(&self, f: &mut Frame, area: Rect) {
        let session = self.app.session();
        let settings = self.app.store().settings();
        let index = if settings.index.is_empty() {
            "no index"
        } else {
            settings.index.as_str()
        };
        let mode = settings
            .hybrid()
            .map_or_else(|| "lexical".to_string(), |(embedder, ratio)| format!("hybrid {embedder} {ratio:.1}"));
        let loading = if session.is_loading() { " | loading..." } else { "" };
        let status = self
            .status_message
            .as_ref()
            .map(|m| format!(" | {m}"))
            .unwrap_or_default();

        let title = Line::from(vec![
            Span::styled("searchpane", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                " | {index} | {mode} | {} results{loading}{status}",
                session.results().len()
            )),
        ]);

        let paragraph = Paragraph::new(title).style(Style::default().fg(Color::Cyan));
        f.render_widget(paragraph, area);
    }

    fn draw_search_bar(&self, f: &mut Frame, area: Rect) {
        let query = self.app.store().query_text();
        let border_style = if self.search_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let search_text = if self.search_focused {
            format!("{query}_")
        } else if query.is_empty() {
            "Type / to search...".to_string()
        } else {
            query.to_string()
        };

        let paragraph = Paragraph::new(search_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(" Search "),
            )
            .style(if query.is_empty() && !self.search_focused {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            });

        f.render_widget(paragraph, area);
    }

    fn draw_main_content(&mut self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        self.draw_list_panel(f, columns[0]);
        self.draw_detail_panel(f, columns[1]);
    }

    fn draw_list_panel(&mut self, f: &mut Frame, area: Rect) {
        let is_focused = self.focus == FocusPanel::List && !self.search_focused;
        let border_style = if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let items: Vec<ListItem> = self
            .app
            .session()
            .cards()
            .into_iter()
            .map(|card| {
                let marker = if card.image_url.is_some() { "[img] " } else { "      " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Magenta)),
                    Span::raw(truncate(&card.title, 40)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(if is_focused { " Results [*] " } else { " Results " }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_detail_panel(&self, f: &mut Frame, area: Rect) {
        let is_focused = self.focus == FocusPanel::Detail && !self.search_focused;
        let border_style = if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let paragraph = Paragraph::new(self.selected_detail())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(if is_focused { " Details [*] " } else { " Details " }),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.detail_scroll, 0));

        f.render_widget(paragraph, area);
    }

    fn draw_help_bar(&self, f: &mut Frame, area: Rect) {
        let help_text = if self.panel.is_some() {
            "Settings: j/k move  Enter edit  h/l change  Esc close"
        } else if self.search_focused {
            "Type to search  Enter/Esc: leave search  Backspace: delete"
        } else {
            "j/k: navigate  /: search  Tab: switch pane  c: settings  s: share link  ?: help  q: quit"
        };

        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        f.render_widget(paragraph, area);
    }

    fn draw_help_overlay(&self, f: &mut Frame) {
        let area = f.area();

        let help_width = 60.min(area.width.saturating_sub(4));
        let help_height = 20.min(area.height.saturating_sub(4));
        let x = (area.width - help_width) / 2;
        let y = (area.height - help_height) / 2;
        let help_area = Rect::new(x, y, help_width, help_height);

        f.render_widget(Clear, help_area);

        let help_text = vec![
            Line::from(Span::styled("Keyboard Shortcuts", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Navigation:"),
            Line::from("  j / Down     Move down in results"),
            Line::from("  k / Up       Move up in results"),
            Line::from("  G / g        Jump to last / first result"),
            Line::from("  Tab          Switch focus between panels"),
            Line::from("  PgUp/PgDn    Scroll detail pane"),
            Line::from(""),
            Line::from("Actions:"),
            Line::from("  /            Focus search box"),
            Line::from("  Esc          Clear search"),
            Line::from("  c            Open settings"),
            Line::from("  s            Show share link"),
            Line::from(""),
            Line::from("Press ? or Esc to close this help"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Help "),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, help_area);
    }

    fn selected_detail(&self) -> Text<'static> {
        let session = self.app.session();
        let Some(selected) = self.list_state.selected() else {
            return Text::from(if session.is_loading() { "Loading..." } else { "No results" });
        };
        let Some(doc) = session.results().get(selected) else {
            return Text::from("No result selected");
        };
        let card = crate::render::render_card(doc, &self.app.store().settings().display_attrs());

        let mut lines = card_lines(&card);
        lines.push(Line::from(format!("ID: {}", document_id(doc))));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Document:".to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from("─".repeat(40)));
        let raw = serde_json::to_string_pretty(doc).unwrap_or_default();
        lines.extend(raw.lines().map(|line| Line::from(line.to_string())));

        Text::from(lines)
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Action {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if self.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter) {
                self.show_help = false;
            }
            return Action::Continue;
        }

        if self.panel.is_some() {
            self.handle_panel_key(key);
            return Action::Continue;
        }

        if self.search_focused {
            self.handle_search_key(key);
            return Action::Continue;
        }

        match key {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('/') => {
                self.search_focused = true;
                return Action::Continue;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return Action::Continue;
            }
            KeyCode::Char('c') => {
                self.panel = Some(SettingsPanel::new());
                return Action::Continue;
            }
            KeyCode::Char('s') => {
                self.show_share_link();
                return Action::Continue;
            }
            KeyCode::Tab => {
                self.focus = self.focus.toggle();
                return Action::Continue;
            }
            KeyCode::Esc => {
                if !self.app.store().query_text().is_empty() {
                    self.app.store_mut().set_query_text("");
                    self.status_message = Some("Search cleared".to_string());
                }
                return Action::Continue;
            }
            _ => {}
        }

        match self.focus {
            FocusPanel::List => self.handle_list_key(key),
            FocusPanel::Detail => self.handle_detail_key(key),
        }
        Action::Continue
    }

    fn handle_panel_key(&mut self, key: KeyCode) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let session = self.app.session();
        let outcome = panel.handle_key(
            key,
            PanelContext {
                settings: self.app.store().settings(),
                connectivity: session.connectivity(),
                metadata: session.metadata(),
            },
        );
        match outcome {
            PanelOutcome::Continue => {}
            PanelOutcome::Close => {
                self.panel = None;
                self.search_focused = true;
            }
            PanelOutcome::Update(settings) => {
                if let Err(e) = self.app.store_mut().replace(settings) {
                    warn!(error = %e, "Failed to persist settings");
                    self.status_message = Some(format!("Settings not saved: {e}"));
                }
            }
            PanelOutcome::Notice(message) => self.status_message = Some(message),
        }
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        let mut text = self.app.store().query_text().to_string();
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Down => {
                self.search_focused = false;
                return;
            }
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                if text.pop().is_none() {
                    return;
                }
            }
            _ => return,
        }
        self.app.store_mut().set_query_text(text);
        self.list_state.select(Some(0));
        self.detail_scroll = 0;
    }

    fn handle_list_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Char('G') => {
                let len = self.app.session().results().len();
                if len > 0 {
                    self.list_state.select(Some(len - 1));
                    self.detail_scroll = 0;
                }
            }
            KeyCode::Char('g') => {
                if !self.app.session().results().is_empty() {
                    self.list_state.select(Some(0));
                    self.detail_scroll = 0;
                }
            }
            KeyCode::Enter | KeyCode::Char('l') => self.focus = FocusPanel::Detail,
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') | KeyCode::PageDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(3);
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::PageUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(3);
            }
            KeyCode::Char('g') => self.detail_scroll = 0,
            KeyCode::Char('h') | KeyCode::Left => self.focus = FocusPanel::List,
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let len = self.app.session().results().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
        self.detail_scroll = 0;
    }

    fn select_prev(&mut self) {
        let len = self.app.session().results().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.detail_scroll = 0;
    }

    fn show_share_link(&mut self) {
        let base = self.app.config.share.base_url.clone();
        match share_link(&base, self.app.store().settings()) {
            Ok(link) => {
                info!(link = %link, "Share link created");
                self.status_message = Some(link);
            }
            Err(e) => self.status_message = Some(format!("Share link failed: {e}")),
        }
    }

    #[cfg(test)]
    fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }
}

fn card_lines(card: &DisplayCard) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            card.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(card.description.clone()),
        Line::from(""),
    ];
    match &card.image_url {
        Some(url) => lines.push(Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::Magenta)),
            Span::raw(format!("{url} ({})", card.image_alt)),
        ])),
        None => lines.push(Line::from(Span::styled(
            "No image",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    lines
}

/// RAII Guard to ensure terminal state is restored even on panic.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

/// Run the search TUI.
pub fn run_search_tui(app: AppContext) -> Result<()> {
    if !io::stdout().is_terminal() {
        return Err(SpError::ValidationFailed(
            "tui command requires an interactive terminal".to_string(),
        ));
    }

    let _guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    SearchTui::new(app).run(&mut terminal)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        format!("{}...", s.chars().take(max_len - 3).collect::<String>())
    } else {
        s.to_string()
    }
}
