//! Settings panel: the Configuration UI.
//!
//! Surfaces what the prober and resolver found as selectable options and
//! turns key presses into whole-record settings updates. Host and key are
//! free text, edited live; every other row cycles through the options the
//! engine reported.

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::engine::Connectivity;
use crate::remote::IndexMetadata;
use crate::settings::{Settings, clamp_ratio};

const RATIO_STEP: f64 = 0.1;

/// One row of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Host,
    ApiKey,
    Index,
    Embedder,
    HybridRatio,
    TitleAttr,
    DescAttr,
    ImageAttr,
}

impl Field {
    const ALL: [Self; 8] = [
        Self::Host,
        Self::ApiKey,
        Self::Index,
        Self::Embedder,
        Self::HybridRatio,
        Self::TitleAttr,
        Self::DescAttr,
        Self::ImageAttr,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Host => "URL",
            Self::ApiKey => "API Key",
            Self::Index => "Index",
            Self::Embedder => "Embedder",
            Self::HybridRatio => "Hybrid Ratio",
            Self::TitleAttr => "Title Attribute",
            Self::DescAttr => "Description Attribute",
            Self::ImageAttr => "Image Attribute",
        }
    }

    const fn is_text(self) -> bool {
        matches!(self, Self::Host | Self::ApiKey)
    }
}

/// Rows shown for the current metadata. Embedder and ratio appear only when
/// the index has embedders; the attribute rows only when it has fields.
pub fn visible_fields(metadata: &IndexMetadata) -> Vec<Field> {
    let mut fields = vec![Field::Host, Field::ApiKey, Field::Index];
    if !metadata.embedders.is_empty() {
        fields.extend([Field::Embedder, Field::HybridRatio]);
    }
    if !metadata.fields.is_empty() {
        fields.extend([Field::TitleAttr, Field::DescAttr, Field::ImageAttr]);
    }
    fields
}

/// Result of a key press in the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome {
    Continue,
    Close,
    /// Replace the stored settings with this record.
    Update(Settings),
    /// Informational message for the status bar.
    Notice(String),
}

/// What the panel needs to know about the world for one key press or frame.
#[derive(Debug, Clone, Copy)]
pub struct PanelContext<'a> {
    pub settings: &'a Settings,
    pub connectivity: &'a Connectivity,
    pub metadata: &'a IndexMetadata,
}

#[derive(Debug)]
pub struct SettingsPanel {
    cursor: Field,
    editing: bool,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self {
            cursor: Field::Host,
            editing: false,
        }
    }
}

impl SettingsPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The panel opens by itself until host, key and index are all set.
    #[must_use]
    pub fn should_auto_open(settings: &Settings) -> bool {
        !settings.missing_required().is_empty()
    }

    /// Row under the cursor. A hidden row falls back to the nearest visible
    /// row above it; the cursor itself keeps its field so it returns when
    /// the row reappears.
    pub fn selected(&self, metadata: &IndexMetadata) -> Field {
        let visible = visible_fields(metadata);
        let end = Field::ALL
            .iter()
            .position(|field| *field == self.cursor)
            .unwrap_or(0);
        Field::ALL[..=end]
            .iter()
            .rev()
            .find(|field| visible.contains(field))
            .copied()
            .unwrap_or(Field::Host)
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn handle_key(&mut self, key: KeyCode, ctx: PanelContext<'_>) -> PanelOutcome {
        let field = self.selected(ctx.metadata);
        if self.editing {
            return self.handle_edit_key(key, field, ctx.settings);
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => PanelOutcome::Close,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.move_cursor(ctx.metadata, true);
                PanelOutcome::Continue
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                self.move_cursor(ctx.metadata, false);
                PanelOutcome::Continue
            }
            KeyCode::Enter if field.is_text() => {
                self.editing = true;
                PanelOutcome::Continue
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                change_option(field, ctx, true)
            }
            KeyCode::Left | KeyCode::Char('h') => change_option(field, ctx, false),
            _ => PanelOutcome::Continue,
        }
    }

    fn handle_edit_key(&mut self, key: KeyCode, field: Field, settings: &Settings) -> PanelOutcome {
        let mut next = settings.clone();
        let value = match field {
            Field::Host => &mut next.host,
            Field::ApiKey => &mut next.api_key,
            _ => {
                self.editing = false;
                return PanelOutcome::Continue;
            }
        };
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.editing = false;
                PanelOutcome::Continue
            }
            KeyCode::Char(c) => {
                value.push(c);
                PanelOutcome::Update(next)
            }
            KeyCode::Backspace => {
                if value.pop().is_some() {
                    PanelOutcome::Update(next)
                } else {
                    PanelOutcome::Continue
                }
            }
            _ => PanelOutcome::Continue,
        }
    }

    fn move_cursor(&mut self, metadata: &IndexMetadata, forward: bool) {
        let fields = visible_fields(metadata);
        let len = fields.len();
        let current = self.selected(metadata);
        let pos = fields.iter().position(|field| *field == current).unwrap_or(0);
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.cursor = fields[next];
    }

    pub fn draw(&self, f: &mut Frame, ctx: PanelContext<'_>) {
        let area = f.area();
        let width = 72.min(area.width.saturating_sub(4));
        let height = 16.min(area.height.saturating_sub(2));
        let x = (area.width - width) / 2;
        let y = (area.height - height) / 2;
        let panel_area = Rect::new(x, y, width, height);

        f.render_widget(Clear, panel_area);

        let selected = self.selected(ctx.metadata);
        let mut lines: Vec<Line<'static>> = visible_fields(ctx.metadata)
            .into_iter()
            .map(|field| self.row(field, field == selected, ctx))
            .collect();

        lines.push(Line::from(""));
        let hint = if self.editing {
            "Type to edit  Enter/Esc: done"
        } else {
            "j/k: move  Enter: edit/next  h/l: change  Esc: close"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Search Configuration "),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, panel_area);
    }

    fn row(&self, field: Field, is_selected: bool, ctx: PanelContext<'_>) -> Line<'static> {
        let (value, valid, disabled) = display_value(field, ctx);
        let value = if is_selected && self.editing {
            format!("{value}_")
        } else {
            value
        };

        let mut label_style = Style::default().add_modifier(Modifier::BOLD);
        let mut value_style = if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        if is_selected {
            label_style = label_style.add_modifier(Modifier::REVERSED);
            value_style = value_style.fg(Color::Yellow);
        }

        let mut spans = vec![
            Span::styled(format!("{:>22} ", field.label()), label_style),
            Span::styled(value, value_style),
        ];
        if valid {
            spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
        }
        Line::from(spans)
    }
}

/// Text shown for a row, whether it carries a check mark, and whether it is
/// disabled.
fn display_value(field: Field, ctx: PanelContext<'_>) -> (String, bool, bool) {
    let s = ctx.settings;
    let or_placeholder = |value: &str, placeholder: &str| {
        if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        }
    };
    match field {
        Field::Host => (
            or_placeholder(&s.host, "http://localhost:7700"),
            ctx.connectivity.host_reachable,
            false,
        ),
        Field::ApiKey => (
            "*".repeat(s.api_key.chars().count()),
            ctx.connectivity.key_authorized,
            false,
        ),
        Field::Index => (
            or_placeholder(&s.index, "Select an index"),
            false,
            !ctx.connectivity.key_authorized,
        ),
        Field::Embedder => (or_placeholder(&s.embedder, "None (lexical)"), false, false),
        Field::HybridRatio => (
            format!("{} {:.1}", ratio_bar(s.hybrid_ratio), s.hybrid_ratio),
            false,
            s.embedder.is_empty(),
        ),
        Field::TitleAttr => (or_placeholder(&s.title_attr, "Select title attribute"), false, false),
        Field::DescAttr => (
            or_placeholder(&s.desc_attr, "Select description attribute"),
            false,
            false,
        ),
        Field::ImageAttr => (or_placeholder(&s.image_attr, "Select image attribute"), false, false),
    }
}

fn ratio_bar(ratio: f64) -> String {
    // Ratios are clamped to [0, 1] so this is at most 10.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (clamp_ratio(ratio) * 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

fn change_option(field: Field, ctx: PanelContext<'_>, forward: bool) -> PanelOutcome {
    let s = ctx.settings;
    match field {
        Field::Host | Field::ApiKey => PanelOutcome::Continue,
        Field::Index => {
            if !ctx.connectivity.key_authorized {
                return PanelOutcome::Notice("Index selection needs an authorized API key".to_string());
            }
            cycle(&ctx.connectivity.indexes, &s.index, forward, false)
                .map_or(PanelOutcome::Continue, |index| {
                    PanelOutcome::Update(s.clone().with_index(index))
                })
        }
        Field::Embedder => {
            let options: Vec<String> = ctx.metadata.embedders.iter().cloned().collect();
            cycle(&options, &s.embedder, forward, true).map_or(PanelOutcome::Continue, |embedder| {
                PanelOutcome::Update(Settings {
                    embedder,
                    ..s.clone()
                })
            })
        }
        Field::HybridRatio => {
            let ratio = step_ratio(s.hybrid_ratio, forward);
            PanelOutcome::Update(Settings {
                hybrid_ratio: ratio,
                ..s.clone()
            })
        }
        Field::TitleAttr | Field::DescAttr | Field::ImageAttr => {
            let options: Vec<String> = ctx.metadata.fields.iter().cloned().collect();
            let current = match field {
                Field::TitleAttr => &s.title_attr,
                Field::DescAttr => &s.desc_attr,
                _ => &s.image_attr,
            };
            cycle(&options, current, forward, true).map_or(PanelOutcome::Continue, |value| {
                let mut next = s.clone();
                match field {
                    Field::TitleAttr => next.title_attr = value,
                    Field::DescAttr => next.desc_attr = value,
                    _ => next.image_attr = value,
                }
                PanelOutcome::Update(next)
            })
        }
    }
}

/// Next option after `current`. With `allow_none`, the empty string is part
/// of the ring. A current value not in `options` moves to the first option.
fn cycle(options: &[String], current: &str, forward: bool, allow_none: bool) -> Option<String> {
    let mut ring: Vec<&str> = Vec::with_capacity(options.len() + 1);
    if allow_none {
        ring.push("");
    }
    ring.extend(options.iter().map(String::as_str));
    if ring.is_empty() {
        return None;
    }

    let next = match ring.iter().position(|option| *option == current) {
        Some(pos) if forward => ring[(pos + 1) % ring.len()],
        Some(pos) => ring[(pos + ring.len() - 1) % ring.len()],
        None => ring[if allow_none && ring.len() > 1 { 1 } else { 0 }],
    };
    (next != current).then(|| next.to_string())
}

/// Move the ratio one step, snapping to one decimal.
fn step_ratio(ratio: f64, up: bool) -> f64 {
    let tenths = (clamp_ratio(ratio) / RATIO_STEP).round();
    let tenths = if up { tenths + 1.0 } else { tenths - 1.0 };
    clamp_ratio(tenths / 10.0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn authorized() -> Connectivity {
        Connectivity {
            host_reachable: true,
            key_authorized: true,
            indexes: vec!["movies".to_string(), "books".to_string()],
        }
    }

    fn metadata() -> IndexMetadata {
        IndexMetadata {
            embedders: set(&["default", "openai"]),
            fields: set(&["name", "photo", "title"]),
        }
    }

    fn settings() -> Settings {
        Settings {
            host: "http://h".to_string(),
            api_key: "k".to_string(),
            index: "movies".to_string(),
            embedder: "default".to_string(),
            ..Settings::default()
        }
    }

    fn press(panel: &mut SettingsPanel, key: KeyCode, s: &Settings, c: &Connectivity, m: &IndexMetadata) -> PanelOutcome {
        panel.handle_key(
            key,
            PanelContext {
                settings: s,
                connectivity: c,
                metadata: m,
            },
        )
    }

    fn move_to(panel: &mut SettingsPanel, field: Field, m: &IndexMetadata) {
        while panel.selected(m) != field {
            panel.move_cursor(m, true);
        }
    }

    #[test]
    fn rows_depend_on_metadata() {
        assert_eq!(
            visible_fields(&IndexMetadata::default()),
            vec![Field::Host, Field::ApiKey, Field::Index]
        );
        assert_eq!(visible_fields(&metadata()).len(), 8);

        let no_embedders = IndexMetadata {
            embedders: BTreeSet::new(),
            fields: set(&["name"]),
        };
        assert!(!visible_fields(&no_embedders).contains(&Field::Embedder));
        assert!(!visible_fields(&no_embedders).contains(&Field::HybridRatio));
    }

    #[test]
    fn auto_open_until_required_fields_set() {
        assert!(SettingsPanel::should_auto_open(&Settings::default()));
        assert!(!SettingsPanel::should_auto_open(&settings()));
    }

    #[test]
    fn host_edit_is_live() {
        let mut panel = SettingsPanel::new();
        let s = Settings::default();
        let c = Connectivity::default();
        let m = IndexMetadata::default();

        assert_eq!(press(&mut panel, KeyCode::Enter, &s, &c, &m), PanelOutcome::Continue);
        assert!(panel.is_editing());
        let PanelOutcome::Update(next) = press(&mut panel, KeyCode::Char('h'), &s, &c, &m) else {
            panic!("expected update");
        };
        assert_eq!(next.host, "h");
        let PanelOutcome::Update(next) = press(&mut panel, KeyCode::Backspace, &next, &c, &m) else {
            panic!("expected update");
        };
        assert_eq!(next.host, "");
        press(&mut panel, KeyCode::Esc, &next, &c, &m);
        assert!(!panel.is_editing());
    }

    #[test]
    fn index_disabled_until_key_authorized() {
        let mut panel = SettingsPanel::new();
        let m = IndexMetadata::default();
        move_to(&mut panel, Field::Index, &m);
        let outcome = press(&mut panel, KeyCode::Right, &settings(), &Connectivity::default(), &m);
        assert!(matches!(outcome, PanelOutcome::Notice(_)));
    }

    #[test]
    fn index_change_resets_embedder() {
        let mut panel = SettingsPanel::new();
        let m = metadata();
        move_to(&mut panel, Field::Index, &m);
        let PanelOutcome::Update(next) = press(&mut panel, KeyCode::Right, &settings(), &authorized(), &m) else {
            panic!("expected update");
        };
        assert_eq!(next.index, "books");
        assert!(next.embedder.is_empty());
    }

    #[test]
    fn embedder_cycle_includes_none() {
        let mut panel = SettingsPanel::new();
        let m = metadata();
        move_to(&mut panel, Field::Embedder, &m);
        let s = settings();
        let PanelOutcome::Update(next) = press(&mut panel, KeyCode::Right, &s, &authorized(), &m) else {
            panic!("expected update");
        };
        assert_eq!(next.embedder, "openai");
        let PanelOutcome::Update(next) = press(&mut panel, KeyCode::Right, &next, &authorized(), &m) else {
            panic!("expected update");
        };
        assert_eq!(next.embedder, "");
    }

    #[test]
    fn ratio_steps_by_tenths_and_clamps() {
        assert!((step_ratio(0.5, true) - 0.6).abs() < 1e-9);
        assert!((step_ratio(0.5, false) - 0.4).abs() < 1e-9);
        assert!((step_ratio(1.0, true) - 1.0).abs() < 1e-9);
        assert!(step_ratio(0.0, false).abs() < 1e-9);
        assert!((step_ratio(0.33, true) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn attribute_cycle_sets_field() {
        let mut panel = SettingsPanel::new();
        let m = metadata();
        move_to(&mut panel, Field::ImageAttr, &m);
        let PanelOutcome::Update(next) = press(&mut panel, KeyCode::Right, &settings(), &authorized(), &m) else {
            panic!("expected update");
        };
        assert_eq!(next.image_attr, "name");
        assert_eq!(next.title_attr, "");
    }

    #[test]
    fn cursor_wraps_and_clamps() {
        let mut panel = SettingsPanel::new();
        let m = metadata();
        panel.move_cursor(&m, false);
        assert_eq!(panel.selected(&m), Field::ImageAttr);

        // Fewer rows after the metadata is cleared.
        assert_eq!(panel.selected(&IndexMetadata::default()), Field::Index);
    }

    #[test]
    fn cursor_stays_on_its_field_when_rows_shift() {
        let mut panel = SettingsPanel::new();
        let full = metadata();
        move_to(&mut panel, Field::Embedder, &full);

        let no_embedders = IndexMetadata {
            embedders: BTreeSet::new(),
            fields: set(&["name"]),
        };
        assert_eq!(panel.selected(&no_embedders), Field::Index);
        assert_eq!(panel.selected(&full), Field::Embedder);

        move_to(&mut panel, Field::DescAttr, &full);
        let fields_only = IndexMetadata {
            embedders: BTreeSet::new(),
            fields: set(&["name"]),
        };
        assert_eq!(panel.selected(&fields_only), Field::DescAttr);
        panel.move_cursor(&fields_only, false);
        assert_eq!(panel.selected(&full), Field::TitleAttr);
    }

    #[test]
    fn cycle_helper() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cycle(&options, "a", true, false), Some("b".to_string()));
        assert_eq!(cycle(&options, "a", false, false), Some("b".to_string()));
        assert_eq!(cycle(&options, "x", true, false), Some("a".to_string()));
        assert_eq!(cycle(&options, "", true, true), Some("a".to_string()));
        assert_eq!(cycle(&options, "b", true, true), Some(String::new()));
        assert_eq!(cycle(&[], "", true, true), None);
        assert_eq!(cycle(&["a".to_string()], "a", true, false), None);
    }

    #[test]
    fn ratio_bar_renders() {
        assert_eq!(ratio_bar(0.5), "[#####-----]");
        assert_eq!(ratio_bar(1.0), "[##########]");
    }
}
