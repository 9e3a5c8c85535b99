use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
};
use std::ops::Range;
use techgrid_core::data::DetectionSource;
use techgrid_core::presence::{
    BASE_URL_COLUMN, Flag, PresenceRow, PresenceTable, SortDirection, SortKey,
};
use techgrid_core::selection::{SelectionOutcome, resolve_selection};
use tracing::warn;

const MAX_BASE_URL_WIDTH: usize = 48;
const COLUMN_SPACING: u16 = 2;
const HIGHLIGHT_SYMBOL: &str = "» ";
/// Lines moved by PgUp/PgDn in the URL panel
const DETAIL_PAGE: usize = 8;

/// How a line in the URL panel is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Message,
    Heading,
    Url,
    Error,
}

/// Interactive presence grid: sortable columns, one selected row, and a URL
/// panel fed by the selection handler.
pub struct PresenceGrid {
    table: PresenceTable,
    sort: SortKey,
    order: Vec<usize>,        // display position -> table row index
    selected: Option<usize>,  // display position
    detail: Vec<(DetailKind, String)>,
    detail_scroll: usize,     // first URL panel line drawn
}

impl PresenceGrid {
    pub fn new(table: PresenceTable) -> Self {
        let sort = SortKey::initial(&table);
        let order = table.row_order(sort);
        let mut grid = Self {
            table,
            sort,
            order,
            selected: None,
            detail: Vec::new(),
            detail_scroll: 0,
        };
        grid.show_outcome(&SelectionOutcome::NoRowSelected);
        grid
    }

    pub fn table(&self) -> &PresenceTable {
        &self.table
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&PresenceRow> {
        self.selected
            .and_then(|pos| self.order.get(pos))
            .and_then(|&idx| self.table.row(idx))
    }

    /// Base URLs in the order they are currently displayed
    pub fn display_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|&idx| self.table.row(idx))
            .map(|row| row.base_url())
            .collect()
    }

    pub fn detail(&self) -> &[(DetailKind, String)] {
        &self.detail
    }

    pub fn detail_scroll(&self) -> usize {
        self.detail_scroll
    }

    /// Scrolls the URL panel; the last line always stays reachable.
    pub fn scroll_detail_down(&mut self, lines: usize) {
        let last = self.detail.len().saturating_sub(1);
        self.detail_scroll = (self.detail_scroll + lines).min(last);
    }

    pub fn scroll_detail_up(&mut self, lines: usize) {
        self.detail_scroll = self.detail_scroll.saturating_sub(lines);
    }

    /// Selects the row at a display position (or clears the selection) and
    /// runs the URL lookup for it.
    pub fn select<S: DetectionSource + ?Sized>(&mut self, source: &S, position: Option<usize>) {
        self.selected = position.filter(|&pos| pos < self.order.len());

        match resolve_selection(source, self.selected_row()) {
            Ok(outcome) => self.show_outcome(&outcome),
            Err(e) => {
                warn!(target: "techgrid::tui", "URL lookup failed: {}", e);
                self.detail = vec![(DetailKind::Error, format!("✗ URL lookup failed: {}", e))];
                self.detail_scroll = 0;
            }
        }
    }

    pub fn select_next<S: DetectionSource + ?Sized>(&mut self, source: &S) {
        if self.order.is_empty() {
            return;
        }
        let next = match self.selected {
            Some(pos) => (pos + 1).min(self.order.len() - 1),
            None => 0,
        };
        if Some(next) != self.selected {
            self.select(source, Some(next));
        }
    }

    pub fn select_previous<S: DetectionSource + ?Sized>(&mut self, source: &S) {
        if self.order.is_empty() {
            return;
        }
        let previous = match self.selected {
            Some(pos) => pos.saturating_sub(1),
            None => self.order.len() - 1,
        };
        if Some(previous) != self.selected {
            self.select(source, Some(previous));
        }
    }

    /// Re-sorts rows. The selected site stays selected at its new position.
    pub fn set_sort(&mut self, sort: SortKey) {
        let selected_row = self.selected.and_then(|pos| self.order.get(pos).copied());
        self.sort = sort;
        self.order = self.table.row_order(sort);
        self.selected =
            selected_row.and_then(|row| self.order.iter().position(|&idx| idx == row));
    }

    pub fn next_sort_column(&mut self) {
        let columns = self.table.technologies().len() + 1;
        self.set_sort(SortKey {
            column: (self.sort.column + 1) % columns,
            direction: self.sort.direction,
        });
    }

    pub fn previous_sort_column(&mut self) {
        let columns = self.table.technologies().len() + 1;
        self.set_sort(SortKey {
            column: (self.sort.column + columns - 1) % columns,
            direction: self.sort.direction,
        });
    }

    pub fn toggle_sort_direction(&mut self) {
        self.set_sort(SortKey {
            column: self.sort.column,
            direction: self.sort.direction.toggled(),
        });
    }

    /// Applies one key press. Returns true when the grid should close.
    pub fn handle_key<S: DetectionSource + ?Sized>(&mut self, key: KeyEvent, source: &S) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(source),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(source),
            KeyCode::Home => {
                if !self.order.is_empty() {
                    self.select(source, Some(0));
                }
            }
            KeyCode::End => {
                if !self.order.is_empty() {
                    self.select(source, Some(self.order.len() - 1));
                }
            }
            KeyCode::Esc => self.select(source, None),
            KeyCode::Right | KeyCode::Tab => self.next_sort_column(),
            KeyCode::Left | KeyCode::BackTab => self.previous_sort_column(),
            KeyCode::Char('s') => self.toggle_sort_direction(),
            KeyCode::PageDown => self.scroll_detail_down(DETAIL_PAGE),
            KeyCode::PageUp => self.scroll_detail_up(DETAIL_PAGE),
            KeyCode::Char('J') => self.scroll_detail_down(1),
            KeyCode::Char('K') => self.scroll_detail_up(1),
            _ => {}
        }
        false
    }

    fn show_outcome(&mut self, outcome: &SelectionOutcome) {
        let lines = outcome.lines();
        self.detail = match outcome {
            SelectionOutcome::Urls { .. } => lines
                .into_iter()
                .enumerate()
                .map(|(i, line)| {
                    let kind = if i == 0 { DetailKind::Heading } else { DetailKind::Url };
                    (kind, line)
                })
                .collect(),
            _ => lines.into_iter().map(|line| (DetailKind::Message, line)).collect(),
        };
        self.detail_scroll = 0;
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(60), // Grid
                Constraint::Min(5),         // URLs
                Constraint::Length(1),      // Hints bar
            ])
            .split(f.area());

        self.render_grid(f, chunks[0]);
        self.render_urls(f, chunks[1]);
        self.render_hints(f, chunks[2]);
    }

    fn render_grid(&self, f: &mut Frame, area: Rect) {
        let base_width = self.base_url_width();
        let window = self.visible_technologies(area.width, base_width);
        let total = self.table.technologies().len();

        let mut title = format!(
            " Presence ({} sites × {} technologies) ",
            self.table.len(),
            total
        );
        if window.len() < total {
            title.push_str(&format!(
                "{}columns {}-{} of {}{} ",
                if window.start > 0 { "‹ " } else { "" },
                window.start + 1,
                window.end,
                total,
                if window.end < total { " ›" } else { "" },
            ));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan));

        // Column 0 is always Base_URL; technology i is column i + 1
        let header_columns = std::iter::once((0, BASE_URL_COLUMN)).chain(
            self.table.technologies()[window.clone()]
                .iter()
                .enumerate()
                .map(|(i, name)| (window.start + i + 1, name.as_str())),
        );
        let header = Row::new(header_columns.map(|(idx, name)| {
            let label = if idx == self.sort.column {
                format!("{} {}", name, self.sort.direction.arrow())
            } else {
                name.to_string()
            };
            let mut style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
            if idx == self.sort.column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(label).style(style)
        }));

        let rows = self.order.iter().filter_map(|&idx| self.table.row(idx)).map(|row| {
            let cells = std::iter::once(Cell::from(row.base_url().to_string())).chain(
                row.cells()
                    .skip(window.start)
                    .take(window.len())
                    .map(|(_, flag)| {
                        let style = match flag {
                            Flag::Yes => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                            Flag::No => Style::default().fg(Color::DarkGray),
                        };
                        Cell::from(flag.as_str()).style(style)
                    }),
            );
            Row::new(cells)
        });

        let widths = std::iter::once(Constraint::Length(base_width as u16)).chain(
            self.table.technologies()[window.clone()]
                .iter()
                .map(|tech| Constraint::Length(technology_width(tech) as u16)),
        );

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol(HIGHLIGHT_SYMBOL);

        let mut state = TableState::default().with_selected(self.selected);
        f.render_stateful_widget(table, area, &mut state);
    }

    fn base_url_width(&self) -> usize {
        // Room for the sort arrow on whichever column holds it
        self.table
            .rows()
            .iter()
            .map(|row| row.base_url().chars().count())
            .max()
            .unwrap_or(0)
            .max(BASE_URL_COLUMN.len() + 2)
            .min(MAX_BASE_URL_WIDTH)
    }

    /// Technology columns that fit next to Base_URL at full width. The window
    /// starts at the first column and slides right until it holds the sort
    /// column.
    pub fn visible_technologies(&self, area_width: u16, base_width: usize) -> Range<usize> {
        let technologies = self.table.technologies();
        let count = technologies.len();
        if count == 0 {
            return 0..0;
        }

        let spacing = COLUMN_SPACING as usize;
        let fixed = 2 + HIGHLIGHT_SYMBOL.chars().count() + base_width;
        let budget = (area_width as usize).saturating_sub(fixed);
        let width = |idx: usize| technology_width(&technologies[idx]) + spacing;

        let anchor = self.sort.column.saturating_sub(1).min(count - 1);

        let mut used = 0;
        let mut end = 0;
        while end < count && used + width(end) <= budget {
            used += width(end);
            end += 1;
        }
        if anchor < end {
            return 0..end;
        }

        let mut start = anchor + 1;
        used = 0;
        while start > 0 && used + width(start - 1) <= budget {
            start -= 1;
            used += width(start);
        }
        let mut end = anchor + 1;
        while end < count && used + width(end) <= budget {
            used += width(end);
            end += 1;
        }
        start.min(anchor)..end
    }

    fn render_urls(&self, f: &mut Frame, area: Rect) {
        let total = self.detail.len();
        let title = if total > 1 && self.detail_scroll > 0 {
            format!(" URLs (from line {} of {}) ", self.detail_scroll + 1, total)
        } else {
            " URLs ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let remaining = total.saturating_sub(self.detail_scroll);
        // Reserve the last line for the overflow marker when lines are hidden
        let shown = if remaining > height {
            height.saturating_sub(1)
        } else {
            remaining
        };

        let mut items: Vec<ListItem> = self
            .detail
            .iter()
            .skip(self.detail_scroll)
            .take(shown)
            .map(|(kind, text)| {
                let style = match kind {
                    DetailKind::Message => Style::default().fg(Color::DarkGray),
                    DetailKind::Heading => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    DetailKind::Url => Style::default().fg(Color::White),
                    DetailKind::Error => Style::default().fg(Color::Red),
                };
                ListItem::new(text.as_str()).style(style)
            })
            .collect();

        if shown < remaining {
            items.push(
                ListItem::new(format!("… ({} more, PgDn/J to scroll)", remaining - shown))
                    .style(Style::default().fg(Color::Yellow)),
            );
        }

        f.render_widget(List::new(items), inner);
    }

    fn render_hints(&self, f: &mut Frame, area: Rect) {
        let key = Style::default().fg(Color::Black).bg(Color::Gray);
        let hints = Line::from(vec![
            Span::styled(" q ", key),
            Span::raw(" Exit  "),
            Span::styled(" ↑/↓ ", key),
            Span::raw(" Select  "),
            Span::styled(" Home/End ", key),
            Span::raw(" Top/Bottom  "),
            Span::styled(" ←/→ ", key),
            Span::raw(" Sort column  "),
            Span::styled(" PgUp/PgDn ", key),
            Span::raw(" URLs  "),
            Span::styled(" s ", key),
            Span::raw(match self.sort.direction {
                SortDirection::Ascending => " Sort descending  ",
                SortDirection::Descending => " Sort ascending  ",
            }),
            Span::styled(" Esc ", key),
            Span::raw(" Clear"),
        ]);

        let paragraph = Paragraph::new(hints).style(Style::default().bg(Color::Black).fg(Color::Gray));
        f.render_widget(paragraph, area);
    }
}

fn technology_width(name: &str) -> usize {
    name.chars().count() + 2
}
