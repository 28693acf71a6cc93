use super::format::{format_amount, signed_amount};
use super::summary::{ChartSegment, chart_segments, expense_by_category, top_expense_category, totals};
use crate::db::storage::Storage;
use crate::db::store::TransactionStore;
use crate::error::Result;
use crate::models::transaction::{Transaction, TransactionType};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use rust_decimal::Decimal;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Home,
    Dashboard,
}

struct DashboardState {
    tab: Tab,
    table_state: TableState,
    status: Option<String>,
}

impl DashboardState {
    fn new(len: usize) -> Self {
        let mut state = Self {
            tab: Tab::Home,
            table_state: TableState::default(),
            status: None,
        };
        state.clamp_selection(len);
        state
    }

    fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Home => Tab::Dashboard,
            Tab::Dashboard => Tab::Home,
        };
    }

    fn move_selection(&mut self, delta: i32, len: usize) {
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i32;
        let next = (current + delta).clamp(0, len as i32 - 1) as usize;
        self.table_state.select(Some(next));
    }

    fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0).min(len - 1);
            self.table_state.select(Some(selected));
        }
    }
}

pub fn run_dashboard<S: Storage>(store: &mut TransactionStore<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = (|| -> Result<()> {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)?;

        let mut state = DashboardState::new(store.transactions().len());

        loop {
            terminal.draw(|frame| draw(frame, &mut state, store.transactions()))?;

            if event::poll(std::time::Duration::from_millis(250))? {
                let event = event::read()?;
                if let Event::Key(key) = event {
                    if handle_key(store, &mut state, key)? {
                        break;
                    }
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn handle_key<S: Storage>(
    store: &mut TransactionStore<S>,
    state: &mut DashboardState,
    key: KeyEvent,
) -> Result<bool> {
    if key.kind == KeyEventKind::Release {
        return Ok(false);
    }

    let len = store.transactions().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Tab => state.toggle_tab(),
        KeyCode::Char('1') => state.tab = Tab::Home,
        KeyCode::Char('2') => state.tab = Tab::Dashboard,
        KeyCode::Up if state.tab == Tab::Home => state.move_selection(-1, len),
        KeyCode::Down if state.tab == Tab::Home => state.move_selection(1, len),
        KeyCode::Char('d') | KeyCode::Delete if state.tab == Tab::Home => {
            let selected = state
                .table_state
                .selected()
                .and_then(|i| store.transactions().get(i))
                .map(|t| (t.id, t.description.clone()));
            if let Some((id, description)) = selected {
                let remaining = store.remove(id)?.len();
                state.clamp_selection(remaining);
                state.status = Some(format!("Deleted '{}'", description));
            }
        }
        _ => {}
    }

    Ok(false)
}

fn draw(frame: &mut ratatui::Frame, state: &mut DashboardState, transactions: &[Transaction]) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, layout[0], transactions);
    render_tabs(frame, layout[1], state.tab);
    match state.tab {
        Tab::Home => render_home(frame, layout[2], state, transactions),
        Tab::Dashboard => render_overview(frame, layout[2], transactions),
    }
    render_footer(frame, layout[3], state);
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, transactions: &[Transaction]) {
    let summary = totals(transactions);

    let lines = vec![
        Line::from(vec![
            Span::styled("Balance  ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_amount(summary.balance),
                Style::default().fg(Color::White).bold(),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Income ", Style::default().fg(Color::Gray)),
            Span::styled(format!("+{}", format_amount(summary.income)), Style::default().fg(Color::Green)),
            Span::raw("    "),
            Span::styled("Expense ", Style::default().fg(Color::Gray)),
            Span::styled(format!("-{}", format_amount(summary.expense)), Style::default().fg(Color::Red)),
        ]),
    ];

    let block = Block::default().title("Money Tracker").borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

fn render_tabs(frame: &mut ratatui::Frame, area: Rect, tab: Tab) {
    let selected = match tab {
        Tab::Home => 0,
        Tab::Dashboard => 1,
    };
    let tabs = Tabs::new(vec!["1 Home", "2 Dashboard"])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, area);
}

fn render_home(
    frame: &mut ratatui::Frame,
    area: Rect,
    state: &mut DashboardState,
    transactions: &[Transaction],
) {
    let block = Block::default().title("Recent").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if transactions.is_empty() {
        let empty = Paragraph::new("No transactions yet. Add one with `mtr add`.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let header = Row::new([
        Cell::from("Date").style(Style::default().bold()),
        Cell::from("").style(Style::default().bold()),
        Cell::from("Description").style(Style::default().bold()),
        Cell::from("Category").style(Style::default().bold()),
        Cell::from("Amount").style(Style::default().bold()),
    ]);

    let rows = transactions.iter().map(|tx| {
        let category = tx.category_info();
        let color = match tx.transaction_type {
            TransactionType::Income => Color::Green,
            TransactionType::Expense => Color::Red,
        };
        Row::new([
            Cell::from(tx.date.format("%Y-%m-%d").to_string()),
            Cell::from(category.icon).style(Style::default().fg(tint(category.color))),
            Cell::from(tx.description.clone()),
            Cell::from(category.label),
            Cell::from(signed_amount(tx)).style(Style::default().fg(color)),
        ])
    });

    let widths = [
        Constraint::Length(10),
        Constraint::Length(2),
        Constraint::Percentage(45),
        Constraint::Length(18),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        .highlight_symbol("➤ ")
        .column_spacing(1);

    frame.render_stateful_widget(table, inner, &mut state.table_state);
}

fn render_overview(frame: &mut ratatui::Frame, area: Rect, transactions: &[Transaction]) {
    let block = Block::default().title("Expense Breakdown").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let expense = totals(transactions).expense;
    let groups = expense_by_category(transactions);
    let segments = chart_segments(&groups, expense);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(inner);

    if segments.is_empty() {
        let empty = Paragraph::new("No expenses yet")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, rows[0]);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[0]);

        render_donut(frame, columns[0], &segments, expense);
        render_legend(frame, columns[1], &segments);
    }

    let focus = top_expense_category(transactions)
        .map(|top| top.label)
        .unwrap_or("General");
    let tip = Paragraph::new(format!(
        "Tip: splitting money by category makes a budget easier to keep. Try trimming \"{}\" first.",
        focus
    ))
    .style(Style::default().fg(Color::LightBlue))
    .wrap(Wrap { trim: true });
    frame.render_widget(tip, rows[1]);
}

fn render_donut(frame: &mut ratatui::Frame, area: Rect, segments: &[ChartSegment], total: Decimal) {
    let arcs: Vec<(f64, f64, Color)> = segments
        .iter()
        .map(|s| {
            let start = s.offset / 100.0 * TAU;
            let end = (s.offset + s.percent) / 100.0 * TAU;
            (start, end, tint(s.color))
        })
        .collect();
    let center = format_amount(total);

    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for (start, end, color) in &arcs {
                let mut points = Vec::new();
                let mut r = 0.55;
                while r <= 1.0 {
                    let mut angle = *start;
                    while angle <= *end {
                        // clockwise from twelve o'clock
                        let theta = FRAC_PI_2 - angle;
                        points.push((r * theta.cos(), r * theta.sin()));
                        angle += 0.02;
                    }
                    r += 0.03;
                }
                if !points.is_empty() {
                    ctx.draw(&Points { coords: &points, color: *color });
                }
            }
            ctx.print(-0.2, 0.12, Span::styled("Total", Style::default().fg(Color::Gray)));
            ctx.print(-0.35, -0.12, Span::styled(center.clone(), Style::default().fg(Color::White).bold()));
        });

    frame.render_widget(canvas, area);
}

fn render_legend(frame: &mut ratatui::Frame, area: Rect, segments: &[ChartSegment]) {
    const BAR_WIDTH: usize = 16;

    let mut lines = Vec::new();
    for segment in segments {
        let color = tint(segment.color);
        let filled = ((segment.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);

        lines.push(Line::from(vec![
            Span::styled(format!("{} ", segment.icon), Style::default().fg(color)),
            Span::styled(format!("{:18}", segment.label), Style::default().fg(Color::White).bold()),
            Span::styled(format!("{:>12}", format_amount(segment.total)), Style::default().fg(Color::White)),
        ]));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("█".repeat(filled), Style::default().fg(color)),
            Span::styled("░".repeat(BAR_WIDTH - filled), Style::default().fg(Color::DarkGray)),
            Span::styled(format!(" {:.1}%", segment.percent), Style::default().fg(Color::Gray)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, state: &DashboardState) {
    let hint = match state.tab {
        Tab::Home => "Tab/1/2 switch  ↑/↓ move  d delete  q/Esc exit",
        Tab::Dashboard => "Tab/1/2 switch  q/Esc exit",
    };
    let text = match state.status {
        Some(ref status) => format!("{}  |  {}", status, hint),
        None => hint.to_string(),
    };

    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn tint(color: &str) -> Color {
    match color {
        "orange" => Color::Rgb(249, 115, 22),
        "blue" => Color::Blue,
        "pink" => Color::LightMagenta,
        "yellow" => Color::Yellow,
        "emerald" => Color::LightGreen,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        _ => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::storage::MemoryStorage;
    use crate::models::transaction::TransactionDraft;
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use rust_decimal::Decimal;

    fn store_with(entries: &[(&str, i64, TransactionType, &str)]) -> TransactionStore<MemoryStorage> {
        let mut store = TransactionStore::load(MemoryStorage::new());
        for (description, amount, transaction_type, category) in entries {
            store
                .add(TransactionDraft {
                    description: description.to_string(),
                    amount: Decimal::from(*amount),
                    transaction_type: *transaction_type,
                    category: Some(category.to_string()),
                })
                .unwrap();
        }
        store
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_tab_switching() {
        let mut store = store_with(&[]);
        let mut state = DashboardState::new(0);

        assert!(!handle_key(&mut store, &mut state, press(KeyCode::Tab)).unwrap());
        assert_eq!(state.tab, Tab::Dashboard);
        handle_key(&mut store, &mut state, press(KeyCode::Char('1'))).unwrap();
        assert_eq!(state.tab, Tab::Home);
        assert!(handle_key(&mut store, &mut state, press(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn test_delete_selected_clamps_selection() {
        let mut store = store_with(&[
            ("Coffee", 3, TransactionType::Expense, "food"),
            ("Bus", 2, TransactionType::Expense, "transport"),
        ]);
        let mut state = DashboardState::new(store.transactions().len());

        handle_key(&mut store, &mut state, press(KeyCode::Down)).unwrap();
        assert_eq!(state.table_state.selected(), Some(1));

        handle_key(&mut store, &mut state, press(KeyCode::Char('d'))).unwrap();
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].description, "Bus");
        assert_eq!(state.table_state.selected(), Some(0));
        assert_eq!(state.status.as_deref(), Some("Deleted 'Coffee'"));

        handle_key(&mut store, &mut state, press(KeyCode::Delete)).unwrap();
        assert!(store.transactions().is_empty());
        assert_eq!(state.table_state.selected(), None);
    }

    #[test]
    fn test_delete_ignored_on_dashboard_tab() {
        let mut store = store_with(&[("Coffee", 3, TransactionType::Expense, "food")]);
        let mut state = DashboardState::new(1);
        state.tab = Tab::Dashboard;

        handle_key(&mut store, &mut state, press(KeyCode::Char('d'))).unwrap();
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn test_render_dashboard_tab() {
        let store = store_with(&[
            ("Pay", 200, TransactionType::Income, "salary"),
            ("Bus", 50, TransactionType::Expense, "transport"),
            ("Rice", 100, TransactionType::Expense, "food"),
        ]);
        let mut state = DashboardState::new(store.transactions().len());
        state.tab = Tab::Dashboard;

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| draw(frame, &mut state, store.transactions()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Transport"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("Try trimming \"Food\""));
        assert!(text.contains("Total"));
    }

    #[test]
    fn test_render_empty_dashboard() {
        let store = store_with(&[]);
        let mut state = DashboardState::new(0);
        state.tab = Tab::Dashboard;

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| draw(frame, &mut state, store.transactions()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("No expenses yet"));
        assert!(text.contains("Try trimming \"General\""));
    }
}
