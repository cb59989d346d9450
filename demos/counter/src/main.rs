//! Counter - Minimal act-dispatch example
//!
//! - State: a single number
//! - Action creators: allocated by a registry, bound to the store
//! - Reducer: handlers keyed by creator
//! - Store: state + reducer + action logger middleware
//! - Main loop: key -> creator call -> render
//!
//! Keys: k/Up = +1, j/Down = -1, t = +10 (one batch), r = reset, q = quit

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use act_dispatch::loggers::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
use act_dispatch::prelude::*;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Flex, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tracing_subscriber::EnvFilter;

/// Counter TUI - act-dispatch example
#[derive(Parser, Debug)]
#[command(name = "counter")]
#[command(about = "A counter TUI demonstrating act-dispatch creators and batches")]
struct Args {
    /// Write tracing output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Only record actions whose type matches these comma-separated globs
    #[arg(long)]
    include: Option<String>,

    /// Number of actions kept in the on-screen log
    #[arg(long, default_value = "8")]
    history: usize,
}

// ============================================================================
// Actions - What can happen
// ============================================================================

#[derive(ActionSet)]
struct CounterActions {
    increment: ActionCreator<()>,
    decrement: ActionCreator<()>,
    reset: ActionCreator<()>,
    batch: ActionCreator<Vec<Action>>,
}

impl CounterActions {
    fn new(registry: &Registry) -> Result<Self> {
        Ok(Self {
            increment: registry.create_action("increment")?,
            decrement: registry.create_action("decrement")?,
            reset: registry.create_action("RESET")?,
            batch: registry.batch(),
        })
    }
}

// ============================================================================
// Reducer - How state changes
// ============================================================================

fn counter_reducer(actions: &CounterActions) -> Reducer<i64> {
    let reducer = Reducer::new(0);
    reducer
        .on(&actions.increment, |state, _, _| state + 1)
        .on(&actions.decrement, |state, _, _| state - 1)
        .on(&actions.reset, |_, _, _| 0);
    reducer
}

// ============================================================================
// Main - Setup terminal, run event loop, cleanup
// ============================================================================

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let registry = Registry::new();
    let actions = CounterActions::new(&registry).map_err(io::Error::other)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &args, &actions);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_tracing(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Rows for the action log, one per entry plus two for the frame.
fn history_height(history: usize) -> u16 {
    u16::try_from(history)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
    actions: &CounterActions,
) -> io::Result<()> {
    let filter = ActionLoggerConfig::new(args.include.as_deref(), None);
    let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::new(args.history, filter));
    let store = Store::with_middleware(0, counter_reducer(actions), middleware);
    let actions = bind_all(actions, &store);

    let mut should_render = true;

    loop {
        if should_render {
            terminal.draw(|frame| {
                let area = frame.area();

                let [_, center, _] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(5),
                    Constraint::Fill(1),
                ])
                .areas(area);

                let [_, center, _] = Layout::horizontal([
                    Constraint::Fill(1),
                    Constraint::Length(30),
                    Constraint::Fill(1),
                ])
                .flex(Flex::Center)
                .areas(center);

                let block = Block::default()
                    .title(" Counter ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan));
                let paragraph = Paragraph::new(store.state().to_string())
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(paragraph, center);

                let [_, history_area, help_area] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(history_height(args.history)),
                    Constraint::Length(1),
                ])
                .areas(area);

                let lines: Vec<Line> = store.with_middleware_ref(|m| {
                    m.log()
                        .map(|log| {
                            log.recent(args.history)
                                .map(|entry| {
                                    let marker = if entry.batch.is_some() { "+" } else { " " };
                                    Line::from(format!(
                                        "{marker} #{:<4} {}",
                                        entry.sequence, entry.action_type
                                    ))
                                })
                                .collect()
                        })
                        .unwrap_or_default()
                });
                let history = Paragraph::new(lines)
                    .block(Block::default().title(" Actions ").borders(Borders::TOP))
                    .style(Style::default().fg(Color::Gray));
                frame.render_widget(history, history_area);

                let help = Paragraph::new("k/Up: +1  j/Down: -1  t: +10  r: reset  q: quit")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(help, help_area);
            })?;
            should_render = false;
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('k') | KeyCode::Up => {
                actions.increment.call(());
            }
            KeyCode::Char('j') | KeyCode::Down => {
                actions.decrement.call(());
            }
            KeyCode::Char('t') => {
                let ten = (0..10).map(|_| actions.increment.raw(())).collect();
                actions.batch.call(ten);
            }
            KeyCode::Char('r') => {
                actions.reset.call(());
            }
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => continue,
        }
        tracing::debug!(count = store.state(), "state updated");
        should_render = true;
    }

    Ok(())
}
