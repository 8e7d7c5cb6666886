use anyhow::Result;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, stdout, Stdout},
    time::{Duration, Instant},
};

use blockfall::{
    clock::TimerQueue,
    color::Rgb,
    game::{Game, GameEvent, Snapshot, Wake},
    grid::{CellState, GRID_HEIGHT, GRID_WIDTH},
    highscore::FileStore,
    input::Command,
    render::RenderSink,
    rotation::Shape,
};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

const HIGH_SCORE_FILE: &str = "highscore.txt";
const HIGH_SCORE_ENV: &str = "TETRIS_HIGHSCORE_FILE";

/// Without key-release events, soft drop ends once the key stops repeating.
const SOFT_DROP_RELEASE_TIMEOUT: Duration = Duration::from_millis(500);
const IDLE_POLL: Duration = Duration::from_millis(250);

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

// ============================================================================
// Rendering
// ============================================================================

struct TerminalSink {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl RenderSink for TerminalSink {
    fn draw(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.size();
            render_game(frame, snapshot, area);
        })?;
        Ok(())
    }
}

impl TerminalSink {
    fn draw_game_over(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.size();
            render_game_over(frame, snapshot, area);
        })?;
        Ok(())
    }
}

fn render_game(frame: &mut Frame, snapshot: &Snapshot<'_>, area: Rect) {
    let grid_display_width = (GRID_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let preview_width = 12;
    let info_width = 22;
    let total_width = grid_display_width + preview_width + info_width + 4;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Preview][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(preview_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, snapshot, horizontal[0]);
    render_preview(frame, snapshot, horizontal[1]);
    render_info(frame, snapshot, horizontal[2]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "A/D/←→: Move | W/↑/Space: Rotate | S/↓: Fast drop | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, snapshot: &Snapshot<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Locked cells keep their own shade; the falling piece is drawn on top
    // in its full color.
    let mut visual_grid = snapshot.grid.to_rows();
    let piece_cell = CellState::Filled(snapshot.piece.kind.color());
    for pos in snapshot.piece.blocks() {
        if let Some(cell) = usize::try_from(pos.row)
            .ok()
            .zip(usize::try_from(pos.col).ok())
            .and_then(|(row, col)| visual_grid.get_mut(row)?.get_mut(col))
        {
            *cell = piece_cell;
        }
    }

    let lines: Vec<Line> = visual_grid
        .iter()
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|cell| match cell {
                        CellState::Empty => Span::raw(EMPTY_CHAR),
                        CellState::Filled(rgb) => {
                            Span::styled(BLOCK_CHAR, Style::default().fg(to_color(*rgb)))
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn shape_lines(shape: &Shape, color: Color) -> Vec<Line<'static>> {
    shape
        .rows()
        .iter()
        .map(|row| {
            let mut spans = vec![Span::raw(" ")];
            spans.extend(row.iter().map(|solid| {
                if *solid {
                    Span::styled(BLOCK_CHAR, Style::default().fg(color))
                } else {
                    Span::raw(EMPTY_CHAR)
                }
            }));
            Line::from(spans)
        })
        .collect()
}

fn render_preview(frame: &mut Frame, snapshot: &Snapshot<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = shape_lines(&snapshot.next.shape, to_color(snapshot.next.kind.color()));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, snapshot: &Snapshot<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let best = snapshot.highscores;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", snapshot.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", snapshot.lines_cleared)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", snapshot.level)),
        Line::from(""),
        Line::from(Span::styled("This run", Style::default().fg(Color::Magenta))),
        Line::from(format!("{} in level {}", best.run.score, best.run.level)),
        Line::from(Span::styled("All time", Style::default().fg(Color::Magenta))),
        Line::from(format!("{} in level {}", best.all_time.score, best.all_time.level)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, snapshot: &Snapshot<'_>, area: Rect) {
    render_game(frame, snapshot, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", snapshot.score)),
        Line::from(format!("Lines: {}", snapshot.lines_cleared)),
        Line::from(format!("Level: {}", snapshot.level)),
        Line::from(""),
        Line::from(Span::styled(
            "R to retry, ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(28, 12, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
}

fn is_soft_drop(code: KeyCode) -> bool {
    matches!(code, KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S'))
}

fn command_for_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(Command::Rotate)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::MoveRight),
        code if is_soft_drop(code) => Some(Command::SoftDropStart),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Retry),
        _ => None,
    }
}

/// Every press feeds the cheat detector; keys without a character break
/// the sequence.
fn cheat_keystroke(code: KeyCode) -> Command {
    match code {
        KeyCode::Char(c) => Command::CheatKeystroke(c),
        _ => Command::CheatKeystroke('\0'),
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(sink: &mut TerminalSink, release_events: bool) -> Result<()> {
    let store_path = std::env::var(HIGH_SCORE_ENV).unwrap_or_else(|_| HIGH_SCORE_FILE.to_string());
    let mut game = Game::new(TimerQueue::new(), FileStore::open(store_path));
    let started = Instant::now();
    let mut last_soft_drop: Option<Instant> = None;

    sink.draw(&game.snapshot())?;

    loop {
        // Fire every timer that is due
        while let Some(handle) = game.clock_mut().poll_expired(started.elapsed()) {
            if game.on_timer(handle) == Wake::Render {
                sink.draw(&game.snapshot())?;
            }
        }

        for event in game.take_events() {
            if event == GameEvent::GameOver {
                sink.draw_game_over(&game.snapshot())?;
            }
        }

        if !release_events {
            if let Some(pressed) = last_soft_drop {
                if pressed.elapsed() >= SOFT_DROP_RELEASE_TIMEOUT {
                    game.handle(Command::SoftDropStop);
                    last_soft_drop = None;
                }
            }
        }

        let timeout = game
            .clock()
            .next_deadline()
            .map(|due| due.saturating_sub(started.elapsed()))
            .unwrap_or(IDLE_POLL);

        if !event::poll(timeout)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if is_quit(&key) {
                    break;
                }
                game.handle(cheat_keystroke(key.code));
                match command_for_key(key.code) {
                    // Retry is only offered from the game-over screen
                    Some(Command::Retry) if !game.is_game_over() => {}
                    Some(command) => game.handle(command),
                    None => {}
                }
                if is_soft_drop(key.code) {
                    last_soft_drop = Some(Instant::now());
                }
                if !game.is_game_over() {
                    sink.draw(&game.snapshot())?;
                }
            }
            KeyEventKind::Release => {
                if is_soft_drop(key.code) {
                    game.handle(Command::SoftDropStop);
                    last_soft_drop = None;
                }
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        stdout().execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(anyhow::Error::from)
        .and_then(|terminal| run(&mut TerminalSink { terminal }, release_events));

    // Restore terminal
    if release_events {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
