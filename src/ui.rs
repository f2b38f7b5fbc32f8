use crate::app::{App, Command, Notice, NoticeLevel, Screen};
use crate::auth::{AuthField, AuthForm};
use crate::task_board::{TaskBoard, DELETE_PROMPT, EMPTY_STATE};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

const DRAFT_PLACEHOLDER: &str = "Enter new trading strategy or note...";

pub fn render(frame: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Auth(form) => render_auth(frame, form),
        Screen::Tasks(board) => render_board(frame, board),
    }
}

/// Maps a key press to a command for the current screen.
pub fn command_for(app: &App, key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match app.screen() {
        Screen::Auth(_) => match key.code {
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                Some(Command::NextField)
            }
            KeyCode::F(2) => Some(Command::ToggleMode),
            KeyCode::Char('t') if ctrl => Some(Command::ToggleMode),
            KeyCode::Backspace => Some(Command::Backspace),
            KeyCode::Char(c) if !ctrl => Some(Command::Input(c)),
            _ => None,
        },
        Screen::Tasks(board) if board.pending_delete().is_some() => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Command::Confirm),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        },
        Screen::Tasks(_) => match key.code {
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Up => Some(Command::SelectPrevious),
            KeyCode::Down => Some(Command::SelectNext),
            KeyCode::Delete => Some(Command::RequestDelete),
            KeyCode::Char('d') if ctrl => Some(Command::RequestDelete),
            KeyCode::F(5) => Some(Command::Reload),
            KeyCode::Char('r') if ctrl => Some(Command::Reload),
            KeyCode::Backspace => Some(Command::Backspace),
            KeyCode::Char(c) if !ctrl => Some(Command::Input(c)),
            _ => None,
        },
    }
}

fn render_auth(frame: &mut Frame, form: &AuthForm) {
    let area = centered(frame.area(), 50, 12);
    let block = Block::default()
        .title(Span::styled(
            form.mode().title(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let masked = "*".repeat(form.password().chars().count());
    frame.render_widget(
        input_field("Email", form.email(), form.focus() == AuthField::Email),
        rows[0],
    );
    frame.render_widget(
        input_field("Password", &masked, form.focus() == AuthField::Password),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(form.mode().toggle_hint(), Style::default().fg(Color::Gray)),
            Span::styled(" (Ctrl+T)", Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Center),
        rows[2],
    );
    if let Some(notice) = form.notice() {
        frame.render_widget(notice_line(notice).alignment(Alignment::Center), rows[3]);
    }
}

fn render_board(frame: &mut Frame, board: &TaskBoard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                "CRYPTODESK",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | Analyst Terminal", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[0],
    );

    let draft = if board.draft_title.is_empty() {
        Paragraph::new(Span::styled(
            DRAFT_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(board.draft_title.as_str())
    }
    .block(
        Block::default()
            .title("New entry")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(draft, chunks[1]);

    let list_block = Block::default().title("Strategies").borders(Borders::ALL);
    if board.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(EMPTY_STATE, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center)
                .block(list_block),
            chunks[2],
        );
    } else {
        let items: Vec<ListItem> = board
            .tasks
            .iter()
            .map(|t| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("ID: {} ", t.id), Style::default().fg(Color::Green)),
                    Span::styled(t.title.as_str(), Style::default().fg(Color::White)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(list_block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(board.selected));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    if let Some(notice) = board.notice() {
        frame.render_widget(notice_line(notice), chunks[3]);
    } else if let Some(synced) = board.last_synced() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Last synced {}", synced.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            )),
            chunks[3],
        );
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Enter add · ↑/↓ select · Del delete · Ctrl+R reload · Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
        chunks[4],
    );

    if let Some(id) = board.pending_delete() {
        let area = centered(frame.area(), 44, 5);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(DELETE_PROMPT),
                Line::from(Span::styled(
                    format!("ID: {id}   [y]es / [n]o"),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title("Confirm")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            ),
            area,
        );
    }
}

fn input_field<'a>(label: &'a str, value: &'a str, focused: bool) -> Paragraph<'a> {
    Paragraph::new(value).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    )
}

fn notice_line(notice: &Notice) -> Paragraph<'_> {
    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Error => Color::Red,
    };
    Paragraph::new(Span::styled(notice.text.as_str(), Style::default().fg(color)))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
