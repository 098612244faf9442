//! Terminal host for the edit-script modal.
//!
//! Draws the session as a centered modal: spinner while loading, the blocking
//! message on a load error, otherwise the editor with help text and a
//! Cancel/Save footer. The event loop pumps the session every tick so request
//! results land on this thread.

mod host;

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthChar;

use scriptedit_client::ScriptsApi;
use scriptedit_config::Settings;
use scriptedit_session::{
    CloseReason, FlashLevel, ScriptEditSession, ScriptRef, SessionProps, SessionStatus,
    HELP_TEXT, LOAD_ERROR_MESSAGE,
};

pub use host::{FlashLine, TerminalHost};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const MODAL_MAX_WIDTH: u16 = 100;

/// Editor behavior taken from settings.
#[derive(Debug, Clone)]
pub struct EditOptions {
    pub tab_width: usize,
    pub show_help_text: bool,
    pub refetch_after_save: bool,
    pub poll_interval: Duration,
}

impl EditOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tab_width: settings.tab_width.max(1),
            show_help_text: settings.show_help_text,
            refetch_after_save: settings.refetch_after_save,
            poll_interval: settings.poll_interval(),
        }
    }
}

/// How the modal closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Saved; carries the success notification.
    Saved(String),
    Cancelled,
    /// Closed from the load error screen; carries the reason.
    LoadFailed(String),
}

type TerminalSession = ScriptEditSession<TerminalHost, FlashLine>;

/// Screen regions for one frame.
struct ModalLayout {
    modal: Rect,
    body: Rect,
    help: Option<Rect>,
    footer: Rect,
    flash: Rect,
}

struct EditApp {
    session: TerminalSession,
    options: EditOptions,
    spinner: usize,
}

impl EditApp {
    fn new(session: TerminalSession, options: EditOptions) -> Self {
        Self { session, options, spinner: 0 }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return self.session.cancel(),
            KeyCode::Char('c') if ctrl => return self.session.cancel(),
            KeyCode::Char('s') if ctrl => {
                if let Err(e) = self.session.save() {
                    log::debug!("save ignored: {}", e);
                }
                return;
            }
            _ => {}
        }

        let page = self.page_rows();
        let tab_width = self.options.tab_width;
        let Ok(buf) = self.session.buffer_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char(c) if !ctrl => buf.insert_char(c),
            KeyCode::Enter => buf.insert_char('\n'),
            KeyCode::Tab => buf.insert_tab(tab_width),
            KeyCode::Backspace => buf.backspace(),
            KeyCode::Delete => buf.delete(),
            KeyCode::Left => buf.cursor_left(),
            KeyCode::Right => buf.cursor_right(),
            KeyCode::Up => buf.cursor_up(),
            KeyCode::Down => buf.cursor_down(),
            KeyCode::Home if ctrl => buf.cursor_buffer_home(),
            KeyCode::End if ctrl => buf.cursor_buffer_end(),
            KeyCode::Home => buf.cursor_home(),
            KeyCode::End => buf.cursor_end(),
            KeyCode::PageUp => buf.page_up(page),
            KeyCode::PageDown => buf.page_down(page),
            _ => {}
        }
    }

    fn tick(&mut self) {
        self.spinner = (self.spinner + 1) % SPINNER.len();
    }

    /// Rows moved by PgUp/PgDn, from the current terminal size.
    fn page_rows(&self) -> usize {
        terminal::size()
            .map(|(w, h)| self.layout(Rect::new(0, 0, w, h)).body.height as usize)
            .unwrap_or(10)
            .max(1)
    }

    fn layout(&self, area: Rect) -> ModalLayout {
        let [main, flash] =
            Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).areas(area);

        let width = main.width.saturating_sub(4).min(MODAL_MAX_WIDTH).max(main.width.min(20));
        let height = main.height.saturating_sub(2).max(main.height.min(5));
        let modal = Rect::new(
            main.x + (main.width - width) / 2,
            main.y + (main.height - height) / 2,
            width,
            height,
        );

        let inner = Block::default().borders(Borders::ALL).inner(modal);
        let help_rows = if self.shows_help() {
            help_height(HELP_TEXT, inner.width)
        } else {
            0
        };

        let [body, help, footer] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(help_rows),
            Constraint::Length(1),
        ])
        .areas(inner);

        ModalLayout {
            modal,
            body,
            help: (help_rows > 0).then_some(help),
            footer,
            flash,
        }
    }

    fn shows_help(&self) -> bool {
        self.options.show_help_text
            && matches!(self.session.status(), SessionStatus::Ready | SessionStatus::Submitting)
    }

    /// Keep the cursor line inside the editor viewport.
    fn scroll_to_cursor(&mut self, area: Rect) {
        let rows = self.layout(area).body.height as usize;
        if let Ok(buf) = self.session.buffer_mut() {
            buf.ensure_cursor_visible(rows);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = self.layout(area);

        if !self.session.is_hidden() {
            let title = format!(" {} ", self.session.script().name);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title)
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

            frame.render_widget(Clear, layout.modal);
            frame.render_widget(block, layout.modal);

            match self.session.status() {
                SessionStatus::Loading => self.draw_loading(frame, layout.body),
                SessionStatus::LoadError => self.draw_load_error(frame, layout.body),
                SessionStatus::Ready | SessionStatus::Submitting => {
                    self.draw_editor(frame, layout.body)
                }
            }

            if let Some(help) = layout.help {
                let para = Paragraph::new(HELP_TEXT)
                    .style(Style::default().fg(Color::DarkGray))
                    .wrap(Wrap { trim: true });
                frame.render_widget(para, help);
            }

            self.draw_footer(frame, layout.footer);
        }

        self.draw_flash(frame, layout.flash);
    }

    fn draw_loading(&self, frame: &mut Frame, area: Rect) {
        let text = format!("{} Loading script...", SPINNER[self.spinner]);
        let para = Paragraph::new(text).style(Style::default().fg(Color::Gray));
        frame.render_widget(para, area);
    }

    fn draw_load_error(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            LOAD_ERROR_MESSAGE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))];
        if let Some(reason) = self.session.load_error() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(reason, Style::default().fg(Color::DarkGray))));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect) {
        let buf = self.session.buffer();
        let text = buf.text();
        let line_count = buf.line_count();
        let gutter = gutter_width(line_count);
        let first = buf.scroll_offset();
        let tab_width = self.options.tab_width;
        let submitting = self.session.status() == SessionStatus::Submitting;

        let text_style = if submitting {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let lines: Vec<Line> = text
            .split('\n')
            .enumerate()
            .skip(first)
            .take(area.height as usize)
            .map(|(i, line)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>w$} ", i + 1, w = gutter - 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(expand_line(line, tab_width), text_style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);

        if !submitting {
            let (line, _) = buf.cursor_line_col();
            let x = gutter + display_width(buf.cursor_line_prefix(), tab_width);
            let y = line.saturating_sub(first);
            if y < area.height as usize {
                let x = (area.x as usize + x).min(area.right().saturating_sub(1) as usize);
                frame.set_cursor_position((x as u16, area.y + y as u16));
            }
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let status = self.session.status();
        let key = Style::default().fg(Color::Black).bg(Color::Gray);
        let disabled = Style::default().fg(Color::DarkGray);

        let save = match status {
            SessionStatus::Submitting => Span::styled(" Saving... ", disabled.add_modifier(Modifier::ITALIC)),
            SessionStatus::Ready => Span::styled(" Ctrl+S Save ", Style::default().fg(Color::Black).bg(Color::Cyan)),
            SessionStatus::Loading | SessionStatus::LoadError => Span::styled(" Ctrl+S Save ", disabled),
        };
        let right = vec![Span::styled(" Esc Cancel ", key), Span::raw(" "), save];

        let left = match status {
            SessionStatus::Ready | SessionStatus::Submitting => {
                let buf = self.session.buffer();
                let (line, _) = buf.cursor_line_col();
                let col = display_width(buf.cursor_line_prefix(), self.options.tab_width);
                let dirty = if self.session.is_dirty() { " [modified]" } else { "" };
                format!("Ln {}, Col {}{}", line + 1, col + 1, dirty)
            }
            _ => String::new(),
        };

        let right_width: usize = right.iter().map(|s| s.width()).sum();
        let padding = (area.width as usize).saturating_sub(left.chars().count() + right_width);

        let mut spans = vec![
            Span::styled(left, Style::default().fg(Color::Gray)),
            Span::raw(" ".repeat(padding)),
        ];
        spans.extend(right);
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_flash(&self, frame: &mut Frame, area: Rect) {
        let Some(flash) = self.session.notifier().visible(Instant::now()) else {
            return;
        };
        let style = match flash.level {
            FlashLevel::Success => Style::default().fg(Color::Black).bg(Color::Green),
            FlashLevel::Error => Style::default().fg(Color::White).bg(Color::Red),
        };
        let para = Paragraph::new(format!(" {} ", flash.message)).style(style);
        frame.render_widget(para, area);
    }

    fn outcome(&self) -> EditOutcome {
        match (self.session.close_reason(), self.session.status()) {
            (Some(CloseReason::Saved), _) => EditOutcome::Saved(
                self.session.notifier().last().map(|f| f.message.clone()).unwrap_or_default(),
            ),
            (_, SessionStatus::LoadError) => EditOutcome::LoadFailed(
                self.session.load_error().unwrap_or(LOAD_ERROR_MESSAGE).to_string(),
            ),
            _ => EditOutcome::Cancelled,
        }
    }
}

fn gutter_width(line_count: usize) -> usize {
    line_count.to_string().len().max(3) + 1
}

/// Rows the help text needs at `width`, capped so the editor keeps its space.
fn help_height(text: &str, width: u16) -> u16 {
    let width = (width as usize).max(1);
    let chars = text.chars().count();
    (chars.div_ceil(width) as u16 + 1).min(4)
}

/// Display form of one line: tabs expanded, carriage returns dropped.
fn expand_line(line: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let fill = tab_width - (col % tab_width);
                out.extend(std::iter::repeat(' ').take(fill));
                col += fill;
            }
            '\r' => {}
            c => {
                out.push(c);
                col += c.width().unwrap_or(0);
            }
        }
    }
    out
}

/// Terminal columns taken by `prefix` once rendered with `expand_line`.
fn display_width(prefix: &str, tab_width: usize) -> usize {
    prefix.chars().fold(0, |col, c| match c {
        '\t' => col + tab_width - (col % tab_width),
        '\r' => col,
        c => col + c.width().unwrap_or(0),
    })
}

/// Open the edit modal for `script` and run it until the session closes.
pub fn run_edit(
    api: Arc<dyn ScriptsApi>,
    script: ScriptRef,
    options: EditOptions,
) -> Result<EditOutcome, String> {
    let mut session = ScriptEditSession::open(
        SessionProps::new(script),
        api,
        TerminalHost::default(),
        FlashLine::default(),
    );
    session.set_refetch_after_save(options.refetch_after_save);
    run_app(EditApp::new(session, options))
}

fn run_app(mut app: EditApp) -> Result<EditOutcome, String> {
    terminal::enable_raw_mode()
        .map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    let poll_interval = app.options.poll_interval;
    loop {
        app.session.pump();
        if app.session.host().closed {
            break;
        }

        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        app.scroll_to_cursor(term_size);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(poll_interval)
            .map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                app.handle_key(key);
            }
        }
        app.tick();
    }

    Ok(app.outcome())
}
