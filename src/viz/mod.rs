//! Terminal interface for pixtone
//!
//! Provides a TUI showing:
//! - The picture, played by moving the mouse over it
//! - What the pointer is over and the pitch it maps to
//! - The sound settings (toggled with `?`)
//! - A scope of the audio output

mod picture;
mod scope;

pub use picture::{canvas_point, Picture};
pub use scope::Scope;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::mapping::{Frequency, Scale, ToneMode, SCALE_CATALOG};
use crate::session::{InputEvent, Session};
use crate::surface::{PatternSurface, Surface};

const VOLUME_STEP_DB: f64 = 2.0;
const DELAY_STEP: f64 = 0.1;
const REVERB_STEP: f64 = 0.5;

/// Buffer for storing recent audio samples for visualization
pub struct SampleBuffer {
    samples: Vec<f32>,
    capacity: usize,
    write_pos: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: vec![0.0; capacity],
            capacity,
            write_pos: 0,
        }
    }

    /// Push a new sample into the buffer
    pub fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Get all samples in order (oldest to newest)
    pub fn get_samples(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.capacity);
        for i in 0..self.capacity {
            let idx = (self.write_pos + i) % self.capacity;
            result.push(self.samples[idx]);
        }
        result
    }
}

/// Something a key press asks for
#[derive(Debug)]
pub enum Action {
    Input(InputEvent),
    NewPattern,
    ToggleSettings,
    Quit,
}

/// Map a key press to an action, given the current session settings
pub fn key_action(key: KeyEvent, session: &Session) -> Option<Action> {
    let sound = session.sound();
    let action = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('c'), _) => Action::Input(InputEvent::SetMode(ToneMode::ByColor)),
        (KeyCode::Char('x'), _) => Action::Input(InputEvent::SetMode(ToneMode::ByCoordinate)),
        (KeyCode::Char('r'), _) => Action::Input(InputEvent::Randomize),
        (KeyCode::Char('n'), _) => Action::NewPattern,
        (KeyCode::Char('w'), _) => Action::Input(InputEvent::SetWaveform(sound.waveform.next())),
        (KeyCode::Char('s'), _) => Action::Input(InputEvent::SetScale(next_scale(session.mapping().scale.name()))),
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
            Action::Input(InputEvent::SetVolume(sound.volume_db + VOLUME_STEP_DB))
        }
        (KeyCode::Char('-'), _) => Action::Input(InputEvent::SetVolume(sound.volume_db - VOLUME_STEP_DB)),
        (KeyCode::Char(']'), _) => Action::Input(InputEvent::SetDelay(round_tenth(sound.delay + DELAY_STEP))),
        (KeyCode::Char('['), _) => Action::Input(InputEvent::SetDelay(round_tenth(sound.delay - DELAY_STEP))),
        (KeyCode::Char('}'), _) => {
            Action::Input(InputEvent::SetReverbDecay(round_tenth(sound.reverb_decay + REVERB_STEP)))
        }
        (KeyCode::Char('{'), _) => {
            Action::Input(InputEvent::SetReverbDecay(round_tenth(sound.reverb_decay - REVERB_STEP)))
        }
        (KeyCode::Char('?'), _) => Action::ToggleSettings,
        _ => return None,
    };
    Some(action)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The catalog entry after `current`, wrapping; the first one if `current` is not listed
pub fn next_scale(current: &str) -> String {
    let position = SCALE_CATALOG.iter().position(|name| {
        Scale::from_name(name)
            .map(|scale| scale.name() == current)
            .unwrap_or(false)
    });
    let next = position.map(|i| (i + 1) % SCALE_CATALOG.len()).unwrap_or(0);
    SCALE_CATALOG[next].to_string()
}

/// Tracks the pointer over the picture
///
/// Terminals only report positions, so entering and leaving the picture are
/// worked out from consecutive mouse events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    inside: bool,
}

impl PointerTracker {
    /// Input events for a mouse event at `(column, row)`
    pub fn track(&mut self, picture: Rect, column: u16, row: u16, surface: &dyn Surface) -> Vec<InputEvent> {
        let mut events = Vec::new();
        match canvas_point(picture, column, row, surface.width(), surface.height()) {
            Some((x, y)) => {
                if !self.inside {
                    self.inside = true;
                    events.push(InputEvent::PointerEnter);
                }
                events.push(InputEvent::PointerMove { x, y });
            }
            None => {
                if self.inside {
                    self.inside = false;
                    events.push(InputEvent::PointerLeave);
                }
            }
        }
        events
    }

    /// Forget the pointer; the next move inside enters again
    pub fn reset(&mut self) -> Option<InputEvent> {
        std::mem::take(&mut self.inside).then_some(InputEvent::PointerLeave)
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Visualization state
pub struct VizState {
    pub sample_buffer: Arc<Mutex<SampleBuffer>>,
    pub running: Arc<AtomicBool>,
    pub show_settings: bool,
    pub message: Option<String>,
    picture_area: Rect,
    pointer: PointerTracker,
}

impl VizState {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sample_buffer: Arc::new(Mutex::new(SampleBuffer::new(buffer_size))),
            running: Arc::new(AtomicBool::new(true)),
            show_settings: true,
            message: None,
            picture_area: Rect::default(),
            pointer: PointerTracker::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn apply(&mut self, session: &mut Session, event: InputEvent) {
        match session.handle(event) {
            Ok(_) => {}
            Err(e) => {
                warn!("input rejected: {:#}", e);
                self.message = Some(format!("{:#}", e));
            }
        }
    }

    fn on_key(&mut self, session: &mut Session, key: KeyEvent) {
        match key_action(key, session) {
            Some(Action::Quit) => self.stop(),
            Some(Action::ToggleSettings) => self.show_settings = !self.show_settings,
            Some(Action::NewPattern) => {
                let seed: u64 = rand::random();
                self.message = Some(format!("pattern {}", seed));
                let surface = Arc::new(PatternSurface::new(seed));
                self.apply(session, InputEvent::LoadSurface(surface));
            }
            Some(Action::Input(event)) => {
                self.message = None;
                self.apply(session, event);
            }
            None => {}
        }
    }

    fn on_mouse(&mut self, session: &mut Session, mouse: MouseEvent) {
        if !matches!(
            mouse.kind,
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)
        ) {
            return;
        }
        let events = self
            .pointer
            .track(self.picture_area, mouse.column, mouse.row, session.surface().as_ref());
        for event in events {
            self.apply(session, event);
        }
    }
}

/// Run the interactive TUI until the user quits
pub fn run_viz(session: &mut Session, state: &mut VizState) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, session, state);

    // Cleanup
    if let Some(leave) = state.pointer.reset() {
        state.apply(session, leave);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut Session,
    state: &mut VizState,
) -> Result<()> {
    while state.is_running() {
        // Draw UI
        terminal.draw(|f| {
            let picture_area = draw_ui(f, session, state);
            state.picture_area = picture_area;
        })?;

        // Handle input
        if event::poll(Duration::from_millis(30))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => state.on_key(session, key),
                Event::Mouse(mouse) => state.on_mouse(session, mouse),
                Event::FocusLost => {
                    if let Some(leave) = state.pointer.reset() {
                        state.apply(session, leave);
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Draw everything; returns the area the picture occupies
fn draw_ui(f: &mut Frame, session: &Session, state: &VizState) -> Rect {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),     // Picture
            Constraint::Length(7),  // Readout, settings, scope
            Constraint::Length(3),  // Status
        ])
        .split(area);

    let picture_area = draw_picture(f, chunks[0], session);

    let panels = if state.show_settings {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Percentage(35),
            ])
            .split(chunks[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Length(0), Constraint::Percentage(50)])
            .split(chunks[1])
    };

    draw_readout(f, panels[0], session);
    if state.show_settings {
        draw_settings(f, panels[1], session);
    }
    draw_scope(f, panels[2], state);
    draw_status(f, chunks[2], session, state);

    picture_area
}

fn draw_picture(f: &mut Frame, area: Rect, session: &Session) -> Rect {
    let block = Block::default().borders(Borders::ALL).title(" pixtone ");
    let inner = block.inner(area);
    let cursor = session.readout().map(|readout| (readout.x, readout.y));

    let picture = Picture::new(session.surface().as_ref()).cursor(cursor).block(block);
    f.render_widget(picture, area);
    inner
}

fn draw_readout(f: &mut Frame, area: Rect, session: &Session) {
    let mode = session.mapping().mode;
    let lines = match session.readout() {
        Some(readout) => {
            let swatch = Color::Rgb(readout.rgb.r, readout.rgb.g, readout.rgb.b);
            let pitch = match (&readout.frequency, &readout.pitch) {
                (Frequency::Hz(hz), Some(name)) => format!("{:.1} Hz ({})", hz, name),
                (Frequency::Hz(hz), None) => format!("{:.1} Hz", hz),
                (Frequency::Unresolved, Some(name)) => format!("{} unresolved", name),
                (Frequency::Unresolved, None) => "unresolved".to_string(),
            };
            vec![
                Line::from(vec![
                    Span::styled("    ", Style::default().bg(swatch)),
                    Span::raw(format!(" {}  rgb{}", readout.hex(), readout.rgb)),
                ]),
                Line::from(format!(" x {}  y {}", readout.x, readout.y)),
                Line::from(format!(" {} mode", mode.label())),
                Line::from(Span::styled(format!(" {}", pitch), Style::default().add_modifier(Modifier::BOLD))),
            ]
        }
        None => vec![
            Line::from(" move the mouse over the picture"),
            Line::from(""),
            Line::from(format!(" {} mode", mode.label())),
        ],
    };

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Readout "));
    f.render_widget(paragraph, area);
}

fn draw_settings(f: &mut Frame, area: Rect, session: &Session) {
    let sound = session.sound();
    let lines = vec![
        Line::from(format!(" scale    {}", session.mapping().scale.name())),
        Line::from(format!(" wave     {}", sound.waveform)),
        Line::from(format!(" volume   {:.0} dB", sound.volume_db)),
        Line::from(format!(" delay    {:.1}", sound.delay)),
        Line::from(format!(" reverb   {:.1} s", sound.reverb_decay)),
    ];

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Settings "));
    f.render_widget(paragraph, area);
}

fn draw_scope(f: &mut Frame, area: Rect, state: &VizState) {
    let samples = state
        .sample_buffer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_samples();

    let scope = Scope::new(&samples)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Output "));

    f.render_widget(scope, area);
}

fn draw_status(f: &mut Frame, area: Rect, session: &Session, state: &VizState) {
    let (status, status_color) = if session.is_interaction_blocked() {
        ("PLAYING TONES", Color::Magenta)
    } else if session.is_playing_sequence() {
        ("SEQUENCE", Color::Yellow)
    } else if session.has_tone() {
        ("TONE", Color::Green)
    } else {
        ("IDLE", Color::DarkGray)
    };

    let mut spans = vec![
        Span::raw("  "),
        Span::styled(status, Style::default().fg(status_color).add_modifier(Modifier::BOLD)),
        Span::raw("  |  "),
    ];
    match &state.message {
        Some(message) => spans.push(Span::styled(message.clone(), Style::default().fg(Color::Red))),
        None => spans.push(Span::raw(
            "c/x mode  r random  n new  w wave  s scale  +/- vol  [/] delay  {/} reverb  ? settings  q quit",
        )),
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
