//! Terminal control panel for nextdsp
//!
//! Lists every parameter of the chain, lets the user nudge them through the
//! parameter bridge, plays notes from the computer keyboard and shows the
//! output as a scope and a spectrum.

mod params;
mod spectrum;
mod waveform;

use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

use next_dsp::{io::midi::MidiEvent, ParameterSet};

use crate::app::AudioEngine;
use params::{render_params, ParamRow};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Scope / FFT window length
const VIS_BUFFER_SIZE: usize = 2_048;

/// Slider step for continuous parameters, in normalised units
const NUDGE: f32 = 0.01;
const COARSE_NUDGE: f32 = 0.05;

/// Computer keyboard as a piano: bottom row white keys, row above black keys.
const NOTE_KEYS: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

pub struct UiApp {
    engine: AudioEngine,
    rows: Vec<ParamRow>,
    selected: usize,
    octave: i8,
    /// Latched notes, so a second press releases
    held: [bool; 128],
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(engine: AudioEngine) -> Self {
        let rows = engine
            .params
            .iter()
            .flat_map(|(kind, params)| {
                (0..params.len()).map(move |index| ParamRow {
                    kind: *kind,
                    params: Arc::clone(params),
                    index,
                })
            })
            .collect();
        let spectrum = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, engine.sample_rate);

        Self {
            engine,
            rows,
            selected: 0,
            octave: 4,
            held: [false; 128],
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(MidiEvent::control_change(MidiEvent::ALL_SOUND_OFF, 0));
        Ok(())
    }

    /// Drain the scope queue into a sliding window.
    fn poll_audio(&mut self) {
        let available = self.engine.scope_rx.slots();
        if available == 0 {
            return;
        }

        let keep = available.min(VIS_BUFFER_SIZE);
        let skip = available - keep;
        for _ in 0..skip {
            let _ = self.engine.scope_rx.pop();
        }

        self.audio_buffer.rotate_left(keep);
        let tail = VIS_BUFFER_SIZE - keep;
        for slot in self.audio_buffer[tail..].iter_mut() {
            *slot = self.engine.scope_rx.pop().unwrap_or(0.0);
        }

        self.spectrum.update(&self.audio_buffer);
    }

    fn send(&mut self, event: MidiEvent) {
        if self.engine.midi_tx.push(event).is_err() {
            tracing::warn!(?event, "MIDI queue full, event dropped");
        }
    }

    fn selected_row(&self) -> &ParamRow {
        &self.rows[self.selected]
    }

    fn nudge(&mut self, steps: f32) {
        let row = self.selected_row();
        let params = &row.params;
        let Some(descriptor) = params.descriptor(row.index) else {
            return;
        };

        if descriptor.is_choice() {
            params.publish_index(row.index, params.snapshot(row.index) + steps.signum());
        } else {
            let position = params.normalized(row.index) + steps;
            params.publish_normalized(row.index, position);
        }
    }

    fn reset_selected(&mut self) {
        let row = self.selected_row();
        if let Some(descriptor) = row.params.descriptor(row.index) {
            row.params.publish_index(row.index, descriptor.default);
        }
    }

    fn toggle_bypass(&mut self) {
        let params: &Arc<ParameterSet> = &self.selected_row().params;
        params.set_enabled(!params.is_enabled());
    }

    fn toggle_note(&mut self, semitone: u8) {
        let note = (self.octave as i16 + 1) * 12 + semitone as i16;
        let Ok(note) = u8::try_from(note) else {
            return;
        };
        if note > 127 {
            return;
        }

        let event = if self.held[note as usize] {
            MidiEvent::note_off(note)
        } else {
            MidiEvent::note_on(note, 100)
        };
        self.held[note as usize] = !self.held[note as usize];
        self.send(event);
    }

    fn release_all(&mut self, controller: u8) {
        self.held = [false; 128];
        self.send(MidiEvent::control_change(controller, 0));
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(self.rows.len().saturating_sub(1)),
            KeyCode::Left => self.nudge(-NUDGE),
            KeyCode::Right => self.nudge(NUDGE),
            KeyCode::PageDown => self.nudge(-COARSE_NUDGE),
            KeyCode::PageUp => self.nudge(COARSE_NUDGE),
            KeyCode::Char('r') => self.reset_selected(),
            KeyCode::Char('R') => self.selected_row().params.reset_to_defaults(),
            KeyCode::Char('b') => self.toggle_bypass(),
            KeyCode::Char('z') => self.octave = (self.octave - 1).max(0),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(8),
            KeyCode::Char(' ') => self.release_all(MidiEvent::ALL_NOTES_OFF),
            KeyCode::Char('p') => self.release_all(MidiEvent::ALL_SOUND_OFF),
            KeyCode::Char(c) => {
                if let Some(&(_, semitone)) = NOTE_KEYS.iter().find(|(k, _)| *k == c) {
                    self.toggle_note(semitone);
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(20)])
            .split(rows[0]);

        render_params(frame, columns[0], &self.rows, self.selected);

        let scopes = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);
        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.spectrum.data());

        let held = self.held.iter().filter(|&&h| h).count();
        let help = Paragraph::new(format!(
            " [↑↓] select [←→/PgUp/PgDn] adjust [r/R] default param/node [b] bypass  \
             [a-k] notes (oct {}, {} held) [z/x] octave [space] release [p] panic [q] quit",
            self.octave, held
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[1]);
    }
}

