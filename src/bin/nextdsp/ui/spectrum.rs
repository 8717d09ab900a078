//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the scope window, folded into log-spaced bands from
//! 20 Hz to 20 kHz. Each band shows its strongest FFT bin, with a falling
//! peak so transients stay visible for a few frames.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const BANDS: usize = 64;
const FLOOR_DB: f64 = -100.0;
/// Per-frame fall of the displayed level, in dB
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin range `[lo, hi)` per band
    bands: Vec<(usize, usize)>,
    /// (log10 of band centre in Hz, level in dB)
    levels: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window = (0..size)
            .map(|i| {
                let phase = std::f32::consts::TAU * i as f32 / size as f32;
                0.5 - 0.5 * phase.cos()
            })
            .collect();

        let half = (size / 2).max(2);
        let bin_hz = sample_rate as f64 / size as f64;
        let top = (sample_rate as f64 / 2.0).min(20_000.0);
        let ratio = top / 20.0;

        let mut bands = Vec::with_capacity(BANDS);
        let mut levels = Vec::with_capacity(BANDS);
        for band in 0..BANDS {
            let lo_hz = 20.0 * ratio.powf(band as f64 / BANDS as f64);
            let hi_hz = 20.0 * ratio.powf((band + 1) as f64 / BANDS as f64);
            let lo = ((lo_hz / bin_hz).floor() as usize).clamp(1, half - 1);
            let hi = ((hi_hz / bin_hz).ceil() as usize).clamp(lo + 1, half);
            bands.push((lo, hi));
            levels.push(((lo_hz * hi_hz).sqrt().log10(), FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            bands,
            levels,
        }
    }

    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Hann window coherent gain is 0.5; normalise so a full-scale sine
        // reads close to 0 dB
        let norm = 2.0 / (0.5 * self.window.len() as f32);
        for (&(lo, hi), (_, level)) in self.bands.iter().zip(self.levels.iter_mut()) {
            let power = self.scratch[lo..hi]
                .iter()
                .map(|c| (c.norm() * norm).powi(2))
                .fold(0.0f32, f32::max) as f64;
            let db = (10.0 * power.max(1e-12).log10()).max(FLOOR_DB);
            *level = db.max(*level - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.levels
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(" Spectrum ").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([20.0f64.log10(), 20_000.0f64.log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 6.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
