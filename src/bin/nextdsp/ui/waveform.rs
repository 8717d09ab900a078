//! Output oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Find a rising zero crossing in the first half so the trace holds still on
/// periodic signals.
fn trigger_point(samples: &[f32]) -> usize {
    samples[..samples.len() / 2]
        .windows(2)
        .position(|pair| pair[0] <= 0.0 && pair[1] > 0.0)
        .unwrap_or(0)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let start = trigger_point(audio_buffer);
    let window = &audio_buffer[start..];
    let peak = window.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));

    let data: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let block = Block::default()
        .title(format!(" Scope  peak {peak:.2} "))
        .borders(Borders::ALL);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, window.len().max(1) as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
