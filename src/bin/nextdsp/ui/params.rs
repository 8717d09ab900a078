//! Parameter list widget

use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use next_dsp::{NodeKind, ParameterSet};

/// One line of the panel: a parameter slot in one node's set.
pub struct ParamRow {
    pub kind: NodeKind,
    pub params: Arc<ParameterSet>,
    pub index: usize,
}

fn kind_colour(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Synth => Color::Cyan,
        NodeKind::Filter => Color::Yellow,
        NodeKind::Phaser => Color::Magenta,
    }
}

/// Ten-cell bar for the normalised slider position.
fn meter(position: f32) -> String {
    let filled = (position.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(10 - filled))
}

pub fn render_params(frame: &mut Frame, area: Rect, rows: &[ParamRow], selected: usize) {
    let table_rows = rows.iter().enumerate().map(|(i, row)| {
        let Some(descriptor) = row.params.descriptor(row.index) else {
            return Row::new(vec![String::new()]);
        };

        let value = row.params.snapshot(row.index);
        let kind = if row.params.is_enabled() {
            row.kind.to_string()
        } else {
            format!("{} (off)", row.kind)
        };

        let mut style = Style::default().fg(kind_colour(row.kind));
        if i == selected {
            style = style.add_modifier(Modifier::REVERSED);
        }

        Row::new(vec![
            kind,
            descriptor.name.to_string(),
            descriptor.to_text(value),
            meter(row.params.normalized(row.index)),
        ])
        .style(style)
    });

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .block(Block::default().title(" Parameters ").borders(Borders::ALL));

    frame.render_widget(table, area);
}
