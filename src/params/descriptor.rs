use crate::{
    error::{Error, Result},
    params::range::ParamRange,
};

/// Display unit for continuous parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Hertz,
    /// The range minimum reads as `-inf dB`.
    Decibels,
    Seconds,
    Semitones,
    Percent,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Continuous { unit: Unit },
    /// Discrete choice stored as a whole-numbered index into `labels`.
    Choice { labels: &'static [&'static str] },
}

/// Static description of one parameter: identity, range, default, display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub range: ParamRange,
    pub default: f32,
    pub kind: ParamKind,
}

impl ParamDescriptor {
    pub fn continuous(
        id: &'static str,
        name: &'static str,
        range: ParamRange,
        default: f32,
        unit: Unit,
    ) -> Self {
        Self {
            id,
            name,
            range,
            default,
            kind: ParamKind::Continuous { unit },
        }
    }

    pub fn choice(
        id: &'static str,
        name: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            id,
            name,
            range: ParamRange::linear(0.0, labels.len().saturating_sub(1) as f32),
            default: default as f32,
            kind: ParamKind::Choice { labels },
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, ParamKind::Choice { .. })
    }

    /// Bring a raw value into the storable domain: `NaN` becomes the
    /// default, everything else is clamped, choices snap to an index.
    pub fn sanitize(&self, raw: f32) -> f32 {
        if raw.is_nan() {
            return self.default;
        }

        let value = self.range.clamp(raw);
        if self.is_choice() {
            value.round()
        } else {
            value
        }
    }

    pub fn to_text(&self, value: f32) -> String {
        let value = self.sanitize(value);

        match self.kind {
            ParamKind::Choice { labels } => labels
                .get(value as usize)
                .map(|label| label.to_string())
                .unwrap_or_default(),
            ParamKind::Continuous { unit } => match unit {
                Unit::Hertz if value >= 1_000.0 => format!("{:.2} kHz", value / 1_000.0),
                Unit::Hertz => format!("{value:.1} Hz"),
                Unit::Decibels if value <= self.range.min => "-inf dB".to_string(),
                Unit::Decibels => format!("{value:.1} dB"),
                Unit::Seconds if value < 1.0 => format!("{:.0} ms", value * 1_000.0),
                Unit::Seconds => format!("{value:.2} s"),
                Unit::Semitones => format!("{value:+.2} st"),
                Unit::Percent => format!("{:.0}%", value * 100.0),
                Unit::Plain => format!("{value:.3}"),
            },
        }
    }

    /// Parse user text. Accepts unit suffixes (`"2.5 kHz"`, `"120 ms"`,
    /// `"50%"`), choice labels in any case, or a choice index. The result is
    /// clamped into range.
    pub fn from_text(&self, text: &str) -> Result<f32> {
        let text = text.trim();
        let unparsable = || Error::UnparsableValue {
            id: self.id.to_string(),
            text: text.to_string(),
        };

        match self.kind {
            ParamKind::Choice { labels } => {
                if let Some(index) = labels.iter().position(|l| l.eq_ignore_ascii_case(text)) {
                    return Ok(index as f32);
                }
                let index: usize = text.parse().map_err(|_| unparsable())?;
                Ok(self.sanitize(index as f32))
            }
            ParamKind::Continuous { unit } => {
                if unit == Unit::Decibels && text.to_ascii_lowercase().starts_with("-inf") {
                    return Ok(self.range.min);
                }

                let (number, suffix) = split_number(text).ok_or_else(unparsable)?;
                let suffix = suffix.to_ascii_lowercase();
                let scale = match (unit, suffix.as_str()) {
                    (_, "") => 1.0,
                    (Unit::Hertz, "hz") => 1.0,
                    (Unit::Hertz, "k" | "khz") => 1_000.0,
                    (Unit::Decibels, "db") => 1.0,
                    (Unit::Seconds, "s" | "sec") => 1.0,
                    (Unit::Seconds, "ms") => 0.001,
                    (Unit::Semitones, "st" | "semi" | "semitones") => 1.0,
                    (Unit::Percent, "%") => 0.01,
                    _ => return Err(unparsable()),
                };

                Ok(self.sanitize(number * scale))
            }
        }
    }
}

/// Split `"2.5 kHz"` into `(2.5, "kHz")`.
fn split_number(text: &str) -> Option<(f32, &str)> {
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(text.len(), |(i, _)| i);

    let number = text[..end].parse::<f32>().ok()?;
    Some((number, text[end..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frequency() -> ParamDescriptor {
        ParamDescriptor::continuous(
            "frequency",
            "Frequency",
            ParamRange::with_centre(20.0, 20_000.0, 1_000.0),
            1_000.0,
            Unit::Hertz,
        )
    }

    const SLOPES: &[&str] = &["12 dB/oct", "24 dB/oct", "36 dB/oct", "48 dB/oct"];

    #[test]
    fn sanitize_clamps_rounds_and_replaces_nan() {
        let slope = ParamDescriptor::choice("slope", "Slope", SLOPES, 1);
        assert_eq!(slope.sanitize(2.4), 2.0);
        assert_eq!(slope.sanitize(9.0), 3.0);
        assert_eq!(slope.sanitize(f32::NAN), 1.0);

        let freq = frequency();
        assert_eq!(freq.sanitize(5.0), 20.0);
        assert_eq!(freq.sanitize(f32::INFINITY), 20_000.0);
    }

    #[test]
    fn hertz_text() {
        let freq = frequency();
        assert_eq!(freq.to_text(440.0), "440.0 Hz");
        assert_eq!(freq.to_text(2_500.0), "2.50 kHz");
        assert_relative_eq!(freq.from_text("2.5 kHz").unwrap(), 2_500.0);
        assert_relative_eq!(freq.from_text("440hz").unwrap(), 440.0);
        assert_relative_eq!(freq.from_text("  800 ").unwrap(), 800.0);
        assert_eq!(freq.from_text("99999").unwrap(), 20_000.0);
    }

    #[test]
    fn seconds_and_percent_text() {
        let attack = ParamDescriptor::continuous(
            "attack",
            "Attack",
            ParamRange::linear(0.001, 5.0),
            0.01,
            Unit::Seconds,
        );
        assert_eq!(attack.to_text(0.12), "120 ms");
        assert_eq!(attack.to_text(1.5), "1.50 s");
        assert_relative_eq!(attack.from_text("120 ms").unwrap(), 0.12);

        let mix = ParamDescriptor::continuous("mix", "Mix", ParamRange::linear(0.0, 1.0), 0.5, Unit::Percent);
        assert_eq!(mix.to_text(0.25), "25%");
        assert_relative_eq!(mix.from_text("50%").unwrap(), 0.5);
    }

    #[test]
    fn decibel_floor_reads_as_silence() {
        let level = ParamDescriptor::continuous(
            "level",
            "Level",
            ParamRange::linear(-60.0, 6.0),
            -6.0,
            Unit::Decibels,
        );
        assert_eq!(level.to_text(-60.0), "-inf dB");
        assert_eq!(level.to_text(-6.0), "-6.0 dB");
        assert_eq!(level.from_text("-inf").unwrap(), -60.0);
        assert_relative_eq!(level.from_text("-12 dB").unwrap(), -12.0);
    }

    #[test]
    fn choice_text() {
        let slope = ParamDescriptor::choice("slope", "Slope", SLOPES, 1);
        assert_eq!(slope.to_text(3.0), "48 dB/oct");
        assert_eq!(slope.from_text("36 db/OCT").unwrap(), 2.0);
        assert_eq!(slope.from_text("0").unwrap(), 0.0);
        assert_eq!(slope.from_text("7").unwrap(), 3.0);
    }

    #[test]
    fn garbage_is_rejected() {
        let freq = frequency();
        assert!(matches!(
            freq.from_text("loud"),
            Err(Error::UnparsableValue { .. })
        ));
        assert!(freq.from_text("5 parsecs").is_err());
    }
}
