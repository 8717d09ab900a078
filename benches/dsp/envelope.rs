//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use next_dsp::dsp::envelope::{AdsrParameters, Envelope};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn envelope(attack: f32, decay: f32, sustain: f32, release: f32) -> Envelope {
    let mut env = Envelope::new();
    env.set_sample_rate(SAMPLE_RATE);
    env.set_parameters(AdsrParameters {
        attack,
        decay,
        sustain,
        release,
    });
    env
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = envelope(10.0, 0.1, 0.7, 0.3);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let mut env = envelope(0.001, 0.001, 0.7, 0.3);
        env.note_on();
        // Advance past attack/decay
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase, re-triggered so it never runs out
        let mut env = envelope(0.001, 0.001, 0.7, 10.0);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                if !env.is_active() {
                    env.note_on();
                    env.next_sample();
                    env.note_off();
                }
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
