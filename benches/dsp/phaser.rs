//! Benchmarks for the all-pass phaser.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use next_dsp::dsp::phaser::Phaser;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_phaser(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/phaser");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut left = input.clone();
        let mut right = input.clone();

        let mut phaser = Phaser::new();
        phaser.set_sample_rate(SAMPLE_RATE);
        phaser.set_rate(0.5);
        phaser.set_depth(1.0);
        phaser.set_feedback(0.7);
        phaser.set_mix(0.5);

        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                    phaser.advance();
                    *l = phaser.process_sample(0, black_box(*l));
                    *r = phaser.process_sample(1, black_box(*r));
                }
            })
        });
    }

    group.finish();
}
