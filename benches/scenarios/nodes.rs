//! Benchmarks for whole nodes and the demo chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use next_dsp::{
    io::{midi::MidiEvent, AudioBuffer},
    nodes::{FilterNode, PhaserNode, SynthNode},
    AudioNode, Node, NodeKind, ProcessSpec,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn noise(frames: usize) -> AudioBuffer {
    let mut rng = fastrand::Rng::with_seed(11);
    AudioBuffer::from_channels(
        (0..2)
            .map(|_| (0..frames).map(|_| rng.f32() * 2.0 - 1.0).collect())
            .collect(),
    )
}

fn chord() -> Vec<MidiEvent> {
    [48, 52, 55, 60, 64, 67, 72, 76]
        .into_iter()
        .map(|note| MidiEvent::note_on(note, 100))
        .collect()
}

pub fn bench_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/nodes");

    for &size in BLOCK_SIZES {
        let spec = ProcessSpec::new(SAMPLE_RATE, size).expect("valid spec");
        let input = noise(size);
        let mut buffer = input.clone();

        // 48 dB/oct settled: fast path, coefficients once per block
        let mut filter = FilterNode::new();
        filter.params().publish("slope", 3.0);
        filter.initialise(spec);
        group.bench_with_input(BenchmarkId::new("filter_48db", size), &size, |b, _| {
            b.iter(|| {
                buffer.clone_from(&input);
                filter.apply_to_buffer(Some(black_box(&mut buffer)), 0, size, &[]);
            })
        });

        // Cutoff moving every block: slow path, coefficients every sample
        let mut filter = FilterNode::new();
        filter.params().publish("slope", 3.0);
        filter.initialise(spec);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("filter_48db_smoothing", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                filter
                    .params()
                    .publish("frequency", if flip { 400.0 } else { 4_000.0 });
                buffer.clone_from(&input);
                filter.apply_to_buffer(Some(black_box(&mut buffer)), 0, size, &[]);
            })
        });

        let mut phaser = PhaserNode::new();
        phaser.params().publish("feedback", 0.7);
        phaser.initialise(spec);
        group.bench_with_input(BenchmarkId::new("phaser", size), &size, |b, _| {
            b.iter(|| {
                buffer.clone_from(&input);
                phaser.apply_to_buffer(Some(black_box(&mut buffer)), 0, size, &[]);
            })
        });

        // All sixteen voices held
        let mut synth = SynthNode::new();
        synth.params().publish("release", 10.0);
        synth.initialise(spec);
        for note in 0..16 {
            synth.handle_event(MidiEvent::note_on(48 + note, 100));
        }
        group.bench_with_input(BenchmarkId::new("synth_16_voices", size), &size, |b, _| {
            b.iter(|| {
                synth.apply_to_buffer(Some(black_box(&mut buffer)), 0, size, &[]);
            })
        });
    }

    group.finish();
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    for &size in BLOCK_SIZES {
        let spec = ProcessSpec::new(SAMPLE_RATE, size).expect("valid spec");
        let mut chain: Vec<Node> = [NodeKind::Synth, NodeKind::Filter, NodeKind::Phaser]
            .into_iter()
            .map(Node::new)
            .collect();
        for node in chain.iter_mut() {
            node.initialise(spec);
        }
        chain[0].apply_to_buffer(Some(&mut AudioBuffer::new(2, size)), 0, size, &chord());

        let mut buffer = AudioBuffer::new(2, size);
        group.bench_with_input(BenchmarkId::new("synth_filter_phaser", size), &size, |b, _| {
            b.iter(|| {
                for node in chain.iter_mut() {
                    node.apply_to_buffer(Some(black_box(&mut buffer)), 0, size, &[]);
                }
            })
        });
    }

    group.finish();
}
