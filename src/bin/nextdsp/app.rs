//! Audio side of nextdsp: the output stream and the node chain it drives.

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use next_dsp::{
    io::{
        midi::{MidiBlock, MidiEvent},
        AudioBuffer,
    },
    AudioNode, Node, NodeKind, ParameterSet, ProcessSpec,
};

/// Render block size handed to the nodes. cpal callbacks of any length are
/// split into blocks of at most this many frames.
const BLOCK_SIZE: usize = 512;
const MIDI_QUEUE: usize = 1_024;
const SCOPE_QUEUE: usize = 16_384;

/// Signal chain order.
const CHAIN: [NodeKind; 3] = [NodeKind::Synth, NodeKind::Filter, NodeKind::Phaser];

/// Running output stream plus the control-side ends of its queues.
pub struct AudioEngine {
    _stream: cpal::Stream,
    pub sample_rate: f32,
    pub midi_tx: Producer<MidiEvent>,
    pub scope_rx: Consumer<f32>,
    /// Parameter sets in chain order.
    pub params: Vec<(NodeKind, Arc<ParameterSet>)>,
}

impl AudioEngine {
    pub fn start() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let spec = ProcessSpec::new(sample_rate, BLOCK_SIZE)
            .wrap_err("output device reports an unusable sample rate")?;

        let mut chain: Vec<Node> = CHAIN.iter().map(|&kind| Node::new(kind)).collect();
        for node in chain.iter_mut() {
            node.initialise(spec);
        }
        let params = chain
            .iter()
            .map(|node| (node.kind(), Arc::clone(node.params())))
            .collect();

        let (midi_tx, midi_rx) = RingBuffer::<MidiEvent>::new(MIDI_QUEUE);
        let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE);

        let mut renderer = Renderer {
            chain,
            buffer: AudioBuffer::new(2, BLOCK_SIZE),
            midi: MidiBlock::new(),
            midi_rx,
            scope_tx,
        };

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| renderer.render_interleaved(data, channels),
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        tracing::info!(sample_rate, channels, "audio stream started");

        Ok(Self {
            _stream: stream,
            sample_rate,
            midi_tx,
            scope_rx,
            params,
        })
    }
}

/// Everything the audio callback owns.
struct Renderer {
    chain: Vec<Node>,
    buffer: AudioBuffer,
    midi: MidiBlock,
    midi_rx: Consumer<MidiEvent>,
    scope_tx: Producer<f32>,
}

impl Renderer {
    fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        // Pending MIDI lands at the start of the callback
        self.midi.fill_from(&mut self.midi_rx);

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(BLOCK_SIZE);
            let events: &[MidiEvent] = if frames_written == 0 {
                self.midi.events()
            } else {
                &[]
            };

            self.buffer.clear_range(0, frames);
            for node in self.chain.iter_mut() {
                node.apply_to_buffer(Some(&mut self.buffer), 0, frames, events);
            }

            let out = &mut data[frames_written * channels..(frames_written + frames) * channels];
            for (i, frame) in out.chunks_exact_mut(channels).enumerate() {
                let left = self.buffer.channel(0)[i];
                let right = self.buffer.channel(1)[i];
                for (ch, sample) in frame.iter_mut().enumerate() {
                    *sample = if ch % 2 == 0 { left } else { right };
                }
                // A full scope queue just drops samples; the UI catches up
                let _ = self.scope_tx.push(left);
            }

            frames_written += frames;
        }
    }
}
