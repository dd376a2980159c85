use std::collections::VecDeque;
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use flipdotflut_core::protocol::Packet;
use flipdotflut_core::receiver::{DotBoard, Received, Receiver};
use flipdotflut_core::source::{PatternKind, ProceduralPattern, SourceKind, VideoFrames};
use flipdotflut_core::stream::{Pacer, Pacing, SessionState, StreamConfig, Streamer};
use flipdotflut_core::transform::TransformConfig;
use flipdotflut_core::transport::{DotSink, TransportError, UdpSink};
use flipdotflut_core::{CELLS, SessionSummary, parse_packet};
use image::{DynamicImage, GrayImage, Luma};

#[derive(Default)]
struct Recorder {
    packets: Vec<Packet>,
}

impl DotSink for Recorder {
    fn send(&mut self, packet: Packet) -> Result<(), TransportError> {
        self.packets.push(packet);
        Ok(())
    }
}

struct NoPause;

impl Pacer for NoPause {
    fn pause(&mut self, _duration: Duration) {}
}

#[test]
fn video_with_immediate_end_of_stream_sends_nothing() {
    let mut source = VideoFrames::new(VecDeque::<DynamicImage>::new(), TransformConfig::video());
    let mut recorder = Recorder::default();
    let config = StreamConfig::for_source(SourceKind::Video);
    let summary = Streamer::new(config, &mut recorder)
        .with_pacer(NoPause)
        .run(&mut source)
        .unwrap();
    assert_eq!(summary.state, SessionState::Completed);
    assert_eq!(summary.frames, 0);
    assert_eq!(summary.dots, 0);
    assert!(recorder.packets.is_empty());
}

#[test]
fn finite_video_runs_until_exhausted() {
    let clip: VecDeque<DynamicImage> = (0..3)
        .map(|i| DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 48, Luma([i * 120]))))
        .collect();
    let mut source = VideoFrames::new(clip, TransformConfig::video());
    let config = StreamConfig::for_source(SourceKind::Video);
    let mut streamer = Streamer::new(config, Recorder::default()).with_pacer(NoPause);

    let summary = streamer.run(&mut source).unwrap();
    assert_eq!(summary.frames, 3);
    let packets = streamer.into_sink().packets;
    assert_eq!(packets.len(), 3 * 1792);

    let lit_per_frame: Vec<usize> = packets
        .chunks(1792)
        .map(|frame| {
            frame
                .iter()
                .filter(|packet| parse_packet(packet.as_bytes()).unwrap().lit)
                .count()
        })
        .collect();
    assert_eq!(lit_per_frame, vec![0, 0, 1792]);
}

#[test]
fn streamed_frame_arrives_on_the_receiver() {
    let mut receiver = Receiver::bind("127.0.0.1:0")
        .unwrap()
        .with_read_timeout(Duration::from_secs(2))
        .unwrap();
    let destination: SocketAddr = receiver.local_addr().unwrap();

    let listener = thread::spawn(move || {
        let mut board = DotBoard::new();
        board.flush();
        let mut received = 0;
        while received < CELLS {
            match receiver.recv().unwrap() {
                Some(Received::Dot { dot, .. }) => {
                    board.apply(dot).unwrap();
                    received += 1;
                }
                Some(Received::Rejected { .. }) => {}
                None => break,
            }
        }
        board.flush();
        (received, board.snapshot())
    });

    let sink = UdpSink::open(destination).unwrap();
    let config = StreamConfig {
        pacing: Pacing::per_row(Duration::from_millis(2)),
        ..StreamConfig::for_source(SourceKind::Pattern)
    };
    let mut pattern = ProceduralPattern::with_seed(PatternKind::Random, 7);
    let expected = ProceduralPattern::with_seed(PatternKind::Random, 7).render();

    let summary = Streamer::new(config, sink)
        .with_destination(destination)
        .run(&mut pattern)
        .unwrap();
    assert_eq!(summary.destination, Some(destination.to_string()));

    let (received, snapshot) = listener.join().unwrap();
    assert_eq!(received, CELLS);
    assert_eq!(snapshot, expected);
}

#[test]
fn summary_serializes_to_json() {
    let config = StreamConfig::for_source(SourceKind::Pattern);
    let summary = Streamer::new(config, Recorder::default())
        .run(&mut ProceduralPattern::new(PatternKind::Clear))
        .unwrap();

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["frames"], 1);
    assert_eq!(value["dots"], 1792);
    assert_eq!(value["bytes"], 3584);
    assert_eq!(value["state"], "completed");
    assert!(value.get("destination").is_none());

    let back: SessionSummary = serde_json::from_value(value).unwrap();
    assert_eq!(back, summary);
}
