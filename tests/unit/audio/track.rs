use std::sync::Arc;

use super::*;

fn pcm(frames: usize) -> DecodedAudio {
    DecodedAudio {
        sample_rate: 8_000,
        channels: 1,
        interleaved_f32: Arc::new(vec![0.5; frames]),
    }
}

#[test]
fn gains_are_fixed_per_role() {
    assert_eq!(AudioTrack::narration(pcm(10)).gain(), 1.0);
    assert_eq!(AudioTrack::music(pcm(10)).gain(), 0.3);
}

#[test]
fn only_music_loops() {
    assert!(!AudioTrack::narration(pcm(10)).looped());
    assert!(AudioTrack::music(pcm(10)).looped());
}

#[test]
fn duration_comes_from_pcm() {
    let t = AudioTrack::narration(pcm(16_000));
    assert_eq!(t.duration_secs(), 2.0);
    assert_eq!(t.role(), TrackRole::Narration);
}
