use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

struct SolidImage;

impl ImageDecoder for SolidImage {
    fn decode_image(&self, bytes: &[u8]) -> ReelResult<MediaAsset> {
        if bytes == b"bad" {
            return Err(ReelError::asset_load("unsupported"));
        }
        Ok(MediaAsset {
            width: 2,
            height: 1,
            rgba8_premul: Arc::new(vec![255; 8]),
        })
    }
}

#[derive(Default)]
struct CountingAudio {
    calls: AtomicUsize,
}

impl AudioDecoder for CountingAudio {
    fn decode_audio(&self, bytes: &[u8]) -> ReelResult<DecodedAudio> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes == b"bad" {
            return Err(ReelError::asset_load("cannot decode"));
        }
        Ok(DecodedAudio {
            sample_rate: 10,
            channels: 1,
            interleaved_f32: Arc::new(vec![0.0; bytes.len() * 10]),
        })
    }
}

fn loader(audio: Arc<CountingAudio>) -> AssetLoader {
    AssetLoader::new(Arc::new(SolidImage), audio)
}

#[test]
fn loads_image_and_both_tracks() {
    let audio = Arc::new(CountingAudio::default());
    let assets = loader(audio.clone())
        .load(
            &MediaSource::bytes(b"img".to_vec()),
            Some(&MediaSource::bytes(b"narr".to_vec())),
            Some(&MediaSource::bytes(b"mu".to_vec())),
        )
        .unwrap();
    assert_eq!(assets.image.width, 2);
    assert!((assets.narration.unwrap().duration_secs() - 4.0).abs() < 1e-12);
    assert!((assets.music.unwrap().duration_secs() - 2.0).abs() < 1e-12);
    assert_eq!(audio.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn absent_and_empty_audio_are_no_track() {
    let audio = Arc::new(CountingAudio::default());
    let assets = loader(audio.clone())
        .load(
            &MediaSource::bytes(b"img".to_vec()),
            None,
            Some(&MediaSource::bytes(Vec::new())),
        )
        .unwrap();
    assert!(assets.narration.is_none());
    assert!(assets.music.is_none());
    assert_eq!(audio.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn undecodable_audio_is_asset_load_error() {
    let err = loader(Arc::new(CountingAudio::default()))
        .load(
            &MediaSource::bytes(b"img".to_vec()),
            None,
            Some(&MediaSource::bytes(b"bad".to_vec())),
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::AssetLoad(ref m) if m.contains("cannot decode")));
}

#[test]
fn image_failure_wins_over_audio_failure() {
    let err = loader(Arc::new(CountingAudio::default()))
        .load(
            &MediaSource::bytes(b"bad".to_vec()),
            Some(&MediaSource::bytes(b"bad".to_vec())),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::AssetLoad(ref m) if m.starts_with("image")));
}

#[test]
fn unreachable_image_path_fails() {
    let err = AssetLoader::default()
        .load(&MediaSource::path("/no/such/dir/photo.png"), None, None)
        .unwrap_err();
    assert!(matches!(err, ReelError::AssetLoad(_)));
}
