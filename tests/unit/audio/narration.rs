use super::*;
use crate::assets::decode::{AudioDecoder, WavDecoder};
use crate::foundation::error::ReelErrorKind;

#[test]
fn duration_tracks_word_count() {
    let words = vec!["word"; 360].join(" ");
    assert_eq!(estimate_duration_secs(&words), 120.0);
    assert_eq!(estimate_duration_secs("six words is about two seconds"), 2.0);
    let ninety = vec!["w"; 90].join(" ");
    assert_eq!(estimate_duration_secs(&ninety), 30.0);
}

#[test]
fn short_text_is_at_least_one_second() {
    assert_eq!(estimate_duration_secs("hi"), 1.0);
    assert_eq!(estimate_duration_secs(""), 1.0);
}

#[test]
fn placeholder_is_a_decodable_silent_wav() {
    let text = vec!["promo"; 9].join("  \n");
    let clip = placeholder(&text).unwrap();
    assert_eq!(clip.word_count, 9);
    assert_eq!(clip.duration_secs, 3.0);

    let reader = hound::WavReader::new(Cursor::new(&clip.wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), 72_000);

    let decoded = WavDecoder.decode_audio(&clip.wav).unwrap();
    assert!((decoded.duration_secs() - 3.0).abs() < 1e-9);
    assert!(decoded.interleaved_f32.iter().all(|s| *s == 0.0));
}

#[test]
fn placeholder_source_carries_the_bytes() {
    let clip = placeholder("hello there").unwrap();
    let bytes = clip.source().read_bytes().unwrap();
    assert_eq!(&bytes[..], &clip.wav[..]);
}

#[test]
fn blank_text_is_rejected() {
    let err = placeholder("   \t").unwrap_err();
    assert_eq!(err.kind(), ReelErrorKind::Validation);
}
