use std::io::Cursor;

use super::*;

fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    let mut w = hound::WavWriter::new(&mut buf, spec).unwrap();
    for &s in samples {
        w.write_sample(s).unwrap();
    }
    w.finalize().unwrap();
    buf.into_inner()
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let prepared = RasterImageDecoder.decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_garbage_is_asset_load_error() {
    let err = RasterImageDecoder.decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, ReelError::AssetLoad(_)));
}

#[test]
fn wav_int16_is_normalized() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let bytes = wav_bytes(spec, &[0, 16_384, -32_768]);
    let audio = WavDecoder.decode_audio(&bytes).unwrap();
    assert_eq!(audio.sample_rate, 24_000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.interleaved_f32.as_slice(), &[0.0, 0.5, -1.0]);
}

#[test]
fn wav_garbage_is_asset_load_error() {
    let err = WavDecoder.decode_audio(b"RIFF....WAVEjunk").unwrap_err();
    assert!(matches!(err, ReelError::AssetLoad(_)));
}

#[test]
fn auto_decoder_routes_wav_in_process() {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let bytes = wav_bytes(spec, &[0; 96]);
    assert!(is_riff_wave(&bytes));
    let audio = AutoAudioDecoder::default().decode_audio(&bytes).unwrap();
    assert_eq!(audio.frames(), 48);
    assert!(!is_riff_wave(b"ID3\x03mp3..."));
}
