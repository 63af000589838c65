//! Decoding of real Ogg/Vorbis and MP3 assets checked into `tests/fixtures`

use std::path::PathBuf;

use spatial_audio_relay::{
    codec::{decode, decode_bytes, decode_file, decode_tagged, AudioCodec},
    config::RelayConfig,
    error::DecodeError,
    registry::AudioRegistry,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_ogg_vorbis_reports_native_layout() {
    // 16 kHz stereo, 1024 frames of silence
    let format = decode_file(fixture("silence.ogg"), AudioCodec::Ogg).unwrap();

    assert_eq!(format.sample_rate(), 16000);
    assert_eq!(format.channels(), 2);
    assert!(format.frames() > 0);
    assert!(format.frames() <= 1024);
    assert_eq!(format.len() % 2, 0);
    assert!(format.samples().iter().all(|s| s.abs() < 1e-6));
}

#[test]
fn test_mp3_reports_native_layout() {
    let format = decode_file(fixture("clip.mp3"), AudioCodec::Mp3).unwrap();

    assert_eq!(format.sample_rate(), 22050);
    assert_eq!(format.channels(), 1);
    assert!(format.len() > 0);
    assert!(format.samples().iter().all(|s| s.is_finite()));
}

#[test]
fn test_compressed_file_and_bytes_decode_identically() {
    for (name, codec) in [("silence.ogg", AudioCodec::Ogg), ("clip.mp3", AudioCodec::Mp3)] {
        let path = fixture(name);
        let data = std::fs::read(&path).unwrap();

        let from_file = decode_file(&path, codec).unwrap();
        let from_bytes = decode_bytes(data.clone(), codec).unwrap();
        let from_tag = decode_tagged(data, codec.extension()).unwrap();

        assert_eq!(from_file, from_bytes, "{} differs between file and memory", name);
        assert_eq!(from_bytes, from_tag);
    }
}

#[test]
fn test_compressed_assets_reject_the_wrong_tag() {
    let ogg = std::fs::read(fixture("silence.ogg")).unwrap();
    let mp3 = std::fs::read(fixture("clip.mp3")).unwrap();

    for (data, codec) in [
        (&ogg, AudioCodec::Mp3),
        (&ogg, AudioCodec::Wav),
        (&mp3, AudioCodec::Ogg),
        (&mp3, AudioCodec::Wav),
    ] {
        let err = decode_bytes(data.clone(), codec).unwrap_err();
        assert!(
            matches!(err, DecodeError::CodecMismatch { .. }),
            "expected codec mismatch for {}, got {}",
            codec,
            err
        );
    }

    // The path variant downgrades a mismatch to "no playable asset"
    assert!(decode(fixture("clip.mp3"), AudioCodec::Ogg).unwrap().is_none());
}

#[test]
fn test_ogg_asset_plays_through_registry() {
    let mut config = RelayConfig::default();
    config.playback.working_buffer_samples = 256;
    let mut registry = AudioRegistry::new(config);

    let handle = registry
        .play_local(fixture("silence.ogg"), AudioCodec::Ogg, false, 1.0)
        .unwrap()
        .expect("decodable asset");

    registry.tick_all();
    assert_eq!(registry.position(handle), Some(256));
}
