// Tests for raw-frame WAV assembly.

use anyhow::Result;
use keepsake::{AudioCodec, AudioEncoder, AudioSpec, WavEncoder};

fn pcm_frame(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[test]
fn test_pcm_frames_produce_wav() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("memory.wav");

    let spec = AudioSpec {
        sample_rate: 16000,
        channels: 1,
        codec: AudioCodec::Pcm16,
    };
    let frames = vec![pcm_frame(&[0, 1000, -1000]), pcm_frame(&[32000, -32000])];

    WavEncoder.encode(&frames, &spec, &dest)?;

    let reader = hound::WavReader::open(&dest)?;
    let wav_spec = reader.spec();
    assert_eq!(wav_spec.sample_rate, 16000);
    assert_eq!(wav_spec.channels, 1);
    assert_eq!(wav_spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(samples, vec![0, 1000, -1000, 32000, -32000]);

    Ok(())
}

#[test]
fn test_frames_concatenate_in_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("ordered.wav");

    let spec = AudioSpec {
        sample_rate: 8000,
        channels: 1,
        codec: AudioCodec::Pcm8,
    };
    let frames: Vec<Vec<u8>> = (0..5).map(|i| pcm_frame(&[i as i16; 4])).collect();

    WavEncoder.encode(&frames, &spec, &dest)?;

    let samples: Vec<i16> = hound::WavReader::open(&dest)?
        .into_samples::<i16>()
        .collect::<Result<_, _>>()?;
    let expected: Vec<i16> = (0..5).flat_map(|i| vec![i as i16; 4]).collect();
    assert_eq!(samples, expected);

    Ok(())
}

#[test]
fn test_opus_frames_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("rejected.wav");

    let spec = AudioSpec {
        sample_rate: 16000,
        channels: 1,
        codec: AudioCodec::Opus,
    };

    let result = WavEncoder.encode(&[vec![1, 2, 3]], &spec, &dest);
    assert!(result.is_err(), "opus frames must be rejected");
    assert!(!dest.exists(), "no file should be created for opus input");
}

#[test]
fn test_empty_frame_list_produces_empty_wav() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("empty.wav");

    let spec = AudioSpec {
        sample_rate: 16000,
        channels: 1,
        codec: AudioCodec::Pcm16,
    };

    WavEncoder.encode(&[], &spec, &dest)?;

    let reader = hound::WavReader::open(&dest)?;
    assert_eq!(reader.len(), 0);

    Ok(())
}
