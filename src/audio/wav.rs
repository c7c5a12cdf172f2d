//! WAV encode/decode helpers for recognition audio.
//!
//! The recognizer consumes headerless 16-bit mono PCM, while captured or
//! imported audio usually arrives as WAV files — often stereo.  This module
//! converts in both directions:
//!
//! * [`decompress_to_mono_pcm`] — WAV bytes → recognizer-ready mono PCM16LE.
//! * [`stereo_wav_to_mono`]     — in-memory canonical stereo WAV → mono WAV.
//! * [`pcm_to_wav`]             — recorded PCM bytes → playable WAV.
//! * [`wav_sample_rate`]        — sample-rate query on WAV bytes.

use std::io::Cursor;

use thiserror::Error;

/// Length of a canonical RIFF/WAVE header: RIFF chunk descriptor (12 bytes),
/// `fmt ` sub-chunk (24 bytes), `data` sub-chunk header (8 bytes).
pub const WAV_HEADER_LEN: usize = 44;

// Fixed byte offsets of the header fields that encode the channel layout.
const OFFSET_NUM_CHANNELS: usize = 22; // u16
const OFFSET_BYTE_RATE: usize = 28; // u32
const OFFSET_BLOCK_ALIGN: usize = 32; // u16
const OFFSET_DATA_SIZE: usize = 40; // u32

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// Errors produced by the WAV helpers.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV data too short for a {WAV_HEADER_LEN}-byte header ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("failed to parse WAV data: {0}")]
    Parse(String),

    #[error("only mono or stereo 16-bit waves allowed ({channels} ch, {bits} bit)")]
    UnsupportedFormat { channels: u16, bits: u16 },

    #[error("failed to encode WAV data: {0}")]
    Encode(String),
}

// ---------------------------------------------------------------------------
// stereo_wav_to_mono
// ---------------------------------------------------------------------------

/// Downmix a canonical-header 16-bit stereo WAV to mono, in byte form.
///
/// Rewrites exactly four header fields — channel count (offset 22), byte rate
/// (offset 28), block align (offset 32) and data sub-chunk size (offset 40) —
/// by halving each, and leaves every other header byte untouched.  The sample
/// data keeps only the left channel of each interleaved 4-byte stereo frame.
/// A trailing partial frame is dropped.
///
/// The input must start with a canonical 44-byte header (`data` sub-chunk
/// directly after `fmt `); use [`decompress_to_mono_pcm`] for WAV files that
/// may carry extra chunks.
pub fn stereo_wav_to_mono(stereo: &[u8]) -> Result<Vec<u8>, WavError> {
    if stereo.len() < WAV_HEADER_LEN {
        return Err(WavError::TruncatedHeader(stereo.len()));
    }

    let data_len = stereo.len() - WAV_HEADER_LEN;
    let mut mono = Vec::with_capacity(WAV_HEADER_LEN + data_len / 2);

    let mut i = 0;
    while i < WAV_HEADER_LEN {
        match i {
            OFFSET_NUM_CHANNELS => {
                let channels = u16::from_le_bytes([stereo[i], stereo[i + 1]]) / 2;
                mono.extend_from_slice(&channels.to_le_bytes());
                i += 2;
            }
            OFFSET_BYTE_RATE => {
                let byte_rate =
                    u32::from_le_bytes([stereo[i], stereo[i + 1], stereo[i + 2], stereo[i + 3]])
                        / 2;
                mono.extend_from_slice(&byte_rate.to_le_bytes());
                i += 4;
            }
            OFFSET_BLOCK_ALIGN => {
                let block_align = u16::from_le_bytes([stereo[i], stereo[i + 1]]) / 2;
                mono.extend_from_slice(&block_align.to_le_bytes());
                i += 2;
            }
            OFFSET_DATA_SIZE => {
                let data_size =
                    u32::from_le_bytes([stereo[i], stereo[i + 1], stereo[i + 2], stereo[i + 3]])
                        / 2;
                mono.extend_from_slice(&data_size.to_le_bytes());
                i += 4;
            }
            _ => {
                mono.push(stereo[i]);
                i += 1;
            }
        }
    }

    // Left channel only; the right channel of each frame is discarded.
    for frame in stereo[WAV_HEADER_LEN..].chunks_exact(4) {
        mono.push(frame[0]);
        mono.push(frame[1]);
    }

    Ok(mono)
}

// ---------------------------------------------------------------------------
// decompress_to_mono_pcm
// ---------------------------------------------------------------------------

/// Decode a 16-bit WAV into headerless mono PCM16LE sample bytes.
///
/// Mono input passes through unchanged; stereo input keeps the left channel
/// only.  Canonical-header stereo files take the byte-level
/// [`stereo_wav_to_mono`] fast path; anything with extra riff chunks falls
/// back to a full `hound` parse.
///
/// # Errors
///
/// [`WavError::UnsupportedFormat`] for anything other than 16-bit mono or
/// stereo integer PCM; [`WavError::Parse`] for malformed data.
pub fn decompress_to_mono_pcm(wav: &[u8]) -> Result<Vec<u8>, WavError> {
    let reader =
        hound::WavReader::new(Cursor::new(wav)).map_err(|e| WavError::Parse(e.to_string()))?;
    let spec = reader.spec();

    if spec.bits_per_sample != 16
        || spec.channels > 2
        || spec.channels == 0
        || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(WavError::UnsupportedFormat {
            channels: spec.channels,
            bits: spec.bits_per_sample,
        });
    }

    if spec.channels == 2 && has_canonical_header(wav) {
        let mono = stereo_wav_to_mono(wav)?;
        return Ok(mono[WAV_HEADER_LEN..].to_vec());
    }

    let mut pcm = Vec::new();
    let mut samples = reader.into_samples::<i16>();

    loop {
        let left = match samples.next() {
            Some(s) => s.map_err(|e| WavError::Parse(e.to_string()))?,
            None => break,
        };
        pcm.extend_from_slice(&left.to_le_bytes());

        if spec.channels == 2 {
            // Skip the right-channel sample of this frame.
            match samples.next() {
                Some(right) => {
                    right.map_err(|e| WavError::Parse(e.to_string()))?;
                }
                None => break,
            }
        }
    }

    Ok(pcm)
}

/// A canonical header places the `data` chunk id directly after `fmt `.
fn has_canonical_header(wav: &[u8]) -> bool {
    wav.len() >= WAV_HEADER_LEN && &wav[36..40] == b"data"
}

// ---------------------------------------------------------------------------
// pcm_to_wav
// ---------------------------------------------------------------------------

/// Wrap headerless PCM16LE sample bytes in a playable WAV container.
///
/// The inverse of [`decompress_to_mono_pcm`]: use it to turn the buffer
/// returned by a finished capture into something an audio player can load.
/// An odd trailing byte is dropped.
pub fn pcm_to_wav(samples: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>, WavError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| WavError::Encode(e.to_string()))?;
        for pair in samples.chunks_exact(2) {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            writer
                .write_sample(sample)
                .map_err(|e| WavError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| WavError::Encode(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// wav_sample_rate
// ---------------------------------------------------------------------------

/// Sample rate in Hz declared by the given WAV bytes.
pub fn wav_sample_rate(wav: &[u8]) -> Result<u32, WavError> {
    let reader =
        hound::WavReader::new(Cursor::new(wav)).map_err(|e| WavError::Parse(e.to_string()))?;
    Ok(reader.spec().sample_rate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a canonical 16-bit WAV from raw i16 samples using hound.
    fn make_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn read_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    // ---- stereo_wav_to_mono ------------------------------------------------

    #[test]
    fn stereo_downmix_halves_the_four_header_fields() {
        // L/R pairs: left = 100, 300, 500; right = 200, 400, 600.
        let stereo = make_wav(&[100, 200, 300, 400, 500, 600], 44_100, 2);
        let mono = stereo_wav_to_mono(&stereo).unwrap();

        assert_eq!(read_u16(&mono, OFFSET_NUM_CHANNELS), 1);
        assert_eq!(
            read_u32(&mono, OFFSET_BYTE_RATE),
            read_u32(&stereo, OFFSET_BYTE_RATE) / 2
        );
        assert_eq!(
            read_u16(&mono, OFFSET_BLOCK_ALIGN),
            read_u16(&stereo, OFFSET_BLOCK_ALIGN) / 2
        );
        assert_eq!(
            read_u32(&mono, OFFSET_DATA_SIZE),
            read_u32(&stereo, OFFSET_DATA_SIZE) / 2
        );
    }

    #[test]
    fn stereo_downmix_preserves_untouched_header_bytes() {
        let stereo = make_wav(&[1, 2, 3, 4], 48_000, 2);
        let mono = stereo_wav_to_mono(&stereo).unwrap();

        // Everything outside the four rewritten fields must be byte-identical.
        let rewritten = [22usize, 23, 28, 29, 30, 31, 32, 33, 40, 41, 42, 43];
        for i in 0..WAV_HEADER_LEN {
            if rewritten.contains(&i) {
                continue;
            }
            assert_eq!(mono[i], stereo[i], "header byte {i} changed");
        }
    }

    #[test]
    fn stereo_downmix_keeps_left_channel_only() {
        let stereo = make_wav(&[100, 200, 300, 400, 500, 600], 16_000, 2);
        let mono = stereo_wav_to_mono(&stereo).unwrap();

        let data = &mono[WAV_HEADER_LEN..];
        let samples: Vec<i16> = data
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(samples, vec![100, 300, 500]);
    }

    #[test]
    fn stereo_downmix_rejects_truncated_input() {
        let err = stereo_wav_to_mono(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, WavError::TruncatedHeader(20)));
    }

    #[test]
    fn stereo_downmix_drops_trailing_partial_frame() {
        let mut stereo = make_wav(&[1, 2, 3, 4], 16_000, 2);
        stereo.extend_from_slice(&[0xAB, 0xCD]); // half a frame
        let mono = stereo_wav_to_mono(&stereo).unwrap();
        // Two full frames → two mono samples → 4 data bytes.
        assert_eq!(mono.len() - WAV_HEADER_LEN, 4);
    }

    // ---- decompress_to_mono_pcm --------------------------------------------

    #[test]
    fn decompress_mono_passes_samples_through() {
        let wav = make_wav(&[10, -20, 30], 16_000, 1);
        let pcm = decompress_to_mono_pcm(&wav).unwrap();
        let samples: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(samples, vec![10, -20, 30]);
    }

    #[test]
    fn decompress_stereo_keeps_left_channel() {
        let wav = make_wav(&[10, 99, 20, 99, 30, 99], 16_000, 2);
        let pcm = decompress_to_mono_pcm(&wav).unwrap();
        let samples: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(samples, vec![10, 20, 30]);
    }

    /// Build a stereo WAV whose `data` chunk is preceded by a `LIST` chunk,
    /// forcing the full parse instead of the canonical-header fast path.
    /// `declared_len` may overstate the actual payload to simulate
    /// truncation.
    fn make_noncanonical_stereo_wav(data: &[u8], declared_len: u32) -> Vec<u8> {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(4 + 24 + 12 + 8 + data.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // integer PCM
        wav.extend_from_slice(&2u16.to_le_bytes()); // stereo
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&64_000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&4u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(b"INFO");
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&declared_len.to_le_bytes());
        wav.extend_from_slice(data);
        wav
    }

    #[test]
    fn decompress_noncanonical_stereo_keeps_left_channel() {
        let data: Vec<u8> = [10i16, 99, 20, 99]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let wav = make_noncanonical_stereo_wav(&data, data.len() as u32);

        let pcm = decompress_to_mono_pcm(&wav).unwrap();
        let samples: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(samples, vec![10, 20]);
    }

    #[test]
    fn decompress_surfaces_truncated_right_channel() {
        // Three samples present, four declared: the second frame's right
        // channel is missing and must surface as a parse error.
        let data: Vec<u8> = [10i16, 99, 20]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let wav = make_noncanonical_stereo_wav(&data, 8);

        assert!(matches!(
            decompress_to_mono_pcm(&wav),
            Err(WavError::Parse(_))
        ));
    }

    #[test]
    fn decompress_rejects_garbage() {
        assert!(matches!(
            decompress_to_mono_pcm(b"definitely not a wav file"),
            Err(WavError::Parse(_))
        ));
    }

    // ---- pcm_to_wav / wav_sample_rate --------------------------------------

    #[test]
    fn pcm_round_trips_through_wav() {
        let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = pcm_to_wav(&pcm, 16_000, 1).unwrap();
        assert_eq!(wav_sample_rate(&wav).unwrap(), 16_000);

        let back = decompress_to_mono_pcm(&wav).unwrap();
        assert_eq!(back, pcm);
    }

    #[test]
    fn pcm_to_wav_declares_channel_count() {
        let pcm: Vec<u8> = [1i16, 2, 3, 4].iter().flat_map(|s| s.to_le_bytes()).collect();
        let wav = pcm_to_wav(&pcm, 44_100, 2).unwrap();
        let reader = hound::WavReader::new(Cursor::new(&wav[..])).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44_100);
    }

    #[test]
    fn wav_sample_rate_rejects_garbage() {
        assert!(wav_sample_rate(&[0u8; 10]).is_err());
    }
}
