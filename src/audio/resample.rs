//! Sample-format conversion for the recognizer.
//!
//! Vosk consumes **16 kHz mono `i16`** PCM, while capture devices deliver
//! interleaved `f32` at whatever rate and channel count the hardware prefers.
//! The conversion chain is:
//!
//! 1. [`mix_to_mono`]      — average interleaved channels down to one.
//! 2. [`resample_to_16k`]  — linear-interpolation resample to 16 000 Hz.
//! 3. [`f32_to_i16`]       — quantize `[-1.0, 1.0]` floats to `i16`.
//!
//! [`pcm_bytes_to_i16`] goes the other direction of byte marshalling: it
//! reinterprets little-endian PCM16 byte buffers (WAV payloads, network
//! chunks) as samples.

/// Sample rate the recognizer expects, in Hz.
pub const RECOGNIZER_SAMPLE_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// mix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging channels.
///
/// The output length is `samples.len() / channels`.  Mono input is returned
/// unchanged; `channels == 0` yields an empty vector.
///
/// # Example
///
/// ```rust
/// use vosk_voice::audio::mix_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = mix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!(mono[0].abs() < 1e-6);
/// ```
pub fn mix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample_to_16k
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` Hz to 16 000 Hz using linear
/// interpolation.
///
/// Input already at 16 kHz is returned unchanged.  The output length is
/// approximately `samples.len() * 16_000 / source_rate`.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == RECOGNIZER_SAMPLE_RATE {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = RECOGNIZER_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// f32_to_i16
// ---------------------------------------------------------------------------

/// Quantize `[-1.0, 1.0]` float samples to signed 16-bit PCM.
///
/// Out-of-range input is clamped rather than wrapped, so a clipping capture
/// device cannot produce sign-flipped artifacts.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

// ---------------------------------------------------------------------------
// pcm_bytes_to_i16
// ---------------------------------------------------------------------------

/// Reinterpret little-endian PCM16 bytes as `i16` samples.
///
/// An odd trailing byte is dropped.
pub fn pcm_bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Serialize `i16` samples as little-endian PCM16 bytes.
pub fn i16_to_pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- mix_to_mono -------------------------------------------------------

    #[test]
    fn mono_input_is_unchanged() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(mix_to_mono(&input, 1), input);
    }

    #[test]
    fn stereo_frames_are_averaged() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = mix_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_yields_empty() {
        assert!(mix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample_to_16k ---------------------------------------------------

    #[test]
    fn resample_at_target_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        assert_eq!(resample_to_16k(&input, 16_000), input);
    }

    #[test]
    fn resample_48k_halves_to_a_third() {
        // 480 samples @ 48 kHz = 10 ms → 160 samples @ 16 kHz.
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn resample_preserves_dc_level() {
        for &s in &resample_to_16k(&vec![0.5_f32; 480], 48_000) {
            assert!((s - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn resample_44100_is_close_to_expected_length() {
        let out = resample_to_16k(&vec![0.0_f32; 44_100], 44_100);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn resample_upsamples_from_8k() {
        let out = resample_to_16k(&vec![0.0_f32; 80], 8_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn resample_empty_is_empty() {
        assert!(resample_to_16k(&[], 48_000).is_empty());
    }

    // ---- f32_to_i16 --------------------------------------------------------

    #[test]
    fn quantization_maps_extremes() {
        let out = f32_to_i16(&[0.0, 1.0, -1.0]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], i16::MAX);
        assert_eq!(out[2], -i16::MAX);
    }

    #[test]
    fn quantization_clamps_out_of_range() {
        let out = f32_to_i16(&[2.0, -3.0]);
        assert_eq!(out[0], i16::MAX);
        assert_eq!(out[1], -i16::MAX);
    }

    // ---- byte marshalling --------------------------------------------------

    #[test]
    fn pcm_bytes_round_trip() {
        let samples = vec![0i16, 1, -1, i16::MAX, i16::MIN];
        let bytes = i16_to_pcm_bytes(&samples);
        assert_eq!(pcm_bytes_to_i16(&bytes), samples);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let out = pcm_bytes_to_i16(&[0x01, 0x02, 0x03]);
        assert_eq!(out, vec![i16::from_le_bytes([0x01, 0x02])]);
    }
}
