//! Luma PSNR scoring with AVX2 SIMD optimization
//!
//! The sum of squared errors is accumulated as an exact integer, so the AVX2
//! path and the scalar fallback produce bit-identical PSNR values.

use crate::error::{PsnrError, Result};

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Score reported for two identical planes.
pub const IDENTICAL_PSNR: f64 = 100.0;

/// Largest squared error of a single 8-bit sample
const MAX_SAMPLE_ERROR_SQ: f64 = 255.0 * 255.0;

/// 32-bit lanes gain at most 2 * 2 * 255^2 per iteration; flush before they overflow.
#[cfg(target_arch = "x86_64")]
const AVX2_FLUSH_INTERVAL: usize = 4096;

/// Compute the PSNR of a candidate luma plane against a reference plane
///
/// Returns [`IDENTICAL_PSNR`] when the planes are equal, otherwise
/// `10 * log10(255^2 * len / sse)`.
pub fn psnr(reference: &[u8], candidate: &[u8]) -> Result<f64> {
    if reference.len() != candidate.len() {
        return Err(PsnrError::LengthMismatch {
            reference: reference.len(),
            candidate: candidate.len(),
        });
    }
    if reference.is_empty() {
        return Err(PsnrError::EmptyPlane);
    }

    let sse = sum_squared_error(reference, candidate);
    Ok(psnr_from_sse(sse, reference.len()))
}

/// Convert a sum of squared errors over `samples` samples into dB
pub fn psnr_from_sse(sse: u64, samples: usize) -> f64 {
    if sse == 0 {
        return IDENTICAL_PSNR;
    }

    10.0 * (MAX_SAMPLE_ERROR_SQ * samples as f64 / sse as f64).log10()
}

/// Sum of squared differences, scalar fallback (portable, slower)
pub fn sum_squared_error_scalar(reference: &[u8], candidate: &[u8]) -> u64 {
    reference
        .iter()
        .zip(candidate)
        .map(|(&r, &c)| {
            let diff = r.abs_diff(c) as u64;
            diff * diff
        })
        .sum()
}

/// Sum of squared differences using AVX2, 32 samples per iteration
///
/// # Safety
/// Requires AVX2 CPU support. Both slices must have the same length.
#[target_feature(enable = "avx2")]
#[cfg(target_arch = "x86_64")]
pub unsafe fn sum_squared_error_avx2(reference: &[u8], candidate: &[u8]) -> u64 {
    debug_assert_eq!(reference.len(), candidate.len());

    let len = reference.len();
    let zero = _mm256_setzero_si256();
    let mut total: u64 = 0;
    let mut acc = _mm256_setzero_si256();
    let mut pending = 0;
    let mut i = 0;

    while i + 32 <= len {
        let r = _mm256_loadu_si256(reference.as_ptr().add(i) as *const __m256i);
        let c = _mm256_loadu_si256(candidate.as_ptr().add(i) as *const __m256i);

        // |r - c| from two saturating subtractions
        let diff = _mm256_or_si256(_mm256_subs_epu8(r, c), _mm256_subs_epu8(c, r));

        // Widen to 16-bit, then square and pairwise add into 32-bit lanes
        let lo = _mm256_unpacklo_epi8(diff, zero);
        let hi = _mm256_unpackhi_epi8(diff, zero);
        acc = _mm256_add_epi32(acc, _mm256_madd_epi16(lo, lo));
        acc = _mm256_add_epi32(acc, _mm256_madd_epi16(hi, hi));

        pending += 1;
        if pending == AVX2_FLUSH_INTERVAL {
            total += horizontal_sum_epi32(acc);
            acc = _mm256_setzero_si256();
            pending = 0;
        }
        i += 32;
    }
    total += horizontal_sum_epi32(acc);

    // Remaining samples (< 32)
    total + sum_squared_error_scalar(&reference[i..], &candidate[i..])
}

#[target_feature(enable = "avx2")]
#[cfg(target_arch = "x86_64")]
unsafe fn horizontal_sum_epi32(v: __m256i) -> u64 {
    let mut lanes = [0u32; 8];
    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, v);
    lanes.iter().map(|&lane| lane as u64).sum()
}

/// Auto-dispatch sum of squared differences with runtime CPU detection
pub fn sum_squared_error(reference: &[u8], candidate: &[u8]) -> u64 {
    debug_assert_eq!(reference.len(), candidate.len());

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && reference.len() == candidate.len() {
            return unsafe { sum_squared_error_avx2(reference, candidate) };
        }
    }

    sum_squared_error_scalar(reference, candidate)
}
