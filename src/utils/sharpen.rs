//! Unsharp masking
//!
//! The blur is a separable 9-tap binomial-like low-pass filter
//! (`1 8 28 56 70 56 28 8 1`, normalised by 256). The taps are integers, so
//! both passes run in fixed point and only the final blend touches floats:
//! `out = (1 + c) * src - c * blur`, rounded and saturated to 8 bits. The
//! blur is not rounded before the blend.
//!
//! Rows are processed in parallel with rayon; every output row is written by
//! exactly one task, so the result matches a sequential pass bit for bit.

use image::RgbImage;
use rayon::prelude::*;

/// Low-pass kernel taps (sum 256)
pub const KERNEL_TAPS: [u32; 9] = [1, 8, 28, 56, 70, 56, 28, 8, 1];

const RADIUS: usize = KERNEL_TAPS.len() / 2;
/// Scale of one pass (sum of taps), as a shift
const PASS_SHIFT: u32 = 8;
/// Scale of the blur after both passes
const BLUR_SCALE: f32 = (1u32 << (2 * PASS_SHIFT)) as f32;
const CHANNELS: usize = 3;

/// Mirror an out-of-range index back into `0..len` without repeating the
/// edge sample (`dcb|abcd|cba`).
#[inline]
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Sharpen `source` with unsharp masking at the given coefficient.
///
/// A coefficient of 0 returns an exact copy. Dimensions and channel count
/// are preserved.
pub fn sharpen(source: &RgbImage, coefficient: f32) -> RgbImage {
    let mut out = RgbImage::new(source.width(), source.height());
    sharpen_into(source, coefficient, &mut out);
    out
}

/// Like [`sharpen`] but writes into `out`, reallocating it only when its
/// dimensions differ from `source`.
pub fn sharpen_into(source: &RgbImage, coefficient: f32, out: &mut RgbImage) {
    if out.dimensions() != source.dimensions() {
        *out = RgbImage::new(source.width(), source.height());
    }

    let width = source.width() as usize;
    let height = source.height() as usize;
    if width == 0 || height == 0 {
        return;
    }

    if coefficient == 0.0 {
        out.copy_from_slice(source);
        return;
    }

    let src: &[u8] = source;
    let stride = width * CHANNELS;
    let horizontal = horizontal_pass(src, width, height);

    let gain = 1.0 + coefficient;
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            let src_row = &src[y * stride..(y + 1) * stride];
            for (i, out_px) in out_row.iter_mut().enumerate() {
                let mut acc = 0u32;
                for (k, &tap) in KERNEL_TAPS.iter().enumerate() {
                    let ry = reflect_101(y as isize + k as isize - RADIUS as isize, height);
                    acc += horizontal[ry * stride + i] * tap;
                }
                // Exact in f32: acc < 2^24
                let blurred = acc as f32 / BLUR_SCALE;
                let value = gain * src_row[i] as f32 - coefficient * blurred;
                *out_px = value.round().clamp(0.0, 255.0) as u8;
            }
        });
}

/// Horizontal filter pass, kept at 256x scale to avoid intermediate rounding
fn horizontal_pass(src: &[u8], width: usize, height: usize) -> Vec<u32> {
    let stride = width * CHANNELS;
    let mut tmp = vec![0u32; stride * height];

    tmp.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * stride..(y + 1) * stride];
            for x in 0..width {
                for c in 0..CHANNELS {
                    let mut acc = 0u32;
                    for (k, &tap) in KERNEL_TAPS.iter().enumerate() {
                        let rx = reflect_101(x as isize + k as isize - RADIUS as isize, width);
                        acc += src_row[rx * CHANNELS + c] as u32 * tap;
                    }
                    row[x * CHANNELS + c] = acc;
                }
            }
        });

    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    fn step_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 { Rgb([40, 40, 40]) } else { Rgb([200, 200, 200]) }
        })
    }

    fn noise_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |_, _| {
            Rgb([rand::random(), rand::random(), rand::random()])
        })
    }

    /// Direct float unsharp mask: normalised kernel, reflect-101 borders,
    /// vertical pass over the horizontal one
    fn reference_sharpen(source: &RgbImage, coefficient: f64) -> RgbImage {
        let kernel: Vec<f64> = KERNEL_TAPS.iter().map(|&t| t as f64 / 256.0).collect();
        let (w, h) = (source.width() as usize, source.height() as usize);
        let at = |x: usize, y: usize, c: usize| source.get_pixel(x as u32, y as u32)[c] as f64;

        let mut horizontal = vec![0.0f64; w * h * 3];
        for y in 0..h {
            for x in 0..w {
                for c in 0..3 {
                    horizontal[(y * w + x) * 3 + c] = (0..9)
                        .map(|k| kernel[k] * at(reflect_101(x as isize + k as isize - 4, w), y, c))
                        .sum();
                }
            }
        }

        RgbImage::from_fn(source.width(), source.height(), |x, y| {
            let (x, y) = (x as usize, y as usize);
            let mut px = [0u8; 3];
            for (c, out) in px.iter_mut().enumerate() {
                let blurred: f64 = (0..9)
                    .map(|k| {
                        let ry = reflect_101(y as isize + k as isize - 4, h);
                        kernel[k] * horizontal[(ry * w + x) * 3 + c]
                    })
                    .sum();
                let value = (1.0 + coefficient) * at(x, y, c) - coefficient * blurred;
                *out = value.round().clamp(0.0, 255.0) as u8;
            }
            Rgb(px)
        })
    }

    fn max_channel_diff(a: &RgbImage, b: &RgbImage) -> u8 {
        a.as_raw()
            .iter()
            .zip(b.as_raw())
            .map(|(&p, &q)| p.abs_diff(q))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_taps_sum_to_pass_scale() {
        assert_eq!(KERNEL_TAPS.iter().sum::<u32>(), 1 << PASS_SHIFT);
    }

    #[test]
    fn test_matches_float_reference() {
        // Odd, non-square and smaller than the kernel in one axis
        for (w, h) in [(23, 17), (5, 31), (40, 3)] {
            let img = noise_image(w, h);
            for coefficient in [0.5f32, 1.0, 2.5, 4.5] {
                let ours = sharpen(&img, coefficient);
                let expected = reference_sharpen(&img, coefficient as f64);
                assert!(
                    max_channel_diff(&ours, &expected) <= 1,
                    "{}x{} at c={} differs from the float reference",
                    w,
                    h,
                    coefficient
                );
            }
        }
    }

    #[test]
    fn test_parallel_matches_single_thread() {
        let img = noise_image(64, 48);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let sequential = pool.install(|| sharpen(&img, 3.0));
        assert_eq!(sharpen(&img, 3.0), sequential);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(8, 5), 0);
        assert_eq!(reflect_101(2, 5), 2);
        // Offsets wider than the image bounce more than once
        assert_eq!(reflect_101(-4, 2), 0);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let img = step_image(17, 9);
        assert_eq!(sharpen(&img, 0.0), img);
    }

    #[test]
    fn test_preserves_dimensions() {
        let img = step_image(13, 7);
        let out = sharpen(&img, 2.5);
        assert_eq!(out.dimensions(), (13, 7));
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let img = RgbImage::from_pixel(12, 12, Rgb([90, 120, 250]));
        assert_eq!(sharpen(&img, 5.0), img);
    }

    #[test]
    fn test_edges_get_overshoot() {
        let img = step_image(20, 4);
        let out = sharpen(&img, 2.0);
        // Dark side of the edge gets darker, bright side brighter
        assert!(out.get_pixel(9, 2)[0] < 40);
        assert!(out.get_pixel(10, 2)[0] > 200);
        // Far from the edge nothing changes
        assert_eq!(out.get_pixel(0, 0)[0], 40);
        assert_eq!(out.get_pixel(19, 0)[0], 200);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let img = RgbImage::from_fn(10, 1, |x, _| {
            if x < 5 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let out = sharpen(&img, 5.0);
        assert_eq!(out.get_pixel(4, 0)[0], 0);
        assert_eq!(out.get_pixel(5, 0)[0], 255);
    }

    #[test]
    fn test_sharpen_into_reuses_buffer() {
        let img = step_image(8, 8);
        let mut out = RgbImage::new(1, 1);
        sharpen_into(&img, 1.0, &mut out);
        assert_eq!(out, sharpen(&img, 1.0));
    }

    #[test]
    fn test_empty_image() {
        let img = RgbImage::new(0, 0);
        assert_eq!(sharpen(&img, 3.0).dimensions(), (0, 0));
    }

    proptest! {
        #[test]
        fn prop_zero_strength_identity(
            w in 1u32..12,
            h in 1u32..12,
            seed in proptest::collection::vec(any::<u8>(), 432),
        ) {
            let img = RgbImage::from_fn(w, h, |x, y| {
                let i = ((y * w + x) * 3) as usize;
                Rgb([seed[i], seed[i + 1], seed[i + 2]])
            });
            prop_assert_eq!(sharpen(&img, 0.0), img.clone());
            prop_assert_eq!(sharpen(&img, 1.5).dimensions(), img.dimensions());
        }

        #[test]
        fn prop_close_to_float_reference(
            w in 1u32..12,
            h in 1u32..12,
            coefficient in 0.1f32..5.0,
            seed in proptest::collection::vec(any::<u8>(), 432),
        ) {
            let img = RgbImage::from_fn(w, h, |x, y| {
                let i = ((y * w + x) * 3) as usize;
                Rgb([seed[i], seed[i + 1], seed[i + 2]])
            });
            let expected = reference_sharpen(&img, coefficient as f64);
            prop_assert!(max_channel_diff(&sharpen(&img, coefficient), &expected) <= 1);
        }
    }
}
