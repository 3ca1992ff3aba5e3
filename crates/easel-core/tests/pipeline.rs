//! End-to-end editing through the public API: decode, edit, inspect, encode.

use easel_core::codec;
use easel_core::color_management::{contrast_ratio, lab_to_rgb, rgb_to_lab, rgb_to_xyz};
use easel_core::grading::curves::{CurveControlPoint, CurveHandle};
use easel_core::{
    Channel, EditError, EditSession, HistogramData, Kernel, KernelPreset, PipelineRequest,
    PixelBuffer, ResizeRequest, ToneCurve, convolve, resample_nearest,
};
use palette::{IntoColor, Lab, Srgb};

const EPSILON: f64 = 1e-6;

/// Horizontal gradient with a vertical ramp in green and varying alpha.
fn gradient(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        [
            (x * 255 / (width - 1).max(1)) as u8,
            (y * 255 / (height - 1).max(1)) as u8,
            128,
            (255 - x % 7) as u8,
        ]
    })
}

#[test]
fn test_decode_edit_encode_roundtrip() {
    let png = codec::encode_png(&gradient(16, 9)).unwrap();
    let mut session = EditSession::with_image(codec::decode(&png).unwrap());

    session.select_preset(KernelPreset::Sharpen);
    session.apply_filter().unwrap();
    session.set_curve_point(CurveHandle::Point1, 30, 0).unwrap();
    session.set_curve_point(CurveHandle::Point2, 220, 255).unwrap();
    session.apply_curve().unwrap();
    assert_eq!(session.resize(&ResizeRequest::percentage(50.0)).unwrap(), (8, 5));

    let result = session.take_image().unwrap();
    let url = codec::encode_data_url(&result).unwrap();
    assert_eq!(codec::decode_data_url(&url).unwrap(), result);
}

#[test]
fn test_identity_kernel_is_idempotent_at_every_size() {
    let src = gradient(7, 5);
    for size in [1, 3, 5, 7] {
        let kernel = Kernel::identity(size).unwrap();
        assert_eq!(convolve(&src, &kernel), src, "size {size}");
    }
}

#[test]
fn test_mid_gray_survives_box_blur() {
    let src = PixelBuffer::filled(2, 2, [128, 128, 128, 255]);
    let out = convolve(&src, &KernelPreset::BoxBlur.kernel());
    assert!(out.pixels().iter().all(|&p| p == [128, 128, 128, 255]));
}

#[test]
fn test_adversarial_kernels_saturate() {
    let src = gradient(9, 9);
    let boost = Kernel::parse("1e9,-1e9,1e9;-1e9,1e9,-1e9;1e9,-1e9,1e9").unwrap();
    let crush = Kernel::parse("-1e9,1e9,-1e9;1e9,-1e9,1e9;-1e9,1e9,-1e9").unwrap();
    // Blue is a constant 128, so the weighted sum is ±128e9 everywhere.
    assert!(convolve(&src, &boost).pixels().iter().all(|p| p[2] == 255));
    assert!(convolve(&src, &crush).pixels().iter().all(|p| p[2] == 0));
    // Alpha is never touched.
    assert_eq!(convolve(&src, &crush).pixels()[3][3], src.pixels()[3][3]);
}

#[test]
fn test_resample_roundtrip_dimensions() {
    let src = gradient(13, 6);
    for (w, h) in [(1, 1), (4, 20), (26, 12), (3, 3)] {
        let there = resample_nearest(&src, w, h).unwrap();
        let back = resample_nearest(&there, 13, 6).unwrap();
        assert_eq!(back.dimensions(), (13, 6));
    }
}

#[test]
fn test_curve_lut_hits_control_points() {
    for (p1, p2) in [
        ((0, 0), (255, 255)),
        ((20, 40), (200, 180)),
        ((0, 255), (255, 0)),
        ((100, 3), (101, 250)),
    ] {
        let curve = ToneCurve::new(
            CurveControlPoint::from_ints(p1.0, p1.1).unwrap(),
            CurveControlPoint::from_ints(p2.0, p2.1).unwrap(),
        )
        .unwrap();
        let lut = curve.lookup_table();
        assert_eq!(lut.get(p1.0 as u8), p1.1 as u8);
        assert_eq!(lut.get(p2.0 as u8), p2.1 as u8);
    }
    let identity = ToneCurve::default().lookup_table();
    assert!((0..=255u8).all(|v| identity.get(v) == v));
}

#[test]
fn test_histogram_totals_match_pixel_count() {
    let image = gradient(17, 11);
    let histogram = HistogramData::compute(&image);
    for channel in Channel::ALL {
        assert_eq!(histogram.total(channel), 17 * 11);
    }
}

#[test]
fn test_white_point_and_contrast_extremes() {
    let [x, y, z] = rgb_to_xyz([255, 255, 255]);
    assert!((x - 95.05).abs() < 1e-3);
    assert!((y - 100.0).abs() < 1e-3);
    assert!((z - 108.9).abs() < 1e-3);
    assert!((contrast_ratio([255, 255, 255], [0, 0, 0]) - 21.0).abs() < EPSILON);
}

#[test]
fn test_lab_agrees_with_palette() {
    for rgb in [
        [255, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [12, 200, 99],
        [90, 30, 200],
        [250, 250, 10],
        [3, 3, 3],
    ] {
        let ours = rgb_to_lab(rgb);
        let srgb = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>();
        let theirs: Lab = srgb.into_linear().into_color();
        let theirs = [theirs.l as f64, theirs.a as f64, theirs.b as f64];
        for (a, b) in ours.iter().zip(theirs) {
            assert!((a - b).abs() < 0.1, "{rgb:?}: {ours:?} vs {theirs:?}");
        }
    }
}

#[test]
fn test_lab_roundtrip_recovers_rgb() {
    for r in (0..=255u16).step_by(51) {
        for g in (0..=255u16).step_by(51) {
            for b in (0..=255u16).step_by(85) {
                let rgb = [r as u8, g as u8, b as u8];
                assert_eq!(lab_to_rgb(rgb_to_lab(rgb)), rgb);
            }
        }
    }
}

#[test]
fn test_pipeline_is_atomic() {
    let original = gradient(6, 4);
    let mut session = EditSession::with_image(original.clone());
    let request = PipelineRequest {
        filter: Some(KernelPreset::GaussianBlur.kernel()),
        curve: None,
        resize: Some(ResizeRequest::percentage(250.0)),
    };
    assert!(matches!(session.process(&request), Err(EditError::InvalidDimensions(_))));
    assert_eq!(session.image(), Some(&original));
}

#[test]
fn test_samples_and_contrast_through_session() {
    let image = PixelBuffer::from_fn(2, 1, |x, _| {
        if x == 0 { [118, 118, 118, 255] } else { [255, 255, 255, 255] }
    });
    let mut session = EditSession::with_image(image);
    session.sample(0, 0).unwrap();
    session.sample(1, 0).unwrap();
    let contrast = session.samples().contrast().unwrap();
    assert!(contrast.level.is_sufficient());
    assert_eq!(contrast.to_string(), "4.54:1");
    assert!(matches!(session.sample(2, 0), Err(EditError::OutOfBounds { .. })));
}
