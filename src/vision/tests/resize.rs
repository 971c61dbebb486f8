use approx::assert_abs_diff_eq;
use image::{DynamicImage, GenericImageView, RgbImage};

use crate::tensor::Tensor;
use crate::vision::Vision;

#[test]
fn test_min_side_scale() {
    // 短边已不小于255时不缩放
    assert_eq!(Vision::min_side_scale(340, 256, 255), None);
    assert_eq!(Vision::min_side_scale(255, 255, 255), None);

    let scale = Vision::min_side_scale(320, 170, 255).unwrap();
    assert_abs_diff_eq!(scale, 1.5, epsilon = 1e-12);

    // 系数只看短边，与短边在哪个方向无关
    let scale = Vision::min_side_scale(100, 400, 255).unwrap();
    assert_abs_diff_eq!(scale, 2.55, epsilon = 1e-12);
}

#[test]
fn test_ensure_min_side_reaches_255() {
    for (width, height) in [(320, 170), (100, 400), (254, 254), (33, 77), (171, 129)] {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let scaled = Vision::ensure_min_side(image, 255);
        let (new_width, new_height) = scaled.dimensions();
        let short = new_width.min(new_height);
        assert!(
            (254..=255).contains(&short),
            "{width}x{height}放大后短边为{short}"
        );
        // 等比放大：长宽比基本保持
        let ratio = width as f64 / height as f64;
        let new_ratio = new_width as f64 / new_height as f64;
        assert_abs_diff_eq!(ratio, new_ratio, epsilon = 0.02);
    }
}

#[test]
fn test_ensure_min_side_keeps_large_image() {
    let image = DynamicImage::ImageRgb8(RgbImage::new(456, 256));
    let kept = Vision::ensure_min_side(image, 255);
    assert_eq!(kept.dimensions(), (456, 256));
}

#[test]
fn test_resize_image() {
    let data: Vec<f32> = (0..28 * 28).map(|x| (x % 256) as f32).collect();
    let tensor = Tensor::new(&data, &[28, 28]);

    let resized = Vision::resize_image(&tensor, 32, 32, false).unwrap();
    assert_eq!(resized.shape(), &[32, 32, 1]);

    let cropped = Vision::resize_image(&tensor, 20, 24, true).unwrap();
    assert_eq!(cropped.shape(), &[20, 24, 1]);
    // 中心裁剪：左上角对应原图的(4, 2)
    assert_eq!(cropped[[0, 0, 0]], tensor[[4, 2]]);

    assert!(Vision::resize_image(&tensor, 30, 10, true).is_err());
}

#[test]
fn test_scale_image_truncates_dimensions() {
    // 2.55 无法精确表示，100 * 2.55 与 400 * 2.55 都略小于整数，截断后各少1个像素
    let image = DynamicImage::ImageRgb8(RgbImage::new(100, 400));
    let scaled = Vision::ensure_min_side(image, 255);
    assert_eq!(scaled.dimensions(), (254, 1019));
}
