use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};

use crate::utils::traits::image::{TraitForDynamicImage, TraitForImageBuffer};

#[test]
fn test_rgb_image_to_tensor() {
    let image = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 200]));
    let tensor = image.to_tensor().unwrap();

    assert_eq!(tensor.shape(), &[2, 3, 3]);
    assert_eq!(tensor[[1, 2, 0]], 2.0);
    assert_eq!(tensor[[1, 2, 1]], 1.0);
    assert_eq!(tensor[[0, 0, 2]], 200.0);
}

#[test]
fn test_gray_image_keeps_channel_dim() {
    let image = DynamicImage::ImageLuma8(GrayImage::from_fn(4, 5, |x, _| Luma([x as u8 * 10])));

    let tensor = image.to_tensor().unwrap();
    assert_eq!(tensor.shape(), &[5, 4, 1]);
    assert_eq!(tensor[[4, 3, 0]], 30.0);
}

#[test]
fn test_unsupported_image_type() {
    let image = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
    assert!(image.to_tensor().is_err());
}
