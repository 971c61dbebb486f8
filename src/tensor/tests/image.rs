use crate::tensor::Tensor;
use crate::vision::ImageType;
use image::GenericImageView;

#[test]
fn test_is_image() {
    let gray = Tensor::new(&[0.0, 128.0, 255.0, 3.0], &[2, 2]);
    assert_eq!(gray.is_image(), Ok(ImageType::L8));

    let gray_with_channel = Tensor::new(&[0.0, 128.0, 255.0, 3.0], &[2, 2, 1]);
    assert_eq!(gray_with_channel.is_image(), Ok(ImageType::L8));

    let rgb = Tensor::zeros(&[2, 2, 3]);
    assert_eq!(rgb.is_image(), Ok(ImageType::Rgb8));

    assert!(Tensor::zeros(&[2, 2, 2]).is_image().is_err());
    assert!(Tensor::zeros(&[2]).is_image().is_err());
    assert!(Tensor::new(&[0.5], &[1, 1]).is_image().is_err());
    assert!(Tensor::new(&[256.0], &[1, 1]).is_image().is_err());
}

#[test]
fn test_to_image() {
    // 高2宽3的RGB图像
    let data: Vec<f32> = (0..18).map(|x| (x * 10) as f32).collect();
    let tensor = Tensor::new(&data, &[2, 3, 3]);
    let image = tensor.to_image().unwrap();

    assert_eq!(image.dimensions(), (3, 2));
    let pixel = image.get_pixel(2, 1);
    assert_eq!(pixel[0], 150);
    assert_eq!(pixel[1], 160);
    assert_eq!(pixel[2], 170);
}
