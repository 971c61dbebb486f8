use super::Tensor;
use crate::vision::ImageType;
use image::{DynamicImage, GrayImage, RgbImage};

impl Tensor {
    /// 判断张量是否为（像素值未归一化的）图像张量：
    /// 形状须为`[H, W]`、`[H, W, 1]`或`[H, W, 3]`，且每个像素值都是[0,255]内的整数。
    pub fn is_image(&self) -> Result<ImageType, String> {
        let dims = self.dimension();
        if !(2..=3).contains(&dims) {
            return Err("图像张量应该仅有2或3个维度。".to_string());
        }
        let channels = if dims == 2 { 1 } else { self.shape()[2] };
        let image_type = match channels {
            1 => ImageType::L8,
            3 => ImageType::Rgb8,
            _ => return Err(format!("图像张量的通道数只可能是1或3，实际为{channels}。")),
        };

        for pixel in self.as_slice() {
            // 检查每个像素值是否在[0,255]闭区间内
            if *pixel < 0.0 || *pixel > 255.0 {
                return Err(format!(
                    "检测到像素值{pixel}：图像张量的每个像素值必须在[0,255]之间。"
                ));
            }
            // 确保每个像素都是整数，即使它的类型是浮点数
            if pixel.fract() != 0.0 {
                return Err(format!(
                    "检测到像素值{pixel}：图像张量的每个像素值必须没有小数。"
                ));
            }
        }

        Ok(image_type)
    }

    /// 将张量转换为Image库的`DynamicImage`格式
    pub fn to_image(&self) -> Result<DynamicImage, String> {
        let image_type = self.is_image()?;
        let height = self.shape()[0] as u32;
        let width = self.shape()[1] as u32;
        let raw: Vec<u8> = self.as_slice().iter().map(|&v| v as u8).collect();
        let image = match image_type {
            ImageType::L8 => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
            ImageType::Rgb8 => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        };
        image.ok_or_else(|| "图像缓冲区大小与张量形状不符。".to_string())
    }
}
