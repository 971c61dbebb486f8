/*
 * @Author       : 老董
 * @Description  : 本模块提供计算机视觉相关的功能（帧图像的加载、颜色转换与缩放）。
 *                 在本模块中，不严谨地说：
 *                 1. 所谓的image/图像是指8位RGB或灰度格式的图像；
 *                 2. “灰度”（图）等同于英文中luma、luminance、grey、gray的概念。
 */

use std::path::Path;

use crate::tensor::Tensor;
use crate::utils::traits::image::TraitForDynamicImage;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};

#[cfg(test)]
mod tests;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ImageType {
    L8,   // 单通道（灰度）图像，如光流的u、v分量
    Rgb8, // 3通道的彩色图像
}

impl ImageType {
    pub fn channel_count(self) -> usize {
        match self {
            ImageType::L8 => 1,
            ImageType::Rgb8 => 3,
        }
    }
}

pub struct Vision;

impl Vision {
    /// 加载本地图像，并转换为`image_type`对应的颜色格式
    pub fn load_image(path: &Path, image_type: ImageType) -> Result<DynamicImage, ImageError> {
        let image = image::open(path)?;
        Ok(match image_type {
            ImageType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
            ImageType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        })
    }

    /// 若图像宽或高小于`min_side`，返回使较短边恰为`min_side`的等比放大系数，否则返回`None`。
    ///
    /// 系数为`1 + (min_side - 短边) / 短边`，仅由原图的短边算出，宽高两个方向共用。
    pub fn min_side_scale(width: u32, height: u32, min_side: u32) -> Option<f64> {
        let short = width.min(height);
        if short >= min_side || short == 0 {
            return None;
        }
        let short = short as f64;
        Some(1.0 + (min_side as f64 - short) / short)
    }

    /// 按`scale`等比缩放图像，新尺寸为`(trunc(w * scale), trunc(h * scale))`
    pub fn scale_image(image: &DynamicImage, scale: f64) -> DynamicImage {
        let (width, height) = image.dimensions();
        // 有意截断而非四舍五入，短边可能比目标小1个像素
        let new_width = (width as f64 * scale) as u32;
        let new_height = (height as f64 * scale) as u32;
        image.resize_exact(new_width, new_height, FilterType::Triangle)
    }

    /// 较短边不足`min_side`时等比放大图像，否则原样返回
    pub fn ensure_min_side(image: DynamicImage, min_side: u32) -> DynamicImage {
        let (width, height) = image.dimensions();
        match Self::min_side_scale(width, height, min_side) {
            Some(scale) => Self::scale_image(&image, scale),
            None => image,
        }
    }

    /// 调整图像大小
    /// * `image` - 原始图像张量，形状为`[H, W]`、`[H, W, 1]`或`[H, W, 3]`
    /// * `height` - 调整后的高度
    /// * `width` - 调整后的宽度
    /// * `crop` - `true`则执行基于中心的裁剪，`false`则执行缩放
    ///
    /// 返回的张量总是带有通道维度，即`[height, width, C]`。
    pub fn resize_image(
        image: &Tensor,
        height: usize,
        width: usize,
        crop: bool,
    ) -> Result<Tensor, String> {
        let image = image.to_image()?;
        if crop {
            if height > image.height() as usize || width > image.width() as usize {
                return Err(format!(
                    "裁剪图像：新尺寸{height}x{width}必须不大于原始尺寸{}x{}。",
                    image.height(),
                    image.width()
                ));
            }
            image
                .crop_imm(
                    (image.width() - width as u32) / 2,
                    (image.height() - height as u32) / 2,
                    width as u32,
                    height as u32,
                )
                .to_tensor()
        } else {
            image
                .resize_exact(width as u32, height as u32, FilterType::Triangle)
                .to_tensor()
        }
    }
}
