use crate::tensor::Tensor;
use image::{DynamicImage, ImageBuffer, Pixel};

pub trait TraitForDynamicImage {
    fn to_tensor(&self) -> Result<Tensor, String>;
}

impl TraitForDynamicImage for DynamicImage {
    /// 将Image库的`DynamicImage`格式转换为形状为`[H, W, C]`的张量（像素值保持[0,255]）。
    /// 仅支持8位的灰度（C=1）与RGB（C=3）图像，其余格式需调用方先行转换。
    fn to_tensor(&self) -> Result<Tensor, String> {
        match self {
            DynamicImage::ImageLuma8(buffer) => buffer.to_tensor(),
            DynamicImage::ImageRgb8(buffer) => buffer.to_tensor(),
            _ => Err(format!("不支持的图像类型:`{:?}`。", self.color())),
        }
    }
}

pub trait TraitForImageBuffer {
    fn to_tensor(&self) -> Result<Tensor, String>;
}

impl<P: Pixel + 'static> TraitForImageBuffer for ImageBuffer<P, Vec<P::Subpixel>> {
    /// 转换为形状为`[H, W, C]`的张量，单通道图像同样保留通道维度
    fn to_tensor(&self) -> Result<Tensor, String> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let channels = P::CHANNEL_COUNT as usize;

        let mut tensor_data = Vec::with_capacity(height * width * channels);
        for pixel in self.pixels() {
            for value in pixel.channels() {
                let sample: f32 = num_traits::NumCast::from(*value)
                    .ok_or_else(|| "像素值无法转换为f32。".to_string())?;
                tensor_data.push(sample);
            }
        }

        Ok(Tensor::from_vec(tensor_data, &[height, width, channels]))
    }
}
