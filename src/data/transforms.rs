//! 数据变换函数
//!
//! 提供像素归一化、视频张量布局转换，以及作用于整个帧窗口`[T, H, W, C]`的视频变换
//! （中心裁剪、随机裁剪、随机水平翻转）。

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::error::DataError;
use crate::tensor::Tensor;

/// 将 0-255 像素值线性映射到 [-1, 1]：`v / 255 * 2 - 1`
///
/// 对所有通道一视同仁，输入保证在 [0, 255] 内，故无需截断。
pub fn linear_norm(tensor: &Tensor) -> Tensor {
    (tensor / 255.0) * 2.0 - 1.0
}

/// `linear_norm` 的逆变换：`(n + 1) / 2 * 255`
pub fn linear_denorm(tensor: &Tensor) -> Tensor {
    ((tensor + 1.0) / 2.0) * 255.0
}

/// 将 `[T, H, W, C]` 的帧窗口转换为通道优先的 `[C, T, H, W]` 视频张量
pub fn video_to_tensor(frames: &Tensor) -> Tensor {
    assert_eq!(
        frames.dimension(),
        4,
        "视频帧窗口应为[T, H, W, C]的4维张量，实际形状为{:?}",
        frames.shape()
    );
    frames.permute(&[3, 0, 1, 2])
}

/// 将 `[H, W, 1]` 的灰度图复制扩展为 `[H, W, channels]`；通道数已满足时原样返回
pub fn expand_channels(image: &Tensor, channels: usize) -> Result<Tensor, DataError> {
    let shape = image.shape();
    if shape.len() != 3 {
        return Err(DataError::ShapeMismatch {
            expected: vec![0, 0, channels],
            got: shape.to_vec(),
        });
    }
    if shape[2] == channels {
        return Ok(image.clone());
    }
    if shape[2] != 1 {
        return Err(DataError::ShapeMismatch {
            expected: vec![shape[0], shape[1], channels],
            got: shape.to_vec(),
        });
    }

    let mut data = Vec::with_capacity(image.size() * channels);
    for &value in image.as_slice() {
        data.extend(std::iter::repeat(value).take(channels));
    }
    Ok(Tensor::from_vec(data, &[shape[0], shape[1], channels]))
}

/// 作用于整个帧窗口 `[T, H, W, C]` 的视频变换
///
/// 同一窗口内的所有帧必须接受相同的变换（如相同的裁剪位置），否则会破坏时序一致性。
/// 闭包 `Fn(Tensor) -> Result<Tensor, DataError>` 也实现了本 trait。
pub trait VideoTransform: Send + Sync {
    fn apply(&self, frames: Tensor) -> Result<Tensor, DataError>;
}

impl<F> VideoTransform for F
where
    F: Fn(Tensor) -> Result<Tensor, DataError> + Send + Sync,
{
    fn apply(&self, frames: Tensor) -> Result<Tensor, DataError> {
        self(frames)
    }
}

/// 按顺序组合多个视频变换
pub struct Compose {
    transforms: Vec<Box<dyn VideoTransform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn VideoTransform>>) -> Self {
        Self { transforms }
    }
}

impl VideoTransform for Compose {
    fn apply(&self, frames: Tensor) -> Result<Tensor, DataError> {
        self.transforms
            .iter()
            .try_fold(frames, |frames, transform| transform.apply(frames))
    }
}

/// 校验帧窗口形状并返回 `(T, H, W, C)`
fn window_shape(frames: &Tensor) -> Result<(usize, usize, usize, usize), DataError> {
    match frames.shape() {
        &[t, h, w, c] => Ok((t, h, w, c)),
        other => Err(DataError::ShapeMismatch {
            expected: vec![0, 0, 0, 0],
            got: other.to_vec(),
        }),
    }
}

fn crop_window(
    frames: &Tensor,
    top: usize,
    left: usize,
    height: usize,
    width: usize,
) -> Tensor {
    frames.narrow(1, top, height).narrow(2, left, width)
}

/// 对帧窗口做中心裁剪，输出 `[T, height, width, C]`
#[derive(Debug, Clone, Copy)]
pub struct CenterCrop {
    pub height: usize,
    pub width: usize,
}

impl CenterCrop {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

impl VideoTransform for CenterCrop {
    fn apply(&self, frames: Tensor) -> Result<Tensor, DataError> {
        let (t, h, w, c) = window_shape(&frames)?;
        if self.height > h || self.width > w {
            return Err(DataError::ShapeMismatch {
                expected: vec![t, self.height, self.width, c],
                got: frames.shape().to_vec(),
            });
        }
        let top = (h - self.height) / 2;
        let left = (w - self.width) / 2;
        Ok(crop_window(&frames, top, left, self.height, self.width))
    }
}

/// 对帧窗口做随机位置裁剪，整个窗口共用同一裁剪位置
pub struct RandomCrop {
    height: usize,
    width: usize,
    rng: Mutex<StdRng>,
}

impl RandomCrop {
    pub fn new(height: usize, width: usize, seed: u64) -> Self {
        Self {
            height,
            width,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl VideoTransform for RandomCrop {
    fn apply(&self, frames: Tensor) -> Result<Tensor, DataError> {
        let (t, h, w, c) = window_shape(&frames)?;
        if self.height > h || self.width > w {
            return Err(DataError::ShapeMismatch {
                expected: vec![t, self.height, self.width, c],
                got: frames.shape().to_vec(),
            });
        }
        let (top, left) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            (
                rng.gen_range(0..=h - self.height),
                rng.gen_range(0..=w - self.width),
            )
        };
        Ok(crop_window(&frames, top, left, self.height, self.width))
    }
}

/// 以概率 `p` 对整个帧窗口做水平翻转
pub struct RandomHorizontalFlip {
    p: f64,
    rng: Mutex<StdRng>,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64, seed: u64) -> Self {
        Self {
            p: p.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl VideoTransform for RandomHorizontalFlip {
    fn apply(&self, frames: Tensor) -> Result<Tensor, DataError> {
        window_shape(&frames)?;
        let flip = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_bool(self.p)
        };
        Ok(if flip { frames.flip(2) } else { frames })
    }
}
