/*
 * @Author       : 老董
 * @Date         : 2025-03-02
 * @Description  : ADL 动作识别视频数据集 - 按样本索引读取定长帧窗口
 *
 * 帧文件布局：
 * - rgb：`<data_path>/rgb/<video_id>/frame_{i:010}.jpg`
 * - flow：`<data_path>/flow/<video_id>/{u,v}/frame_{i:010}.jpg`（光流帧率为rgb的一半）
 *
 * 每次访问都重新从硬盘读取并归一化帧图像，不做缓存；
 * 访问过程不修改数据集状态，同一实例可安全地被多个加载线程共享。
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, GenericImageView};
use serde::Deserialize;

use crate::data::config::load_json_config;
use crate::data::dataloader::stack_samples;
use crate::data::dataset::{Dataset, check_index};
use crate::data::datasets::sample_index::{SampleIndexEntry, load_sample_index};
use crate::data::error::DataError;
use crate::data::transforms::{VideoTransform, linear_norm, video_to_tensor};
use crate::tensor::Tensor;
use crate::utils::traits::image::TraitForDynamicImage;
use crate::vision::{ImageType, Vision};

/// 默认窗口长度（rgb帧数）
pub const DEFAULT_WINDOW_LEN: usize = 16;

/// 帧图像短边的最小尺寸，不足时等比放大
pub const MIN_FRAME_SIDE: u32 = 255;

/// 帧的读取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// 连续的RGB帧，每帧3通道
    Rgb,
    /// 半帧率的光流帧，每帧由u、v两张灰度图组成2通道
    Flow,
}

impl FrameMode {
    /// 该模式在数据根目录下对应的子目录名
    pub fn dir_name(self) -> &'static str {
        match self {
            FrameMode::Rgb => "rgb",
            FrameMode::Flow => "flow",
        }
    }

    /// 每帧的通道数
    pub fn channel_count(self) -> usize {
        match self {
            FrameMode::Rgb => 3,
            FrameMode::Flow => 2,
        }
    }
}

impl FromStr for FrameMode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(FrameMode::Rgb),
            "flow" => Ok(FrameMode::Flow),
            other => Err(DataError::InvalidConfig(format!(
                "未知的帧模式 `{other}`，仅支持 rgb/flow"
            ))),
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

fn default_window_len() -> usize {
    DEFAULT_WINDOW_LEN
}

/// ADL 数据集配置，可从 JSON 文件加载
///
/// ```json
/// { "data_path": "/data/adl", "list_path": "/data/adl/train.pkl",
///   "mode": "flow", "dataset_split": "train", "window_len": 16 }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AdlConfig {
    pub data_path: PathBuf,
    pub list_path: PathBuf,
    pub mode: FrameMode,
    pub dataset_split: String,
    #[serde(default = "default_window_len")]
    pub window_len: usize,
}

impl AdlConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, DataError> {
        load_json_config(path)
    }
}

/// ADL 视频数据集
///
/// # 示例
/// ```ignore
/// let dataset = AdlDataset::new("/data/adl", "/data/adl/train.pkl", FrameMode::Rgb, "train")?
///     .window_len(16)?
///     .transform(CenterCrop::new(224, 224));
/// let (video, label) = dataset.get(0)?; // video: [3, 16, 224, 224]
/// ```
pub struct AdlDataset {
    data_path: PathBuf,
    mode: FrameMode,
    dataset_split: String,
    window_len: usize,
    transform: Option<Box<dyn VideoTransform>>,
    entries: Vec<SampleIndexEntry>,
}

impl AdlDataset {
    /// 解析样本索引文件并创建数据集（窗口长度默认为16）
    ///
    /// # 参数
    /// - `data_path`: 帧图像根目录
    /// - `list_path`: 样本索引文件（.pkl/.pickle/.csv）
    /// - `mode`: rgb 或 flow
    /// - `dataset_split`: 划分名称，仅用于日志
    pub fn new(
        data_path: impl Into<PathBuf>,
        list_path: impl AsRef<Path>,
        mode: FrameMode,
        dataset_split: impl Into<String>,
    ) -> Result<Self, DataError> {
        let dataset_split = dataset_split.into();
        let entries = load_sample_index(list_path.as_ref())?;
        log::info!("{dataset_split:5} 动作片段数: {}", entries.len());

        Ok(Self {
            data_path: data_path.into(),
            mode,
            dataset_split,
            window_len: DEFAULT_WINDOW_LEN,
            transform: None,
            entries,
        })
    }

    /// 由配置创建数据集
    pub fn from_config(config: &AdlConfig) -> Result<Self, DataError> {
        Self::new(
            &config.data_path,
            &config.list_path,
            config.mode,
            config.dataset_split.as_str(),
        )?
        .window_len(config.window_len)
    }

    /// 设置窗口长度（rgb帧数）。
    /// 必须大于0；flow模式下必须为偶数，因为光流为半帧率，实际读取`window_len / 2`帧。
    pub fn window_len(mut self, window_len: usize) -> Result<Self, DataError> {
        self.validate_window_len(window_len)?;
        self.window_len = window_len;
        Ok(self)
    }

    /// 设置作用于`[T, H, W, C]`帧窗口的后处理变换
    pub fn transform(mut self, transform: impl VideoTransform + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    fn validate_window_len(&self, window_len: usize) -> Result<(), DataError> {
        if window_len == 0 {
            return Err(DataError::InvalidConfig("window_len 必须大于 0".to_string()));
        }
        if self.mode == FrameMode::Flow && window_len % 2 != 0 {
            return Err(DataError::InvalidConfig(format!(
                "flow 模式下 window_len 必须为偶数，实际为 {window_len}"
            )));
        }
        Ok(())
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    pub fn dataset_split(&self) -> &str {
        &self.dataset_split
    }

    pub fn get_window_len(&self) -> usize {
        self.window_len
    }

    /// 每个样本的时间步数：rgb为`window_len`，flow为`window_len / 2`
    pub fn time_steps(&self) -> usize {
        match self.mode {
            FrameMode::Rgb => self.window_len,
            FrameMode::Flow => self.window_len / 2,
        }
    }

    /// 全部样本索引
    pub fn entries(&self) -> &[SampleIndexEntry] {
        &self.entries
    }

    /// 查询第`index`个样本的索引信息，无副作用
    pub fn sample_at(&self, index: usize) -> Result<&SampleIndexEntry, DataError> {
        check_index(index, self.entries.len())?;
        Ok(&self.entries[index])
    }

    /// 连续rgb帧的文件路径
    pub fn rgb_frame_path(&self, video_id: &str, frame: usize) -> PathBuf {
        self.data_path
            .join(self.mode.dir_name())
            .join(video_id)
            .join(frame_file_name(frame))
    }

    /// 光流某一分量（`"u"`或`"v"`）的帧文件路径
    pub fn flow_frame_path(&self, video_id: &str, component: &str, frame: usize) -> PathBuf {
        self.data_path
            .join(self.mode.dir_name())
            .join(video_id)
            .join(component)
            .join(frame_file_name(frame))
    }

    /// 读取连续`window_len`帧rgb图像，返回`[T, H, W, 3]`
    pub fn load_rgb_frames(&self, entry: &SampleIndexEntry) -> Result<Tensor, DataError> {
        let mut frames = Vec::with_capacity(self.window_len);
        for i in entry.start_frame..entry.start_frame + self.window_len {
            let path = self.rgb_frame_path(&entry.video_id, i);
            let image = Vision::ensure_min_side(load_frame(&path, ImageType::Rgb8)?, MIN_FRAME_SIDE);
            frames.push(linear_norm(&image_to_tensor(&image, &path)?));
        }
        stack_samples(&frames)
    }

    /// 读取`window_len / 2`帧光流（u、v两个分量），返回`[T, H, W, 2]`
    pub fn load_flow_frames(&self, entry: &SampleIndexEntry) -> Result<Tensor, DataError> {
        let start = flow_start_frame(entry.start_frame);
        let steps = self.window_len / 2;

        let mut frames = Vec::with_capacity(steps);
        for i in start..start + steps {
            let path_u = self.flow_frame_path(&entry.video_id, "u", i);
            let path_v = self.flow_frame_path(&entry.video_id, "v", i);
            let mut image_u = load_frame(&path_u, ImageType::L8)?;
            let mut image_v = load_frame(&path_v, ImageType::L8)?;

            let (width, height) = image_u.dimensions();
            let (width_v, height_v) = image_v.dimensions();
            if (width, height) != (width_v, height_v) {
                return Err(DataError::ShapeMismatch {
                    expected: vec![height as usize, width as usize],
                    got: vec![height_v as usize, width_v as usize],
                });
            }
            // 缩放系数只由u分量算出，两个分量共用
            if let Some(scale) = Vision::min_side_scale(width, height, MIN_FRAME_SIDE) {
                image_u = Vision::scale_image(&image_u, scale);
                image_v = Vision::scale_image(&image_v, scale);
            }

            let u = image_to_tensor(&image_u, &path_u)?;
            let v = image_to_tensor(&image_v, &path_v)?;
            frames.push(linear_norm(&stack_uv(&u, &v)));
        }
        stack_samples(&frames)
    }
}

impl Dataset for AdlDataset {
    fn len(&self) -> usize {
        self.entries.len()
    }

    /// 返回`([C, T, H, W], 标签)`
    fn get(&self, index: usize) -> Result<(Tensor, usize), DataError> {
        let entry = self.sample_at(index)?;
        let frames = match self.mode {
            FrameMode::Rgb => self.load_rgb_frames(entry)?,
            FrameMode::Flow => self.load_flow_frames(entry)?,
        };
        let frames = match &self.transform {
            Some(transform) => transform.apply(frames)?,
            None => frames,
        };
        Ok((video_to_tensor(&frames), entry.label))
    }

    fn label(&self, index: usize) -> Result<usize, DataError> {
        Ok(self.sample_at(index)?.label)
    }
}

impl fmt::Debug for AdlDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdlDataset")
            .field("data_path", &self.data_path)
            .field("mode", &self.mode)
            .field("dataset_split", &self.dataset_split)
            .field("window_len", &self.window_len)
            .field("has_transform", &self.transform.is_some())
            .field("len", &self.entries.len())
            .finish()
    }
}

/// 帧文件名，帧号补零至10位，如`frame_0000000005.jpg`
pub fn frame_file_name(frame: usize) -> String {
    format!("frame_{frame:010}.jpg")
}

/// 光流起始帧：`ceil(start / 2) - 1`，且不小于1
pub fn flow_start_frame(start_frame: usize) -> usize {
    start_frame.div_ceil(2).saturating_sub(1).max(1)
}

fn load_frame(path: &Path, image_type: ImageType) -> Result<DynamicImage, DataError> {
    if !path.is_file() {
        return Err(DataError::FrameNotFound(path.to_path_buf()));
    }
    Vision::load_image(path, image_type).map_err(|source| DataError::FrameDecode {
        path: path.to_path_buf(),
        source,
    })
}

fn image_to_tensor(image: &DynamicImage, path: &Path) -> Result<Tensor, DataError> {
    image
        .to_tensor()
        .map_err(|reason| DataError::FormatError(format!("{path:?}: {reason}")))
}

/// 将两张`[H, W, 1]`的灰度图按通道拼接为`[H, W, 2]`
fn stack_uv(u: &Tensor, v: &Tensor) -> Tensor {
    let shape = u.shape();
    let mut data = Vec::with_capacity(u.size() * 2);
    for (&value_u, &value_v) in u.as_slice().iter().zip(v.as_slice()) {
        data.push(value_u);
        data.push(value_v);
    }
    Tensor::from_vec(data, &[shape[0], shape[1], 2])
}
