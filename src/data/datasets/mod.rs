//! 内置数据集
//!
//! - ADL：按样本索引读取定长帧窗口的动作识别视频数据集（rgb / 光流）
//! - 数字图像域：MNIST、MNIST-M、USPS、SVHN，用于跨域实验

mod adl;
mod digits;
mod idx;
mod sample_index;

use std::path::PathBuf;

pub use adl::{
    AdlConfig, AdlDataset, DEFAULT_WINDOW_LEN, FrameMode, MIN_FRAME_SIDE, flow_start_frame,
    frame_file_name,
};
pub use digits::{
    DIGIT_IMAGE_SIZE, DIGIT_NUM_CLASSES, DigitDataset, DigitDatasetAccess, DigitSplit,
};
pub use idx::{parse_idx_images, parse_idx_labels, write_idx};
pub use sample_index::{SampleIndexEntry, load_sample_index, parse_index_field};

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("video_domain_data")
        .join("datasets")
}
