//! 数据加载模块
//!
//! 提供视频帧窗口数据集、多域数据集组合、数据变换和批处理功能。
//!
//! # 主要组件
//!
//! - [`AdlDataset`]: 按样本索引读取定长帧窗口的动作识别视频数据集
//! - [`MultiDomainDatasets`]: 将源域与目标域配对为 train/valid/test 划分
//! - [`DigitDataset`]: MNIST、MNIST-M、USPS、SVHN 数字图像域
//! - [`DataLoader`]: `PyTorch` 风格的数据批量加载器
//! - [`transforms`]: 数据变换（线性归一化、视频裁剪/翻转等）
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use video_domain_data::data::{AdlDataset, DataLoader, FrameMode};
//!
//! let dataset = AdlDataset::new("/data/adl", "/data/adl/train.pkl", FrameMode::Rgb, "train")?;
//! let loader = DataLoader::new(dataset, 8)
//!     .shuffle(true)
//!     .seed(42);
//!
//! for batch in loader.iter() {
//!     let (videos, labels) = batch?; // videos: [8, 3, 16, H, W]
//! }
//! ```

mod config;
mod dataloader;
mod dataset;
pub mod datasets;
pub mod download;
pub mod error;
pub mod multi_domain;
pub mod sampling;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::load_json_config;
pub use dataloader::{DataLoader, DataLoaderIterator};
pub use dataset::{Dataset, Subset, TensorDataset};
pub use datasets::{
    AdlConfig, AdlDataset, DigitDataset, DigitDatasetAccess, DigitSplit, FrameMode,
    SampleIndexEntry, default_data_dir,
};
pub use error::DataError;
pub use multi_domain::{
    DatasetAccess, DatasetSizeType, DomainBatch, DomainPair, MultiDomainConfig,
    MultiDomainDatasets, MultiDomainLoader, SplitType, WeightingType,
};
pub use sampling::SamplingConfig;
