//! # Video Domain Data
//!
//! `video_domain_data`为动作识别与领域自适应实验提供数据加载工具：
//! - 从帧图像目录按样本索引读取定长（rgb）或半帧率（光流）的视频窗口，输出`[C, T, H, W]`张量；
//! - 将源域与目标域数据集按加权策略和规模策略组合成 train/valid/test 样本对；
//! - 内置 MNIST、MNIST-M、USPS、SVHN 数字图像域。
//!

pub mod data;
pub mod errors;
pub mod tensor;
pub mod utils;
pub mod vision;
