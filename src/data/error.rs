//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如 magic number 不匹配）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 下载错误
    #[error("下载错误: {0}")]
    DownloadError(String),

    /// 校验和不匹配
    #[error("校验和不匹配: 期望 {expected}, 实际 {got}")]
    ChecksumMismatch { expected: String, got: String },

    /// 样本索引文件无法打开或解析
    #[error("样本索引文件 {path:?} 无效: {reason}")]
    DatasetIndex { path: PathBuf, reason: String },

    /// 样本索引中的数值字段不是合法的非负整数文本
    #[error("样本索引第 {row} 行第 {column} 列不是合法的非负整数: {value:?}")]
    IndexFieldFormat {
        row: usize,
        column: usize,
        value: String,
    },

    /// 帧图像文件不存在
    #[error("帧图像不存在: {0}")]
    FrameNotFound(PathBuf),

    /// 帧图像无法解码
    #[error("帧图像 {path:?} 解码失败: {source}")]
    FrameDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 配置不合法
    #[error("配置不合法: {0}")]
    InvalidConfig(String),

    /// 多域数据集尚未调用 `prepare()`
    #[error("数据集尚未准备，请先调用 prepare()")]
    NotPrepared,

    /// 未知的数据集名称
    #[error("未知的数据集: {0}")]
    UnknownDataset(String),
}
