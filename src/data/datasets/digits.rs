//! 数字图像域（MNIST、MNIST-M、USPS、SVHN）
//!
//! 每个域以 IDX 格式（可选 .gz 压缩）存放在 `<data_root>/<域名小写>/` 下：
//! - MNIST、USPS（灰度）：`train-images-idx3-ubyte`、`train-labels-idx1-ubyte`、
//!   `t10k-images-idx3-ubyte`、`t10k-labels-idx1-ubyte`
//! - MNIST-M、SVHN（彩色）：`train-images-idx4-ubyte`、`train-labels-idx1-ubyte`、
//!   `test-images-idx4-ubyte`、`test-labels-idx1-ubyte`
//!
//! 只有 MNIST 支持自动下载。取样时统一缩放到 32x32、扩展到所需通道数并归一化到 [-1, 1]，
//! 输出 `[C, 32, 32]`。

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::data::dataset::{Dataset, check_index};
use crate::data::datasets::idx::{parse_idx_images, parse_idx_labels};
use crate::data::download::download_file;
use crate::data::error::DataError;
use crate::data::multi_domain::DatasetAccess;
use crate::data::transforms::{expand_channels, linear_norm};
use crate::tensor::Tensor;
use crate::vision::Vision;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// MNIST 压缩文件及其 MD5
const MNIST_FILES: [(&str, &str); 4] = [
    (
        "train-images-idx3-ubyte.gz",
        "f68b3c2dcbeaaa9fbdd348bbdeb94873",
    ),
    (
        "train-labels-idx1-ubyte.gz",
        "d53e105ee54ea40749a09fcbcd1e9432",
    ),
    (
        "t10k-images-idx3-ubyte.gz",
        "9fb629c4189551a2d022fa330f9573f3",
    ),
    (
        "t10k-labels-idx1-ubyte.gz",
        "ec29112dd5afa0611ce80d1b7f02629c",
    ),
];

/// 数字图像统一的边长
pub const DIGIT_IMAGE_SIZE: usize = 32;

/// 数字图像的类别数（0-9）
pub const DIGIT_NUM_CLASSES: usize = 10;

/// 可用的数字图像域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitDataset {
    Mnist,
    MnistM,
    Usps,
    Svhn,
}

impl DigitDataset {
    pub const ALL: [DigitDataset; 4] = [
        DigitDataset::Mnist,
        DigitDataset::MnistM,
        DigitDataset::Usps,
        DigitDataset::Svhn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DigitDataset::Mnist => "MNIST",
            DigitDataset::MnistM => "MNISTM",
            DigitDataset::Usps => "USPS",
            DigitDataset::Svhn => "SVHN",
        }
    }

    /// 数据根目录下该域的子目录名
    pub fn dir_name(self) -> &'static str {
        match self {
            DigitDataset::Mnist => "mnist",
            DigitDataset::MnistM => "mnistm",
            DigitDataset::Usps => "usps",
            DigitDataset::Svhn => "svhn",
        }
    }

    /// 原生通道数：MNIST、USPS 为灰度，MNIST-M、SVHN 为 RGB
    pub fn channel_count(self) -> usize {
        match self {
            DigitDataset::Mnist | DigitDataset::Usps => 1,
            DigitDataset::MnistM | DigitDataset::Svhn => 3,
        }
    }

    /// `(图像文件, 标签文件)` 的基础文件名（不含 .gz）
    pub fn file_names(self, train: bool) -> (&'static str, &'static str) {
        match (self.channel_count(), train) {
            (1, true) => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            (1, false) => ("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte"),
            (_, true) => ("train-images-idx4-ubyte", "train-labels-idx1-ubyte"),
            (_, false) => ("test-images-idx4-ubyte", "test-labels-idx1-ubyte"),
        }
    }

    pub fn is_downloadable(self) -> bool {
        self == DigitDataset::Mnist
    }

    /// 为源域和目标域创建访问器
    ///
    /// 返回 `(源域访问器, 目标域访问器, 通道数)`。通道数取两个域原生通道数的较大者，
    /// 两个访问器产出的样本都扩展到该通道数。此处不读取任何文件。
    pub fn get_source_target(
        source: DigitDataset,
        target: DigitDataset,
        data_path: impl AsRef<Path>,
    ) -> (DigitDatasetAccess, DigitDatasetAccess, usize) {
        let num_channels = source.channel_count().max(target.channel_count());
        let data_path = data_path.as_ref();
        log::debug!(
            "源域 {source} -> 目标域 {target}，通道数 {num_channels}，数据目录 {data_path:?}"
        );
        (
            DigitDatasetAccess::new(source, data_path, num_channels),
            DigitDatasetAccess::new(target, data_path, num_channels),
            num_channels,
        )
    }
}

impl FromStr for DigitDataset {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MNIST" => Ok(DigitDataset::Mnist),
            "MNISTM" | "MNIST-M" => Ok(DigitDataset::MnistM),
            "USPS" => Ok(DigitDataset::Usps),
            "SVHN" => Ok(DigitDataset::Svhn),
            _ => Err(DataError::UnknownDataset(s.to_string())),
        }
    }
}

impl fmt::Display for DigitDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个数字图像域的访问器，按需从硬盘加载训练/测试划分
#[derive(Debug, Clone)]
pub struct DigitDatasetAccess {
    dataset: DigitDataset,
    data_dir: PathBuf,
    num_channels: usize,
    image_size: usize,
    download: bool,
}

impl DigitDatasetAccess {
    /// # 参数
    /// - `dataset`: 数字图像域
    /// - `data_root`: 数据根目录，该域的文件位于 `<data_root>/<dir_name>/`
    /// - `num_channels`: 输出样本的通道数，不得小于该域的原生通道数
    pub fn new(dataset: DigitDataset, data_root: impl AsRef<Path>, num_channels: usize) -> Self {
        Self {
            dataset,
            data_dir: data_root.as_ref().join(dataset.dir_name()),
            num_channels,
            image_size: DIGIT_IMAGE_SIZE,
            download: true,
        }
    }

    /// 文件缺失时是否自动下载（仅对 MNIST 生效）
    pub fn download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    /// 输出图像的边长，默认32
    pub fn image_size(mut self, image_size: usize) -> Self {
        self.image_size = image_size;
        self
    }

    pub fn dataset(&self) -> DigitDataset {
        self.dataset
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// 加载训练（`train = true`）或测试划分
    pub fn load_split(&self, train: bool) -> Result<DigitSplit, DataError> {
        let (images_file, labels_file) = self.dataset.file_names(train);
        let images_path = self.ensure_file(images_file)?;
        let labels_path = self.ensure_file(labels_file)?;

        let images = parse_idx_images(&images_path)?;
        let labels = parse_idx_labels(&labels_path)?;
        log::info!(
            "{} {} 样本数: {}",
            self.dataset,
            if train { "train" } else { "test" },
            labels.len()
        );

        DigitSplit::new(images, labels, self.num_channels, self.image_size)
    }

    /// 确保文件存在（优先未压缩版本），必要时下载
    fn ensure_file(&self, base_name: &str) -> Result<PathBuf, DataError> {
        let uncompressed_path = self.data_dir.join(base_name);
        if uncompressed_path.exists() {
            return Ok(uncompressed_path);
        }

        let gz_name = format!("{base_name}.gz");
        let gz_path = self.data_dir.join(&gz_name);
        if gz_path.exists() {
            return Ok(gz_path);
        }

        if self.download && self.dataset.is_downloadable() {
            let md5 = MNIST_FILES
                .iter()
                .find(|(name, _)| *name == gz_name)
                .map(|(_, md5)| *md5);
            std::fs::create_dir_all(&self.data_dir)?;
            download_file(&format!("{MNIST_BASE_URL}{gz_name}"), &gz_path, md5)?;
            Ok(gz_path)
        } else {
            Err(DataError::FileNotFound(uncompressed_path))
        }
    }
}

impl DatasetAccess for DigitDatasetAccess {
    fn train_dataset(&self) -> Result<Arc<dyn Dataset>, DataError> {
        Ok(Arc::new(self.load_split(true)?))
    }

    fn test_dataset(&self) -> Result<Arc<dyn Dataset>, DataError> {
        Ok(Arc::new(self.load_split(false)?))
    }

    fn num_classes(&self) -> usize {
        DIGIT_NUM_CLASSES
    }
}

/// 一个数字图像划分：原始像素 `[N, H, W, C]`（0-255）及其标签
///
/// 取样时才做缩放、通道扩展和归一化，返回 `[num_channels, image_size, image_size]`。
#[derive(Debug, Clone)]
pub struct DigitSplit {
    images: Tensor,
    labels: Vec<usize>,
    num_channels: usize,
    image_size: usize,
}

impl DigitSplit {
    pub fn new(
        images: Tensor,
        labels: Vec<usize>,
        num_channels: usize,
        image_size: usize,
    ) -> Result<Self, DataError> {
        let shape = images.shape();
        if shape.len() != 4 || shape[0] != labels.len() {
            return Err(DataError::ShapeMismatch {
                expected: vec![labels.len(), 0, 0, 0],
                got: shape.to_vec(),
            });
        }
        if shape[3] > num_channels {
            return Err(DataError::InvalidConfig(format!(
                "输出通道数 {num_channels} 小于图像的原生通道数 {}",
                shape[3]
            )));
        }
        Ok(Self {
            images,
            labels,
            num_channels,
            image_size,
        })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// 未经处理的原始像素 `[N, H, W, C]`
    pub fn raw_images(&self) -> &Tensor {
        &self.images
    }
}

impl Dataset for DigitSplit {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, usize), DataError> {
        check_index(index, self.len())?;
        let image = self.images.select(0, index);

        let shape = image.shape();
        let image = if shape[0] == self.image_size && shape[1] == self.image_size {
            image
        } else {
            Vision::resize_image(&image, self.image_size, self.image_size, false)
                .map_err(DataError::FormatError)?
        };
        let image = linear_norm(&expand_channels(&image, self.num_channels)?);

        Ok((image.permute(&[2, 0, 1]), self.labels[index]))
    }

    fn label(&self, index: usize) -> Result<usize, DataError> {
        check_index(index, self.len())?;
        Ok(self.labels[index])
    }
}
