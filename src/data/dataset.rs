//! 数据集抽象
//!
//! 所有数据集（视频帧窗口、数字图像等）都以 `(样本张量, 类别标签)` 的形式按下标访问。
//! 访问只读、不修改数据集自身状态，因而同一数据集可被多个加载线程共享。

use std::fmt;
use std::sync::Arc;

use crate::data::error::DataError;
use crate::tensor::Tensor;

/// 可按下标访问的带标签数据集
pub trait Dataset: Send + Sync + fmt::Debug {
    /// 样本数量
    fn len(&self) -> usize;

    /// 获取第 `index` 个样本及其标签
    fn get(&self, index: usize) -> Result<(Tensor, usize), DataError>;

    /// 仅获取第 `index` 个样本的标签。
    /// 默认实现会加载整个样本，持有标签列表的数据集应覆盖此方法。
    fn label(&self, index: usize) -> Result<usize, DataError> {
        self.get(index).map(|(_, label)| label)
    }

    /// 数据集是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, usize), DataError> {
        (**self).get(index)
    }

    fn label(&self, index: usize) -> Result<usize, DataError> {
        (**self).label(index)
    }
}

/// 越界检查，供各数据集实现复用
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), DataError> {
    if index >= len {
        return Err(DataError::IndexOutOfBounds { index, len });
    }
    Ok(())
}

/// TensorDataset - 持有全部样本与标签的内存数据集
///
/// # 示例
/// ```ignore
/// let dataset = TensorDataset::new(features, labels);
/// println!("样本数: {}", dataset.len());
/// ```
#[derive(Debug, Clone)]
pub struct TensorDataset {
    features: Tensor,
    labels: Vec<usize>,
}

impl TensorDataset {
    /// 创建新的 TensorDataset
    ///
    /// # 参数
    /// - `features`: 特征张量，第一维为样本数
    /// - `labels`: 每个样本的类别标签（数量必须与 features 第一维一致）
    ///
    /// # Panics
    /// 如果 features 和 labels 的样本数不一致
    pub fn new(features: Tensor, labels: Vec<usize>) -> Self {
        assert!(
            features.dimension() >= 1,
            "TensorDataset: features 至少需要1个维度"
        );
        assert_eq!(
            features.shape()[0],
            labels.len(),
            "TensorDataset: features 和 labels 的样本数必须一致，得到 {} vs {}",
            features.shape()[0],
            labels.len()
        );
        Self { features, labels }
    }

    /// 获取特征张量引用
    pub fn features(&self) -> &Tensor {
        &self.features
    }

    /// 获取标签列表引用
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

impl Dataset for TensorDataset {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, usize), DataError> {
        check_index(index, self.len())?;
        Ok((self.features.select(0, index), self.labels[index]))
    }

    fn label(&self, index: usize) -> Result<usize, DataError> {
        check_index(index, self.len())?;
        Ok(self.labels[index])
    }
}

/// Subset - 以下标列表引用另一个数据集的一部分样本
#[derive(Clone)]
pub struct Subset {
    dataset: Arc<dyn Dataset>,
    indices: Vec<usize>,
}

impl Subset {
    pub fn new(dataset: Arc<dyn Dataset>, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// 包含底层数据集全部样本的子集
    pub fn full(dataset: Arc<dyn Dataset>) -> Self {
        let indices = (0..dataset.len()).collect();
        Self { dataset, indices }
    }

    /// 底层数据集
    pub fn dataset(&self) -> Arc<dyn Dataset> {
        Arc::clone(&self.dataset)
    }

    /// 子集中各样本在底层数据集中的下标
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 仅保留标签属于 `class_ids` 的样本
    pub fn filter_classes(&self, class_ids: &[usize]) -> Result<Self, DataError> {
        let mut indices = Vec::new();
        for &index in &self.indices {
            if class_ids.contains(&self.dataset.label(index)?) {
                indices.push(index);
            }
        }
        Ok(Self {
            dataset: Arc::clone(&self.dataset),
            indices,
        })
    }

    /// 子集中所有样本的标签
    pub fn labels(&self) -> Result<Vec<usize>, DataError> {
        self.indices
            .iter()
            .map(|&index| self.dataset.label(index))
            .collect()
    }
}

impl fmt::Debug for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subset")
            .field("len", &self.indices.len())
            .finish()
    }
}

impl Dataset for Subset {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, usize), DataError> {
        check_index(index, self.len())?;
        self.dataset.get(self.indices[index])
    }

    fn label(&self, index: usize) -> Result<usize, DataError> {
        check_index(index, self.len())?;
        self.dataset.label(self.indices[index])
    }
}
