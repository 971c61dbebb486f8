/*
 * @Author       : 老董
 * @Date         : 2025-01-21
 * @Description  : 批量加载器：把任意 `Dataset` 的样本按批读取并堆叠
 *
 * 样本按下标逐个从数据集读取（如从硬盘解码视频帧），任一样本失败都会原样返回该错误。
 */

use std::vec;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::dataset::Dataset;
use crate::data::error::DataError;
use crate::tensor::Tensor;

/// 按批读取数据集的加载器
///
/// # 示例
/// ```ignore
/// let dataset = AdlDataset::new(data_path, list_path, FrameMode::Rgb, "train")?;
/// let loader = DataLoader::new(dataset, 8).shuffle(true).drop_last(true);
///
/// for batch in loader.iter() {
///     let (videos, labels) = batch?; // videos: [N, C, T, H, W]
/// }
/// ```
pub struct DataLoader<D: Dataset> {
    dataset: D,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl<D: Dataset> DataLoader<D> {
    /// # Panics
    /// `batch_size` 为0时
    pub fn new(dataset: D, batch_size: usize) -> Self {
        assert!(batch_size > 0, "DataLoader: batch_size 必须大于 0");
        Self {
            dataset,
            batch_size,
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }

    /// 每轮迭代前是否打乱样本顺序
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 样本数不足一批的尾部是否丢弃
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 固定打乱所用的随机种子；未设置时每轮使用系统随机源
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn num_batches(&self) -> usize {
        let full = self.dataset.len() / self.batch_size;
        let has_tail = self.dataset.len() % self.batch_size != 0;
        if has_tail && !self.drop_last {
            full + 1
        } else {
            full
        }
    }

    /// 样本总数
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// 生成本轮的批次划分，随后惰性读取样本
    pub fn iter(&self) -> DataLoaderIterator<'_, D> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            order.shuffle(&mut rng);
        }

        let batches: Vec<Vec<usize>> = order
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(<[usize]>::to_vec)
            .collect();

        DataLoaderIterator {
            dataset: &self.dataset,
            batches: batches.into_iter(),
        }
    }
}

/// `DataLoader::iter` 返回的迭代器，每项为 `(堆叠后的样本, 标签)`
pub struct DataLoaderIterator<'a, D: Dataset> {
    dataset: &'a D,
    batches: vec::IntoIter<Vec<usize>>,
}

impl<D: Dataset> Iterator for DataLoaderIterator<'_, D> {
    type Item = Result<(Tensor, Vec<usize>), DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.batches.next()?;
        Some(collate(self.dataset, &indices))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.batches.size_hint()
    }
}

/// 按下标读取样本，并在新增的首个维度上堆叠为批次
fn collate<D: Dataset + ?Sized>(
    dataset: &D,
    indices: &[usize],
) -> Result<(Tensor, Vec<usize>), DataError> {
    let (samples, labels): (Vec<Tensor>, Vec<usize>) = indices
        .iter()
        .map(|&index| dataset.get(index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unzip();
    Ok((stack_samples(&samples)?, labels))
}

/// 堆叠形状一致的样本；形状不一致时返回错误而非panic
pub(crate) fn stack_samples(samples: &[Tensor]) -> Result<Tensor, DataError> {
    if let Some(first) = samples.first() {
        if let Some(bad) = samples.iter().find(|s| !s.is_same_shape(first)) {
            return Err(DataError::ShapeMismatch {
                expected: first.shape().to_vec(),
                got: bad.shape().to_vec(),
            });
        }
    }
    let refs: Vec<&Tensor> = samples.iter().collect();
    Ok(Tensor::stack(&refs))
}
