/*
 * @Author       : 老董
 * @Date         : 2025-03-09
 * @Description  : 多域数据集组合器 - 将源域与目标域配对为 train/valid/test 三个划分
 *
 * 每个域由一个 `DatasetAccess` 提供训练集、测试集和类别数。
 * `prepare()` 之后，第 i 个样本对由各域在该划分上的采样顺序决定：
 * - 采样顺序由加权策略（natural / balanced / preset0）生成；
 * - 采样顺序的长度（即划分长度）由规模策略（max / source）决定；
 * - 可选的类别子集会作用于两个域的所有划分。
 */

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::data::config::load_json_config;
use crate::data::dataloader::stack_samples;
use crate::data::dataset::{Dataset, Subset, check_index};
use crate::data::error::DataError;
use crate::data::sampling::SamplingConfig;
use crate::tensor::Tensor;

/// 样本加权策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingType {
    /// 按各类别的自然频率采样
    #[default]
    Natural,
    /// 各类别等概率采样
    Balanced,
    /// 源域类别权重为 `n, n-1, .., 1`，目标域类别权重随机取自 `1..4`
    Preset0,
}

impl FromStr for WeightingType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "natural" => Ok(WeightingType::Natural),
            "balanced" => Ok(WeightingType::Balanced),
            "preset0" => Ok(WeightingType::Preset0),
            other => Err(DataError::InvalidConfig(format!(
                "未知的加权策略 `{other}`，仅支持 natural/balanced/preset0"
            ))),
        }
    }
}

impl fmt::Display for WeightingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeightingType::Natural => "natural",
            WeightingType::Balanced => "balanced",
            WeightingType::Preset0 => "preset0",
        })
    }
}

/// 组合后数据集规模的计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSizeType {
    /// 两个域中较大者的样本数
    #[default]
    Max,
    /// 源域的样本数
    Source,
}

impl DatasetSizeType {
    pub fn size(self, source_len: usize, target_len: usize) -> usize {
        match self {
            DatasetSizeType::Max => source_len.max(target_len),
            DatasetSizeType::Source => source_len,
        }
    }
}

impl FromStr for DatasetSizeType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" => Ok(DatasetSizeType::Max),
            "source" => Ok(DatasetSizeType::Source),
            other => Err(DataError::InvalidConfig(format!(
                "未知的规模策略 `{other}`，仅支持 max/source"
            ))),
        }
    }
}

impl fmt::Display for DatasetSizeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatasetSizeType::Max => "max",
            DatasetSizeType::Source => "source",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitType {
    Train,
    Valid,
    Test,
}

impl SplitType {
    pub const ALL: [SplitType; 3] = [SplitType::Train, SplitType::Valid, SplitType::Test];

    fn position(self) -> usize {
        match self {
            SplitType::Train => 0,
            SplitType::Valid => 1,
            SplitType::Test => 2,
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SplitType::Train => "train",
            SplitType::Valid => "valid",
            SplitType::Test => "test",
        })
    }
}

/// 单个域的数据访问能力：训练集、测试集与类别数
///
/// 源域与目标域的类别数是否一致由调用方保证。
pub trait DatasetAccess: Send + Sync {
    fn train_dataset(&self) -> Result<Arc<dyn Dataset>, DataError>;
    fn test_dataset(&self) -> Result<Arc<dyn Dataset>, DataError>;
    fn num_classes(&self) -> usize;
}

impl<A: DatasetAccess + ?Sized> DatasetAccess for Arc<A> {
    fn train_dataset(&self) -> Result<Arc<dyn Dataset>, DataError> {
        (**self).train_dataset()
    }

    fn test_dataset(&self) -> Result<Arc<dyn Dataset>, DataError> {
        (**self).test_dataset()
    }

    fn num_classes(&self) -> usize {
        (**self).num_classes()
    }
}

/// 多域组合配置，可从 JSON 文件加载，缺省字段取默认值
///
/// ```json
/// { "weight_type": "balanced", "size_type": "source", "class_ids": [1, 3, 8] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MultiDomainConfig {
    pub weight_type: WeightingType,
    pub size_type: DatasetSizeType,
    /// 从训练集中留作验证集的比例，取值 `[0, 1)`
    pub val_split_ratio: f64,
    /// 只保留这些类别的样本
    pub class_ids: Option<Vec<usize>>,
    /// 目标域每个类别保留的有标签样本数，大于0时为半监督模式
    pub n_fewshot: Option<usize>,
    pub seed: u64,
}

impl Default for MultiDomainConfig {
    fn default() -> Self {
        Self {
            weight_type: WeightingType::default(),
            size_type: DatasetSizeType::default(),
            val_split_ratio: 0.0,
            class_ids: None,
            n_fewshot: None,
            seed: 0,
        }
    }
}

impl MultiDomainConfig {
    pub fn new(weight_type: WeightingType, size_type: DatasetSizeType) -> Self {
        Self {
            weight_type,
            size_type,
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DataError> {
        let config: Self = load_json_config(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn val_split_ratio(mut self, ratio: f64) -> Self {
        self.val_split_ratio = ratio;
        self
    }

    pub fn class_ids(mut self, class_ids: Vec<usize>) -> Self {
        self.class_ids = Some(class_ids);
        self
    }

    pub fn n_fewshot(mut self, n_fewshot: usize) -> Self {
        self.n_fewshot = Some(n_fewshot);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if !(0.0..1.0).contains(&self.val_split_ratio) {
            return Err(DataError::InvalidConfig(format!(
                "val_split_ratio 必须在 [0, 1) 内，实际为 {}",
                self.val_split_ratio
            )));
        }
        Ok(())
    }

    pub fn is_semi_supervised(&self) -> bool {
        self.n_fewshot.is_some_and(|n| n > 0)
    }
}

/// 一个样本对
#[derive(Debug, Clone)]
pub struct DomainPair {
    pub source: (Tensor, usize),
    /// 半监督模式下训练划分的目标域样本不带标签
    pub target: (Tensor, Option<usize>),
    /// 半监督模式下训练划分额外附带的有标签目标域样本
    pub labeled_target: Option<(Tensor, usize)>,
}

/// 一个批次的样本对，张量在首维堆叠
#[derive(Debug, Clone)]
pub struct DomainBatch {
    pub source: (Tensor, Vec<usize>),
    pub target: (Tensor, Vec<Option<usize>>),
    pub labeled_target: Option<(Tensor, Vec<usize>)>,
}

struct DomainSplits {
    train: Subset,
    valid: Subset,
    test: Subset,
}

impl DomainSplits {
    fn get(&self, split: SplitType) -> &Subset {
        match split {
            SplitType::Train => &self.train,
            SplitType::Valid => &self.valid,
            SplitType::Test => &self.test,
        }
    }
}

/// 某个划分上的采样顺序，元素为对应 `Subset` 内的位置
#[derive(Debug, Clone, PartialEq)]
struct SplitOrder {
    len: usize,
    source: Vec<usize>,
    target: Vec<usize>,
    labeled_target: Vec<usize>,
}

struct Prepared {
    source: DomainSplits,
    target: DomainSplits,
    labeled_target: Option<Subset>,
    orders: Vec<SplitOrder>,
}

/// 源域与目标域的组合数据集
///
/// # 示例
/// ```ignore
/// let (source, target, _) = DigitDataset::get_source_target(
///     DigitDataset::Mnist, DigitDataset::MnistM, default_data_dir());
/// let config = MultiDomainConfig::new(WeightingType::Balanced, DatasetSizeType::Source)
///     .class_ids(vec![1, 3, 8]);
/// let mut dataset = MultiDomainDatasets::new(source, target, config)?;
/// dataset.prepare()?;
/// for batch in dataset.domain_loader(SplitType::Train, 64)?.iter() {
///     let batch = batch?;
/// }
/// ```
pub struct MultiDomainDatasets<S: DatasetAccess, T: DatasetAccess> {
    source_access: S,
    target_access: T,
    config: MultiDomainConfig,
    prepared: Option<Prepared>,
}

impl<S: DatasetAccess, T: DatasetAccess> MultiDomainDatasets<S, T> {
    pub fn new(source_access: S, target_access: T, config: MultiDomainConfig) -> Result<Self, DataError> {
        config.validate()?;
        Ok(Self {
            source_access,
            target_access,
            config,
            prepared: None,
        })
    }

    pub fn config(&self) -> &MultiDomainConfig {
        &self.config
    }

    pub fn source_access(&self) -> &S {
        &self.source_access
    }

    pub fn target_access(&self) -> &T {
        &self.target_access
    }

    pub fn num_classes(&self) -> usize {
        self.source_access.num_classes()
    }

    pub fn is_semi_supervised(&self) -> bool {
        self.config.is_semi_supervised()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// 加载两个域的数据并生成各划分及其采样顺序
    ///
    /// 结果只由配置（含 `seed`）决定；已准备过时直接返回。
    pub fn prepare(&mut self) -> Result<(), DataError> {
        if self.prepared.is_some() {
            return Ok(());
        }

        let mut source_rng = StdRng::seed_from_u64(self.config.seed);
        let mut target_rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));

        let source = self.load_domain(&self.source_access, &mut source_rng)?;
        let mut target = self.load_domain(&self.target_access, &mut target_rng)?;

        let labeled_target = match self.config.n_fewshot {
            Some(n_fewshot) if n_fewshot > 0 => {
                let (labeled, unlabeled) = split_fewshot(&target.train, n_fewshot, &mut target_rng)?;
                log::info!(
                    "目标域少样本划分: 有标签 {}，无标签 {}",
                    labeled.len(),
                    unlabeled.len()
                );
                target.train = unlabeled;
                Some(labeled)
            }
            _ => None,
        };

        let (source_sampling, target_sampling) =
            sampling_configs(self.config.weight_type, self.num_classes(), &mut target_rng);

        let mut orders = Vec::with_capacity(SplitType::ALL.len());
        for split in SplitType::ALL {
            let source_split = source.get(split);
            let target_split = target.get(split);
            let n = self.config.size_type.size(source_split.len(), target_split.len());

            let source_order =
                source_sampling.sample_order(&source_split.labels()?, n, &mut source_rng)?;
            let target_order =
                target_sampling.sample_order(&target_split.labels()?, n, &mut target_rng)?;
            let labeled_target_order = match (&labeled_target, split) {
                (Some(labeled), SplitType::Train) => {
                    target_sampling.sample_order(&labeled.labels()?, n, &mut target_rng)?
                }
                _ => Vec::new(),
            };

            log::info!(
                "{split:5} 源域 {} / 目标域 {} 样本，组合规模 {n}",
                source_split.len(),
                target_split.len()
            );
            orders.push(SplitOrder {
                len: n,
                source: source_order,
                target: target_order,
                labeled_target: labeled_target_order,
            });
        }

        self.prepared = Some(Prepared {
            source,
            target,
            labeled_target,
            orders,
        });
        Ok(())
    }

    fn load_domain<A: DatasetAccess>(
        &self,
        access: &A,
        rng: &mut StdRng,
    ) -> Result<DomainSplits, DataError> {
        let train = self.filter(Subset::full(access.train_dataset()?))?;
        let test = self.filter(Subset::full(access.test_dataset()?))?;
        let (train, valid) = hold_out(&train, self.config.val_split_ratio, rng);
        Ok(DomainSplits { train, valid, test })
    }

    fn filter(&self, subset: Subset) -> Result<Subset, DataError> {
        match &self.config.class_ids {
            Some(class_ids) => subset.filter_classes(class_ids),
            None => Ok(subset),
        }
    }

    fn prepared(&self) -> Result<&Prepared, DataError> {
        self.prepared.as_ref().ok_or(DataError::NotPrepared)
    }

    /// 训练划分的组合规模；未准备时为0
    pub fn len(&self) -> usize {
        self.split_len(SplitType::Train)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定划分的组合规模；未准备时为0
    pub fn split_len(&self, split: SplitType) -> usize {
        self.prepared
            .as_ref()
            .map_or(0, |prepared| prepared.orders[split.position()].len)
    }

    /// 指定划分中某个域（`source = true` 为源域）经过类别过滤后的样本数
    pub fn domain_len(&self, split: SplitType, source: bool) -> Result<usize, DataError> {
        let prepared = self.prepared()?;
        let splits = if source {
            &prepared.source
        } else {
            &prepared.target
        };
        Ok(splits.get(split).len())
    }

    /// 训练划分的第 `index` 个样本对
    pub fn get(&self, index: usize) -> Result<DomainPair, DataError> {
        self.get_split(SplitType::Train, index)
    }

    pub fn get_split(&self, split: SplitType, index: usize) -> Result<DomainPair, DataError> {
        let prepared = self.prepared()?;
        check_index(index, self.split_len(split))?;
        let order = &prepared.orders[split.position()];

        let (source_image, source_label) =
            prepared.source.get(split).get(position_at(&order.source, index)?)?;
        let (target_image, target_label) =
            prepared.target.get(split).get(position_at(&order.target, index)?)?;

        let semi_supervised_train = split == SplitType::Train && prepared.labeled_target.is_some();
        let labeled_target = match (&prepared.labeled_target, split) {
            (Some(labeled), SplitType::Train) => {
                Some(labeled.get(position_at(&order.labeled_target, index)?)?)
            }
            _ => None,
        };

        Ok(DomainPair {
            source: (source_image, source_label),
            target: (
                target_image,
                (!semi_supervised_train).then_some(target_label),
            ),
            labeled_target,
        })
    }

    /// 按顺序成批读取指定划分，批次数为 `max(规模 / batch_size, 1)`
    pub fn domain_loader(
        &self,
        split: SplitType,
        batch_size: usize,
    ) -> Result<MultiDomainLoader<'_, S, T>, DataError> {
        self.prepared()?;
        if batch_size == 0 {
            return Err(DataError::InvalidConfig("batch_size 必须大于 0".to_string()));
        }
        Ok(MultiDomainLoader {
            datasets: self,
            split,
            batch_size,
        })
    }
}

impl<S: DatasetAccess, T: DatasetAccess> fmt::Debug for MultiDomainDatasets<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiDomainDatasets")
            .field("config", &self.config)
            .field("prepared", &self.is_prepared())
            .field("len", &self.len())
            .finish()
    }
}

/// 多域数据集的批量加载器
pub struct MultiDomainLoader<'a, S: DatasetAccess, T: DatasetAccess> {
    datasets: &'a MultiDomainDatasets<S, T>,
    split: SplitType,
    batch_size: usize,
}

impl<'a, S: DatasetAccess, T: DatasetAccess> MultiDomainLoader<'a, S, T> {
    pub fn num_batches(&self) -> usize {
        (self.datasets.split_len(self.split) / self.batch_size).max(1)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn iter(&self) -> MultiDomainLoaderIterator<'a, S, T> {
        MultiDomainLoaderIterator {
            datasets: self.datasets,
            split: self.split,
            batch_size: self.batch_size,
            num_batches: self.num_batches(),
            current_batch: 0,
        }
    }
}

pub struct MultiDomainLoaderIterator<'a, S: DatasetAccess, T: DatasetAccess> {
    datasets: &'a MultiDomainDatasets<S, T>,
    split: SplitType,
    batch_size: usize,
    num_batches: usize,
    current_batch: usize,
}

impl<S: DatasetAccess, T: DatasetAccess> Iterator for MultiDomainLoaderIterator<'_, S, T> {
    type Item = Result<DomainBatch, DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_batch >= self.num_batches {
            return None;
        }
        let n = self.datasets.split_len(self.split);
        let start = self.current_batch * self.batch_size;
        let end = (start + self.batch_size).min(n);
        if start >= end {
            return None;
        }
        self.current_batch += 1;

        Some(collate_pairs(self.datasets, self.split, start..end))
    }
}

fn collate_pairs<S: DatasetAccess, T: DatasetAccess>(
    datasets: &MultiDomainDatasets<S, T>,
    split: SplitType,
    range: std::ops::Range<usize>,
) -> Result<DomainBatch, DataError> {
    let mut source_images = Vec::with_capacity(range.len());
    let mut source_labels = Vec::with_capacity(range.len());
    let mut target_images = Vec::with_capacity(range.len());
    let mut target_labels = Vec::with_capacity(range.len());
    let mut labeled_images = Vec::new();
    let mut labeled_labels = Vec::new();

    for index in range {
        let pair = datasets.get_split(split, index)?;
        source_images.push(pair.source.0);
        source_labels.push(pair.source.1);
        target_images.push(pair.target.0);
        target_labels.push(pair.target.1);
        if let Some((image, label)) = pair.labeled_target {
            labeled_images.push(image);
            labeled_labels.push(label);
        }
    }

    let labeled_target = if labeled_images.is_empty() {
        None
    } else {
        Some((stack_samples(&labeled_images)?, labeled_labels))
    };
    Ok(DomainBatch {
        source: (stack_samples(&source_images)?, source_labels),
        target: (stack_samples(&target_images)?, target_labels),
        labeled_target,
    })
}

/// 采样顺序为空（该域在此划分上没有样本）时报越界
fn position_at(order: &[usize], index: usize) -> Result<usize, DataError> {
    order.get(index).copied().ok_or(DataError::IndexOutOfBounds {
        index,
        len: order.len(),
    })
}

/// 源域与目标域各自的采样配置
fn sampling_configs<R: Rng + ?Sized>(
    weight_type: WeightingType,
    num_classes: usize,
    rng: &mut R,
) -> (SamplingConfig, SamplingConfig) {
    match weight_type {
        WeightingType::Natural => (SamplingConfig::Natural, SamplingConfig::Natural),
        WeightingType::Balanced => (SamplingConfig::Balanced, SamplingConfig::Balanced),
        WeightingType::Preset0 => {
            let source_weights = (1..=num_classes).rev().map(|w| w as f64).collect();
            let target_weights = (0..num_classes)
                .map(|_| rng.gen_range(1..4) as f64)
                .collect();
            (
                SamplingConfig::ClassWeights(source_weights),
                SamplingConfig::ClassWeights(target_weights),
            )
        }
    }
}

/// 随机留出 `floor(n * ratio)` 个样本作为验证集，返回 `(训练集, 验证集)`，两者下标均升序
fn hold_out(subset: &Subset, ratio: f64, rng: &mut StdRng) -> (Subset, Subset) {
    let mut indices = subset.indices().to_vec();
    indices.shuffle(rng);
    let n_valid = (indices.len() as f64 * ratio).floor() as usize;

    let mut valid = indices[..n_valid].to_vec();
    let mut train = indices[n_valid..].to_vec();
    valid.sort_unstable();
    train.sort_unstable();
    (
        Subset::new(subset.dataset(), train),
        Subset::new(subset.dataset(), valid),
    )
}

/// 每个类别随机保留 `n_fewshot` 个有标签样本，返回 `(有标签, 无标签)`
fn split_fewshot(
    train: &Subset,
    n_fewshot: usize,
    rng: &mut StdRng,
) -> Result<(Subset, Subset), DataError> {
    let labels = train.labels()?;
    let mut positions: Vec<usize> = (0..train.len()).collect();
    positions.shuffle(rng);

    let mut taken = std::collections::HashMap::new();
    let mut labeled = Vec::new();
    let mut unlabeled = Vec::new();
    for position in positions {
        let count = taken.entry(labels[position]).or_insert(0usize);
        if *count < n_fewshot {
            *count += 1;
            labeled.push(train.indices()[position]);
        } else {
            unlabeled.push(train.indices()[position]);
        }
    }
    labeled.sort_unstable();
    unlabeled.sort_unstable();
    Ok((
        Subset::new(train.dataset(), labeled),
        Subset::new(train.dataset(), unlabeled),
    ))
}
