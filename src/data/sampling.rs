//! 按类别加权的采样策略
//!
//! 为某个域的某个划分生成长度固定的样本访问顺序：
//! - `Natural`：不放回地随机打乱，长度不足时重新打乱接续（即按自然类别频率采样）；
//! - `Balanced`：每个类别总权重相等，有放回采样；
//! - `ClassWeights`：每个类别的总权重由外部给定，有放回采样。

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use crate::data::error::DataError;

#[derive(Debug, Clone, PartialEq)]
pub enum SamplingConfig {
    Natural,
    Balanced,
    ClassWeights(Vec<f64>),
}

impl SamplingConfig {
    /// 为标签序列 `labels` 生成长度为 `n` 的采样下标（下标指向 `labels`）。
    /// `labels` 为空时返回空序列。
    pub fn sample_order<R: Rng + ?Sized>(
        &self,
        labels: &[usize],
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, DataError> {
        if labels.is_empty() || n == 0 {
            return Ok(Vec::new());
        }
        match self {
            SamplingConfig::Natural => Ok(shuffled_cycle(labels.len(), n, rng)),
            SamplingConfig::Balanced => {
                let num_classes = labels.iter().max().map_or(0, |m| m + 1);
                weighted_order(labels, &vec![1.0; num_classes], n, rng)
            }
            SamplingConfig::ClassWeights(class_weights) => {
                weighted_order(labels, class_weights, n, rng)
            }
        }
    }
}

/// 不放回打乱 `0..len`，循环拼接直至长度为 `n`
fn shuffled_cycle<R: Rng + ?Sized>(len: usize, n: usize, rng: &mut R) -> Vec<usize> {
    let mut order = Vec::with_capacity(n);
    while order.len() < n {
        let mut epoch: Vec<usize> = (0..len).collect();
        epoch.shuffle(rng);
        let take = (n - order.len()).min(len);
        order.extend_from_slice(&epoch[..take]);
    }
    order
}

/// 单个样本的权重 = 其类别权重 / 该类别样本数，从而各类别被抽中的总概率与类别权重成正比
fn weighted_order<R: Rng + ?Sized>(
    labels: &[usize],
    class_weights: &[f64],
    n: usize,
    rng: &mut R,
) -> Result<Vec<usize>, DataError> {
    let mut class_counts = vec![0usize; class_weights.len()];
    for &label in labels {
        if label >= class_weights.len() {
            return Err(DataError::InvalidConfig(format!(
                "标签 {label} 超出类别权重的数量 {}",
                class_weights.len()
            )));
        }
        class_counts[label] += 1;
    }

    let sample_weights: Vec<f64> = labels
        .iter()
        .map(|&label| class_weights[label] / class_counts[label] as f64)
        .collect();
    let distribution = WeightedIndex::new(&sample_weights)
        .map_err(|e| DataError::InvalidConfig(format!("类别权重无效: {e}")))?;

    Ok((0..n).map(|_| distribution.sample(rng)).collect())
}
