//! DataLoader 单元测试

use std::sync::Arc;

use crate::assert_err;
use crate::data::{DataError, DataLoader, Dataset, Subset, TensorDataset};
use crate::tensor::Tensor;

fn range_dataset(n: usize) -> TensorDataset {
    let features = Tensor::new(&(0..n * 2).map(|x| x as f32).collect::<Vec<_>>(), &[n, 2]);
    TensorDataset::new(features, (0..n).map(|x| x % 3).collect())
}

#[test]
fn test_dataloader_basic() {
    let loader = DataLoader::new(range_dataset(10), 3);
    assert_eq!(loader.len(), 10);
    assert_eq!(loader.num_batches(), 4); // 10 / 3 = 3.33, 向上取整 = 4

    let batches: Vec<_> = loader.iter().map(|b| b.unwrap()).collect();
    assert_eq!(batches.len(), 4);

    // 前 3 个批次大小为 3
    assert_eq!(batches[0].0.shape(), &[3, 2]);
    assert_eq!(batches[1].0.shape(), &[3, 2]);
    assert_eq!(batches[2].0.shape(), &[3, 2]);
    // 最后一个批次大小为 1
    assert_eq!(batches[3].0.shape(), &[1, 2]);
    assert_eq!(batches[3].1, vec![0]);

    // 不打乱时保持原顺序
    assert_eq!(batches[1].0[[0, 0]], 6.0);
    assert_eq!(batches[1].1, vec![0, 1, 2]);
}

#[test]
fn test_dataloader_drop_last() {
    let loader = DataLoader::new(range_dataset(10), 3).drop_last(true);
    assert_eq!(loader.num_batches(), 3); // 10 / 3 = 3

    let batches: Vec<_> = loader.iter().collect();
    assert_eq!(batches.len(), 3);
}

#[test]
fn test_dataloader_shuffle_with_seed() {
    // 使用相同种子，两次迭代应该产生相同的结果
    let loader1 = DataLoader::new(range_dataset(10), 3).shuffle(true).seed(42);
    let loader2 = DataLoader::new(range_dataset(10), 3).shuffle(true).seed(42);

    let batches1: Vec<_> = loader1.iter().map(|b| b.unwrap()).collect();
    let batches2: Vec<_> = loader2.iter().map(|b| b.unwrap()).collect();

    assert_eq!(batches1.len(), batches2.len());
    for (b1, b2) in batches1.iter().zip(batches2.iter()) {
        assert_eq!(b1.0, b2.0);
        assert_eq!(b1.1, b2.1);
    }

    // 打乱后仍覆盖全部样本
    let mut firsts: Vec<f32> = batches1
        .iter()
        .flat_map(|(x, _)| (0..x.shape()[0]).map(|i| x[[i, 0]]).collect::<Vec<_>>())
        .collect();
    firsts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let expected: Vec<f32> = (0..10).map(|i| (i * 2) as f32).collect();
    assert_eq!(firsts, expected);
}

#[test]
fn test_dataloader_video_batches() {
    // 模拟视频样本: [C, T, H, W]
    let features = Tensor::zeros(&[4, 3, 2, 5, 5]);
    let dataset = TensorDataset::new(features, vec![0, 1, 1, 0]);

    let loader = DataLoader::new(dataset, 2);
    let batches: Vec<_> = loader.iter().map(|b| b.unwrap()).collect();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].0.shape(), &[2, 3, 2, 5, 5]);
    assert_eq!(batches[1].1, vec![1, 0]);
}

#[test]
fn test_dataloader_propagates_sample_errors() {
    // 第2个样本指向底层数据集之外
    let subset = Subset::new(Arc::new(range_dataset(3)), vec![0, 5, 1]);
    let loader = DataLoader::new(subset, 2);

    let mut iter = loader.iter();
    assert_err!(
        iter.next().unwrap(),
        DataError::IndexOutOfBounds { index: 5, len: 3 }
    );
    assert!(iter.next().unwrap().is_ok());
    assert!(iter.next().is_none());
}

#[test]
fn test_dataloader_empty_dataset() {
    let dataset = TensorDataset::new(Tensor::zeros(&[0, 2]), vec![]);
    let loader = DataLoader::new(dataset, 4);
    assert!(loader.is_empty());
    assert_eq!(loader.num_batches(), 0);
    assert!(loader.iter().next().is_none());
}

#[test]
fn test_dataloader_zero_batch_size_panics() {
    crate::assert_panic!(
        DataLoader::new(range_dataset(3), 0),
        "DataLoader: batch_size 必须大于 0"
    );
}

#[test]
fn test_dataloader_over_shared_dataset() {
    let dataset: Arc<dyn Dataset> = Arc::new(range_dataset(5));
    let loader = DataLoader::new(Arc::clone(&dataset), 5);
    let (batch, labels) = loader.iter().next().unwrap().unwrap();
    assert_eq!(batch.shape(), &[5, 2]);
    assert_eq!(labels, vec![0, 1, 2, 0, 1]);
    assert_eq!(loader.dataset().len(), dataset.len());
}
