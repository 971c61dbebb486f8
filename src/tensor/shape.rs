use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Axis, IxDyn, Slice};
use std::collections::HashSet;

impl Tensor {
    /// 将多个形状相同的张量在最前面新增的维度上堆叠起来，返回一个新的张量。
    /// 如：`T`个形状为`[H, W, C]`的帧堆叠为`[T, H, W, C]`的视频窗口。
    ///
    /// 列表为空或形状不一致时panic；调用方若需要可恢复的错误，应先自行校验形状。
    pub fn stack(tensors: &[&Self]) -> Self {
        assert!(!tensors.is_empty(), "{}", TensorError::EmptyList);
        let first_shape = tensors[0].shape();
        assert!(
            tensors.iter().all(|t| t.shape() == first_shape),
            "{}",
            TensorError::InconsistentShape
        );

        let mut shape = first_shape.to_vec();
        shape.insert(0, tensors.len());

        let mut data = Vec::with_capacity(shape.iter().product());
        for t in tensors {
            data.extend_from_slice(t.as_slice());
        }
        Self::from_vec(data, &shape)
    }

    /// 按`axes`重排张量的维度，并将其返回（不影响原张量）。
    /// 如：`[T, H, W, C]`经`permute(&[3, 0, 1, 2])`后为`[C, T, H, W]`。
    pub fn permute(&self, axes: &[usize]) -> Self {
        assert!(axes.len() >= 2, "{}", TensorError::PermuteNeedAtLeast2Dims);
        // 检查axes中的所有元素必须是唯一且在[0, <张量维数>)范围内
        let unique_axes = axes.iter().copied().collect::<HashSet<_>>();
        assert!(
            unique_axes.len() == axes.len()
                && axes.len() == self.dimension()
                && unique_axes.iter().all(|&a| a < self.dimension()),
            "{}",
            TensorError::PermuteNeedUniqueAndInRange
        );

        Self::from_array(self.data.clone().permuted_axes(IxDyn(axes)))
    }

    /// 取出第`axis`维上下标为`index`的子张量（该维度被移除）。
    /// 如：从`[N, H, W, C]`中取第`i`个样本得到`[H, W, C]`。
    pub fn select(&self, axis: usize, index: usize) -> Self {
        assert!(axis < self.dimension(), "{}", TensorError::AxisOutOfRange);
        assert!(
            index < self.shape()[axis],
            "{}",
            TensorError::IndexOutOfRange
        );
        Self::from_array(self.data.index_axis(Axis(axis), index).to_owned())
    }

    /// 在第`axis`维上截取`[start, start + len)`区间（维数不变）
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Self {
        assert!(axis < self.dimension(), "{}", TensorError::AxisOutOfRange);
        assert!(
            start + len <= self.shape()[axis],
            "{}",
            TensorError::IndexOutOfRange
        );
        let sliced = self
            .data
            .slice_axis(Axis(axis), Slice::from(start..start + len));
        Self::from_array(sliced.to_owned())
    }

    /// 翻转第`axis`维的元素顺序（如：沿宽度维翻转即水平镜像）
    pub fn flip(&self, axis: usize) -> Self {
        assert!(axis < self.dimension(), "{}", TensorError::AxisOutOfRange);
        let mut data = self.data.clone();
        data.invert_axis(Axis(axis));
        Self::from_array(data)
    }
}
