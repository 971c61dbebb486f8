use ndarray::{Array, IxDyn};

mod image;
mod index;
mod ops;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 本库中张量主要用于承载图像/视频帧数据，元素类型固定为`f32`。
/// 注：内部数组始终保持标准（行优先、连续）内存布局，`permute`、`flip`等操作后也会重新整理。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[t,h,w,c,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        Self::from_vec(data.to_vec(), shape)
    }

    /// 同`new`，但直接接管`data`的所有权，免去一次拷贝（逐帧加载图像时数据量较大）
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Tensor {
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "数据长度{}与形状{:?}不匹配",
            data.len(),
            shape
        );
        let data = Array::from_shape_vec(IxDyn(shape), data).unwrap();
        Tensor { data }
    }

    /// 创建一个元素全为0的张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// 由任意内存布局的ndarray数组构建张量，内部统一整理为标准布局
    pub(crate) fn from_array(array: Array<f32, IxDyn>) -> Tensor {
        let data = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        Tensor { data }
    }
}
