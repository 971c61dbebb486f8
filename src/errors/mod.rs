use thiserror::Error;

/// 张量形状契约被违反时的错误信息；张量方法以此作为panic消息
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不一致")]
    InconsistentShape,
    #[error("交换张量时，输入的维度数至少需要2个")]
    PermuteNeedAtLeast2Dims,
    #[error("需要交换的维度必须是唯一且在[0, <张量维数>)范围内，且数量等于张量维数")]
    PermuteNeedUniqueAndInRange,
    #[error("维度超出范围")]
    AxisOutOfRange,
    #[error("下标超出范围")]
    IndexOutOfRange,
    #[error("除数为零")]
    DivByZero,
}
