//! IDX 二进制格式解析（支持 .gz 压缩）
//!
//! IDX 格式：
//! - [0-1] 固定为 0
//! - [2]   数据类型，本库只支持 0x08（unsigned byte）
//! - [3]   维数 d
//! - [4..4+4d] 每一维的长度（大端序 u32）
//! - 其后为按行优先排列的数据
//!
//! 标签文件为1维 `[N]`；灰度图像为3维 `[N, H, W]`；彩色图像为4维 `[N, H, W, C]`。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::data::error::DataError;
use crate::tensor::Tensor;

const IDX_TYPE_U8: u8 = 0x08;

fn open_reader(path: &Path) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// 读取 IDX 头部与全部数据，返回 `(各维长度, 原始字节)`
fn read_idx(path: &Path) -> Result<(Vec<usize>, Vec<u8>), DataError> {
    let mut reader = open_reader(path)?;

    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|e| DataError::FormatError(format!("读取头部失败: {}", e)))?;
    if magic[0] != 0 || magic[1] != 0 || magic[2] != IDX_TYPE_U8 {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {:02x?} (期望 [00, 00, 08, 维数])",
            magic
        )));
    }

    let ndim = magic[3] as usize;
    let mut dims = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        let mut dim = [0u8; 4];
        reader
            .read_exact(&mut dim)
            .map_err(|e| DataError::FormatError(format!("读取维度失败: {}", e)))?;
        dims.push(u32::from_be_bytes(dim) as usize);
    }

    let count: usize = dims.iter().product();
    let mut data = vec![0u8; count];
    reader
        .read_exact(&mut data)
        .map_err(|e| DataError::FormatError(format!("读取数据失败: {}", e)))?;

    Ok((dims, data))
}

/// 解析 IDX 图像文件，返回 `[N, H, W, C]` 的张量（像素值保持 0-255）
pub fn parse_idx_images(path: &Path) -> Result<Tensor, DataError> {
    let (dims, pixels) = read_idx(path)?;
    let shape = match dims.as_slice() {
        &[n, h, w] => vec![n, h, w, 1],
        &[n, h, w, c] if c == 1 || c == 3 => vec![n, h, w, c],
        other => {
            return Err(DataError::FormatError(format!(
                "无效的图像维度: {:?} (期望 [N, H, W] 或 [N, H, W, 1|3])",
                other
            )));
        }
    };

    let data: Vec<f32> = pixels.into_iter().map(f32::from).collect();
    Ok(Tensor::from_vec(data, &shape))
}

/// 解析 IDX 标签文件，返回每个样本的类别
pub fn parse_idx_labels(path: &Path) -> Result<Vec<usize>, DataError> {
    let (dims, labels) = read_idx(path)?;
    if dims.len() != 1 {
        return Err(DataError::FormatError(format!(
            "无效的标签维度: {:?} (期望 [N])",
            dims
        )));
    }
    Ok(labels.into_iter().map(usize::from).collect())
}

/// 将 `[N, ...]` 的 u8 数据写为 IDX 文件（扩展名为 .gz 时压缩）
pub fn write_idx(path: &Path, dims: &[usize], data: &[u8]) -> Result<(), DataError> {
    use std::io::Write;

    let expected: usize = dims.iter().product();
    if expected != data.len() {
        return Err(DataError::ShapeMismatch {
            expected: dims.to_vec(),
            got: vec![data.len()],
        });
    }

    let mut bytes = vec![0, 0, IDX_TYPE_U8, dims.len() as u8];
    for &dim in dims {
        bytes.extend_from_slice(&(dim as u32).to_be_bytes());
    }
    bytes.extend_from_slice(data);

    let file = File::create(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?;
    } else {
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    Ok(())
}
