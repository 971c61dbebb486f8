//! 从 JSON 文件加载数据集配置

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::data::error::DataError;

/// 读取并反序列化 JSON 配置文件
pub fn load_json_config<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DataError::InvalidConfig(format!("{path:?}: {e}")))
}
