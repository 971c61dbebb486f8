//! 数据集文件下载
//!
//! 响应体边读边算MD5并写入 `<目标>.part`，校验通过后再改名为目标文件，
//! 因此中途失败不会留下看似完整的缓存文件。

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use md5::{Digest, Md5};

use super::error::DataError;

/// 下载 `url` 到 `dest_path`；给出 `expected_md5` 时校验内容
pub fn download_file(
    url: &str,
    dest_path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    log::info!("正在下载 {url} -> {}", dest_path.display());

    let response = ureq::get(url)
        .call()
        .map_err(|e| DataError::DownloadError(format!("{url}: {e}")))?;
    if response.status() != 200 {
        return Err(DataError::DownloadError(format!(
            "{url}: HTTP 状态码 {}",
            response.status()
        )));
    }

    let part_path = dest_path.with_extension("part");
    let result = write_verified(response.into_reader(), &part_path, expected_md5)
        .and_then(|()| fs::rename(&part_path, dest_path).map_err(DataError::from));
    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }
    result?;

    log::info!("下载完成: {}", dest_path.display());
    Ok(())
}

fn write_verified(
    reader: impl Read,
    path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let digest = copy_hashed(reader, &mut writer)
        .map_err(|e| DataError::DownloadError(format!("读取响应失败: {e}")))?;
    writer.flush()?;

    if let Some(expected) = expected_md5 {
        check_digest(digest, expected)?;
        log::debug!("MD5 校验通过: {expected}");
    }
    Ok(())
}

/// 把 `reader` 的全部内容复制到 `writer`，返回内容的MD5（小写十六进制）
pub fn copy_hashed(mut reader: impl Read, mut writer: impl Write) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n])?;
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// 校验数据的 MD5，大小写不敏感
pub fn verify_md5(data: &[u8], expected: &str) -> Result<(), DataError> {
    check_digest(compute_md5(data), expected)
}

pub fn compute_md5(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

fn check_digest(actual: String, expected: &str) -> Result<(), DataError> {
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(DataError::ChecksumMismatch {
            expected: expected.to_string(),
            got: actual,
        })
    }
}
