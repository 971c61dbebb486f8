//! 视频动作片段的样本索引
//!
//! 索引文件每行至少6个字段：
//! - 第0列：视频ID（如 `P_01`）
//! - 第1列：起始帧号
//! - 第2列：结束帧号
//! - 第5列：类别标签
//!
//! 其余字段忽略。数值字段以文本形式保存，解析时只接受非负整数文本，其它任何内容都报错，
//! 绝不把索引内容当作代码求值。
//!
//! 支持两种文件格式（按扩展名区分）：
//! - `.pkl` / `.pickle`：pickle 序列化的“行列表”（list/tuple 嵌套 list/tuple）；
//! - `.csv`：首行为表头的逗号分隔文本，字段可用双引号包裹（其中可含逗号）。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_pickle::{DeOptions, Value};

use crate::data::error::DataError;

const MIN_FIELDS: usize = 6;
const VIDEO_ID_COLUMN: usize = 0;
const START_FRAME_COLUMN: usize = 1;
const END_FRAME_COLUMN: usize = 2;
const LABEL_COLUMN: usize = 5;

/// pickle 只支持行列表；pandas DataFrame 需导出为 CSV
const PICKLE_HINT: &str =
    "。若为 pandas DataFrame，请改用 `df.to_csv(path, index=False)` 导出的 .csv 索引";

/// 一个动作片段：`(视频ID, 起始帧, 结束帧, 标签)`，满足 `start_frame <= end_frame`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleIndexEntry {
    pub video_id: String,
    pub start_frame: usize,
    pub end_frame: usize,
    pub label: usize,
}

/// 单元格的原始内容
enum Cell<'a> {
    Text(&'a str),
    Int(i64),
    Other(String),
}

/// 加载样本索引文件
pub fn load_sample_index(path: &Path) -> Result<Vec<SampleIndexEntry>, DataError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pkl") | Some("pickle") => parse_pickle(path),
        Some("csv") => parse_csv(path),
        _ => Err(index_error(path, "不支持的索引文件格式，仅支持 .pkl/.pickle/.csv")),
    }
}

/// 严格解析非负整数文本：允许首尾空白与前导`+`，其余只能是ASCII数字
///
/// `row` 从1开始计数（不含表头），`column` 为字段位置。
pub fn parse_index_field(raw: &str, row: usize, column: usize) -> Result<usize, DataError> {
    let field_error = || DataError::IndexFieldFormat {
        row,
        column,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field_error());
    }
    digits.parse::<usize>().map_err(|_| field_error())
}

fn index_error(path: &Path, reason: impl Into<String>) -> DataError {
    DataError::DatasetIndex {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn parse_pickle(path: &Path) -> Result<Vec<SampleIndexEntry>, DataError> {
    let file = File::open(path).map_err(|e| index_error(path, e.to_string()))?;
    let value = serde_pickle::value_from_reader(BufReader::new(file), DeOptions::new())
        .map_err(|e| index_error(path, format!("pickle 解析失败: {e}{PICKLE_HINT}")))?;

    let rows = match value {
        Value::List(rows) | Value::Tuple(rows) => rows,
        other => {
            return Err(index_error(
                path,
                format!("顶层对象应为行列表，实际为 {}{PICKLE_HINT}", value_kind(&other)),
            ));
        }
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let fields = match row {
                Value::List(fields) | Value::Tuple(fields) => fields,
                other => {
                    return Err(index_error(
                        path,
                        format!("第 {} 行应为列表，实际为 {}", i + 1, value_kind(other)),
                    ));
                }
            };
            let cells: Vec<Cell<'_>> = fields.iter().map(pickle_cell).collect();
            entry_from_cells(path, i + 1, &cells)
        })
        .collect()
}

fn pickle_cell(value: &Value) -> Cell<'_> {
    match value {
        Value::String(s) => Cell::Text(s),
        Value::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => Cell::Text(s),
            Err(_) => Cell::Other(format!("{b:?}")),
        },
        Value::I64(n) => Cell::Int(*n),
        other => Cell::Other(format!("{other:?}")),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::None => "None",
        Value::Bool(_) => "bool",
        Value::I64(_) | Value::Int(_) => "int",
        Value::F64(_) => "float",
        Value::Bytes(_) => "bytes",
        Value::String(_) => "str",
        Value::List(_) => "list",
        Value::Tuple(_) => "tuple",
        Value::Dict(_) => "dict",
        _ => "set",
    }
}

fn parse_csv(path: &Path) -> Result<Vec<SampleIndexEntry>, DataError> {
    let file = File::open(path).map_err(|e| index_error(path, e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut entries = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| index_error(path, format!("第 {} 行 CSV 解析失败: {e}", i + 1)))?;
        let cells: Vec<Cell<'_>> = record.iter().map(Cell::Text).collect();
        entries.push(entry_from_cells(path, i + 1, &cells)?);
    }
    Ok(entries)
}

fn entry_from_cells(
    path: &Path,
    row: usize,
    cells: &[Cell<'_>],
) -> Result<SampleIndexEntry, DataError> {
    if cells.len() < MIN_FIELDS {
        return Err(index_error(
            path,
            format!("第 {row} 行只有 {} 个字段，至少需要 {MIN_FIELDS} 个", cells.len()),
        ));
    }

    let video_id = match &cells[VIDEO_ID_COLUMN] {
        Cell::Text(s) if !s.trim().is_empty() => s.trim().to_string(),
        Cell::Int(n) => n.to_string(),
        _ => return Err(index_error(path, format!("第 {row} 行缺少视频ID"))),
    };
    let start_frame = numeric_cell(&cells[START_FRAME_COLUMN], row, START_FRAME_COLUMN)?;
    let end_frame = numeric_cell(&cells[END_FRAME_COLUMN], row, END_FRAME_COLUMN)?;
    let label = numeric_cell(&cells[LABEL_COLUMN], row, LABEL_COLUMN)?;

    if start_frame > end_frame {
        return Err(index_error(
            path,
            format!("第 {row} 行起始帧 {start_frame} 大于结束帧 {end_frame}"),
        ));
    }

    Ok(SampleIndexEntry {
        video_id,
        start_frame,
        end_frame,
        label,
    })
}

fn numeric_cell(cell: &Cell<'_>, row: usize, column: usize) -> Result<usize, DataError> {
    match cell {
        Cell::Text(s) => parse_index_field(s, row, column),
        Cell::Int(n) => usize::try_from(*n).map_err(|_| DataError::IndexFieldFormat {
            row,
            column,
            value: n.to_string(),
        }),
        Cell::Other(s) => Err(DataError::IndexFieldFormat {
            row,
            column,
            value: s.clone(),
        }),
    }
}
