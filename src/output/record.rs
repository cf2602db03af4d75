// 该文件是 Kanjian （看见） 项目的一部分。
// src/output/record.rs - 检测结果文本记录
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{DetectItem, DetectResult, WithLabel};

const RECORD_FIELDS: usize = 6;

#[derive(Error, Debug)]
pub enum RecordParseError {
  #[error("第 {line} 行字段数量错误: 期望 6, 实际 {found}")]
  FieldCount { line: usize, found: usize },
  #[error("第 {line} 行无法识别的标签: {label}")]
  UnknownLabel { line: usize, label: String },
  #[error("第 {line} 行数值无效: {value}")]
  InvalidNumber { line: usize, value: String },
}

/// 将检测结果写入与输出图像同名的 `.txt` 文件
///
/// 每行格式为 `label, score, x_min, y_min, x_max, y_max`，坐标为归一化值。
#[derive(Debug, Clone, Copy)]
pub struct Record {
  pub label_with_name: bool,
}

impl Default for Record {
  fn default() -> Self {
    Record {
      label_with_name: true,
    }
  }
}

impl Record {
  pub fn record_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
  }

  pub fn format<T: WithLabel>(&self, result: &DetectResult<T>) -> String {
    result
      .iter()
      .map(|item| {
        let name = if self.label_with_name {
          item.kind.to_label_str()
        } else {
          item.kind.to_label_id().to_string()
        };
        format!(
          "{}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
          name, item.score, item.bbox[0], item.bbox[1], item.bbox[2], item.bbox[3]
        )
      })
      .collect::<Vec<_>>()
      .join("\n")
  }

  pub fn record<T: WithLabel>(
    &self,
    result: &DetectResult<T>,
    image_path: &Path,
  ) -> Result<PathBuf, std::io::Error> {
    let path = Self::record_path(image_path);
    std::fs::write(&path, self.format(result))?;
    Ok(path)
  }

  /// 解析 [`Record::format`] 写出的文本，标签列可以是名称或编号，空行忽略
  pub fn parse<T: WithLabel>(text: &str) -> Result<DetectResult<T>, RecordParseError> {
    let mut items = Vec::new();

    for (idx, line) in text.lines().enumerate() {
      let line_no = idx + 1;
      if line.trim().is_empty() {
        continue;
      }

      let fields: Vec<&str> = line.split(',').map(str::trim).collect();
      if fields.len() != RECORD_FIELDS {
        return Err(RecordParseError::FieldCount {
          line: line_no,
          found: fields.len(),
        });
      }

      let kind = match fields[0].parse::<u32>() {
        Ok(id) => T::from_label_id(id),
        Err(_) => T::from_label_str(fields[0]).ok_or_else(|| RecordParseError::UnknownLabel {
          line: line_no,
          label: fields[0].to_string(),
        })?,
      };

      let mut values = [0f32; RECORD_FIELDS - 1];
      for (value, field) in values.iter_mut().zip(&fields[1..]) {
        *value = field.parse().map_err(|_| RecordParseError::InvalidNumber {
          line: line_no,
          value: field.to_string(),
        })?;
      }

      items.push(DetectItem {
        kind,
        score: values[0],
        bbox: [values[1], values[2], values[3], values[4]],
      });
    }

    Ok(DetectResult::from(items))
  }
}
