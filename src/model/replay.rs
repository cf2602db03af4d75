// 该文件是 Kanjian （看见） 项目的一部分。
// src/model/replay.rs - 回放检测记录的模型后端
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

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DetectResult, Model, ModelFrame, WithLabel},
  output::record::{Record, RecordParseError},
  url_file_path,
};

/// 对任意输入帧返回同一份检测记录
///
/// 记录文件即 `--record` 写出的 `.txt`，可用于在没有 NPU 的主机上
/// 复现一次检测结果。
pub struct RecordReplay<T> {
  result: DetectResult<T>,
}

#[derive(Error, Debug)]
pub enum RecordReplayError {
  #[error("记录路径错误: {0}")]
  PathError(String),
  #[error("记录读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("记录格式错误: {0}")]
  ParseError(#[from] RecordParseError),
}

impl<T> FromUrlWithScheme for RecordReplay<T>
where
  T: WithLabel + Clone,
{
  const SCHEME: &'static str = "record";
}

impl<T> FromUrl for RecordReplay<T>
where
  T: WithLabel + Clone,
{
  type Error = RecordReplayError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RecordReplayError::PathError(format!(
        "记录路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    let path =
      url_file_path(url).map_err(|e| RecordReplayError::PathError(format!("路径解码失败: {}", e)))?;
    info!("加载检测记录: {}", path.display());

    let text = std::fs::read_to_string(&path)?;
    let result = Record::parse(&text)?;
    debug!("记录中共有 {} 个检测结果", result.len());

    Ok(RecordReplay { result })
  }
}

impl<T> Model for RecordReplay<T>
where
  T: WithLabel + Clone,
{
  type Input = ModelFrame;
  type Output = DetectResult<T>;
  type Error = RecordReplayError;

  fn infer(&self, _input: &Self::Input, confidence: f32) -> Result<Self::Output, Self::Error> {
    let items: Vec<_> = self
      .result
      .iter()
      .filter(|item| item.score >= confidence)
      .cloned()
      .collect();
    Ok(DetectResult::from(items))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::CocoLabel;

  fn replay_from(text: &str) -> (tempfile::TempDir, Url) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_1.txt");
    std::fs::write(&path, text).unwrap();
    let url = Url::parse(&format!("record://{}", path.display())).unwrap();
    (dir, url)
  }

  #[test]
  fn replays_items_above_threshold() {
    let (_dir, url) = replay_from("dog, 0.87, 0.1, 0.1, 0.5, 0.5\nperson, 0.2, 0, 0, 1, 1\n");
    let model = RecordReplay::<CocoLabel>::from_url(&url).unwrap();

    let result = model.infer(&ModelFrame::default(), 0.25).unwrap();
    assert_eq!(result.report_lines(), vec!["dog: 0.87"]);

    let result = model.infer(&ModelFrame::default(), 0.1).unwrap();
    assert_eq!(result.len(), 2);

    let result = model.infer(&ModelFrame::default(), 0.9).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn score_equal_to_threshold_is_kept() {
    let (_dir, url) = replay_from("dog, 0.5, 0.1, 0.1, 0.5, 0.5");
    let model = RecordReplay::<CocoLabel>::from_url(&url).unwrap();
    assert_eq!(model.infer(&ModelFrame::default(), 0.5).unwrap().len(), 1);
  }

  #[test]
  fn malformed_record_is_rejected() {
    let (_dir, url) = replay_from("dog, 0.5");
    assert!(matches!(
      RecordReplay::<CocoLabel>::from_url(&url),
      Err(RecordReplayError::ParseError(_))
    ));
  }

  #[test]
  fn other_scheme_is_rejected() {
    let url = Url::parse("yolo26:///tmp/test_1.txt").unwrap();
    assert!(matches!(
      RecordReplay::<CocoLabel>::from_url(&url),
      Err(RecordReplayError::PathError(_))
    ));
  }
}
