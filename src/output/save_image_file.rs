// 该文件是 Kanjian （看见） 项目的一部分。
// src/output/save_image_file.rs - 保存标注图像
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

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  model::{DetectResult, WithLabel},
  output::{
    Render,
    draw::{Draw, DrawDetectionOnImage},
    preview::PreviewOutput,
    record::Record,
  },
};

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("输入路径没有文件名: {}", .0.display())]
  NoFileName(PathBuf),
}

/// 绘制检测结果，按输入文件名写入输出目录
pub struct SaveImageFileOutput<'a> {
  directory: PathBuf,
  draw: Draw<'a>,
  preview: Option<PreviewOutput>,
  record: Option<Record>,
}

impl<'a> SaveImageFileOutput<'a> {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    SaveImageFileOutput {
      directory: directory.into(),
      draw: Draw::default(),
      preview: None,
      record: None,
    }
  }

  pub fn with_preview(mut self, preview: PreviewOutput) -> Self {
    self.preview = Some(preview);
    self
  }

  pub fn with_record(mut self, record: Record) -> Self {
    self.record = Some(record);
    self
  }

  /// 输出路径：保留输入文件名，替换所在目录
  pub fn output_path(&self, source: &Path) -> Result<PathBuf, SaveImageFileError> {
    source
      .file_name()
      .map(|name| self.directory.join(name))
      .ok_or_else(|| SaveImageFileError::NoFileName(source.to_path_buf()))
  }

  fn save_image(&self, image: &RgbImage, path: &Path) -> Result<(), SaveImageFileError> {
    std::fs::create_dir_all(&self.directory)?;
    image.save(path)?;
    info!("保存图像到文件: {}", path.display());
    Ok(())
  }
}

impl<'a, T: WithLabel> Render<RgbImage, DetectResult<T>> for SaveImageFileOutput<'a> {
  type Error = SaveImageFileError;

  fn render_result(
    &self,
    source: &Path,
    frame: &RgbImage,
    result: &DetectResult<T>,
  ) -> Result<PathBuf, Self::Error> {
    let path = self.output_path(source)?;
    let annotated = self.draw.draw_detection(frame, result);

    if let Some(preview) = &self.preview {
      preview.show(source, frame, &annotated)?;
    }

    self.save_image(&annotated, &path)?;

    if let Some(record) = &self.record {
      let record_path = record.record(result, &path)?;
      debug!("检测记录: {}", record_path.display());
    }

    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{CocoLabel, DetectItem};

  #[test]
  fn output_keeps_base_name() {
    let output = SaveImageFileOutput::new("output");
    assert_eq!(
      output.output_path(Path::new("images/test_1.jpg")).unwrap(),
      Path::new("output").join("test_1.jpg")
    );
  }

  #[test]
  fn path_without_name_is_rejected() {
    let output = SaveImageFileOutput::new("output");
    assert!(matches!(
      output.output_path(Path::new("..")),
      Err(SaveImageFileError::NoFileName(_))
    ));
  }

  #[test]
  fn render_creates_directory_and_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("output");
    let output = SaveImageFileOutput::new(&out_dir)
      .with_preview(PreviewOutput::new(dir.path().join("preview")))
      .with_record(Record::default());

    let frame = RgbImage::new(64, 48);
    let result = DetectResult::from(vec![DetectItem {
      kind: CocoLabel::from_label_id(16),
      score: 0.87,
      bbox: [0.1, 0.1, 0.9, 0.9],
    }]);

    let path = output
      .render_result(Path::new("images/test_1.png"), &frame, &result)
      .unwrap();

    assert_eq!(path, out_dir.join("test_1.png"));
    let written = image::open(&path).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (64, 48));
    assert_ne!(written, frame);
    assert!(dir.path().join("preview").join("test_1.png").is_file());
    assert!(out_dir.join("test_1.txt").is_file());
  }
}
