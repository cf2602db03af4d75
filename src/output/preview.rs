// 该文件是 Kanjian （看见） 项目的一部分。
// src/output/preview.rs - 原图与检测结果并排预览
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

use image::{Rgb, RgbImage, imageops};
use tracing::info;

use super::SaveImageFileError;

const PREVIEW_GAP: u32 = 8;
const PREVIEW_BACKGROUND: [u8; 3] = [255, 255, 255];

/// 左右拼接两张图像，中间留白
pub fn compose_side_by_side(left: &RgbImage, right: &RgbImage) -> RgbImage {
  let width = left.width() + PREVIEW_GAP + right.width();
  let height = left.height().max(right.height());

  let mut canvas = RgbImage::from_pixel(width, height, Rgb(PREVIEW_BACKGROUND));
  imageops::overlay(&mut canvas, left, 0, 0);
  imageops::overlay(
    &mut canvas,
    right,
    i64::from(left.width() + PREVIEW_GAP),
    0,
  );
  canvas
}

/// 把并排对比图写入预览目录
#[derive(Debug, Clone)]
pub struct PreviewOutput {
  directory: PathBuf,
}

impl PreviewOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    PreviewOutput {
      directory: directory.into(),
    }
  }

  pub fn show(
    &self,
    source: &Path,
    original: &RgbImage,
    annotated: &RgbImage,
  ) -> Result<PathBuf, SaveImageFileError> {
    let name = source
      .file_name()
      .ok_or_else(|| SaveImageFileError::NoFileName(source.to_path_buf()))?;
    std::fs::create_dir_all(&self.directory)?;

    let path = self.directory.join(name);
    compose_side_by_side(original, annotated).save(&path)?;
    info!("预览图: {}", path.display());

    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn places_images_left_and_right() {
    let left = RgbImage::from_pixel(4, 3, Rgb([255, 0, 0]));
    let right = RgbImage::from_pixel(5, 6, Rgb([0, 0, 255]));
    let canvas = compose_side_by_side(&left, &right);

    assert_eq!(canvas.dimensions(), (4 + PREVIEW_GAP + 5, 6));
    assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 0, 0]));
    assert_eq!(canvas.get_pixel(4, 0), &Rgb(PREVIEW_BACKGROUND));
    assert_eq!(canvas.get_pixel(0, 5), &Rgb(PREVIEW_BACKGROUND));
    assert_eq!(canvas.get_pixel(4 + PREVIEW_GAP, 5), &Rgb([0, 0, 255]));
  }

  #[test]
  fn show_writes_composition_under_source_name() {
    let dir = tempfile::tempdir().unwrap();
    let preview = PreviewOutput::new(dir.path().join("preview"));
    let image = RgbImage::new(2, 2);

    let path = preview
      .show(Path::new("images/test_1.png"), &image, &image)
      .unwrap();
    assert_eq!(path, dir.path().join("preview").join("test_1.png"));
    assert_eq!(
      image::open(&path).unwrap().to_rgb8().dimensions(),
      (4 + PREVIEW_GAP, 2)
    );
  }
}
