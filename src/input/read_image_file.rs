// 该文件是 Kanjian （看见） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("图片文件不存在: {}", .0.display())]
  NotFound(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 从文件读入的一张图像，解码为 RGB
pub struct ImageFileInput {
  path: PathBuf,
  image: RgbImage,
}

impl ImageFileInput {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    if !path.is_file() {
      error!("图片文件不存在: {}", path.display());
      return Err(ImageFileInputError::NotFound(path.to_path_buf()));
    }

    let image = ImageReader::open(path)?
      .with_guessed_format()?
      .decode()?
      .to_rgb8();
    debug!(
      "读取图像 {}: {}x{}",
      path.display(),
      image.width(),
      image.height()
    );

    Ok(ImageFileInput {
      path: path.to_path_buf(),
      image,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.jpg");

    match ImageFileInput::open(&path) {
      Err(ImageFileInputError::NotFound(p)) => assert_eq!(p, path),
      other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn directory_is_not_an_image_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
      ImageFileInput::open(dir.path()),
      Err(ImageFileInputError::NotFound(_))
    ));
  }

  #[test]
  fn decodes_png_as_rgb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]))
      .save(&path)
      .unwrap();

    let input = ImageFileInput::open(&path).unwrap();
    assert_eq!(input.path(), path.as_path());
    assert_eq!(input.image().dimensions(), (3, 2));
    assert_eq!(input.into_image().get_pixel(1, 1), &Rgb([10, 20, 30]));
  }

  #[test]
  fn corrupt_data_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    assert!(ImageFileInput::open(&path).is_err());
  }
}
