// 该文件是 Kanjian （看见） 项目的一部分。
// src/input/read_directory.rs - 图片目录输入
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
use tracing::{debug, error};

use super::has_image_extension;

#[derive(Error, Debug)]
pub enum DirectoryInputError {
  #[error("目录不存在: {}", .0.display())]
  NotFound(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 目录中的图片列表，保持目录列举顺序
#[derive(Debug, Clone)]
pub struct DirectoryInput {
  images: Vec<PathBuf>,
}

impl DirectoryInput {
  pub fn scan(directory: impl AsRef<Path>) -> Result<Self, DirectoryInputError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
      error!("目录不存在: {}", directory.display());
      return Err(DirectoryInputError::NotFound(directory.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(directory)? {
      let path = entry?.path();
      if path.is_file() && has_image_extension(&path) {
        images.push(path);
      } else {
        debug!("跳过非图片条目: {}", path.display());
      }
    }

    Ok(DirectoryInput { images })
  }

  pub fn len(&self) -> usize {
    self.images.len()
  }

  pub fn is_empty(&self) -> bool {
    self.images.is_empty()
  }
}

impl<'a> IntoIterator for &'a DirectoryInput {
  type Item = &'a PathBuf;
  type IntoIter = std::slice::Iter<'a, PathBuf>;

  fn into_iter(self) -> Self::IntoIter {
    self.images.iter()
  }
}
