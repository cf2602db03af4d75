// 该文件是 Kanjian （看见） 项目的一部分。
// src/input.rs - 图像输入
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

use std::path::Path;

pub trait AsNhwcFrame<const W: u32, const H: u32> {
  fn as_nhwc(&self) -> &[u8];
}

mod read_directory;
mod read_image_file;

pub use self::read_directory::{DirectoryInput, DirectoryInputError};
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

/// 批量处理时接受的图片扩展名（不区分大小写）
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

pub fn has_image_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| {
      IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extension_match_ignores_case() {
    assert!(has_image_extension(Path::new("a.JPG")));
    assert!(has_image_extension(Path::new("b.png")));
    assert!(has_image_extension(Path::new("dir/c.Jpeg")));
    assert!(has_image_extension(Path::new("d.BMP")));
  }

  #[test]
  fn other_extensions_are_rejected() {
    assert!(!has_image_extension(Path::new("c.txt")));
    assert!(!has_image_extension(Path::new("e.gif")));
    assert!(!has_image_extension(Path::new("jpg")));
    assert!(!has_image_extension(Path::new("f.png.bak")));
  }
}
