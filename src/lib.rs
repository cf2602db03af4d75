// 该文件是 Kanjian （看见） 项目的一部分。
// src/lib.rs - 库主文件
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

use std::path::PathBuf;

pub mod frame;
pub mod input;
pub mod model;
pub mod output;
pub mod task;

/// 从 URL 构造，URL 的 scheme 决定具体后端
pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 取 URL 中的本地文件路径，路径部分按百分号编码解码
pub fn url_file_path(url: &url::Url) -> Result<PathBuf, std::string::FromUtf8Error> {
  let path = urlencoding::decode(url.path())?;
  Ok(PathBuf::from(path.into_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use url::Url;

  #[test]
  fn file_path_is_percent_decoded() {
    let url = Url::parse("record:///data/my%20weights/%E6%9D%83%E9%87%8D.txt").unwrap();
    assert_eq!(
      url_file_path(&url).unwrap(),
      PathBuf::from("/data/my weights/权重.txt")
    );
  }

  #[test]
  fn relative_path_is_kept() {
    let url = Url::parse("yolo26:weights/yolo26n.rknn").unwrap();
    assert_eq!(
      url_file_path(&url).unwrap(),
      PathBuf::from("weights/yolo26n.rknn")
    );
  }

  #[test]
  fn invalid_utf8_is_rejected() {
    let url = Url::parse("record:///data/%FF.txt").unwrap();
    assert!(url_file_path(&url).is_err());
  }
}
