// 该文件是 Kanjian （看见） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::{Parser, Subcommand, ValueEnum};
use kanjian::{output::record::Record, task::DEFAULT_CONFIDENCE};
use url::Url;

/// Kanjian 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型地址，scheme 决定推理后端
  /// 支持:
  /// - record:<path>  回放 --record 写出的 .txt 检测记录
  /// - yolo26:<path>  RKNN YOLO26 模型（需启用 model_yolo26 特性）
  #[arg(
    long,
    global = true,
    default_value = "yolo26:weights/yolo26n.rknn",
    value_name = "MODEL"
  )]
  pub model: Url,

  /// 标注图像输出目录，不存在时自动创建
  #[arg(long, global = true, default_value = "output", value_name = "DIR")]
  pub output: PathBuf,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, global = true, default_value_t = DEFAULT_CONFIDENCE, value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 并排对比图输出目录
  #[arg(long, global = true, default_value = "preview", value_name = "DIR")]
  pub preview: PathBuf,

  /// 不生成并排对比图
  #[arg(long, global = true)]
  pub no_preview: bool,

  /// 同时写出 .txt 检测记录，标签列使用类别名称或编号，如 --record=id
  #[arg(
    long,
    global = true,
    value_enum,
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = "name",
    value_name = "LABEL"
  )]
  pub record: Option<RecordLabel>,

  #[command(subcommand)]
  pub command: Command,
}

impl Args {
  pub fn preview_dir(&self) -> Option<&Path> {
    (!self.no_preview).then_some(self.preview.as_path())
  }

  pub fn record(&self) -> Option<Record> {
    self.record.map(RecordLabel::to_record)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordLabel {
  Name,
  Id,
}

impl RecordLabel {
  fn to_record(self) -> Record {
    Record {
      label_with_name: self == RecordLabel::Name,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 检测单张图片
  Image {
    #[arg(value_name = "PATH")]
    path: PathBuf,
  },
  /// 检测目录中的全部图片（jpg/jpeg/png/bmp）
  Directory {
    #[arg(default_value = "images", value_name = "DIR")]
    directory: PathBuf,
  },
}
