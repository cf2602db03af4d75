// 该文件是 Kanjian （看见） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use kanjian::{
  FromUrl,
  model::{ModelWrapper, WithLabel},
  output::{SaveImageFileOutput, preview::PreviewOutput},
  task::{DirectoryTask, ImageReport, OneShotTask, Task},
};

use args::{Args, Command};

fn print_report<T: WithLabel>(report: &ImageReport<T>) {
  for line in report.report_lines() {
    println!("{}", line);
  }
  println!("输出文件: {}", report.output.display());
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型地址: {}", args.model);
  info!("输出目录: {}", args.output.display());
  info!("置信度阈值: {}", args.confidence);

  let model = ModelWrapper::from_url(&args.model)?;

  let mut output = SaveImageFileOutput::new(&args.output);
  if let Some(preview) = args.preview_dir() {
    info!("对比图目录: {}", preview.display());
    output = output.with_preview(PreviewOutput::new(preview));
  }
  if let Some(record) = args.record() {
    output = output.with_record(record);
  }

  match args.command {
    Command::Image { path } => {
      let report = OneShotTask::new(path, args.confidence).run_task(&model, &output)?;
      print_report(&report);
    }
    Command::Directory { directory } => {
      let report = DirectoryTask::new(&directory, args.confidence).run_task(&model, &output)?;
      if report.is_empty() {
        println!("目录 {} 中没有找到图片", directory.display());
        return Ok(());
      }

      for image_report in &report.processed {
        println!("== {}", image_report.source.display());
        print_report(image_report);
      }
      for (path, err) in &report.failures {
        println!("== {} 处理失败: {}", path.display(), err);
      }

      println!();
      println!("总图片数: {}", report.total_images());
      println!("总检测数: {}", report.total_detections());
      println!("失败数: {}", report.failures.len());
    }
  }

  Ok(())
}
