// 该文件是 Kanjian （看见） 项目的一部分。
// src/task.rs - 单图与目录检测任务
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

use std::{
  error::Error as StdError,
  path::PathBuf,
  time::{Duration, Instant},
};

use image::RgbImage;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
  frame::FromRgbImage,
  input::{DirectoryInput, DirectoryInputError, ImageFileInput, ImageFileInputError},
  model::{DetectResult, Model, WithLabel},
  output::Render,
};

/// 检测阈值默认值
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TaskError {
  #[error("图片文件不存在: {}", .0.display())]
  ImageNotFound(PathBuf),
  #[error("目录不存在: {}", .0.display())]
  DirectoryNotFound(PathBuf),
  #[error("读取图像失败: {0}")]
  Input(ImageFileInputError),
  #[error("读取目录失败: {0}")]
  Directory(DirectoryInputError),
  #[error("推理失败: {0}")]
  Model(BoxError),
  #[error("渲染失败: {0}")]
  Render(BoxError),
}

impl From<ImageFileInputError> for TaskError {
  fn from(err: ImageFileInputError) -> Self {
    match err {
      ImageFileInputError::NotFound(path) => TaskError::ImageNotFound(path),
      other => TaskError::Input(other),
    }
  }
}

impl From<DirectoryInputError> for TaskError {
  fn from(err: DirectoryInputError) -> Self {
    match err {
      DirectoryInputError::NotFound(path) => TaskError::DirectoryNotFound(path),
      other => TaskError::Directory(other),
    }
  }
}

pub trait Task<M, O>: Sized {
  type Report;
  type Error;
  fn run_task(self, model: &M, output: &O) -> Result<Self::Report, Self::Error>;
}

/// 单张图像的处理结果
#[derive(Debug)]
pub struct ImageReport<T> {
  pub source: PathBuf,
  pub output: PathBuf,
  pub result: DetectResult<T>,
  pub elapsed: Duration,
}

impl<T: WithLabel> ImageReport<T> {
  pub fn report_lines(&self) -> Vec<String> {
    self.result.report_lines()
  }
}

/// 目录批处理结果，失败的图片不会中断后续处理
#[derive(Debug)]
pub struct BatchReport<T> {
  pub processed: Vec<ImageReport<T>>,
  pub failures: Vec<(PathBuf, TaskError)>,
}

impl<T> Default for BatchReport<T> {
  fn default() -> Self {
    BatchReport {
      processed: Vec::new(),
      failures: Vec::new(),
    }
  }
}

impl<T> BatchReport<T> {
  /// 没有任何图片被尝试处理
  pub fn is_empty(&self) -> bool {
    self.processed.is_empty() && self.failures.is_empty()
  }

  pub fn total_images(&self) -> usize {
    self.processed.len() + self.failures.len()
  }

  pub fn total_detections(&self) -> usize {
    self.processed.iter().map(|r| r.result.len()).sum()
  }
}

/// 处理单张图像：读取、推理、绘制、预览、保存
pub struct OneShotTask {
  path: PathBuf,
  confidence: f32,
}

impl OneShotTask {
  pub fn new(path: impl Into<PathBuf>, confidence: f32) -> Self {
    OneShotTask {
      path: path.into(),
      confidence,
    }
  }
}

impl<F, T, ME, RE, M, O> Task<M, O> for OneShotTask
where
  F: FromRgbImage,
  T: WithLabel,
  ME: StdError + Send + Sync + 'static,
  RE: StdError + Send + Sync + 'static,
  M: Model<Input = F, Output = DetectResult<T>, Error = ME>,
  O: Render<RgbImage, DetectResult<T>, Error = RE>,
{
  type Report = ImageReport<T>;
  type Error = TaskError;

  fn run_task(self, model: &M, output: &O) -> Result<Self::Report, Self::Error> {
    let input = ImageFileInput::open(&self.path)?;
    let frame = F::from_rgb_image(input.image(), model.channel_order());

    let now = Instant::now();
    let result = model
      .infer(&frame, self.confidence)
      .map_err(|e| TaskError::Model(Box::new(e)))?;
    let elapsed = now.elapsed();
    info!("推理完成，耗时: {:.2?}，检测到 {} 个物体", elapsed, result.len());

    let output_path = output
      .render_result(input.path(), input.image(), &result)
      .map_err(|e| TaskError::Render(Box::new(e)))?;

    Ok(ImageReport {
      source: self.path,
      output: output_path,
      result,
      elapsed,
    })
  }
}

/// 按目录列举顺序逐张处理图片
pub struct DirectoryTask {
  directory: PathBuf,
  confidence: f32,
}

impl DirectoryTask {
  pub fn new(directory: impl Into<PathBuf>, confidence: f32) -> Self {
    DirectoryTask {
      directory: directory.into(),
      confidence,
    }
  }
}

impl<F, T, ME, RE, M, O> Task<M, O> for DirectoryTask
where
  F: FromRgbImage,
  T: WithLabel,
  ME: StdError + Send + Sync + 'static,
  RE: StdError + Send + Sync + 'static,
  M: Model<Input = F, Output = DetectResult<T>, Error = ME>,
  O: Render<RgbImage, DetectResult<T>, Error = RE>,
{
  type Report = BatchReport<T>;
  type Error = TaskError;

  fn run_task(self, model: &M, output: &O) -> Result<Self::Report, Self::Error> {
    let input = DirectoryInput::scan(&self.directory)?;
    let mut report = BatchReport::default();

    if input.is_empty() {
      warn!("目录中没有找到图片: {}", self.directory.display());
      return Ok(report);
    }
    info!("找到 {} 张图片", input.len());

    for path in &input {
      info!("处理图片: {}", path.display());
      match OneShotTask::new(path, self.confidence).run_task(model, output) {
        Ok(image_report) => report.processed.push(image_report),
        Err(e) => {
          error!("处理图片 {} 失败: {}", path.display(), e);
          report.failures.push((path.clone(), e));
        }
      }
    }

    info!(
      "处理完成: 图片 {} 张，检测 {} 个，失败 {} 张",
      report.total_images(),
      report.total_detections(),
      report.failures.len()
    );
    Ok(report)
  }
}
