// 该文件是 Kanjian （看见） 项目的一部分。
// src/model.rs - 模型
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

use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{ChannelOrder, NhwcFrame},
  url_file_path,
};

/// 模型输入边长
pub const MODEL_INPUT_SIZE: u32 = 640;

pub type ModelFrame = NhwcFrame<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>;

/// 检测能力：给定输入帧与置信度阈值，返回检测结果
pub trait Model {
  type Input;
  type Output;
  type Error;

  /// 模型期望的输入通道顺序
  fn channel_order(&self) -> ChannelOrder {
    ChannelOrder::Rgb
  }

  fn infer(&self, input: &Self::Input, confidence: f32) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct DetectItem<T> {
  pub kind: T,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
}

impl<T: WithLabel> DetectItem<T> {
  /// 文本报告行，如 `dog: 0.87`
  pub fn report_line(&self) -> String {
    format!("{}: {:.2}", self.kind.to_label_str(), self.score)
  }
}

#[derive(Debug, Clone)]
pub struct DetectResult<T> {
  pub items: Box<[DetectItem<T>]>,
}

impl<T> DetectResult<T> {
  pub fn empty() -> Self {
    DetectResult {
      items: Box::new([]),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, DetectItem<T>> {
    self.items.iter()
  }
}

impl<T> From<Vec<DetectItem<T>>> for DetectResult<T> {
  fn from(items: Vec<DetectItem<T>>) -> Self {
    DetectResult {
      items: items.into_boxed_slice(),
    }
  }
}

impl<T: WithLabel> DetectResult<T> {
  pub fn report_lines(&self) -> Vec<String> {
    self.items.iter().map(DetectItem::report_line).collect()
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn to_label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Self;
  fn from_label_str(label: &str) -> Option<Self>;
}

const COCO_LABELS: [&str; 80] = [
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "toaster",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// COCO 80 类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CocoLabel(u32);

impl CocoLabel {
  pub const NUM_CLASSES: usize = COCO_LABELS.len();
}

impl WithLabel for CocoLabel {
  fn to_label_str(&self) -> String {
    match COCO_LABELS.get(self.0 as usize) {
      Some(name) => name.to_string(),
      None => format!("class_{}", self.0),
    }
  }

  fn to_label_id(&self) -> u32 {
    self.0
  }

  fn from_label_id(id: u32) -> Self {
    CocoLabel(id)
  }

  fn from_label_str(label: &str) -> Option<Self> {
    if let Some(idx) = COCO_LABELS.iter().position(|name| *name == label) {
      return Some(CocoLabel(idx as u32));
    }
    label
      .strip_prefix("class_")
      .and_then(|id| id.parse().ok())
      .map(CocoLabel)
  }
}

mod replay;
pub use self::replay::{RecordReplay, RecordReplayError};

#[cfg(feature = "model_yolo26")]
mod yolo26;
#[cfg(feature = "model_yolo26")]
pub use self::yolo26::{Yolo26, Yolo26Builder, Yolo26Error};

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("权重文件不存在: {}", .0.display())]
  WeightsNotFound(PathBuf),
  #[error("不支持的模型方案: {0}")]
  UnsupportedScheme(String),
  #[error("模型路径无法解码: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
  #[error("检测记录错误: {0}")]
  RecordReplayError(#[from] RecordReplayError),
  #[cfg(feature = "model_yolo26")]
  #[error("YOLO26 模型错误: {0}")]
  Yolo26Error(#[from] Yolo26Error),
}

/// 按 URL scheme 选择的模型后端
pub enum ModelWrapper {
  Record(RecordReplay<CocoLabel>),
  #[cfg(feature = "model_yolo26")]
  Yolo26(Yolo26<CocoLabel>),
}

impl FromUrl for ModelWrapper {
  type Error = ModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let weights = url_file_path(url)?;
    if !weights.is_file() {
      error!("权重文件不存在: {}", weights.display());
      return Err(ModelError::WeightsNotFound(weights));
    }
    info!("模型权重: {}", weights.display());

    if url.scheme() == RecordReplay::<CocoLabel>::SCHEME {
      return Ok(ModelWrapper::Record(RecordReplay::from_url(url)?));
    }

    #[cfg(feature = "model_yolo26")]
    {
      if url.scheme() == Yolo26Builder::SCHEME {
        let model = Yolo26Builder::from_url(url)?.build()?;
        return Ok(ModelWrapper::Yolo26(model));
      }
    }

    error!("不支持的模型方案: {}", url.scheme());
    Err(ModelError::UnsupportedScheme(url.scheme().to_string()))
  }
}

impl Model for ModelWrapper {
  type Input = ModelFrame;
  type Output = DetectResult<CocoLabel>;
  type Error = ModelError;

  fn channel_order(&self) -> ChannelOrder {
    match self {
      ModelWrapper::Record(model) => model.channel_order(),
      #[cfg(feature = "model_yolo26")]
      ModelWrapper::Yolo26(model) => model.channel_order(),
    }
  }

  fn infer(&self, input: &Self::Input, confidence: f32) -> Result<Self::Output, Self::Error> {
    match self {
      ModelWrapper::Record(model) => model.infer(input, confidence).map_err(ModelError::from),
      #[cfg(feature = "model_yolo26")]
      ModelWrapper::Yolo26(model) => model.infer(input, confidence).map_err(ModelError::from),
    }
  }
}
