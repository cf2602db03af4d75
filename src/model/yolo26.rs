// 该文件是 Kanjian （看见） 项目的一部分。
// src/model/yolo26.rs - YOLO26 RKNN 后端
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

use std::{marker::PhantomData, path::PathBuf};

use rknpu::{Context, InitFlags, TensorFormat, TensorType};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  url_file_path,
  frame::ChannelOrder,
  input::AsNhwcFrame,
  model::{DetectItem, DetectResult, MODEL_INPUT_SIZE, Model, ModelFrame, WithLabel},
};

const YOLO26_NUM_INPUTS: u32 = 1;
const YOLO26_NUM_OUTPUTS: u32 = 6;
const YOLO26_CLASS_NUM: usize = 80;
const YOLO26_INPUT_W: f32 = MODEL_INPUT_SIZE as f32;
const YOLO26_INPUT_H: f32 = MODEL_INPUT_SIZE as f32;
const YOLO26_HEAD_SIZES: [(usize, usize); 3] = [(80, 80), (40, 40), (20, 20)];
const YOLO26_STRIDES: [f32; 3] = [8.0, 16.0, 32.0];

pub struct Yolo26<T> {
  context: Context,
  _label: PhantomData<T>,
}

#[derive(Error, Debug)]
pub enum Yolo26Error {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
  #[error("RKNN 错误: {0}")]
  RknnError(#[from] rknpu::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
}

impl Yolo26Error {
  fn invalid(msg: &str, e: rknpu::Error) -> Self {
    Yolo26Error::ModelInvalid(msg.to_string(), e)
  }
}

pub struct Yolo26Builder {
  model_path: PathBuf,
}

impl FromUrlWithScheme for Yolo26Builder {
  const SCHEME: &'static str = "yolo26";
}

impl FromUrl for Yolo26Builder {
  type Error = Yolo26Error;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(Yolo26Error::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    let model_path = url_file_path(url)
      .map_err(|e| Yolo26Error::ModelPathError(format!("路径解码失败: {}", e)))?;

    Ok(Yolo26Builder { model_path })
  }
}

impl Yolo26Builder {
  pub fn build<T>(self) -> Result<Yolo26<T>, Yolo26Error> {
    info!("加载模型文件: {}", self.model_path.display());
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let context = Context::new(&model_data, InitFlags::default())?;

    let num_inputs = context
      .num_inputs()
      .map_err(|e| Yolo26Error::invalid("无法获取输入数量", e))?;
    let num_outputs = context
      .num_outputs()
      .map_err(|e| Yolo26Error::invalid("无法获取输出数量", e))?;

    if num_inputs != YOLO26_NUM_INPUTS || num_outputs != YOLO26_NUM_OUTPUTS {
      let msg = format!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        YOLO26_NUM_INPUTS, YOLO26_NUM_OUTPUTS, num_inputs, num_outputs
      );
      error!("{}", msg);
      return Err(Yolo26Error::invalid(&msg, rknpu::Error::InvalidModel));
    }

    info!("模型加载完成");
    Ok(Yolo26 {
      context,
      _label: PhantomData,
    })
  }
}

/// 按张量长度区分回归与分类输出，返回 (reg, cls)
fn match_reg_cls_tensors<'a>(
  tensor1: &'a [f32],
  tensor2: &'a [f32],
  reg_expected: usize,
  cls_expected: usize,
) -> Option<(&'a [f32], &'a [f32])> {
  if tensor1.len() == reg_expected && tensor2.len() == cls_expected {
    Some((tensor1, tensor2))
  } else if tensor1.len() == cls_expected && tensor2.len() == reg_expected {
    Some((tensor2, tensor1))
  } else {
    None
  }
}

fn decode_head<T: WithLabel>(
  reg: &[f32],
  cls: &[f32],
  (map_h, map_w): (usize, usize),
  stride: f32,
  confidence: f32,
  items: &mut Vec<DetectItem<T>>,
) {
  let spatial = map_h * map_w;

  for h in 0..map_h {
    for w in 0..map_w {
      let idx = h * map_w + w;

      let (class_id, max_logit) = (0..YOLO26_CLASS_NUM)
        .map(|c| (c, cls[c * spatial + idx]))
        .fold((0usize, f32::MIN), |best, cur| {
          if cur.1 > best.1 { cur } else { best }
        });
      let score = sigmoid(max_logit);
      if score < confidence {
        continue;
      }

      let grid_x = (w as f32) + 0.5;
      let grid_y = (h as f32) + 0.5;

      let xmin = ((grid_x - reg[idx]) * stride).clamp(0.0, YOLO26_INPUT_W);
      let ymin = ((grid_y - reg[spatial + idx]) * stride).clamp(0.0, YOLO26_INPUT_H);
      let xmax = ((grid_x + reg[2 * spatial + idx]) * stride).clamp(0.0, YOLO26_INPUT_W);
      let ymax = ((grid_y + reg[3 * spatial + idx]) * stride).clamp(0.0, YOLO26_INPUT_H);

      if xmin < xmax && ymin < ymax {
        items.push(DetectItem {
          kind: T::from_label_id(class_id as u32),
          score,
          bbox: [
            xmin / YOLO26_INPUT_W,
            ymin / YOLO26_INPUT_H,
            xmax / YOLO26_INPUT_W,
            ymax / YOLO26_INPUT_H,
          ],
        });
      }
    }
  }
}

impl<T: WithLabel> Yolo26<T> {
  fn postprocess(output: &rknpu::Output, confidence: f32) -> DetectResult<T> {
    let mut items = Vec::new();

    for (head_idx, (&head_size, stride)) in
      YOLO26_HEAD_SIZES.iter().zip(YOLO26_STRIDES).enumerate()
    {
      let spatial = head_size.0 * head_size.1;
      let reg_expected = 4 * spatial;
      let cls_expected = YOLO26_CLASS_NUM * spatial;

      // RKNN 输出顺序不固定，每个检测头占两个相邻输出
      let (tensor1, tensor2) = match (
        output.get_f32(head_idx * 2),
        output.get_f32(head_idx * 2 + 1),
      ) {
        (Ok(t1), Ok(t2)) => (t1, t2),
        (Err(e), _) | (_, Err(e)) => {
          error!("获取检测头 {} 输出失败: {}", head_idx, e);
          continue;
        }
      };

      match match_reg_cls_tensors(tensor1, tensor2, reg_expected, cls_expected) {
        Some((reg, cls)) => decode_head(reg, cls, head_size, stride, confidence, &mut items),
        None => error!(
          "检测头 {}: 输出大小不匹配 - 张量1: {}, 张量2: {}",
          head_idx,
          tensor1.len(),
          tensor2.len()
        ),
      }
    }

    debug!("检测到 {} 个物体", items.len());
    DetectResult::from(items)
  }
}

impl<T: WithLabel> Model for Yolo26<T> {
  type Input = ModelFrame;
  type Output = DetectResult<T>;
  type Error = Yolo26Error;

  fn channel_order(&self) -> ChannelOrder {
    ChannelOrder::Rgb
  }

  fn infer(&self, input: &Self::Input, confidence: f32) -> Result<Self::Output, Self::Error> {
    self
      .context
      .set_input(0, input.as_nhwc(), TensorFormat::NHWC, TensorType::UInt8)?;

    debug!("执行模型推理");
    self.context.run()?;

    let output = self.context.get_outputs()?;
    Ok(Self::postprocess(&output, confidence))
  }
}

fn sigmoid(x: f32) -> f32 {
  1.0 / (1.0 + (-x).exp())
}
