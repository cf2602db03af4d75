// 该文件是 Kanjian （看见） 项目的一部分。
// src/frame.rs - 模型输入帧定义
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

use image::{
  ImageBuffer, Rgb, RgbImage,
  imageops::{self, FilterType},
};

use crate::input::AsNhwcFrame;

const RGB_CHANNELS: usize = 3;

/// 像素通道顺序
///
/// 图像文件解码后与保存时均为 RGB，部分模型以 BGR 训练，
/// 推理前需要按模型声明的顺序重排通道。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
  #[default]
  Rgb,
  Bgr,
}

/// 原地交换交错像素数据中的 R 与 B 通道，调用两次即还原
pub fn swap_red_blue(data: &mut [u8]) {
  for pixel in data.chunks_exact_mut(RGB_CHANNELS) {
    pixel.swap(0, 2);
  }
}

pub trait FromRgbImage: Sized {
  fn from_rgb_image(image: &RgbImage, order: ChannelOrder) -> Self;
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

/// 固定尺寸的 NHWC 帧，作为模型输入
#[derive(Debug, Clone)]
pub struct NhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
  order: ChannelOrder,
}

impl<const W: u32, const H: u32> NhwcFrame<W, H> {
  const LEN: usize = RGB_CHANNELS * W as usize * H as usize;
}

impl<const W: u32, const H: u32> Default for NhwcFrame<W, H> {
  fn default() -> Self {
    Self {
      data: vec![0u8; Self::LEN].into_boxed_slice(),
      order: ChannelOrder::default(),
    }
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for NhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

impl<const W: u32, const H: u32> FromRgbImage for NhwcFrame<W, H> {
  fn from_rgb_image(image: &RgbImage, order: ChannelOrder) -> Self {
    // 直接拉伸到模型尺寸，归一化坐标可直接映射回原图
    let mut data = if image.dimensions() == (W, H) {
      image.as_raw().clone()
    } else {
      imageops::resize(image, W, H, FilterType::Triangle).into_raw()
    };

    if order == ChannelOrder::Bgr {
      swap_red_blue(&mut data);
    }

    Self {
      data: data.into_boxed_slice(),
      order,
    }
  }
}

impl<const W: u32, const H: u32> ToRgbImage for NhwcFrame<W, H> {
  fn to_rgb_image(&self) -> RgbImage {
    let (r, b) = match self.order {
      ChannelOrder::Rgb => (0, 2),
      ChannelOrder::Bgr => (2, 0),
    };

    ImageBuffer::from_fn(W, H, |x, y| {
      let idx = (y as usize * W as usize + x as usize) * RGB_CHANNELS;
      Rgb([self.data[idx + r], self.data[idx + 1], self.data[idx + b]])
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gradient(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
      Rgb([(x * 40) as u8, (y * 40) as u8, (x * 7 + y * 3) as u8])
    })
  }

  #[test]
  fn bgr_frame_swaps_red_and_blue() {
    let image = gradient(4, 3);
    let frame = NhwcFrame::<4, 3>::from_rgb_image(&image, ChannelOrder::Bgr);

    let pixel = image.get_pixel(2, 1);
    let idx = (4 + 2) * 3;
    assert_eq!(frame.as_nhwc()[idx], pixel[2]);
    assert_eq!(frame.as_nhwc()[idx + 1], pixel[1]);
    assert_eq!(frame.as_nhwc()[idx + 2], pixel[0]);
  }

  #[test]
  fn converting_back_restores_original_bytes() {
    let image = gradient(4, 3);
    let frame = NhwcFrame::<4, 3>::from_rgb_image(&image, ChannelOrder::Bgr);

    assert_eq!(frame.to_rgb_image(), image);

    let mut data = frame.as_nhwc().to_vec();
    swap_red_blue(&mut data);
    assert_eq!(data.as_slice(), image.as_raw().as_slice());
  }

  #[test]
  fn swap_twice_is_identity() {
    let original = vec![1u8, 2, 3, 4, 5, 6];
    let mut data = original.clone();
    swap_red_blue(&mut data);
    assert_eq!(data, vec![3, 2, 1, 6, 5, 4]);
    swap_red_blue(&mut data);
    assert_eq!(data, original);
  }

  #[test]
  fn resizes_to_frame_shape() {
    let image = gradient(7, 5);
    let frame = NhwcFrame::<4, 4>::from_rgb_image(&image, ChannelOrder::Rgb);
    assert_eq!(frame.as_nhwc().len(), 4 * 4 * 3);
    assert_eq!(frame.to_rgb_image().dimensions(), (4, 4));
  }
}
