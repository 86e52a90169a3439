//! # stega 库
//!
//! 本库包含 BMP 隐写工具的核心逻辑：不依赖图像库的 BMP 头部解析，
//! 以及把文本逐字节藏进像素低位的编解码算法。

pub mod bitmap;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod steganography;
