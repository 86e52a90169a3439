//! # 隐写核心算法模块
//!
//! 每个像素是一个 `u32`，从高到低依次为 (A, R, G, B) 四个通道。
//! 一个字符嵌入一个像素：字符的位被分散到 R、G、B 三个通道的低 4 位
//! (bits 16–19, 8–11, 0–3)。文本之后的那个像素三个槽位全部清零，作为结束标记。
//!
//! 本模块只处理内存中的数据，不做任何 I/O。

use crate::constants::CLEAR_MASK;
use crate::error::StegaError;
use std::borrow::Cow;

/// 解码时如何处理提取出的非零字节。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// 只保留可打印 ASCII 字符 (`0x20..=0x7E`)，其余静默丢弃。
    #[default]
    PrintableOnly,
    /// 逐字节恢复，保留所有非零字节。
    Raw,
}

/// `find` 的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub bytes: Vec<u8>,
    /// 扫描过的像素数 (包括结束标记本身)。
    pub pixels_scanned: usize,
    /// 是否在像素耗尽之前遇到了结束标记。
    pub sentinel_found: bool,
}

impl Recovered {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// 只有找到结束标记且内容非空，才认为图像里确实藏有消息。
    pub fn is_message(&self) -> bool {
        self.sentinel_found && !self.bytes.is_empty()
    }
}

/// 把字符 `c` 写入像素的三个嵌入槽位，其余位保持不变。
///
/// `c` 只有 8 位，因此 `0xF00` 那一组永远为零，R 通道的槽位实际上总是被清零。
/// 这个布局需要与已编码的图像保持兼容，不要压缩成 8 位。
#[inline]
pub fn embed_char(pixel: u32, c: u8) -> u32 {
    let c = u32::from(c);
    (pixel & CLEAR_MASK) | ((c & 0xF00) << 8) | ((c & 0x0F0) << 4) | (c & 0x00F)
}

/// 从像素的三个嵌入槽位中取出 12 位的隐藏值。
#[inline]
pub fn extract_char(pixel: u32) -> u32 {
    ((pixel & 0x000F_0000) >> 8) | ((pixel & 0x0000_0F00) >> 4) | (pixel & 0x0000_000F)
}

/// 将 `payload` 逐字节隐藏到 `pixels` 中，并在 `pixels[payload.len()]` 写入结束标记。
///
/// # Errors
///
/// 如果 `payload.len() + 1 > pixels.len()`，返回 [`StegaError::PayloadTooLarge`]，
/// 此时不会修改任何像素。
pub fn hide(pixels: &mut [u32], payload: &[u8]) -> Result<(), StegaError> {
    if payload.len() >= pixels.len() {
        return Err(StegaError::PayloadTooLarge {
            payload_len: payload.len(),
            capacity: pixels.len().saturating_sub(1),
        });
    }

    pixels
        .iter_mut()
        .zip(payload)
        .for_each(|(pixel, &c)| *pixel = embed_char(*pixel, c));

    pixels[payload.len()] &= CLEAR_MASK;

    Ok(())
}

/// 从 `pixels[0]` 开始扫描，直到遇到结束标记或像素耗尽。
pub fn find(pixels: &[u32], policy: DecodePolicy) -> Recovered {
    let mut bytes = Vec::new();
    let mut pixels_scanned = 0;
    let mut sentinel_found = false;

    for &pixel in pixels {
        pixels_scanned += 1;

        let hidden = extract_char(pixel);
        if hidden == 0 {
            sentinel_found = true;
            break;
        }

        // 只有 R 槽位非零时低 8 位为 0，不是结束标记，但也不产生字符
        let byte = (hidden & 0xFF) as u8;
        let keep = match policy {
            DecodePolicy::PrintableOnly => is_printable(byte),
            DecodePolicy::Raw => byte != 0,
        };
        if keep {
            bytes.push(byte);
        }
    }

    Recovered {
        bytes,
        pixels_scanned,
        sentinel_found,
    }
}

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EMBED_SLOTS;

    #[test]
    fn embed_places_nibbles_in_channel_slots() {
        // 'o' = 0x6F: 高半字节进入 G 槽位，低半字节进入 B 槽位，R 槽位清零。
        assert_eq!(embed_char(0xFFFF_FFFF, b'o'), 0xFFF0_F6FF);
        assert_eq!(embed_char(0x0000_0000, b'o'), 0x0000_060F);
        assert_eq!(extract_char(0xFFF0_F6FF), 0x6F);
    }

    #[test]
    fn hide_then_find_round_trips() {
        let mut pixels = vec![0xAB_CD_EF_12; 32];
        let text = b"Hello, bitmap world!";

        hide(&mut pixels, text).unwrap();
        let recovered = find(&pixels, DecodePolicy::PrintableOnly);

        assert_eq!(recovered.bytes, text);
        assert!(recovered.sentinel_found);
        assert_eq!(recovered.pixels_scanned, text.len() + 1);
        assert!(recovered.is_message());
    }

    #[test]
    fn sentinel_clears_only_slot_bits() {
        let mut pixels = vec![0xFFFF_FFFF; 4];
        hide(&mut pixels, b"ab").unwrap();

        assert_eq!(pixels[2] & EMBED_SLOTS, 0);
        assert_eq!(pixels[2], 0xFFF0_F0F0);
        assert_eq!(pixels[3], 0xFFFF_FFFF);
    }

    #[test]
    fn bits_outside_slots_are_untouched() {
        let original: Vec<u32> = (0..64u32).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();
        let mut pixels = original.clone();
        let text: Vec<u8> = (0..63u8).map(|i| b' ' + i % 95).collect();

        hide(&mut pixels, &text).unwrap();

        for (before, after) in original.iter().zip(&pixels) {
            assert_eq!(before & CLEAR_MASK, after & CLEAR_MASK);
        }
    }

    #[test]
    fn capacity_boundary() {
        let mut exact = vec![0x1234_5678; 4];
        assert!(hide(&mut exact, b"abc").is_ok());

        let mut short = vec![0x1234_5678; 3];
        let err = hide(&mut short, b"abc").unwrap_err();
        assert!(matches!(
            err,
            StegaError::PayloadTooLarge {
                payload_len: 3,
                capacity: 2
            }
        ));
        assert!(short.iter().all(|&p| p == 0x1234_5678));
    }

    #[test]
    fn hide_into_empty_buffer_fails() {
        let mut pixels: Vec<u32> = Vec::new();
        assert!(hide(&mut pixels, b"").is_err());
    }

    #[test]
    fn empty_payload_writes_only_sentinel() {
        let mut pixels = vec![0xFFFF_FFFF; 3];
        hide(&mut pixels, b"").unwrap();

        assert_eq!(pixels, [0xFFF0_F0F0, 0xFFFF_FFFF, 0xFFFF_FFFF]);

        let recovered = find(&pixels, DecodePolicy::PrintableOnly);
        assert!(recovered.bytes.is_empty());
        assert_eq!(recovered.pixels_scanned, 1);
        assert!(recovered.sentinel_found);
        assert!(!recovered.is_message());
    }

    #[test]
    fn no_sentinel_consumes_every_pixel() {
        // 每个像素都隐藏着 'A' (0x41)，没有任何结束标记。
        let pixels = vec![embed_char(0, b'A'); 10];
        let recovered = find(&pixels, DecodePolicy::PrintableOnly);

        assert_eq!(recovered.bytes.len(), pixels.len());
        assert_eq!(recovered.pixels_scanned, pixels.len());
        assert!(!recovered.sentinel_found);
        assert!(!recovered.is_message());
    }

    #[test]
    fn non_printable_bytes_depend_on_policy() {
        let mut pixels = vec![0; 8];
        hide(&mut pixels, b"a\nb\x01c").unwrap();

        assert_eq!(find(&pixels, DecodePolicy::PrintableOnly).bytes, b"abc");
        assert_eq!(find(&pixels, DecodePolicy::Raw).bytes, b"a\nb\x01c");
    }

    #[test]
    fn red_slot_only_is_neither_sentinel_nor_byte() {
        let pixels = [0x0001_0000, embed_char(0, b'a'), 0x0F00_0000];

        for policy in [DecodePolicy::PrintableOnly, DecodePolicy::Raw] {
            let recovered = find(&pixels, policy);
            assert_eq!(recovered.bytes, b"a");
            assert!(recovered.sentinel_found);
            assert_eq!(recovered.pixels_scanned, 3);
        }

        let recovered = find(&[0x000F_0000; 4], DecodePolicy::Raw);
        assert!(recovered.bytes.is_empty());
        assert!(!recovered.sentinel_found);
        assert_eq!(recovered.pixels_scanned, 4);
    }

    #[test]
    fn find_on_empty_buffer() {
        let recovered = find(&[], DecodePolicy::Raw);
        assert_eq!(recovered.pixels_scanned, 0);
        assert!(!recovered.sentinel_found);
        assert!(recovered.bytes.is_empty());
    }
}
