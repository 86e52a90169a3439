//! # BMP 容器模块
//!
//! 不依赖通用图像库，只读取 BMP 头部中几个固定偏移的字段：
//!
//! * 偏移 2: 文件大小
//! * 偏移 10: 像素数组偏移
//! * 偏移 14: DIB 头大小
//!
//! 所有多字节字段均为小端。像素数组之前的全部字节作为不透明的头部原样保留，
//! 这样写回的文件仍然是有效的图像。

use crate::constants::{
    BYTES_PER_PIXEL, DIB_HEADER_SIZE_OFFSET, FILE_SIZE_OFFSET, FIXED_FIELDS_LEN,
    PIXEL_ARRAY_OFFSET_OFFSET,
};
use crate::error::StegaError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// 从 BMP 头部派生出的只读元数据。
///
/// 只能通过 [`BitmapMetadata::read_from`] 或 [`BitmapMetadata::parse`] 创建。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapMetadata {
    file_size: u32,
    pixel_array_offset: u32,
    dib_header_size: u32,
    header_bytes: Vec<u8>,
}

impl BitmapMetadata {
    /// 从可随机访问的数据源中读取元数据。
    ///
    /// # Errors
    ///
    /// * 数据源不足 18 字节，或不足 `pixel_array_offset` 字节时返回 [`StegaError::TruncatedHeader`]。
    /// * `pixel_array_offset < dib_header_size` 或 `file_size < pixel_array_offset` 时返回
    ///   [`StegaError::ArithmeticInvariantViolated`]。
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, StegaError> {
        let file_size = read_field(reader, FILE_SIZE_OFFSET)?;
        let pixel_array_offset = read_field(reader, PIXEL_ARRAY_OFFSET_OFFSET)?;
        let dib_header_size = read_field(reader, DIB_HEADER_SIZE_OFFSET)?;

        if pixel_array_offset < dib_header_size {
            return Err(StegaError::ArithmeticInvariantViolated {
                field: "pixel array offset",
                value: pixel_array_offset,
                bound: dib_header_size,
            });
        }
        if file_size < pixel_array_offset {
            return Err(StegaError::ArithmeticInvariantViolated {
                field: "file size",
                value: file_size,
                bound: pixel_array_offset,
            });
        }

        let header_len = pixel_array_offset as usize;
        let mut header_bytes = Vec::new();
        reader.seek(SeekFrom::Start(0))?;
        reader
            .by_ref()
            .take(u64::from(pixel_array_offset))
            .read_to_end(&mut header_bytes)?;
        if header_bytes.len() < header_len {
            return Err(StegaError::TruncatedHeader {
                expected: header_len,
            });
        }

        log::debug!(
            "bitmap metadata: file size {file_size}, pixel array offset {pixel_array_offset}, DIB header size {dib_header_size}"
        );

        Ok(Self {
            file_size,
            pixel_array_offset,
            dib_header_size,
            header_bytes,
        })
    }

    /// [`BitmapMetadata::read_from`] 的内存版本。
    pub fn parse(bytes: &[u8]) -> Result<Self, StegaError> {
        Self::read_from(&mut Cursor::new(bytes))
    }

    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    pub fn pixel_array_offset(&self) -> u32 {
        self.pixel_array_offset
    }

    pub fn dib_header_size(&self) -> u32 {
        self.dib_header_size
    }

    /// `pixel_array_offset - dib_header_size`
    pub fn bmp_header_size(&self) -> u32 {
        self.pixel_array_offset - self.dib_header_size
    }

    /// 像素数组中完整的 4 字节像素个数 (向下取整)。
    pub fn pixel_count(&self) -> u32 {
        (self.file_size - self.pixel_array_offset) / BYTES_PER_PIXEL
    }

    /// 可隐藏的最大字符数，需要为结束标记预留一个像素。
    pub fn capacity(&self) -> usize {
        (self.pixel_count() as usize).saturating_sub(1)
    }

    /// 像素数组之前的全部原始字节。
    pub fn header_bytes(&self) -> &[u8] {
        &self.header_bytes
    }

    /// 像素数组之后、`file_size` 之前不足一个像素的剩余字节数。
    fn trailing_len(&self) -> u32 {
        (self.file_size - self.pixel_array_offset) % BYTES_PER_PIXEL
    }
}

fn read_field<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<u32, StegaError> {
    reader.seek(SeekFrom::Start(offset))?;
    reader
        .read_u32::<LittleEndian>()
        .map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => StegaError::TruncatedHeader {
                expected: FIXED_FIELDS_LEN,
            },
            _ => StegaError::Io(e),
        })
}

/// 一个已载入内存的载体图像：元数据、像素缓冲区以及末尾不足一个像素的字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    metadata: BitmapMetadata,
    pub pixels: Vec<u32>,
    trailer: Vec<u8>,
}

impl Carrier {
    /// 读取元数据以及恰好 `pixel_count` 个像素。
    ///
    /// # Errors
    ///
    /// 除了 [`BitmapMetadata::read_from`] 的错误外，像素数组不完整时返回
    /// [`StegaError::TruncatedPixelData`]。
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, StegaError> {
        let metadata = BitmapMetadata::read_from(reader)?;
        Self::load(reader, metadata)
    }

    /// 在已读取元数据的前提下载入像素，便于调用方先检查容量。
    pub fn load<R: Read + Seek>(
        reader: &mut R,
        metadata: BitmapMetadata,
    ) -> Result<Self, StegaError> {
        let pixels = read_pixels(reader, &metadata)?;

        let mut trailer = Vec::new();
        reader
            .by_ref()
            .take(u64::from(metadata.trailing_len()))
            .read_to_end(&mut trailer)?;

        Ok(Self {
            metadata,
            pixels,
            trailer,
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, StegaError> {
        Self::read_from(&mut Cursor::new(bytes))
    }

    pub fn metadata(&self) -> &BitmapMetadata {
        &self.metadata
    }

    /// 依次写出原始头部、像素 (小端) 和末尾字节。
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.metadata.header_bytes())?;
        for &pixel in &self.pixels {
            writer.write_u32::<LittleEndian>(pixel)?;
        }
        writer.write_all(&self.trailer)?;
        writer.flush()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out)
            .expect("writing to a Vec cannot fail");
        out
    }
}

/// 从 `pixel_array_offset` 开始读取 `pixel_count` 个小端 `u32` 像素。
pub fn read_pixels<R: Read + Seek>(
    reader: &mut R,
    metadata: &BitmapMetadata,
) -> Result<Vec<u32>, StegaError> {
    let count = metadata.pixel_count() as usize;
    let expected = count * BYTES_PER_PIXEL as usize;

    reader.seek(SeekFrom::Start(u64::from(metadata.pixel_array_offset())))?;
    let mut raw = Vec::new();
    reader
        .by_ref()
        .take(expected as u64)
        .read_to_end(&mut raw)?;
    if raw.len() < expected {
        return Err(StegaError::TruncatedPixelData {
            expected,
            actual: raw.len(),
        });
    }

    let mut pixels = vec![0u32; count];
    Cursor::new(raw).read_u32_into::<LittleEndian>(&mut pixels)?;

    log::debug!("read {count} pixels");
    Ok(pixels)
}
