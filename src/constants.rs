/// BMP 文件头中 "文件大小" 字段的字节偏移 (u32, 小端)。
pub const FILE_SIZE_OFFSET: u64 = 2;

/// BMP 文件头中 "像素数组偏移" 字段的字节偏移 (u32, 小端)。
pub const PIXEL_ARRAY_OFFSET_OFFSET: u64 = 10;

/// DIB 头中 "DIB 头大小" 字段的字节偏移 (u32, 小端)。
pub const DIB_HEADER_SIZE_OFFSET: u64 = 14;

/// 读取上述三个固定字段至少需要的字节数。
pub const FIXED_FIELDS_LEN: usize = 18;

/// 每个像素按 4 字节打包的通道组处理。
pub const BYTES_PER_PIXEL: u32 = 4;

/// 三个嵌入槽位: bits 16–19 (R), bits 8–11 (G), bits 0–3 (B)。
pub const EMBED_SLOTS: u32 = 0x000F_0F0F;

/// 清除三个嵌入槽位的掩码。
pub const CLEAR_MASK: u32 = !EMBED_SLOTS;

/// 未指定输出路径时，编码结果写入的文件名。
pub const DEFAULT_OUTPUT: &str = "out.bmp";

/// 载体图像必须使用的扩展名。
pub const CARRIER_EXTENSION: &str = "bmp";

/// 秘密文本文件必须使用的扩展名。
pub const SECRET_EXTENSION: &str = "txt";
