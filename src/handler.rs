//! # 命令处理逻辑模块
//!
//! 包含处理 `encode`、`decode` 和 `info` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::bitmap::{BitmapMetadata, Carrier};
use crate::cli::{DecodeArgs, EncodeArgs, InfoArgs};
use crate::constants::{CARRIER_EXTENSION, SECRET_EXTENSION};
use crate::error::StegaError;
use crate::steganography::{DecodePolicy, Recovered, find, hide};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责检查扩展名、读取载体图像和秘密文本、检查容量、隐藏文本，
/// 最后将原始头部和修改后的像素写入输出文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 载体不是 `.bmp` 或秘密文件不是 `.txt`。
/// * 无法打开输入的图像或文本文件。
/// * BMP 头部损坏。
/// * 图像没有足够的像素来隐藏文本和结束标记。
/// * 输出文件已存在 (未指定 `--force`) 或无法写入。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    ensure_extension(&args.carrier, CARRIER_EXTENSION)?;
    ensure_extension(&args.secret, SECRET_EXTENSION)?;

    let mut reader = open_carrier(&args.carrier)?;
    let secret = fs::read(&args.secret).map_err(|source| StegaError::FileOpen {
        path: args.secret.clone(),
        source,
    })?;

    log::info!("Reading data from {}", args.carrier.display());
    let metadata = BitmapMetadata::read_from(&mut reader).with_context(|| {
        format!(
            "Unable to read the bitmap header of {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;

    let capacity = metadata.capacity();
    if secret.len() > capacity {
        return Err(StegaError::PayloadTooLarge {
            payload_len: secret.len(),
            capacity,
        })
        .with_context(|| {
            format!(
                "Not enough space in the image to hide the text. \nRequired: {}, Available: {}",
                secret.len().to_string().red().bold(),
                capacity.to_string().green().bold()
            )
        });
    }

    log::info!("Reading {} pixels", metadata.pixel_count());
    let mut carrier = Carrier::load(&mut reader, metadata).with_context(|| {
        format!(
            "Unable to read the pixel data of {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;
    drop(reader);

    log::info!(
        "Hiding {} bytes inside {}",
        secret.len(),
        args.carrier.display()
    );
    log::debug!("message: {:?}", String::from_utf8_lossy(&secret));
    hide(&mut carrier.pixels, &secret)?;

    log::info!("Writing the new pixels to {}", args.output.display());
    write_carrier(&carrier, &args.output, args.force).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            args.output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        args.output.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 读取载体图像并扫描出隐藏的文本。
///
/// # Errors
///
/// 载体扩展名错误、无法打开或 BMP 头部损坏时返回错误。
/// 没有找到消息不算错误，由 [`Recovered::is_message`] 表示。
pub fn recover_message(carrier: &Path, policy: DecodePolicy) -> Result<Recovered> {
    ensure_extension(carrier, CARRIER_EXTENSION)?;

    let mut reader = open_carrier(carrier)?;
    log::info!("Reading data from {}", carrier.display());
    let image = Carrier::read_from(&mut reader).with_context(|| {
        format!(
            "Failed to read bitmap data from '{}'. \nThe image may be truncated or corrupted.",
            carrier.to_string_lossy().red().bold()
        )
    })?;

    log::info!("Scanning {} pixels", image.pixels.len());
    let recovered = find(&image.pixels, policy);
    log::debug!(
        "scanned {} pixels, sentinel found: {}",
        recovered.pixels_scanned,
        recovered.sentinel_found
    );

    Ok(recovered)
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 找到消息时打印到标准输出 (或写入 `--output` 指定的文件)；
/// 否则向标准错误输出提示，但仍然正常返回。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let policy = if args.raw {
        DecodePolicy::Raw
    } else {
        DecodePolicy::PrintableOnly
    };
    let recovered = recover_message(&args.carrier, policy)?;

    if !recovered.is_message() {
        eprintln!(
            "No hidden message was found in {}",
            args.carrier.to_string_lossy().yellow().bold()
        );
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &recovered.bytes)
                .map_err(|source| StegaError::OutputWrite {
                    path: path.clone(),
                    source,
                })
                .with_context(|| {
                    format!(
                        "Unable to write to target text file: {}",
                        path.to_string_lossy().red().bold()
                    )
                })?;
            println!(
                "The text has been successfully recovered and saved: {}",
                path.to_string_lossy().green().bold()
            );
        }
        None => {
            log::info!("There was a message hidden in the file");
            print_message(&mut io::stdout().lock(), &recovered, policy)
                .context("Unable to write the recovered text to standard output")?;
        }
    }

    Ok(())
}

/// 把恢复的文本写到 `out`。`Raw` 模式原样写出字节，不追加换行。
fn print_message<W: Write>(
    out: &mut W,
    recovered: &Recovered,
    policy: DecodePolicy,
) -> io::Result<()> {
    match policy {
        DecodePolicy::Raw => out.write_all(&recovered.bytes)?,
        DecodePolicy::PrintableOnly => writeln!(out, "{}", recovered.text())?,
    }
    out.flush()
}

/// 处理 'Info' 命令：打印头部字段和容量，不读取像素。
pub fn handle_info(args: InfoArgs) -> Result<()> {
    ensure_extension(&args.carrier, CARRIER_EXTENSION)?;

    let mut reader = open_carrier(&args.carrier)?;
    let metadata = BitmapMetadata::read_from(&mut reader).with_context(|| {
        format!(
            "Unable to read the bitmap header of {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;

    println!("{}", args.carrier.to_string_lossy().bold());
    println!("  file size:          {} bytes", metadata.file_size());
    println!("  pixel array offset: {}", metadata.pixel_array_offset());
    println!("  DIB header size:    {} bytes", metadata.dib_header_size());
    println!("  BMP header size:    {} bytes", metadata.bmp_header_size());
    println!("  pixel count:        {}", metadata.pixel_count());
    println!(
        "  capacity:           {} characters",
        metadata.capacity().to_string().green().bold()
    );

    Ok(())
}

/// 检查路径的扩展名 (不区分大小写)。
pub fn ensure_extension(path: &Path, expected: &'static str) -> Result<(), StegaError> {
    let matches = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        Err(StegaError::InvalidFileType {
            path: path.to_path_buf(),
            expected,
        })
    }
}

fn open_carrier(path: &Path) -> Result<BufReader<File>, StegaError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| StegaError::FileOpen {
            path: path.to_path_buf(),
            source,
        })
}

fn write_carrier(carrier: &Carrier, path: &Path, force: bool) -> Result<(), StegaError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let file = options.open(path).map_err(|source| match source.kind() {
        io::ErrorKind::AlreadyExists => StegaError::OutputExists {
            path: path.to_path_buf(),
        },
        _ => StegaError::OutputWrite {
            path: path.to_path_buf(),
            source,
        },
    })?;

    carrier
        .write_to(&mut BufWriter::new(file))
        .map_err(|source| StegaError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
}
