use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// 按扩展名推断图片的 media type，未知扩展名按 JPEG 处理
pub fn guess_image_media_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// 读取图片并编码为 base64
///
/// # 返回
/// 返回 `(media_type, base64_data)`
pub fn encode_image(path: &Path) -> AppResult<(&'static str, String)> {
    let bytes =
        std::fs::read(path).map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    Ok((guess_image_media_type(path), STANDARD.encode(bytes)))
}
