//! 封面裁切
//!
//! 封面圖片為橫向的完整封套，右側區域即為海報

use anyhow::{Context, Result};
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// 海報寬度（像素）
pub const POSTER_WIDTH: u32 = 379;

/// 將封面重新存為 JPEG，並把右側 `POSTER_WIDTH` 寬的區域存成海報
///
/// 圖片寬度不足時使用整張圖片
pub fn crop_poster(fanart: &Path, poster: &Path) -> Result<()> {
    // 下載的檔案副檔名不一定符合實際格式
    let image = ImageReader::open(fanart)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(|| format!("無法開啟圖片: {}", fanart.display()))?
        .decode()
        .with_context(|| format!("無法解碼圖片: {}", fanart.display()))?;

    let width = image.width();
    let left = width.saturating_sub(POSTER_WIDTH);
    let cropped = image.crop_imm(left, 0, width - left, image.height());

    cropped
        .to_rgb8()
        .save_with_format(poster, ImageFormat::Jpeg)
        .with_context(|| format!("無法儲存海報: {}", poster.display()))?;

    image
        .to_rgb8()
        .save_with_format(fanart, ImageFormat::Jpeg)
        .with_context(|| format!("無法儲存封面: {}", fanart.display()))?;

    Ok(())
}
