use std::path::Path;

use log::debug;

use crate::{error::Result, PixelBuffer};

/// Decodes any format the `image` crate recognizes into RGBA.
pub fn load_buffer(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();
    debug!("loaded {} ({}x{})", path.display(), image.width(), image.height());
    PixelBuffer::try_from(image)
}

/// Encodes `buffer`, picking the format from the file extension.
pub fn save_buffer(buffer: PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    buffer.into_rgba_image()?.save(path)?;
    debug!("wrote {}", path.display());
    Ok(())
}
