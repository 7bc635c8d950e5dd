//! Resource limits for decode operations.

use crate::info::ImageConfig;

/// Resource limits checked against the dimensions a decoder reports.
///
/// Used to reject oversized images before they reach downstream code.
/// All limits are optional.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the normalized RGBA8 buffer in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_dimensions(mut self, width: u64, height: u64) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Check if dimensions are within limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err("pixel count exceeds limit");
            }
        }

        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), &'static str> {
        if let Some(max_memory) = self.max_memory_bytes {
            if bytes > max_memory {
                return Err("memory allocation exceeds limit");
            }
        }
        Ok(())
    }

    /// Check a decoded image or a parsed header against every limit.
    pub fn check(&self, config: &ImageConfig) -> Result<(), &'static str> {
        self.check_dimensions(u64::from(config.width), u64::from(config.height))?;
        self.check_memory(config.rgba8_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::ColorModel;

    #[test]
    fn limits_none() {
        let limits = Limits::none();
        assert!(limits.check_dimensions(u64::MAX, u64::MAX).is_ok());
        assert!(limits.check_memory(u64::MAX).is_ok());
    }

    #[test]
    fn limits_dimensions() {
        let limits = Limits {
            max_width: Some(1000),
            max_height: Some(1000),
            max_pixels: Some(500_000),
            ..Default::default()
        };

        assert!(limits.check_dimensions(1000, 1000).is_err()); // 1M pixels > 500k
        assert!(limits.check_dimensions(500, 500).is_ok());
        assert!(limits.check_dimensions(2000, 500).is_err());
    }

    #[test]
    fn check_uses_rgba8_footprint() {
        let limits = Limits::none().with_max_memory(400);
        let small = ImageConfig::new(10, 10, ColorModel::Gray, 8);
        let large = ImageConfig::new(11, 10, ColorModel::Gray, 8);

        assert!(limits.check(&small).is_ok());
        assert_eq!(limits.check(&large), Err("memory allocation exceeds limit"));
    }
}
