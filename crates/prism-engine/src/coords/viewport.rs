/// Rasterization rectangle in physical pixels, origin top-left.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport covering `width` x `height` pixels from the origin.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the viewport lies inside a `width` x `height` target.
    #[inline]
    pub fn fits(self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_viewport_fits_its_target() {
        let vp = Viewport::full(640, 480);
        assert!(vp.fits(640, 480));
        assert!(!vp.fits(639, 480));
        assert!(!vp.is_empty());
    }

    #[test]
    fn zero_sized_viewport_is_empty() {
        assert!(Viewport::full(0, 10).is_empty());
        assert!(Viewport::full(10, 0).is_empty());
    }

    #[test]
    fn offset_viewport_respects_target_bounds() {
        let vp = Viewport { x: 10, y: 10, width: 20, height: 20 };
        assert!(vp.fits(30, 30));
        assert!(!vp.fits(29, 30));
    }
}
