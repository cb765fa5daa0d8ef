use crate::foundation::core::FrameIndex;

/// One rendered frame in premultiplied RGBA8.
///
/// `timestamp_secs` is always `index / fps` for the session that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Position in the session timeline.
    pub index: FrameIndex,
    /// Presentation time in seconds.
    pub timestamp_secs: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Read one pixel. Returns `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
