use std::sync::Arc;

use crate::animation::motion::{Effect, FrameParams, Transition, frame_params};
use crate::assets::media::MediaAsset;
use crate::foundation::core::{FrameIndex, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::Frame;
use crate::render::schedule::FrameSchedule;

/// Opaque black, premultiplied.
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Rasterizes the still image for each frame with `vello_cpu`.
///
/// The image is cover-fit into the frame, scaled and offset by the per-frame [`FrameParams`],
/// and composited with its opacity over black. The output pixmap is owned exclusively by the
/// renderer and reused across frames.
pub struct FrameRenderer {
    size: FrameSize,
    width: u16,
    height: u16,
    effect: Effect,
    transition: Transition,
    image_width: u32,
    image_height: u32,
    paint: vello_cpu::Image,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("size", &self.size)
            .field("effect", &self.effect)
            .field("transition", &self.transition)
            .field("image_width", &self.image_width)
            .field("image_height", &self.image_height)
            .finish_non_exhaustive()
    }
}

impl FrameRenderer {
    /// Prepare a renderer for `image` at output `size`.
    pub fn new(
        image: &MediaAsset,
        size: FrameSize,
        effect: Effect,
        transition: Transition,
    ) -> ReelResult<Self> {
        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| ReelError::validation("frame width exceeds u16"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| ReelError::validation("frame height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("frame size must be non-zero"));
        }

        let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        Ok(Self {
            size,
            width,
            height,
            effect,
            transition,
            image_width: image.width,
            image_height: image.height,
            paint,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Output frame size.
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Draw parameters at normalized timeline position `progress`.
    pub fn params_at(&self, progress: f64) -> FrameParams {
        frame_params(
            self.effect,
            self.transition,
            progress,
            f64::from(self.size.width),
        )
    }

    /// Render frame `idx` of `schedule`.
    pub fn render(&mut self, schedule: &FrameSchedule, idx: FrameIndex) -> ReelResult<Frame> {
        if schedule.is_complete(idx) {
            return Err(ReelError::validation(format!(
                "frame {} is outside the {}-frame timeline",
                idx.0,
                schedule.total_frames()
            )));
        }
        let params = self.params_at(schedule.progress(idx));
        tracing::trace!(
            frame = idx.0,
            opacity = params.opacity,
            scale = params.scale,
            offset_x = params.offset_x,
            "render frame"
        );
        let data = self.render_params(params);
        Ok(Frame {
            index: idx,
            timestamp_secs: schedule.timestamp_secs(idx),
            width: self.size.width,
            height: self.size.height,
            data,
        })
    }

    /// Rasterize one frame for explicit draw parameters; returns premultiplied RGBA8.
    pub fn render_params(&mut self, params: FrameParams) -> Vec<u8> {
        clear_pixmap(&mut self.pixmap, BACKGROUND);

        let opacity = params.opacity.clamp(0.0, 1.0) as f32;
        if opacity > 0.0 {
            let dst = cover_fit(self.image_width, self.image_height, self.size, params);
            let (iw, ih) = (f64::from(self.image_width), f64::from(self.image_height));
            let transform = kurbo::Affine::translate((dst.x0, dst.y0))
                * kurbo::Affine::scale_non_uniform(dst.width() / iw, dst.height() / ih);

            let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                BACKGROUND[0],
                BACKGROUND[1],
                BACKGROUND[2],
                BACKGROUND[3],
            ));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(self.width),
                f64::from(self.height),
            ));

            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(self.paint.clone());
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
            if opacity < 1.0 {
                ctx.pop_layer();
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut self.pixmap);
        }

        self.pixmap.data_as_u8_slice().to_vec()
    }
}

/// Destination rectangle of the image in frame space.
///
/// The image covers the frame at `params.scale == 1` (the longer relative side overflows),
/// stays centered, and is then shifted by the params offsets.
pub fn cover_fit(
    image_width: u32,
    image_height: u32,
    frame: FrameSize,
    params: FrameParams,
) -> kurbo::Rect {
    let fw = f64::from(frame.width);
    let fh = f64::from(frame.height);
    let image_aspect = f64::from(image_width) / f64::from(image_height.max(1));

    let (w, h) = if image_aspect > frame.aspect() {
        let h = fh * params.scale;
        (h * image_aspect, h)
    } else {
        let w = fw * params.scale;
        (w, w / image_aspect)
    };

    let x = (fw - w) / 2.0 + params.offset_x;
    let y = (fh - h) / 2.0 + params.offset_y;
    kurbo::Rect::new(x, y, x + w, y + h)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::validation("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ReelError::validation("image must have non-zero size"));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ReelError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
