use std::fmt;
use std::str::FromStr;

use crate::animation::ease::Ease;
use crate::foundation::error::ReelError;

/// Fraction of the timeline occupied by the intro transition.
pub const TRANSITION_SPAN: f64 = 0.1;

/// Scale applied by the camera effects at their widest framing.
const EFFECT_MAX_SCALE: f64 = 1.1;

/// Horizontal pan distance as a fraction of frame width.
const PAN_FRACTION: f64 = 0.1;

/// Ken-Burns-style camera motion applied during the main window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    /// Static framing.
    #[default]
    None,
    /// Scale up from 1.0 to 1.1.
    ZoomIn,
    /// Scale down from 1.1 to 1.0.
    ZoomOut,
    /// Drift left at a fixed 1.1 scale.
    PanLeft,
    /// Drift right at a fixed 1.1 scale.
    PanRight,
}

/// Intro transition applied during the first [`TRANSITION_SPAN`] of the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    /// No intro.
    #[default]
    None,
    /// Opacity ramps linearly from 0 to 1.
    FadeIn,
    /// Image enters from the left edge with a cubic ease-out.
    SlideInLeft,
}

impl Effect {
    /// Wire spelling of this effect.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::PanLeft => "pan-left",
            Self::PanRight => "pan-right",
        }
    }
}

impl Transition {
    /// Wire spelling of this transition.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FadeIn => "fade-in",
            Self::SlideInLeft => "slide-in-left",
        }
    }
}

impl FromStr for Effect {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "zoom-in" => Ok(Self::ZoomIn),
            "zoom-out" => Ok(Self::ZoomOut),
            "pan-left" => Ok(Self::PanLeft),
            "pan-right" => Ok(Self::PanRight),
            other => Err(ReelError::validation(format!(
                "unknown effect '{other}' (expected none, zoom-in, zoom-out, pan-left, pan-right)"
            ))),
        }
    }
}

impl FromStr for Transition {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "fade-in" => Ok(Self::FadeIn),
            "slide-in-left" => Ok(Self::SlideInLeft),
            other => Err(ReelError::validation(format!(
                "unknown transition '{other}' (expected none, fade-in, slide-in-left)"
            ))),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame draw parameters derived from timeline progress.
///
/// `scale` multiplies the cover-fit size; offsets are in output pixels and are applied after
/// centering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    /// Image opacity in `[0, 1]`.
    pub opacity: f64,
    /// Scale factor relative to the cover-fit size.
    pub scale: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl FrameParams {
    /// Full opacity, unit scale, no offset.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };
}

/// Evaluate transition and camera effect for timeline progress `progress` in `[0, 1)`.
///
/// While `progress < TRANSITION_SPAN` only the transition runs and the effect is held at its
/// starting pose. Afterwards the effect runs over the remaining window with a quadratic ease.
pub fn frame_params(
    effect: Effect,
    transition: Transition,
    progress: f64,
    frame_width: f64,
) -> FrameParams {
    let p = progress.clamp(0.0, 1.0);
    let mut out = FrameParams::IDENTITY;

    let main_progress = if p < TRANSITION_SPAN {
        let tp = p / TRANSITION_SPAN;
        match transition {
            Transition::None => {}
            Transition::FadeIn => out.opacity = tp,
            Transition::SlideInLeft => {
                out.offset_x += -frame_width * (1.0 - Ease::OutCubic.apply(tp));
            }
        }
        0.0
    } else {
        (p - TRANSITION_SPAN) / (1.0 - TRANSITION_SPAN)
    };

    let em = Ease::InOutQuad.apply(main_progress);
    match effect {
        Effect::None => {}
        Effect::ZoomIn => out.scale = 1.0 + (EFFECT_MAX_SCALE - 1.0) * em,
        Effect::ZoomOut => out.scale = EFFECT_MAX_SCALE - (EFFECT_MAX_SCALE - 1.0) * em,
        Effect::PanLeft => {
            out.scale = EFFECT_MAX_SCALE;
            out.offset_x += -PAN_FRACTION * em * frame_width;
        }
        Effect::PanRight => {
            out.scale = EFFECT_MAX_SCALE;
            out.offset_x += PAN_FRACTION * em * frame_width;
        }
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
