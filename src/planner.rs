//! # Dimension Planner Module
//!
//! Calcolo puro delle dimensioni di destinazione: nessun I/O, nessun pixel.
//!
//! ## Regole:
//! - `max_width == 0 && max_height == 0` → sempre `NoResizeNeeded`
//! - La scala è il minimo dei fattori di riduzione per asse, mai > 1
//! - Scala uniforme su entrambi gli assi (aspect ratio preservato)
//! - Mai upscale, mai resize quando l'immagine è esattamente al limite
//! - Arrotondamento half-away-from-zero (`f64::round`), ogni asse forzato a ≥ 1
//!
//! ## Esempio:
//! ```text
//! 3840x2160, max 1920x1080 → scale 0.5 → 1920x1080
//! 500x2000,  max 0x1080    → scale 0.54 → 270x1080
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either axis is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of planning a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// The image already fits within the limits
    NoResizeNeeded,
    /// Scale the image down to these dimensions
    Resize(Dimensions),
}

impl ResizePlan {
    pub fn target(&self) -> Option<Dimensions> {
        match self {
            ResizePlan::NoResizeNeeded => None,
            ResizePlan::Resize(target) => Some(*target),
        }
    }
}

/// Uniform scale factor needed to fit `original` within the limits, capped at 1.
pub fn scale_factor(original: Dimensions, max_width: u32, max_height: u32) -> f64 {
    let mut scale = 1.0_f64;

    if max_width > 0 && original.width > max_width {
        scale = scale.min(max_width as f64 / original.width as f64);
    }
    if max_height > 0 && original.height > max_height {
        scale = scale.min(max_height as f64 / original.height as f64);
    }

    scale
}

/// Decide whether `original` needs to shrink and compute the target size.
pub fn plan(original: Dimensions, max_width: u32, max_height: u32) -> ResizePlan {
    if max_width == 0 && max_height == 0 {
        return ResizePlan::NoResizeNeeded;
    }

    let scale = scale_factor(original, max_width, max_height);
    if scale >= 1.0 {
        return ResizePlan::NoResizeNeeded;
    }

    ResizePlan::Resize(Dimensions {
        width: scaled_axis(original.width, scale),
        height: scaled_axis(original.height, scale),
    })
}

fn scaled_axis(length: u32, scale: f64) -> u32 {
    // scale < 1, so the result never exceeds the original axis
    ((length as f64 * scale).round() as u32).max(1)
}
