//! Generation request configuration and clamping.
//!
//! A [`GenerationConfig`] is validated exactly once, at construction, via
//! [`GenerationConfig::validated`]. Every numeric field is clamped into its
//! documented range there; downstream stages trust the values as-is.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Minimum number of full-pipeline attempts per run.
pub const MIN_RETRIES: u32 = 1;
/// Maximum number of full-pipeline attempts per run.
pub const MAX_RETRIES: u32 = 5;

/// Smallest supported panorama width in pixels.
pub const MIN_IMAGE_WIDTH: u32 = 720;
/// Largest supported panorama width in pixels.
pub const MAX_IMAGE_WIDTH: u32 = 1440;

/// Smallest supported panorama height in pixels.
pub const MIN_IMAGE_HEIGHT: u32 = 360;
/// Largest supported panorama height in pixels.
pub const MAX_IMAGE_HEIGHT: u32 = 720;

/// Lower bound for the diffusion guidance scale.
pub const MIN_GUIDANCE_SCALE: f64 = 1.0;
/// Upper bound for the diffusion guidance scale.
pub const MAX_GUIDANCE_SCALE: f64 = 20.0;

/// Minimum number of inference steps.
pub const MIN_INFERENCE_STEPS: u32 = 10;
/// Maximum number of inference steps.
pub const MAX_INFERENCE_STEPS: u32 = 50;

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Immutable per-request generation settings.
///
/// Construct via [`GenerationConfig::default`] or
/// [`GenerationConfig::validated`]; both guarantee every field is inside
/// its documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Run the furniture-matching sub-pipeline after panorama generation.
    pub include_furniture_matching: bool,
    /// Run the upscaling pass on the final image.
    pub enable_upscaling: bool,
    /// Full-pipeline attempts before giving up (`1..=5`).
    pub max_retries: u32,
    /// Panorama width in pixels (`720..=1440`).
    pub image_width: u32,
    /// Panorama height in pixels (`360..=720`).
    pub image_height: u32,
    /// Diffusion guidance scale (`1.0..=20.0`).
    pub guidance_scale: f64,
    /// Diffusion inference steps (`10..=50`).
    pub inference_steps: u32,
}

/// Caller-supplied overrides for [`GenerationConfig`].
///
/// Every field is optional; missing fields fall back to the defaults and
/// present fields are clamped by [`GenerationConfig::validated`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationConfigPatch {
    pub include_furniture_matching: Option<bool>,
    pub enable_upscaling: Option<bool>,
    pub max_retries: Option<u32>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub guidance_scale: Option<f64>,
    pub inference_steps: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            include_furniture_matching: true,
            enable_upscaling: true,
            max_retries: 3,
            image_width: 1440,
            image_height: 720,
            guidance_scale: 7.5,
            inference_steps: 20,
        }
    }
}

impl GenerationConfig {
    /// Merge a patch over the defaults, clamping every numeric field into
    /// its documented range.
    ///
    /// This is the single validation point for a run; no stage re-checks
    /// these values afterwards.
    pub fn validated(patch: GenerationConfigPatch) -> Self {
        let defaults = Self::default();
        Self {
            include_furniture_matching: patch
                .include_furniture_matching
                .unwrap_or(defaults.include_furniture_matching),
            enable_upscaling: patch.enable_upscaling.unwrap_or(defaults.enable_upscaling),
            max_retries: patch
                .max_retries
                .unwrap_or(defaults.max_retries)
                .clamp(MIN_RETRIES, MAX_RETRIES),
            image_width: patch
                .image_width
                .unwrap_or(defaults.image_width)
                .clamp(MIN_IMAGE_WIDTH, MAX_IMAGE_WIDTH),
            image_height: patch
                .image_height
                .unwrap_or(defaults.image_height)
                .clamp(MIN_IMAGE_HEIGHT, MAX_IMAGE_HEIGHT),
            guidance_scale: patch
                .guidance_scale
                .unwrap_or(defaults.guidance_scale)
                .clamp(MIN_GUIDANCE_SCALE, MAX_GUIDANCE_SCALE),
            inference_steps: patch
                .inference_steps
                .unwrap_or(defaults.inference_steps)
                .clamp(MIN_INFERENCE_STEPS, MAX_INFERENCE_STEPS),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_yields_defaults() {
        let config = GenerationConfig::validated(GenerationConfigPatch::default());
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn in_range_values_pass_through() {
        let config = GenerationConfig::validated(GenerationConfigPatch {
            max_retries: Some(2),
            image_width: Some(1024),
            image_height: Some(512),
            guidance_scale: Some(12.0),
            inference_steps: Some(30),
            ..Default::default()
        });
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.image_width, 1024);
        assert_eq!(config.image_height, 512);
        assert_eq!(config.guidance_scale, 12.0);
        assert_eq!(config.inference_steps, 30);
    }

    #[test]
    fn max_retries_clamped_high() {
        let config = GenerationConfig::validated(GenerationConfigPatch {
            max_retries: Some(10),
            ..Default::default()
        });
        assert_eq!(config.max_retries, MAX_RETRIES);
    }

    #[test]
    fn max_retries_clamped_low() {
        let config = GenerationConfig::validated(GenerationConfigPatch {
            max_retries: Some(0),
            ..Default::default()
        });
        assert_eq!(config.max_retries, MIN_RETRIES);
    }

    #[test]
    fn guidance_scale_clamped_below_minimum() {
        let config = GenerationConfig::validated(GenerationConfigPatch {
            guidance_scale: Some(-3.0),
            ..Default::default()
        });
        assert_eq!(config.guidance_scale, MIN_GUIDANCE_SCALE);
    }

    #[test]
    fn dimensions_clamped_into_supported_range() {
        let config = GenerationConfig::validated(GenerationConfigPatch {
            image_width: Some(8192),
            image_height: Some(16),
            ..Default::default()
        });
        assert_eq!(config.image_width, MAX_IMAGE_WIDTH);
        assert_eq!(config.image_height, MIN_IMAGE_HEIGHT);
    }

    #[test]
    fn inference_steps_clamped_both_ways() {
        let low = GenerationConfig::validated(GenerationConfigPatch {
            inference_steps: Some(1),
            ..Default::default()
        });
        let high = GenerationConfig::validated(GenerationConfigPatch {
            inference_steps: Some(500),
            ..Default::default()
        });
        assert_eq!(low.inference_steps, MIN_INFERENCE_STEPS);
        assert_eq!(high.inference_steps, MAX_INFERENCE_STEPS);
    }

    #[test]
    fn booleans_pass_through_unclamped() {
        let config = GenerationConfig::validated(GenerationConfigPatch {
            include_furniture_matching: Some(false),
            enable_upscaling: Some(false),
            ..Default::default()
        });
        assert!(!config.include_furniture_matching);
        assert!(!config.enable_upscaling);
    }
}
