//! Render settings and the small vocabularies used to pick sampler and
//! tracer variants.
//!
//! Settings are layered: built-in defaults, then the scene file's `<render>`
//! element, then an optional JSON settings file, then command line flags.
//! Every layer above the defaults is a [`RenderOverrides`] with only the
//! fields it sets.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading a settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anti-aliasing sample distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    Regular,
    Random,
    Jittered,
    NRooks,
    MultiJittered,
}

impl SamplerKind {
    /// Parse a scene-file token (`regular|random|jittered|nrooks|multijittered`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "regular" => Some(Self::Regular),
            "random" => Some(Self::Random),
            "jittered" => Some(Self::Jittered),
            "nrooks" => Some(Self::NRooks),
            "multijittered" => Some(Self::MultiJittered),
            _ => None,
        }
    }

    /// Whether this distribution lays samples on a square grid.
    pub fn needs_square_count(&self) -> bool {
        matches!(self, Self::Regular | Self::Jittered | Self::MultiJittered)
    }
}

/// Which shading driver renders the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracerKind {
    /// Recursive reflection/refraction up to a maximum depth.
    Whitted,
    /// Direct lighting only, no secondary rays.
    RayCast,
    /// Unlit material colors.
    Flat,
}

impl TracerKind {
    /// Parse a scene-file token (`whitted|raycast|flat`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "whitted" => Some(Self::Whitted),
            "raycast" => Some(Self::RayCast),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

/// Fully resolved render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel
    pub samples: u32,
    pub sampler: SamplerKind,
    /// Number of precomputed sample sets the sampler cycles through
    pub sample_sets: u32,
    /// Maximum recursion depth for reflected/refracted rays
    pub max_depth: u32,
    pub tracer: TracerKind,
    /// Seed for every random decision in the render
    pub seed: u64,
    /// Linear scale applied to averaged pixel colors
    pub exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            samples: 16,
            sampler: SamplerKind::MultiJittered,
            sample_sets: 83,
            max_depth: 5,
            tracer: TracerKind::Whitted,
            seed: 0,
            exposure: 1.0,
        }
    }
}

impl RenderSettings {
    /// Apply every field the overrides set.
    pub fn apply(&mut self, overrides: &RenderOverrides) {
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(samples) = overrides.samples {
            self.samples = samples;
        }
        if let Some(sampler) = overrides.sampler {
            self.sampler = sampler;
        }
        if let Some(sample_sets) = overrides.sample_sets {
            self.sample_sets = sample_sets;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(tracer) = overrides.tracer {
            self.tracer = tracer;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(exposure) = overrides.exposure {
            self.exposure = exposure;
        }
    }

    /// Builder form of [`RenderSettings::apply`].
    pub fn with(mut self, overrides: &RenderOverrides) -> Self {
        self.apply(overrides);
        self
    }
}

/// A partial set of render settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub samples: Option<u32>,
    pub sampler: Option<SamplerKind>,
    pub sample_sets: Option<u32>,
    pub max_depth: Option<u32>,
    pub tracer: Option<TracerKind>,
    pub seed: Option<u64>,
    pub exposure: Option<f32>,
}

impl RenderOverrides {
    /// Parse overrides from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read overrides from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_tokens() {
        assert_eq!(SamplerKind::from_token("regular"), Some(SamplerKind::Regular));
        assert_eq!(SamplerKind::from_token("NRooks"), Some(SamplerKind::NRooks));
        assert_eq!(
            SamplerKind::from_token(" multijittered "),
            Some(SamplerKind::MultiJittered)
        );
        assert_eq!(SamplerKind::from_token("halton"), None);
    }

    #[test]
    fn test_square_requirement() {
        assert!(SamplerKind::Jittered.needs_square_count());
        assert!(SamplerKind::MultiJittered.needs_square_count());
        assert!(!SamplerKind::Random.needs_square_count());
        assert!(!SamplerKind::NRooks.needs_square_count());
    }

    #[test]
    fn test_tracer_tokens() {
        assert_eq!(TracerKind::from_token("whitted"), Some(TracerKind::Whitted));
        assert_eq!(TracerKind::from_token("RAYCAST"), Some(TracerKind::RayCast));
        assert_eq!(TracerKind::from_token("path"), None);
    }

    #[test]
    fn test_overrides_layering() {
        let scene = RenderOverrides {
            width: Some(64),
            samples: Some(4),
            ..Default::default()
        };
        let cli = RenderOverrides {
            samples: Some(9),
            ..Default::default()
        };

        let settings = RenderSettings::default().with(&scene).with(&cli);

        assert_eq!(settings.width, 64);
        assert_eq!(settings.samples, 9);
        assert_eq!(settings.height, RenderSettings::default().height);
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides = RenderOverrides::from_json(
            r#"{ "sampler": "nrooks", "max_depth": 2, "tracer": "flat" }"#,
        )
        .unwrap();

        assert_eq!(overrides.sampler, Some(SamplerKind::NRooks));
        assert_eq!(overrides.max_depth, Some(2));
        assert_eq!(overrides.tracer, Some(TracerKind::Flat));
        assert_eq!(overrides.width, None);
    }

    #[test]
    fn test_overrides_bad_json() {
        assert!(matches!(
            RenderOverrides::from_json(r#"{ "sampler": "sobol" }"#),
            Err(SettingsError::Json(_))
        ));
    }
}
