//! Mapping from physical sizes and distances to scene units.

use serde::{Deserialize, Serialize};

use crate::bodies::BodyKind;

/// One astronomical unit (`km`).
pub const AU: f64 = 149.6e6;
/// Scene units per AU.
pub const DISTANCE_SCALE_FACTOR: f64 = 50.0;
/// On-screen radius of the Earth, which fixes the planet size scale.
pub const EARTH_RADIUS_SCENE_UNITS: f64 = 0.3;
/// Mean radius of the Earth (`km`).
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const SUN_DISPLAY_RADIUS: f64 = 2.0;
pub const MIN_VISUAL_RADIUS: f64 = 0.05;
pub const MOON_MIN_VISUAL_RADIUS: f64 = 0.08;
/// Clearance between a parent's surface and its moons' visual orbits.
pub const MOON_VISUAL_ORBIT_GAP: f64 = 0.05;

/// Asteroids are inflated by this factor so they stay visible.
const ASTEROID_SIZE_BOOST: f64 = 5.0;

/// Scene scaling parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneScale {
    /// Scene units per `km` of orbital distance.
    pub distance_scale: f64,
    /// Scene units per `km` of body radius.
    pub size_scale: f64,
    pub sun_display_radius: f64,
    pub min_visual_radius: f64,
    pub moon_min_visual_radius: f64,
    pub moon_orbit_gap: f64,
    /// User multiplier applied on top of every visual radius, `[1, 10]`.
    pub body_size_multiplier: f64,
}

impl Default for SceneScale {
    fn default() -> Self {
        Self {
            distance_scale: DISTANCE_SCALE_FACTOR / AU,
            size_scale: EARTH_RADIUS_SCENE_UNITS / EARTH_RADIUS_KM,
            sun_display_radius: SUN_DISPLAY_RADIUS,
            min_visual_radius: MIN_VISUAL_RADIUS,
            moon_min_visual_radius: MOON_MIN_VISUAL_RADIUS,
            moon_orbit_gap: MOON_VISUAL_ORBIT_GAP,
            body_size_multiplier: 1.0,
        }
    }
}

impl SceneScale {
    /// Visual radius of a body before the user size multiplier.
    pub fn base_visual_radius(&self, kind: BodyKind, radius_km: f64) -> f64 {
        match kind {
            BodyKind::Star => self.sun_display_radius,
            BodyKind::Planet => self.min_visual_radius.max(radius_km * self.size_scale),
            BodyKind::Moon => self
                .moon_min_visual_radius
                .max(radius_km * self.size_scale),
            BodyKind::Asteroid => (self.min_visual_radius * 2.0)
                .max(radius_km * self.size_scale * ASTEROID_SIZE_BOOST),
        }
    }

    /// On-screen radius of a body.
    pub fn visual_radius(&self, kind: BodyKind, radius_km: f64) -> f64 {
        self.base_visual_radius(kind, radius_km) * self.body_size_multiplier
    }

    /// Map a `[0, 100]` slider position linearly onto a `[1, 10]` size
    /// multiplier.
    pub fn set_body_size_slider(&mut self, slider: f64) {
        let slider = slider.clamp(0.0, 100.0);
        self.body_size_multiplier = 1.0 + slider / 100.0 * 9.0;
    }
}
