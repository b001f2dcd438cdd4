//! Camera framing for focusing on a body.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::{BodyId, BodyKind},
    motion::Orrery,
};

/// Closest the camera may sit to a body's surface.
const SURFACE_CLEARANCE: f64 = 0.2;
/// Closest the camera may sit to a body's centre.
const MIN_CAMERA_DISTANCE: f64 = 0.5;
/// Length of an animated focus transition (`s`).
pub const FOCUS_TRANSITION_SECONDS: f64 = 0.75;

fn distance_factor(kind: BodyKind) -> f64 {
    match kind {
        BodyKind::Star => 4.0,
        BodyKind::Planet => 8.0,
        BodyKind::Moon => 10.0,
        BodyKind::Asteroid => 6.0,
    }
}

/// Camera distance from the centre of a body of `kind` drawn at
/// `visual_radius`.
pub fn camera_distance(kind: BodyKind, visual_radius: f64) -> f64 {
    (visual_radius * distance_factor(kind))
        .max(visual_radius + SURFACE_CLEARANCE)
        .max(MIN_CAMERA_DISTANCE)
}

/// Where the camera sits and what it looks at.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
}

impl CameraPose {
    /// Frame a body at `target`, keeping the current viewing direction.
    pub fn framing(&self, target: Vector3<f64>, kind: BodyKind, visual_radius: f64) -> Self {
        let direction = (self.position - self.target)
            .try_normalize(0.0)
            .unwrap_or_else(|| Vector3::new(0.0, 0.3, 1.0).normalize());
        Self {
            position: target + direction * camera_distance(kind, visual_radius),
            target,
        }
    }

    /// Frame body `id` of `orrery` at its current world position.
    pub fn focus_on(&self, orrery: &Orrery, id: BodyId) -> Self {
        self.framing(
            orrery.world_position(id),
            orrery.system()[id].kind,
            orrery.visual_radius(id),
        )
    }
}

/// Smoothstep interpolation between two camera poses.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusTransition {
    from: CameraPose,
    to: CameraPose,
    duration: f64,
    elapsed: f64,
}

impl FocusTransition {
    pub fn new(from: CameraPose, to: CameraPose) -> Self {
        Self {
            from,
            to,
            duration: FOCUS_TRANSITION_SECONDS,
            elapsed: 0.0,
        }
    }

    pub fn instant(to: CameraPose) -> Self {
        Self {
            from: to,
            to,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` real seconds and return the pose to show.
    pub fn advance(&mut self, dt: f64) -> CameraPose {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.pose()
    }

    pub fn pose(&self) -> CameraPose {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        let s = t * t * (3.0 - 2.0 * t);
        CameraPose {
            position: self.from.position.lerp(&self.to.position, s),
            target: self.from.target.lerp(&self.to.target, s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_minimums() {
        assert_eq!(camera_distance(BodyKind::Star, 2.0), 8.0);
        assert_eq!(camera_distance(BodyKind::Planet, 0.3), 0.3 * 8.0);
        assert_eq!(camera_distance(BodyKind::Moon, 0.08), 0.08 * 10.0);
        // tiny bodies are clamped to the absolute floor
        assert_eq!(camera_distance(BodyKind::Asteroid, 0.05), 0.5);
        assert_eq!(camera_distance(BodyKind::Planet, 0.0), 0.5);
    }

    #[test]
    fn keeps_view_direction() {
        let pose = CameraPose {
            position: Vector3::new(0.0, 0.0, 10.0),
            target: Vector3::zeros(),
        };
        let framed = pose.framing(Vector3::new(50.0, 0.0, 0.0), BodyKind::Planet, 1.0);
        assert_eq!(framed.target, Vector3::new(50.0, 0.0, 0.0));
        assert!((framed.position - Vector3::new(50.0, 0.0, 8.0)).norm() < 1e-12);
    }

    #[test]
    fn degenerate_view_uses_default_direction() {
        let pose = CameraPose {
            position: Vector3::zeros(),
            target: Vector3::zeros(),
        };
        let framed = pose.framing(Vector3::zeros(), BodyKind::Star, 2.0);
        let expected = Vector3::new(0.0, 0.3, 1.0).normalize() * 8.0;
        assert!((framed.position - expected).norm() < 1e-12);
    }

    #[test]
    fn transition_is_smooth() {
        let from = CameraPose {
            position: Vector3::zeros(),
            target: Vector3::zeros(),
        };
        let to = CameraPose {
            position: Vector3::new(10.0, 0.0, 0.0),
            target: Vector3::new(4.0, 0.0, 0.0),
        };
        let mut transition = FocusTransition::new(from, to);
        let half = transition.advance(FOCUS_TRANSITION_SECONDS / 2.0);
        assert!((half.position.x - 5.0).abs() < 1e-12);
        assert!(!transition.is_finished());
        let end = transition.advance(10.0);
        assert_eq!(end, to);
        assert!(transition.is_finished());

        let mut instant = FocusTransition::instant(to);
        assert!(instant.is_finished());
        assert_eq!(instant.advance(0.0), to);
    }
}
