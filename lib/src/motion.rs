//! Per-frame body motion: orbital position and spin.

use std::{f64::consts, sync::Arc};

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    arena::IdLike,
    bodies::{BodyId, BodyKind, SolarSystem},
    kepler::orbits::{normalize_angle, ref_to_scene, visual_orbit_position},
    scale::SceneScale,
    time::FrameTime,
};

/// Runtime state of one body. Never persisted with the catalog.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Position relative to the parent, in scene units.
    pub position: Vector3<f64>,
    /// Accumulated spin angle (`rad`), in `[0, 2π)`.
    pub rotation: f64,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: 0.0,
        }
    }
}

impl BodyState {
    /// Orientation of the body: the axial tilt (`deg`) about scene Z, then
    /// the spin about the tilted Y axis.
    pub fn orientation(&self, axial_tilt: f64) -> UnitQuaternion<f64> {
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), axial_tilt.to_radians());
        let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.rotation);
        tilt * spin
    }
}

/// Advance one body to `frame`.
///
/// The orbital position is a pure function of `frame.sim_days`; the spin
/// advances by `frame.delta_days`. A zero period or a solver failure leaves
/// the previous position in place.
pub fn update_body(
    system: &SolarSystem,
    id: BodyId,
    scale: &SceneScale,
    visual_radii: &[f64],
    state: &mut BodyState,
    frame: FrameTime,
) {
    let body = &system[id];

    if body.rotperiod != 0.0 {
        let rotperiod_days = body.rotperiod / 24.0;
        let spin_rate = consts::TAU / rotperiod_days;
        state.rotation = normalize_angle(state.rotation + spin_rate * frame.delta_days);
    }

    let (Some(ephem), Some(parent)) = (body.ephem.as_ref(), system.parent(id)) else {
        return;
    };
    let Some(pos_ref) = ephem.position_ref_at(frame.sim_days) else {
        trace!(body = %body.name, t = frame.sim_days, "position update skipped");
        return;
    };

    let scene = ref_to_scene(pos_ref, scale.distance_scale);
    state.position = if body.kind == BodyKind::Moon {
        visual_orbit_position(
            scene,
            visual_radii[parent.into_raw()],
            visual_radii[id.into_raw()],
            scale.moon_orbit_gap,
        )
    } else {
        scene
    };
}

/// Position and spin of a body at one instant, in world coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub name: Arc<str>,
    pub kind: BodyKind,
    pub position: Vector3<f64>,
    pub rotation: f64,
    pub visual_radius: f64,
}

/// A solar system in motion: the registry plus every body's runtime
/// state.
#[derive(Clone, Debug)]
pub struct Orrery {
    system: SolarSystem,
    scale: SceneScale,
    visual_radii: Vec<f64>,
    states: Vec<BodyState>,
    time: FrameTime,
}

impl Orrery {
    /// Place every body at the epoch.
    pub fn new(system: SolarSystem, scale: SceneScale) -> Self {
        let mut orrery = Self {
            visual_radii: Vec::new(),
            states: vec![BodyState::default(); system.len()],
            system,
            scale,
            time: FrameTime::default(),
        };
        orrery.set_scale(scale);
        orrery
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn scale(&self) -> &SceneScale {
        &self.scale
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Replace the scene scale and reposition every body at the current
    /// simulated time without advancing spin.
    pub fn set_scale(&mut self, scale: SceneScale) {
        self.scale = scale;
        self.visual_radii = self
            .system
            .iter()
            .map(|(_, body)| scale.visual_radius(body.kind, body.radius))
            .collect();
        self.update_all(FrameTime {
            sim_days: self.time.sim_days,
            delta_days: 0.0,
        });
    }

    pub fn set_body_size_slider(&mut self, slider: f64) {
        let mut scale = self.scale;
        scale.set_body_size_slider(slider);
        self.set_scale(scale);
    }

    /// Advance every body, in registry order.
    pub fn update_all(&mut self, frame: FrameTime) {
        self.time = frame;
        for id in self.system.ids() {
            update_body(
                &self.system,
                id,
                &self.scale,
                &self.visual_radii,
                &mut self.states[id.into_raw()],
                frame,
            );
        }
    }

    pub fn state(&self, id: BodyId) -> &BodyState {
        &self.states[id.into_raw()]
    }

    pub fn visual_radius(&self, id: BodyId) -> f64 {
        self.visual_radii[id.into_raw()]
    }

    /// World position, summing parent-relative positions up to the root.
    pub fn world_position(&self, id: BodyId) -> Vector3<f64> {
        self.system
            .ancestors(id)
            .map(|ancestor| self.state(ancestor).position)
            .sum()
    }

    pub fn orientation(&self, id: BodyId) -> UnitQuaternion<f64> {
        self.state(id).orientation(self.system[id].axial_tilt)
    }

    /// Orbit polyline around the parent, in parent-relative scene
    /// coordinates. `None` for bodies without an orbit.
    pub fn orbit_path(&self, id: BodyId, segments: usize) -> Option<Vec<Vector3<f64>>> {
        let body = &self.system[id];
        let ephem = body.ephem.as_ref()?;
        let parent = self.system.parent(id)?;
        let scaled_a = if body.kind == BodyKind::Moon {
            self.visual_radius(parent) + self.visual_radius(id) + self.scale.moon_orbit_gap
        } else {
            ephem.a * self.scale.distance_scale
        };
        Some(ephem.path_points(scaled_a, segments))
    }

    pub fn snapshot(&self, id: BodyId) -> BodySnapshot {
        let body = &self.system[id];
        BodySnapshot {
            name: body.name.clone(),
            kind: body.kind,
            position: self.world_position(id),
            rotation: self.state(id).rotation,
            visual_radius: self.visual_radius(id),
        }
    }

    pub fn snapshots(&self) -> Vec<BodySnapshot> {
        self.system.ids().map(|id| self.snapshot(id)).collect()
    }
}
