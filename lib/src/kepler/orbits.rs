//! Keplerian orbits.

use std::f64::consts;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Newton-Raphson iteration cap used by the per-frame solver.
pub const KEPLER_MAXITER: u64 = 10;
/// Convergence tolerance on the eccentric anomaly step (`rad`).
pub const KEPLER_TOL: f64 = 1e-7;
/// Below this derivative magnitude the solver stops with its current
/// estimate.
const MIN_DERIVATIVE: f64 = 1e-10;

/// Classical orbital elements of a body relative to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (`km`).
    pub a: f64,
    /// Eccentricity (dimensionless, `[0, 1)`).
    pub e: f64,
    /// Inclination (`deg`).
    pub i: f64,
    /// Mean anomaly at epoch (`deg`).
    pub ma: f64,
    /// Argument of periapsis (`deg`).
    pub argpe: f64,
    /// Longitude of ascending node (`deg`).
    pub lan: f64,
    /// Orbital period (`days`). Negative for retrograde motion.
    pub period: f64,
}

impl OrbitalElements {
    /// Mean motion (`rad/day`), or `None` for a zero period.
    pub fn mean_motion(&self) -> Option<f64> {
        if self.period == 0.0 {
            None
        } else {
            Some(consts::TAU / self.period)
        }
    }

    /// Mean anomaly in `[0, 2π)` after `t` days of simulated time.
    ///
    /// Returns `None` when the period is zero.
    pub fn mean_anomaly_at(&self, t: f64) -> Option<f64> {
        let n = self.mean_motion()?;
        Some(normalize_angle(self.ma.to_radians() + n * t))
    }

    /// Periapsis distance (`km`).
    pub fn periapsis_radius(&self) -> f64 {
        self.a * (1.0 - self.e)
    }

    /// Apoapsis distance (`km`).
    pub fn apoapsis_radius(&self) -> f64 {
        self.a * (1.0 + self.e)
    }

    /// Rotation from the perifocal frame PQW into the parent-centred
    /// reference frame. The columns are the P, Q and W unit vectors.
    pub fn pqw_ref_matrix(&self) -> Matrix3<f64> {
        let i = self.i.to_radians();
        let lan = self.lan.to_radians();
        let argpe = self.argpe.to_radians();

        let m11 = libm::cos(argpe) * libm::cos(lan)
            - libm::sin(argpe) * libm::sin(lan) * libm::cos(i);
        let m12 = -libm::sin(argpe) * libm::cos(lan)
            - libm::cos(argpe) * libm::sin(lan) * libm::cos(i);
        let m13 = libm::sin(lan) * libm::sin(i);
        let m21 = libm::cos(argpe) * libm::sin(lan)
            + libm::sin(argpe) * libm::cos(lan) * libm::cos(i);
        let m22 = -libm::sin(argpe) * libm::sin(lan)
            + libm::cos(argpe) * libm::cos(lan) * libm::cos(i);
        let m23 = -libm::cos(lan) * libm::sin(i);
        let m31 = libm::sin(argpe) * libm::sin(i);
        let m32 = libm::cos(argpe) * libm::sin(i);
        let m33 = libm::cos(i);

        Matrix3::new(m11, m12, m13, m21, m22, m23, m31, m32, m33)
    }

    /// Position in the orbital plane (`km`) at the given eccentric
    /// anomaly. The x axis points at periapsis.
    pub fn position_pqw(&self, ea: f64) -> Vector3<f64> {
        let ta = ea_to_ta(ea, self.e);
        let r = ea_to_radius(ea, self.a, self.e);
        Vector3::new(r * libm::cos(ta), r * libm::sin(ta), 0.0)
    }

    /// Position in the parent-centred reference frame (`km`) at the
    /// given eccentric anomaly.
    pub fn position_ref(&self, ea: f64) -> Vector3<f64> {
        let basis = self.pqw_ref_matrix();
        let pqw = self.position_pqw(ea);
        basis.column(0) * pqw.x + basis.column(1) * pqw.y
    }

    /// Position in the parent-centred reference frame (`km`) after `t`
    /// days of simulated time.
    ///
    /// `None` when the period is zero or the solver produced a
    /// non-finite anomaly; callers keep the previous position.
    pub fn position_ref_at(&self, t: f64) -> Option<Vector3<f64>> {
        let ma = self.mean_anomaly_at(t)?;
        let ea = ma_to_ea(ma, self.e, KEPLER_TOL, KEPLER_MAXITER);
        if ea.is_nan() {
            return None;
        }
        Some(self.position_ref(ea))
    }

    /// Sample the orbit ellipse as a closed polyline in scene
    /// coordinates, centred on the parent.
    ///
    /// `scaled_a` is the on-screen semi-major axis; the returned vector
    /// has `segments + 1` points with the last equal to the first.
    pub fn path_points(&self, scaled_a: f64, segments: usize) -> Vec<Vector3<f64>> {
        let segments = segments.max(3);
        let scaled_b = scaled_a * (1.0 - self.e * self.e).max(0.0).sqrt();
        let focus_offset = scaled_a * self.e;
        let basis = self.pqw_ref_matrix();
        let p = ref_to_scene(basis.column(0).into_owned(), 1.0);
        let q = ref_to_scene(basis.column(1).into_owned(), 1.0);

        (0..=segments)
            .map(|k| {
                let theta = if k == segments {
                    0.0
                } else {
                    consts::TAU * k as f64 / segments as f64
                };
                let x = scaled_a * libm::cos(theta) - focus_offset;
                let y = scaled_b * libm::sin(theta);
                p * x + q * y
            })
            .collect()
    }
}

/// Normalize an angle to `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= consts::TAU {
        0.0
    } else {
        a
    }
}

/// Solve Kepler's equation `E - e sin E = M` for the eccentric anomaly.
///
/// Starts from `E = M` and stops after `maxiter` steps, once the step
/// falls under `tol`, or when the derivative `1 - e cos E` becomes too
/// small to divide by. Never panics; a NaN input yields NaN.
pub fn ma_to_ea(ma: f64, e: f64, tol: f64, maxiter: u64) -> f64 {
    let mut ea = ma;
    for _ in 0..maxiter {
        let f = ea - e * libm::sin(ea) - ma;
        let fp = 1.0 - e * libm::cos(ea);
        if fp.abs() < MIN_DERIVATIVE {
            break;
        }
        let ea_prev = ea;
        ea -= f / fp;
        if (ea - ea_prev).abs() < tol {
            break;
        }
    }
    ea
}

/// Eccentric anomaly to true anomaly.
pub fn ea_to_ta(ea: f64, e: f64) -> f64 {
    2.0 * libm::atan2(
        libm::sqrt(1.0 + e) * libm::sin(ea / 2.0),
        libm::sqrt(1.0 - e) * libm::cos(ea / 2.0),
    )
}

/// Distance from the focus at the given eccentric anomaly.
pub fn ea_to_radius(ea: f64, a: f64, e: f64) -> f64 {
    a * (1.0 - e * libm::cos(ea))
}

/// Scale a reference-frame vector into scene units and swap into the
/// scene's y-up convention: reference z becomes scene y, reference y
/// becomes scene z.
pub fn ref_to_scene(v: Vector3<f64>, distance_scale: f64) -> Vector3<f64> {
    Vector3::new(
        v.x * distance_scale,
        v.z * distance_scale,
        v.y * distance_scale,
    )
}

/// Keep the direction of `scene_pos` and place it at the visual orbit
/// radius `parent_radius + own_radius + gap`.
///
/// A zero vector points along +X.
pub fn visual_orbit_position(
    scene_pos: Vector3<f64>,
    parent_radius: f64,
    own_radius: f64,
    gap: f64,
) -> Vector3<f64> {
    let direction = scene_pos
        .try_normalize(0.0)
        .filter(|d| d.iter().all(|c| c.is_finite()))
        .unwrap_or_else(Vector3::x);
    direction * (parent_radius + own_radius + gap)
}

/// Orbital period (`days`) of a heliocentric orbit from Kepler's third
/// law, with `a` in AU.
pub fn heliocentric_period_days(a_au: f64) -> f64 {
    a_au.powf(1.5) * 365.25
}
