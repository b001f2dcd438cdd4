//! Procedural asteroid belt.
//!
//! The belt is a population of synthetic minor bodies in two passes:
//! first the configured families, clustered around their centre, then a
//! uniform background thinned by density zones. Both passes reject draws
//! landing in a resonance gap and both are bounded by an attempt budget,
//! so a restrictive configuration produces fewer bodies instead of
//! stalling.

use std::sync::Arc;

use color_eyre::eyre::{self, ensure};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    bodies::{Body, BodyKind},
    catalog::SUN,
    kepler::orbits::{heliocentric_period_days, OrbitalElements},
    scale::AU,
};

/// Family tag given to asteroids generated outside any family.
pub const BACKGROUND: &str = "Background";

/// Draw budget per requested family member.
const FAMILY_ATTEMPTS_PER_BODY: usize = 20;
/// Draw budget per requested background asteroid.
const BACKGROUND_ATTEMPTS_PER_BODY: usize = 5;
/// Density multiplier outside every configured zone.
const BASE_DENSITY: f64 = 0.3;
/// Scales a zone's density into an acceptance probability.
const DENSITY_ACCEPTANCE: f64 = 0.8;
const FAMILY_ECCENTRICITY_RANGE: (f64, f64) = (0.01, 0.4);
const FAMILY_INCLINATION_RANGE: (f64, f64) = (0.0, 25.0);
/// Family members vary their color by this fraction of the belt's
/// variation.
const FAMILY_COLOR_SPREAD: f64 = 0.5;
const MAX_COLOR: u32 = 0x00ff_ffff;
/// Asteroid spin periods are drawn from `[8, 24)` hours.
const ROTATION_PERIOD_RANGE: (f64, f64) = (8.0, 24.0);

/// An annulus depleted by a resonance (a Kirkwood gap).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResonanceGap {
    /// Centre semi-major axis (`AU`).
    pub center: f64,
    /// Full width (`AU`).
    pub width: f64,
    pub name: String,
}

impl ResonanceGap {
    pub fn contains(&self, a_au: f64) -> bool {
        (a_au - self.center).abs() < self.width / 2.0
    }
}

/// A mean and the half-width of a uniform spread around it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub mean: f64,
    pub spread: f64,
}

impl Spread {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.mean + (rng.gen::<f64>() - 0.5) * self.spread * 2.0
    }
}

/// A cluster of asteroids with similar orbits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsteroidFamily {
    pub name: Arc<str>,
    /// Centre semi-major axis (`AU`).
    pub center: f64,
    /// Scale of the offset from `center` (`AU`).
    pub spread: f64,
    /// Target number of members.
    pub count: usize,
    #[serde(default)]
    pub color: Option<u32>,
    /// Inclination (`deg`).
    pub inclination: Spread,
    pub eccentricity: Spread,
}

/// A band of the belt with its own acceptance density.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityZone {
    /// Centre semi-major axis (`AU`).
    pub center: f64,
    /// Full width (`AU`).
    pub width: f64,
    pub density: f64,
}

impl DensityZone {
    pub fn contains(&self, a_au: f64) -> bool {
        (a_au - self.center).abs() < self.width / 2.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltConfig {
    /// Upper bound on the number of asteroids generated.
    pub count: usize,
    /// Name of the body the belt orbits.
    pub parent: Arc<str>,
    /// Inner edge for background asteroids (`AU`).
    pub inner_radius: f64,
    /// Outer edge for background asteroids (`AU`).
    pub outer_radius: f64,
    /// Smallest asteroid radius (`km`).
    pub min_size: f64,
    /// Largest asteroid radius (`km`).
    pub max_size: f64,
    /// Background inclination range (`deg`).
    pub min_inclination: f64,
    pub max_inclination: f64,
    pub min_eccentricity: f64,
    pub max_eccentricity: f64,
    /// Display color of background asteroids and families without their
    /// own color.
    pub base_color: u32,
    /// Full width of the random offset added to an asteroid's color
    /// value. Family members get half of it.
    pub color_variation: u32,
    pub gaps: Vec<ResonanceGap>,
    pub families: Vec<AsteroidFamily>,
    pub density_zones: Vec<DensityZone>,
}

impl Default for BeltConfig {
    fn default() -> Self {
        let gap = |center: f64, width: f64, name: &str| ResonanceGap {
            center,
            width,
            name: name.to_owned(),
        };
        let family = |name: &str, color, center, spread, count, inclination, eccentricity| {
            AsteroidFamily {
                name: name.into(),
                center,
                spread,
                count,
                color: Some(color),
                inclination,
                eccentricity,
            }
        };
        let spread = |mean, spread| Spread { mean, spread };
        let zone = |center, width, density| DensityZone {
            center,
            width,
            density,
        };

        #[rustfmt::skip]
        let families = vec![
            family("Flora", 0xa0856b, 2.25, 0.15, 25, spread(5.5, 3.0), spread(0.15, 0.08)),
            family("Vesta", 0x9a8570, 2.35, 0.12, 18, spread(7.1, 2.5), spread(0.12, 0.06)),
            family("Eunomia", 0x8a7865, 2.65, 0.18, 20, spread(11.7, 4.0), spread(0.18, 0.09)),
            family("Koronis", 0x7a6b58, 2.87, 0.14, 15, spread(2.1, 1.5), spread(0.06, 0.04)),
            family("Eos", 0x6b5c49, 3.01, 0.16, 22, spread(10.9, 3.5), spread(0.11, 0.07)),
        ];

        Self {
            count: 150,
            parent: SUN.into(),
            inner_radius: 2.1,
            outer_radius: 3.4,
            min_size: 0.5,
            max_size: 50.0,
            min_inclination: 0.0,
            max_inclination: 25.0,
            min_eccentricity: 0.05,
            max_eccentricity: 0.3,
            base_color: 0x8b7355,
            color_variation: 0x333333,
            gaps: vec![
                gap(2.06, 0.08, "4:1 resonance"),
                gap(2.5, 0.12, "3:1 resonance"),
                gap(2.82, 0.08, "5:2 resonance"),
                gap(2.96, 0.06, "7:3 resonance"),
                gap(3.28, 0.1, "2:1 resonance"),
            ],
            families,
            density_zones: vec![
                zone(2.2, 0.2, 1.5),
                zone(2.7, 0.3, 2.0),
                zone(3.15, 0.2, 1.2),
            ],
        }
    }
}

impl BeltConfig {
    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(
            self.inner_radius > 0.0 && self.inner_radius < self.outer_radius,
            "belt radii must satisfy 0 < inner ({}) < outer ({})",
            self.inner_radius,
            self.outer_radius
        );
        ensure!(
            0.0 <= self.min_size && self.min_size <= self.max_size,
            "belt sizes must satisfy 0 <= min ({}) <= max ({})",
            self.min_size,
            self.max_size
        );
        ensure!(
            0.0 <= self.min_eccentricity
                && self.min_eccentricity <= self.max_eccentricity
                && self.max_eccentricity < 1.0,
            "belt eccentricities must satisfy 0 <= min ({}) <= max ({}) < 1",
            self.min_eccentricity,
            self.max_eccentricity
        );
        ensure!(
            self.min_inclination <= self.max_inclination,
            "belt inclinations must satisfy min ({}) <= max ({})",
            self.min_inclination,
            self.max_inclination
        );
        for family in &self.families {
            ensure!(
                family.spread >= 0.0 && family.center - family.spread > 0.0,
                "family {:?} needs a non-negative spread smaller than its center ({} AU)",
                family.name,
                family.center
            );
        }
        for gap in &self.gaps {
            ensure!(gap.width >= 0.0, "gap {:?} has negative width", gap.name);
        }
        for zone in &self.density_zones {
            ensure!(
                zone.width >= 0.0 && zone.density >= 0.0,
                "density zone at {} AU needs non-negative width and density",
                zone.center
            );
        }
        Ok(())
    }

    pub fn in_gap(&self, a_au: f64) -> bool {
        self.gaps.iter().any(|gap| gap.contains(a_au))
    }

    /// Probability of keeping a background asteroid at `a_au`.
    pub fn acceptance(&self, a_au: f64) -> f64 {
        let density = self
            .density_zones
            .iter()
            .find(|zone| zone.contains(a_au))
            .map_or(BASE_DENSITY, |zone| zone.density);
        (density * DENSITY_ACCEPTANCE).clamp(0.0, 1.0)
    }
}

/// A base color and the full width of the jitter applied around it.
struct Tint {
    color: u32,
    variation: f64,
}

impl Tint {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let jitter = (rng.gen::<f64>() - 0.5) * self.variation;
        (f64::from(self.color) + jitter).round().clamp(0.0, f64::from(MAX_COLOR)) as u32
    }
}

struct Draw {
    a_au: f64,
    e: f64,
    i: f64,
}

/// Generate the asteroid population described by `config`.
///
/// Returns at most `config.count` bodies and possibly fewer; every
/// family contributes at most its own `count`.
pub fn generate<R: Rng + ?Sized>(config: &BeltConfig, rng: &mut R) -> eyre::Result<Vec<Body>> {
    config.validate()?;

    let mut asteroids = Vec::with_capacity(config.count);

    for family in &config.families {
        let mut generated = 0;
        let mut attempts = 0;
        let max_attempts = family.count * FAMILY_ATTEMPTS_PER_BODY;
        while generated < family.count
            && attempts < max_attempts
            && asteroids.len() < config.count
        {
            attempts += 1;

            let scatter = rng.gen::<f64>() - 0.5;
            let offset = scatter * family.spread * (rng.gen::<f64>() + rng.gen::<f64>());
            let a_au = family.center + offset;
            if config.in_gap(a_au) {
                continue;
            }

            let (e_min, e_max) = FAMILY_ECCENTRICITY_RANGE;
            let (i_min, i_max) = FAMILY_INCLINATION_RANGE;
            let draw = Draw {
                a_au,
                e: family.eccentricity.sample(rng).clamp(e_min, e_max),
                i: family.inclination.sample(rng).clamp(i_min, i_max),
            };

            generated += 1;
            let name = format!("{}-{}", family.name, generated);
            let years = heliocentric_period_days(a_au) / 365.25;
            let description = format!(
                "A member of the {} family, circling {} once every {years:.1} years \
                 on an orbit close to its siblings'.",
                family.name, config.parent
            );
            asteroids.push(asteroid(
                config,
                draw,
                name,
                family.name.clone(),
                Tint {
                    color: family.color.unwrap_or(config.base_color),
                    variation: f64::from(config.color_variation) * FAMILY_COLOR_SPREAD,
                },
                description,
                rng,
            ));
        }
        if generated < family.count {
            debug!(
                family = %family.name,
                generated,
                target = family.count,
                attempts,
                "asteroid family under target"
            );
        }
    }

    let background_target = config.count.saturating_sub(asteroids.len());
    let max_attempts = background_target * BACKGROUND_ATTEMPTS_PER_BODY;
    let background: Arc<str> = BACKGROUND.into();
    let mut attempts = 0;
    while asteroids.len() < config.count && attempts < max_attempts {
        attempts += 1;

        let a_au = rng.gen_range(config.inner_radius..config.outer_radius);
        if config.in_gap(a_au) {
            continue;
        }
        if !rng.gen_bool(config.acceptance(a_au)) {
            continue;
        }

        let draw = Draw {
            a_au,
            e: uniform(rng, config.min_eccentricity, config.max_eccentricity),
            i: uniform(rng, config.min_inclination, config.max_inclination),
        };
        let name = format!("Asteroid-{}", asteroids.len() + 1);
        let years = heliocentric_period_days(a_au) / 365.25;
        let description = format!(
            "A background asteroid {a_au:.2} AU from {}, taking {years:.1} years per orbit.",
            config.parent
        );
        asteroids.push(asteroid(
            config,
            draw,
            name,
            background.clone(),
            Tint {
                color: config.base_color,
                variation: f64::from(config.color_variation),
            },
            description,
            rng,
        ));
    }

    let summary = BeltSummary::new(config, &asteroids);
    info!(
        total = summary.total,
        requested = summary.requested,
        in_families = summary.in_families(),
        background = summary.background,
        "generated asteroid belt"
    );
    debug!(
        gaps = %config.gaps.iter().map(|g| g.name.as_str()).join(", "),
        "resonance gaps"
    );

    Ok(asteroids)
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

fn asteroid<R: Rng + ?Sized>(
    config: &BeltConfig,
    draw: Draw,
    name: String,
    family: Arc<str>,
    tint: Tint,
    description: String,
    rng: &mut R,
) -> Body {
    let ephem = OrbitalElements {
        a: draw.a_au * AU,
        e: draw.e,
        i: draw.i,
        ma: uniform(rng, 0.0, 360.0),
        argpe: uniform(rng, 0.0, 360.0),
        lan: uniform(rng, 0.0, 360.0),
        period: heliocentric_period_days(draw.a_au),
    };
    let radius = uniform(rng, config.min_size, config.max_size);
    let color = tint.sample(rng);
    let (rot_min, rot_max) = ROTATION_PERIOD_RANGE;
    Body {
        name: name.into(),
        kind: BodyKind::Asteroid,
        parent: Some(config.parent.clone()),
        radius,
        rotperiod: uniform(rng, rot_min, rot_max),
        axial_tilt: uniform(rng, 0.0, 180.0),
        ephem: Some(ephem),
        family: Some(family),
        color: Some(color),
        description: Some(description),
    }
}

/// Counts describing a generated belt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeltSummary {
    pub requested: usize,
    pub total: usize,
    /// Members per configured family, in configuration order.
    pub families: Vec<(Arc<str>, usize)>,
    pub background: usize,
    /// Smallest and largest semi-major axis (`AU`).
    pub a_range: Option<(f64, f64)>,
}

impl BeltSummary {
    pub fn new(config: &BeltConfig, asteroids: &[Body]) -> Self {
        let counts = asteroids
            .iter()
            .filter_map(|b| b.family.as_deref())
            .counts();
        let families = config
            .families
            .iter()
            .map(|f| (f.name.clone(), counts.get(f.name.as_ref()).copied().unwrap_or(0)))
            .collect();
        let a_range = asteroids
            .iter()
            .filter_map(|b| b.ephem.map(|e| e.a / AU))
            .minmax_by_key(|a| OrderedFloat(*a))
            .into_option();
        Self {
            requested: config.count,
            total: asteroids.len(),
            families,
            background: counts.get(BACKGROUND).copied().unwrap_or(0),
            a_range,
        }
    }

    pub fn in_families(&self) -> usize {
        self.families.iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn semi_major_axes_au(bodies: &[Body]) -> Vec<f64> {
        bodies.iter().map(|b| b.ephem.unwrap().a / AU).collect()
    }

    #[test]
    fn avoids_gaps() {
        let config = BeltConfig::default();
        for seed in 0..20 {
            let belt = generate(&config, &mut StdRng::seed_from_u64(seed)).unwrap();
            for a in semi_major_axes_au(&belt) {
                for gap in &config.gaps {
                    assert!(
                        (a - gap.center).abs() >= gap.width / 2.0,
                        "a = {a} AU inside {}",
                        gap.name
                    );
                }
                // 3:1 resonance at 2.5 AU, 0.12 AU wide
                assert!(!(2.44 < a && a < 2.56));
            }
        }
    }

    #[test]
    fn respects_counts() {
        let config = BeltConfig::default();
        for seed in 0..20 {
            let belt = generate(&config, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(belt.len() <= config.count);
            let summary = BeltSummary::new(&config, &belt);
            assert_eq!(summary.total, belt.len());
            assert_eq!(summary.in_families() + summary.background, belt.len());
            for ((name, n), family) in summary.families.iter().zip(&config.families) {
                assert_eq!(name, &family.name);
                assert!(*n <= family.count);
            }
        }
    }

    #[test]
    fn total_caps_family_pass() {
        let config = BeltConfig {
            count: 10,
            ..BeltConfig::default()
        };
        let belt = generate(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(belt.len() <= 10);
        assert!(belt
            .iter()
            .all(|b| b.family.as_deref() == Some("Flora")));
    }

    #[test]
    fn deterministic_under_seed() {
        let config = BeltConfig::default();
        let a = generate(&config, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate(&config, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn naming_and_elements() {
        let config = BeltConfig::default();
        let belt = generate(&config, &mut StdRng::seed_from_u64(5)).unwrap();

        let flora: Vec<_> = belt
            .iter()
            .filter(|b| b.family.as_deref() == Some("Flora"))
            .collect();
        for (k, body) in flora.iter().enumerate() {
            assert_eq!(body.name.as_ref(), format!("Flora-{}", k + 1));
        }

        for (k, body) in belt.iter().enumerate() {
            if body.family.as_deref() == Some(BACKGROUND) {
                assert_eq!(body.name.as_ref(), format!("Asteroid-{}", k + 1));
                let ephem = body.ephem.unwrap();
                let a_au = ephem.a / AU;
                assert!((config.inner_radius..config.outer_radius).contains(&a_au));
                assert!((config.min_eccentricity..config.max_eccentricity).contains(&ephem.e));
            } else {
                let ephem = body.ephem.unwrap();
                assert!((0.01..=0.4).contains(&ephem.e));
                assert!((0.0..=25.0).contains(&ephem.i));
            }
            let ephem = body.ephem.unwrap();
            let a_au = ephem.a / AU;
            assert!((ephem.period - a_au.powf(1.5) * 365.25).abs() < 1e-9);
            assert!((0.0..360.0).contains(&ephem.ma));
            assert!((8.0..24.0).contains(&body.rotperiod));
            assert!((config.min_size..config.max_size).contains(&body.radius));
            assert_eq!(body.parent.as_deref(), Some(SUN));
            assert_eq!(body.kind, BodyKind::Asteroid);
            assert!(body.description.is_some());
        }
    }

    #[test]
    fn under_produces_instead_of_blocking() {
        let config = BeltConfig {
            count: 500,
            families: vec![],
            gaps: vec![ResonanceGap {
                center: 2.75,
                width: 1.2,
                name: "everything".into(),
            }],
            ..BeltConfig::default()
        };
        let belt = generate(&config, &mut StdRng::seed_from_u64(11)).unwrap();
        assert!(belt.len() < 500);
        for a in semi_major_axes_au(&belt) {
            assert!(!(2.15 < a && a < 3.35));
        }
    }

    #[test]
    fn acceptance_is_clamped() {
        let config = BeltConfig {
            density_zones: vec![DensityZone {
                center: 2.7,
                width: 0.3,
                density: 5.0,
            }],
            ..BeltConfig::default()
        };
        assert_eq!(config.acceptance(2.7), 1.0);
        assert!((config.acceptance(2.2) - 0.24).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_config() {
        let config = BeltConfig {
            inner_radius: 3.0,
            outer_radius: 2.0,
            ..BeltConfig::default()
        };
        assert!(generate(&config, &mut StdRng::seed_from_u64(0)).is_err());

        let config = BeltConfig {
            max_eccentricity: 1.5,
            ..BeltConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_family_reaching_the_star() {
        let wide = AsteroidFamily {
            name: "Wide".into(),
            center: 0.5,
            spread: 1.5,
            count: 50,
            color: None,
            inclination: Spread {
                mean: 5.0,
                spread: 1.0,
            },
            eccentricity: Spread {
                mean: 0.1,
                spread: 0.05,
            },
        };
        let config = BeltConfig {
            families: vec![wide.clone()],
            ..BeltConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(generate(&config, &mut StdRng::seed_from_u64(0)).is_err());

        // offsets stay strictly inside the spread, so every draw is positive
        let config = BeltConfig {
            count: 500,
            gaps: vec![],
            families: vec![AsteroidFamily {
                center: 0.5,
                spread: 0.45,
                ..wide
            }],
            ..BeltConfig::default()
        };
        let belt = generate(&config, &mut StdRng::seed_from_u64(0)).unwrap();
        for body in belt.iter().filter(|b| b.family.as_deref() == Some("Wide")) {
            let ephem = body.ephem.unwrap();
            assert!(ephem.a > 0.0);
            assert!(ephem.period.is_finite() && ephem.period > 0.0);
        }
    }

    #[test]
    fn colors_jitter_around_family_and_base() {
        let config = BeltConfig::default();
        for seed in 0..10 {
            let belt = generate(&config, &mut StdRng::seed_from_u64(seed)).unwrap();
            let mut tints = Vec::new();
            for body in &belt {
                let raw = body.color.unwrap();
                let color = f64::from(raw);
                let (base, half_band) = match config
                    .families
                    .iter()
                    .find(|f| Some(f.name.as_ref()) == body.family.as_deref())
                {
                    Some(family) => (
                        family.color.unwrap(),
                        f64::from(config.color_variation) / 4.0,
                    ),
                    None => (config.base_color, f64::from(config.color_variation) / 2.0),
                };
                assert!(
                    (color - f64::from(base)).abs() <= half_band + 0.5,
                    "{} color {raw:#08x} too far from {base:#08x}",
                    body.name
                );
                tints.push(body.color);
            }
            assert!(tints.iter().unique().count() > 1);
        }
    }

    #[test]
    fn zero_variation_keeps_exact_colors() {
        let config = BeltConfig {
            color_variation: 0,
            ..BeltConfig::default()
        };
        let belt = generate(&config, &mut StdRng::seed_from_u64(4)).unwrap();
        for body in &belt {
            let expected = match body.family.as_deref() {
                Some("Flora") => 0xa0856b,
                Some(BACKGROUND) => config.base_color,
                _ => continue,
            };
            assert_eq!(body.color, Some(expected));
        }
    }

    #[test]
    fn empty_belt() {
        let config = BeltConfig {
            count: 0,
            ..BeltConfig::default()
        };
        let belt = generate(&config, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(belt.is_empty());
        assert_eq!(BeltSummary::new(&config, &belt).a_range, None);
    }
}
