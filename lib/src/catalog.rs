//! Built-in catalog of the Sun, planets and major moons.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::{Body, BodyKind},
    kepler::orbits::OrbitalElements,
    scale::AU,
};

/// Name of the catalog's root star.
pub const SUN: &str = "Sun";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    /// Draw the epoch mean anomaly, argument of periapsis and node of
    /// moons without published values from the caller's RNG instead of
    /// starting them at zero.
    pub randomize_epoch_phase: bool,
}

/// Epoch angles of a body: either fixed, or free to be randomized.
#[derive(Copy, Clone)]
enum Phase {
    Fixed { ma: f64, argpe: f64, lan: f64 },
    Free,
}

#[derive(Copy, Clone)]
enum Distance {
    Au(f64),
    Km(f64),
}

impl Distance {
    fn km(self) -> f64 {
        match self {
            Distance::Au(au) => au * AU,
            Distance::Km(km) => km,
        }
    }
}

struct Entry {
    name: &'static str,
    color: u32,
    kind: BodyKind,
    parent: Option<&'static str>,
    radius: f64,
    rotperiod: f64,
    axial_tilt: f64,
    orbit: Option<(Distance, f64, f64, Phase, f64)>,
}

#[allow(clippy::too_many_arguments)]
const fn planet(
    name: &'static str,
    color: u32,
    radius: f64,
    rotperiod: f64,
    axial_tilt: f64,
    a_au: f64,
    e: f64,
    i: f64,
    ma: f64,
    argpe: f64,
    lan: f64,
    period: f64,
) -> Entry {
    Entry {
        name,
        color,
        kind: BodyKind::Planet,
        parent: Some(SUN),
        radius,
        rotperiod,
        axial_tilt,
        orbit: Some((Distance::Au(a_au), e, i, Phase::Fixed { ma, argpe, lan }, period)),
    }
}

#[allow(clippy::too_many_arguments)]
const fn moon(
    name: &'static str,
    color: u32,
    parent: &'static str,
    radius: f64,
    rotperiod: f64,
    axial_tilt: f64,
    a: f64,
    e: f64,
    i: f64,
    phase: Phase,
    period: f64,
) -> Entry {
    Entry {
        name,
        color,
        kind: BodyKind::Moon,
        parent: Some(parent),
        radius,
        rotperiod,
        axial_tilt,
        orbit: Some((Distance::Km(a), e, i, phase, period)),
    }
}

const FREE: Phase = Phase::Free;

#[rustfmt::skip]
const CATALOG: &[Entry] = &[
    Entry {
        name: SUN,
        color: 0xffff00,
        kind: BodyKind::Star,
        parent: None,
        radius: 695_700.0,
        rotperiod: 25.38 * 24.0,
        axial_tilt: 7.25,
        orbit: None,
    },
    planet("Mercury", 0x9c887a, 2439.7, 58.646 * 24.0, 0.03, 0.387_098, 0.205_63, 7.005, 174.796, 29.124, 48.331, 87.969),
    planet("Venus", 0xd8c0a3, 6051.8, -243.025 * 24.0, 177.36, 0.723_332, 0.006_772, 3.394_58, 50.416, 54.884, 76.68, 224.701),
    planet("Earth", 0x3399ff, 6371.0, 23.9345, 23.439_281_1, 1.0, 0.016_708_6, 0.000_05, 358.617, 114.207_83, -11.260_64, 365.256_36),
    moon(
        "Moon", 0xcccccc, "Earth", 1737.4, 27.321_661 * 24.0, 6.68, 384_748.0, 0.0549, 5.145,
        Phase::Fixed { ma: 135.27, argpe: 318.06, lan: 125.08 },
        27.321_661,
    ),
    planet("Mars", 0xc1440e, 3389.5, 24.6229, 25.19, 1.523_679, 0.093_400_6, 1.85, 19.39, 286.502, 49.558, 686.98),
    moon("Phobos", 0x555555, "Mars", 11.2667, 0.318_91 * 24.0, 0.0, 9376.0, 0.0151, 1.075, FREE, 0.318_91),
    moon("Deimos", 0x777777, "Mars", 6.2, 1.263 * 24.0, 0.0, 23_463.2, 0.000_33, 0.93, FREE, 1.263),
    planet("Jupiter", 0xc8a060, 69_911.0, 9.925 * 24.0, 3.13, 5.2038, 0.0489, 1.303, 19.677, 273.867, 100.464, 4332.589),
    moon("Io", 0xfff8b5, "Jupiter", 1821.6, 1.769_138 * 24.0, 0.0, 421_700.0, 0.0041, 0.05, FREE, 1.769_138),
    moon("Europa", 0xd4c9b8, "Jupiter", 1560.8, 3.551_181 * 24.0, 0.1, 671_034.0, 0.0094, 0.471, FREE, 3.551_181),
    moon("Ganymede", 0xa0a0a0, "Jupiter", 2634.1, 7.154_553 * 24.0, 0.0, 1_070_412.0, 0.0013, 0.204, FREE, 7.154_553),
    moon("Callisto", 0x605040, "Jupiter", 2410.3, 16.689_018 * 24.0, 0.0, 1_882_709.0, 0.0074, 0.205, FREE, 16.689_018),
    planet("Saturn", 0xd0b080, 58_232.0, 10.656 * 24.0, 26.73, 9.5826, 0.0565, 2.485, 320.347, 339.392, 113.665, 10_759.22),
    moon("Mimas", 0xbababa, "Saturn", 198.2, 0.942_422 * 24.0, 0.0, 185_539.0, 0.0196, 1.574, FREE, 0.942_422),
    moon("Enceladus", 0xf8f8f8, "Saturn", 252.1, 1.370_218 * 24.0, 0.0, 237_948.0, 0.0047, 0.009, FREE, 1.370_218),
    moon("Tethys", 0xdadada, "Saturn", 533.0, 1.887_802 * 24.0, 0.0, 294_619.0, 0.0001, 1.12, FREE, 1.887_802),
    moon("Dione", 0xd3d3d3, "Saturn", 561.4, 2.736_915 * 24.0, 0.0, 377_420.0, 0.0022, 0.019, FREE, 2.736_915),
    moon("Rhea", 0xbebebe, "Saturn", 763.8, 4.518_212 * 24.0, 0.0, 527_108.0, 0.001, 0.345, FREE, 4.518_212),
    moon("Titan", 0xffa500, "Saturn", 2574.7, 15.945 * 24.0, 0.0, 1_221_870.0, 0.0288, 0.348_54, FREE, 15.945),
    moon("Iapetus", 0x908070, "Saturn", 734.5, 79.3215 * 24.0, 0.0, 3_560_820.0, 0.029_25, 15.47, FREE, 79.3215),
    planet("Uranus", 0xa0d0d0, 25_362.0, -17.24 * 24.0, 97.77, 19.2184, 0.0457, 0.772, 142.238, 98.999, 74.006, 30_688.5),
    moon("Miranda", 0xaaaaaa, "Uranus", 235.8, 1.413_479 * 24.0, 0.0, 129_390.0, 0.0013, 4.232, FREE, 1.413_479),
    moon("Ariel", 0xc0c0c0, "Uranus", 578.9, 2.520_379 * 24.0, 0.0, 191_020.0, 0.0012, 0.26, FREE, 2.520_379),
    moon("Umbriel", 0x5a5a5a, "Uranus", 584.7, 4.144_177 * 24.0, 0.0, 266_000.0, 0.0039, 0.2, FREE, 4.144_177),
    moon("Titania", 0xb0e0e6, "Uranus", 788.4, 8.706_234 * 24.0, 0.0, 435_910.0, 0.0011, 0.34, FREE, 8.706_234),
    moon("Oberon", 0x778899, "Uranus", 761.4, 13.463_234 * 24.0, 0.0, 583_520.0, 0.0014, 0.058, FREE, 13.463_234),
    planet("Neptune", 0x4060b0, 24_622.0, 16.11 * 24.0, 28.32, 30.11, 0.0113, 1.77, 267.767, 272.846, 131.783, 60_182.0),
    moon("Triton", 0xfff0e0, "Neptune", 1353.4, -5.876_854 * 24.0, 0.0, 354_759.0, 0.000_016, 156.885, FREE, -5.876_854),
    moon("Nereid", 0x888899, "Neptune", 170.0, 0.475 * 24.0, 0.0, 5_513_818.0, 0.7507, 7.09, FREE, 360.1362),
];

/// Bodies of the built-in catalog, parents before satellites.
///
/// `rng` is only consulted when `options.randomize_epoch_phase` is set.
pub fn solar_system<R: Rng + ?Sized>(options: &CatalogOptions, rng: &mut R) -> Vec<Body> {
    CATALOG
        .iter()
        .map(|entry| Body {
            name: Arc::from(entry.name),
            kind: entry.kind,
            parent: entry.parent.map(Arc::from),
            radius: entry.radius,
            rotperiod: entry.rotperiod,
            axial_tilt: entry.axial_tilt,
            ephem: entry.orbit.map(|(a, e, i, phase, period)| {
                let (ma, argpe, lan) = match phase {
                    Phase::Fixed { ma, argpe, lan } => (ma, argpe, lan),
                    Phase::Free if options.randomize_epoch_phase => (
                        rng.gen_range(0.0..360.0),
                        rng.gen_range(0.0..360.0),
                        rng.gen_range(0.0..360.0),
                    ),
                    Phase::Free => (0.0, 0.0, 0.0),
                };
                OrbitalElements {
                    a: a.km(),
                    e,
                    i,
                    ma,
                    argpe,
                    lan,
                    period,
                }
            }),
            family: None,
            color: Some(entry.color),
            description: None,
        })
        .collect()
}
