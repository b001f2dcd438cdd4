//! Definitions of celestial bodies.

use std::{collections::HashMap, fmt, sync::Arc};

use color_eyre::eyre::{self, bail, ensure, OptionExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    arena::{Arena, IdLike},
    kepler::orbits::OrbitalElements,
};

/// What sort of body this is. Drives visual sizing and the moon
/// orbit-distance override.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Asteroid,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
            BodyKind::Asteroid => "asteroid",
        };
        f.pad(s)
    }
}

/// A celestial body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Unique name of this body.
    pub name: Arc<str>,
    pub kind: BodyKind,
    /// The name of the parent body of this body, if any.
    pub parent: Option<Arc<str>>,
    /// Mean radius of the body's sphere (`km`)
    pub radius: f64,
    /// Sidereal rotation period (`hours`). Negative for retrograde
    /// spin, zero for no spin.
    pub rotperiod: f64,
    /// Tilt of the spin axis (`deg`)
    pub axial_tilt: f64,
    /// Orbit around the parent. Absent for the root star.
    pub ephem: Option<OrbitalElements>,
    /// Asteroid family name, or `"Background"` for unclustered
    /// asteroids.
    #[serde(default)]
    pub family: Option<Arc<str>>,
    /// Display color as `0xRRGGBB`, a hint for the renderer.
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct BodyId(u32);

impl IdLike for BodyId {
    fn from_raw(index: usize) -> Self {
        Self(index as u32)
    }

    fn into_raw(self) -> usize {
        self.0 as usize
    }
}

/// Immutable registry of every body in the simulation, arranged as a
/// tree rooted at the star.
#[derive(Clone, Debug)]
pub struct SolarSystem {
    bodies: Arena<BodyId, Body>,
    by_name: HashMap<Arc<str>, BodyId>,
    parents: Vec<Option<BodyId>>,
    satellites: Vec<Vec<BodyId>>,
    root: BodyId,
}

impl SolarSystem {
    /// Build the registry, resolving parent names into ids.
    ///
    /// Fails on duplicate names, unknown parents, anything other than
    /// exactly one root, parent cycles and orbits outside `0 <= e < 1`.
    pub fn build(bodies: impl IntoIterator<Item = Body>) -> eyre::Result<Self> {
        let bodies: Arena<BodyId, Body> = bodies.into_iter().collect();

        let mut by_name = HashMap::with_capacity(bodies.len());
        for (id, body) in bodies.iter() {
            if by_name.insert(body.name.clone(), id).is_some() {
                bail!("duplicate body name {:?}", body.name);
            }
            if let Some(ephem) = &body.ephem {
                ensure!(
                    (0.0..1.0).contains(&ephem.e),
                    "body {:?} has eccentricity {} outside [0, 1)",
                    body.name,
                    ephem.e
                );
            }
        }

        let mut parents = Vec::with_capacity(bodies.len());
        let mut satellites = vec![Vec::new(); bodies.len()];
        let mut roots = Vec::new();
        for (id, body) in bodies.iter() {
            let parent = match &body.parent {
                Some(name) => {
                    let pid = *by_name.get(name).ok_or_else(|| {
                        eyre::eyre!("body {:?} has unknown parent {:?}", body.name, name)
                    })?;
                    satellites[pid.into_raw()].push(id);
                    Some(pid)
                }
                None => {
                    roots.push(id);
                    None
                }
            };
            parents.push(parent);
        }

        let root = match roots.as_slice() {
            [root] => *root,
            [] => bail!("no root body; every body has a parent"),
            _ => bail!(
                "multiple root bodies: {}",
                roots
                    .iter()
                    .map(|id| bodies[*id].name.as_ref())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };

        for id in bodies.ids() {
            let mut cur = id;
            let mut steps = 0;
            while let Some(parent) = parents[cur.into_raw()] {
                steps += 1;
                if steps > bodies.len() {
                    bail!("parent chain of {:?} contains a cycle", bodies[id].name);
                }
                cur = parent;
            }
        }

        debug!(
            bodies = bodies.len(),
            root = %bodies[root].name,
            "built solar system registry"
        );

        Ok(Self {
            bodies,
            by_name,
            parents,
            satellites,
            root,
        })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn root(&self) -> BodyId {
        self.root
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn lookup(&self, name: &str) -> Option<BodyId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a body name, failing with a readable error.
    pub fn require(&self, name: &str) -> eyre::Result<BodyId> {
        self.lookup(name).ok_or_eyre(format!("no body named {name:?}"))
    }

    pub fn parent(&self, id: BodyId) -> Option<BodyId> {
        self.parents[id.into_raw()]
    }

    /// Bodies orbiting `id`, in registry order.
    pub fn satellites(&self, id: BodyId) -> &[BodyId] {
        &self.satellites[id.into_raw()]
    }

    /// Walk from `id` up to (and including) the root.
    pub fn ancestors(&self, id: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        std::iter::successors(Some(id), |cur| self.parent(*cur))
    }
}

impl std::ops::Index<BodyId> for SolarSystem {
    type Output = Body;

    fn index(&self, index: BodyId) -> &Self::Output {
        &self.bodies[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str, kind: BodyKind, parent: Option<&str>) -> Body {
        Body {
            name: name.into(),
            kind,
            parent: parent.map(Into::into),
            radius: 1.0,
            rotperiod: 0.0,
            axial_tilt: 0.0,
            ephem: parent.map(|_| OrbitalElements {
                a: 1000.0,
                e: 0.0,
                i: 0.0,
                ma: 0.0,
                argpe: 0.0,
                lan: 0.0,
                period: 10.0,
            }),
            family: None,
            color: None,
            description: None,
        }
    }

    #[test]
    fn builds_tree() {
        let sys = SolarSystem::build([
            body("Sun", BodyKind::Star, None),
            body("Earth", BodyKind::Planet, Some("Sun")),
            body("Moon", BodyKind::Moon, Some("Earth")),
        ])
        .unwrap();
        let sun = sys.require("Sun").unwrap();
        let earth = sys.require("Earth").unwrap();
        let moon = sys.require("Moon").unwrap();
        assert_eq!(sys.root(), sun);
        assert_eq!(sys.parent(moon), Some(earth));
        assert_eq!(sys.satellites(sun), &[earth]);
        assert_eq!(sys.ancestors(moon).collect::<Vec<_>>(), vec![moon, earth, sun]);
        assert!(sys.require("Pluto").is_err());
    }

    #[test]
    fn satellites_may_precede_parent() {
        let sys = SolarSystem::build([
            body("Moon", BodyKind::Moon, Some("Earth")),
            body("Earth", BodyKind::Planet, Some("Sun")),
            body("Sun", BodyKind::Star, None),
        ])
        .unwrap();
        assert_eq!(sys[sys.root()].name.as_ref(), "Sun");
    }

    #[test]
    fn rejects_bad_trees() {
        assert!(SolarSystem::build([
            body("Sun", BodyKind::Star, None),
            body("Sun", BodyKind::Planet, Some("Sun")),
        ])
        .is_err());
        assert!(SolarSystem::build([
            body("Sun", BodyKind::Star, None),
            body("Earth", BodyKind::Planet, Some("Vulcan")),
        ])
        .is_err());
        assert!(SolarSystem::build([
            body("Sun", BodyKind::Star, None),
            body("Sun2", BodyKind::Star, None),
        ])
        .is_err());
        assert!(SolarSystem::build([
            body("Sun", BodyKind::Star, None),
            body("A", BodyKind::Planet, Some("B")),
            body("B", BodyKind::Planet, Some("A")),
        ])
        .is_err());
    }

    #[test]
    fn rejects_open_orbits() {
        let mut comet = body("Comet", BodyKind::Asteroid, Some("Sun"));
        if let Some(ephem) = comet.ephem.as_mut() {
            ephem.e = 1.2;
        }
        assert!(SolarSystem::build([body("Sun", BodyKind::Star, None), comet]).is_err());
    }
}
