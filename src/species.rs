// species.rs
// Particle presets used by emitters

use std::collections::HashMap;
use once_cell::sync::Lazy;

use crate::units;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticlePreset {
    pub charge: f64,
    pub mass: f64,
}

pub static PARTICLE_PRESETS: Lazy<HashMap<&'static str, ParticlePreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "electron",
        ParticlePreset { charge: -units::ELEMENTARY_CHARGE, mass: units::ELECTRON_MASS },
    );
    m.insert(
        "proton",
        ParticlePreset { charge: units::ELEMENTARY_CHARGE, mass: units::PROTON_MASS },
    );
    m.insert(
        "alpha",
        ParticlePreset { charge: 2.0 * units::ELEMENTARY_CHARGE, mass: units::ALPHA_MASS },
    );
    m
});

/// Look up a preset by its `particleType` name. Unknown names (e.g. "custom") yield `None`.
pub fn preset(name: &str) -> Option<ParticlePreset> {
    PARTICLE_PRESETS.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_carries_two_charges() {
        let alpha = preset("alpha").unwrap();
        assert!((alpha.charge - 3.204e-19).abs() < 1e-30);
        assert!(preset("custom").is_none());
    }
}
