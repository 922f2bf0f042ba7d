use super::*;

/// Mode of electronic stopping to use.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum ElectronicStoppingMode {
    /// Biersack-Varelas interpolation between Bethe-Bloch and Lindhard-Scharff. Valid for ~keV/nucleon to ~GeV/nucleon.
    INTERPOLATED,
    /// Bethe-Bloch with the Biersack-Varelas shell term only. Valid above ~1 MeV/nucleon.
    BETHE,
    /// Lindhard-Scharff velocity-proportional electronic stopping. Valid up to ~25 keV/nucleon.
    LINDHARD_SCHARFF,
}

impl fmt::Display for ElectronicStoppingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ElectronicStoppingMode::INTERPOLATED => write!(f, "Biersack-Varelas interpolated electronic stopping"),
            ElectronicStoppingMode::BETHE => write!(f, "Bethe-Bloch electronic stopping"),
            ElectronicStoppingMode::LINDHARD_SCHARFF => write!(f, "Lindhard-Scharff electronic stopping"),
        }
    }
}

/// Effective projectile charge used in the high energy stopping term.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum ZEffective {
    /// Bare nuclear charge Z.
    NONE,
    /// Pierce-Blann velocity-dependent effective charge.
    PIERCE_BLANN,
    /// Fixed ionic charge Q of the projectile; falls back to Z when Q is not positive.
    FIXED,
}

impl fmt::Display for ZEffective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ZEffective::NONE => write!(f, "Bare nuclear charge"),
            ZEffective::PIERCE_BLANN => write!(f, "Pierce-Blann effective charge"),
            ZEffective::FIXED => write!(f, "Fixed ionic charge"),
        }
    }
}

/// Direction in which the projectiles are walked through the layers.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum IntegrationMode {
    /// Known entry energy, compute the exit energy.
    FORWARD,
    /// Known exit energy, compute the required entry energy.
    REVERSE,
}

impl fmt::Display for IntegrationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IntegrationMode::FORWARD => write!(f, "Forward integration from entry energy"),
            IntegrationMode::REVERSE => write!(f, "Reverse integration from exit energy"),
        }
    }
}

/// Projectile energy distributions.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum Distributions {
    UNIFORM{min: f64, max: f64},
    NORMAL{mean: f64, std: f64},
    POINT(f64),
}
