#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

use std::fmt;

//Error handling crates
use anyhow::{Result, Context, anyhow};
use thiserror::Error;

//Logging facade
use log::{debug, info, warn};

//Serializing/Deserializing crate
use serde::{Deserialize, Serialize};

//Parallelization and progress bar
use rayon::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

//I/O
use std::fs::File;
use std::fs::OpenOptions;
use std::io::prelude::*;
use std::io::BufWriter;

//itertools
use itertools::{izip, Itertools};

//Load internal modules
pub mod consts;
pub mod enums;
pub mod nucdata;
pub mod particle;
pub mod material;
pub mod stopping;
pub mod integrator;
pub mod calculate;
pub mod input;
pub mod output;
pub mod physics;
pub mod tests;

pub use crate::enums::*;
pub use crate::consts::*;
pub use crate::particle::Projectile;
pub use crate::material::{Element, Material, Layers};
pub use crate::stopping::{Config, StoppingPowerModel, StandardStopping, Target, beta_from_T, gamma_from_T, p_from_T};
pub use crate::integrator::{IntegrationOptions, IntegrationError, integrate_energyloss, reverse_integrate_energyloss};
pub use crate::calculate::{LayerResult, MultiResult, calculate_layers, reverse_calculate_layers};
pub use crate::input::{Input, Options, Run};
pub use crate::nucdata::{element_atomic_weight, element_density, get_material};

/// One projectile through one single-element layer with the standard stopping model and
/// default settings.
///
/// * pa, pz: projectile mass number and atomic number
/// * T: projectile energy in MeV/u
/// * ta, tz: target atomic weight (0 for the tabulated value) and atomic number
/// * thickness: areal thickness in g/cm^2
/// * density: target density in g/cm^3
pub fn simple_eloss(pa: f64, pz: i32, T: f64, ta: f64, tz: i32, thickness: f64, density: f64) -> Result<LayerResult> {

    if !(pa > 0.) {
        return Err(anyhow!("Input error: projectile mass number {}; must be greater than zero.", pa));
    }
    if !(density > 0.) {
        return Err(anyhow!("Input error: target density {} g/cm^3; must be greater than zero.", density));
    }

    let mut projectile = Projectile::bare(pa, pz, T);
    let material = Material::from_element(ta, tz, density, thickness, 0.);

    if !(material.get_element(0).A > 0.) {
        return Err(anyhow!("Input error: no atomic weight for target Z = {}; give ta explicitly.", tz));
    }

    let result = calculate::calculate_layer(&mut projectile, &material, &StandardStopping, &Config::default(), &IntegrationOptions::default())
        .with_context(|| format!("Could not integrate {} through {}.", projectile, material))?;
    Ok(result)
}
