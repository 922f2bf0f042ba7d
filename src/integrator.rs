use super::*;

/// Step control of the adaptive integrators. Immutable for the duration of a call.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct IntegrationOptions {
    /// Largest accepted energy loss of a single step, as a fraction of the current energy.
    #[serde(default = "default_max_fractional_step")]
    pub max_fractional_step: f64,
    /// Largest number of step halvings over one traversal.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for IntegrationOptions {
    fn default() -> IntegrationOptions {
        IntegrationOptions {
            max_fractional_step: default_max_fractional_step(),
            max_depth: default_max_depth(),
        }
    }
}

///This helper function is a workaround to issue #368 in serde
fn default_max_fractional_step() -> f64 {
    0.001
}

///This helper function is a workaround to issue #368 in serde
fn default_max_depth() -> usize {
    100
}

/// Failed traversal of a single material.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntegrationError {
    /// The step could not be refined below the fractional loss threshold within `depth` halvings.
    #[error("Numerical error: step refinement did not converge after {depth} halvings at {traversed} of {thickness} g/cm2 (T = {energy} MeV/u).")]
    NotConverged {
        depth: usize,
        traversed: f64,
        thickness: f64,
        energy: f64,
        fallback: f64,
    },
    /// The projectile energy reached zero or below inside the material.
    #[error("Numerical error: non-physical projectile energy {energy} MeV/u at {traversed} of {thickness} g/cm2; projectile stops inside the material.")]
    NonPhysical {
        traversed: f64,
        thickness: f64,
        energy: f64,
        fallback: f64,
    },
}

impl IntegrationError {
    /// The value returned in place of an energy loss by integrators that signal failure
    /// through the return value: the total input energy in MeV.
    pub fn fallback_energy(&self) -> f64 {
        match *self {
            IntegrationError::NotConverged{fallback, ..} => fallback,
            IntegrationError::NonPhysical{fallback, ..} => fallback,
        }
    }
}

/// Forward or reverse walk through one material, sharing the step control of both integrators.
fn adaptive_walk<M: StoppingPowerModel>(projectile: &mut Projectile, material: &Material, model: &M,
    config: &Config, options: &IntegrationOptions, sign: f64) -> Result<f64, IntegrationError> {

    let thickness = material.thickness();
    let e_start = projectile.T;
    let mut e_current = e_start;
    let mut depth = 0;
    let mut x_step = 0.25*thickness;
    let mut x_traversed = 0.;

    loop {
        let mut e_step = model.dedx(projectile, material, config)*x_step;

        //Refine at the current state before committing any energy change
        while e_step/e_current > options.max_fractional_step && depth < options.max_depth {
            depth += 1;
            x_step *= 0.5;
            e_step = model.dedx(projectile, material, config)*x_step;
        }

        if x_step + x_traversed >= thickness {
            x_step = thickness - x_traversed;
            e_step = model.dedx(projectile, material, config)*x_step;
            e_current += sign*e_step;
            projectile.T = e_current;
            if !(e_current > 0.) {
                return Err(IntegrationError::NonPhysical {
                    traversed: thickness,
                    thickness,
                    energy: e_current,
                    fallback: e_start*projectile.A,
                });
            }
            debug!("event=integration_done direction={} depth={} step={} T_start={} T_end={}",
                if sign < 0. {"forward"} else {"reverse"}, depth, x_step, e_start, e_current);
            return Ok(sign*(e_current - e_start)*projectile.A);
        }

        if depth == options.max_depth && e_step/e_current > options.max_fractional_step {
            return Err(IntegrationError::NotConverged {
                depth,
                traversed: x_traversed,
                thickness,
                energy: e_current,
                fallback: e_start*projectile.A,
            });
        }

        e_current += sign*e_step;
        projectile.T = e_current;
        x_traversed += x_step;

        if !(e_current > 0.) {
            return Err(IntegrationError::NonPhysical {
                traversed: x_traversed,
                thickness,
                energy: e_current,
                fallback: e_start*projectile.A,
            });
        }
    }
}

/// Walks `projectile` through `material` from its entry energy.
///
/// On success `projectile.T` holds the exit energy per nucleon and the total energy lost,
/// in MeV, is returned. On failure `projectile.T` holds the last committed energy.
/// Halved steps are never regrown, so the cost grows with the thickness over the
/// smallest step taken.
pub fn integrate_energyloss<M: StoppingPowerModel>(projectile: &mut Projectile, material: &Material, model: &M,
    config: &Config, options: &IntegrationOptions) -> Result<f64, IntegrationError> {

    //The oracle is undefined at or below zero energy
    if !(projectile.T > 0.) {
        return Err(IntegrationError::NonPhysical {
            traversed: 0.,
            thickness: material.thickness(),
            energy: projectile.T,
            fallback: projectile.T*projectile.A,
        });
    }

    adaptive_walk(projectile, material, model, config, options, -1.)
}

/// Walks `projectile` backwards through `material` from its exit energy.
///
/// On success `projectile.T` holds the required entry energy per nucleon and the total
/// energy lost in the material, in MeV, is returned.
///
/// The step is halved where the exit side demands it and never regrown, so the number of
/// oracle calls is about the thickness over the smallest step. From a low exit energy
/// that step is set by the low-energy end of the layer: 2e-3 g/cm^2 of carbon from
/// 0.01 MeV/u costs on the order of 1e5 calls, and thicker layers cost proportionally more.
pub fn reverse_integrate_energyloss<M: StoppingPowerModel>(projectile: &mut Projectile, material: &Material, model: &M,
    config: &Config, options: &IntegrationOptions) -> Result<f64, IntegrationError> {

    if !(projectile.T > 0.) {
        return Err(IntegrationError::NonPhysical {
            traversed: 0.,
            thickness: material.thickness(),
            energy: projectile.T,
            fallback: projectile.T*projectile.A,
        });
    }

    adaptive_walk(projectile, material, model, config, options, 1.)
}
