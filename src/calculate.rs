use super::*;

/// Lowest energy, in MeV/u, of the range integration grid.
pub const RANGE_LOWER_ENERGY: f64 = 1E-4;
/// Number of logarithmically spaced points of the range integration grid.
pub const RANGE_POINTS: usize = 400;
/// Number of points of the energy straggling integration grid.
pub const STRAGGLING_POINTS: usize = 200;

/// Result of one projectile crossing one layer.
///
/// Energies in and out are per nucleon (MeV/u), the loss is total (MeV), stopping
/// powers are per nucleon (MeV/u per g/cm^2), range is in g/cm^2 and time of flight in ns.
/// `sigma_E` is the standard deviation of the total energy loss in MeV.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LayerResult {
    pub Ein: f64,
    pub Eout: f64,
    pub Eloss: f64,
    pub dEdxi: f64,
    pub dEdxo: f64,
    pub range: f64,
    pub sigma_E: f64,
    pub tof: f64,
}

impl fmt::Display for LayerResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ein = {} MeV/u Eout = {} MeV/u Eloss = {} MeV dEdx = ({}, {}) MeV/u/(g/cm2) range = {} g/cm2 sigma_E = {} MeV tof = {} ns",
            self.Ein, self.Eout, self.Eloss, self.dEdxi, self.dEdxo, self.range, self.sigma_E, self.tof)
    }
}

/// Per-layer results, in traversal order, and their combination over the whole stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MultiResult {
    pub results: Vec<LayerResult>,
    pub total: LayerResult,
}

impl MultiResult {
    pub fn new(results: Vec<LayerResult>) -> MultiResult {
        let total = match (results.first(), results.last()) {
            (Some(first), Some(last)) => LayerResult {
                Ein: first.Ein,
                Eout: last.Eout,
                Eloss: results.iter().map(|result| result.Eloss).sum(),
                dEdxi: first.dEdxi,
                dEdxo: last.dEdxo,
                range: first.range,
                sigma_E: stack_straggling(&results),
                tof: results.iter().map(|result| result.tof).sum(),
            },
            _ => LayerResult::default(),
        };
        MultiResult {
            results,
            total
        }
    }
}

/// Energy-loss spread behind a stack of layers in MeV. The spread carried into a layer
/// scales with the stopping power ratio dEdxo/dEdxi; each layer adds its own in quadrature.
fn stack_straggling(results: &[LayerResult]) -> f64 {
    results.iter().fold(0., |variance, result| {
        let scale = if result.dEdxi > 0. {result.dEdxo/result.dEdxi} else {1.};
        variance*scale*scale + result.sigma_E*result.sigma_E
    }).sqrt()
}

/// Continuous-slowing-down range in g/cm^2 of `projectile` at its current energy.
///
/// Integrates 1/dedx on a logarithmic energy grid down to `RANGE_LOWER_ENERGY`; the
/// residual range below that is T/dedx(T).
pub fn range<M: StoppingPowerModel>(projectile: &Projectile, material: &Material, model: &M, config: &Config) -> f64 {
    let mut p = *projectile;

    if projectile.T <= RANGE_LOWER_ENERGY {
        return projectile.T/model.dedx(projectile, material, config);
    }

    p.T = RANGE_LOWER_ENERGY;
    let residual = RANGE_LOWER_ENERGY/model.dedx(&p, material, config);

    //dT/S = T/S dln(T)
    let log_min = RANGE_LOWER_ENERGY.ln();
    let h = (projectile.T.ln() - log_min)/(RANGE_POINTS - 1) as f64;
    let integrand: Vec<f64> = (0..RANGE_POINTS).map(|i| {
        p.T = (log_min + h*i as f64).exp();
        p.T/model.dedx(&p, material, config)
    }).collect();

    let trapezoid: f64 = integrand.iter().tuple_windows().map(|(a, b)| 0.5*h*(a + b)).sum();
    residual + trapezoid
}

/// Standard deviation in MeV of the total energy lost between `Ein` and `Eout`.
///
/// sigma^2 = S(Eout)^2 * integral from Eout to Ein of dOmega^2/dx / S^3 dE, on a linear grid.
pub fn energy_straggling<M: StoppingPowerModel>(projectile: &Projectile, material: &Material, model: &M,
    config: &Config, Ein: f64, Eout: f64) -> f64 {

    if !(Ein > Eout) || !(Eout > 0.) {
        return 0.;
    }

    let mut p = *projectile;
    p.T = Eout;
    let dedx_out = model.dedx(&p, material, config);

    let h = (Ein - Eout)/(STRAGGLING_POINTS - 1) as f64;
    let integrand: Vec<f64> = (0..STRAGGLING_POINTS).map(|i| {
        p.T = Eout + h*i as f64;
        let dedx = model.dedx(&p, material, config);
        if dedx > 0. {model.dedx_variance(&p, material, config)/(dedx*dedx*dedx)} else {0.}
    }).collect();

    let integral: f64 = integrand.iter().tuple_windows().map(|(a, b)| 0.5*h*(a + b)).sum();
    projectile.A*dedx_out*integral.sqrt()
}

/// Time of flight in ns across `material` from the mean of the entry and exit velocities.
pub fn time_of_flight(material: &Material, Ein: f64, Eout: f64) -> f64 {
    let velocity = 0.5*(beta_from_T(Ein) + beta_from_T(Eout.max(0.)))*C;
    material.thickness_cm()/velocity
}

/// Forward traversal of a single layer with the derived quantities of a `LayerResult`.
pub fn calculate_layer<M: StoppingPowerModel>(projectile: &mut Projectile, material: &Material, model: &M,
    config: &Config, options: &IntegrationOptions) -> Result<LayerResult, IntegrationError> {

    let Ein = projectile.T;
    let dEdxi = if Ein > 0. {model.dedx(projectile, material, config)} else {0.};
    let range = if Ein > 0. {range(projectile, material, model, config)} else {0.};

    let Eloss = integrate_energyloss(projectile, material, model, config, options)?;

    let Eout = projectile.T;
    let dEdxo = model.dedx(projectile, material, config);

    Ok(LayerResult {
        Ein,
        Eout,
        Eloss,
        dEdxi,
        dEdxo,
        range,
        sigma_E: energy_straggling(projectile, material, model, config, Ein, Eout),
        tof: time_of_flight(material, Ein, Eout),
    })
}

/// Reverse traversal of a single layer from the exit energy held by `projectile`.
pub fn reverse_calculate_layer<M: StoppingPowerModel>(projectile: &mut Projectile, material: &Material, model: &M,
    config: &Config, options: &IntegrationOptions) -> Result<LayerResult, IntegrationError> {

    let Eout = projectile.T;
    let dEdxo = if Eout > 0. {model.dedx(projectile, material, config)} else {0.};

    let Eloss = reverse_integrate_energyloss(projectile, material, model, config, options)?;

    let Ein = projectile.T;

    Ok(LayerResult {
        Ein,
        Eout,
        Eloss,
        dEdxi: model.dedx(projectile, material, config),
        dEdxo,
        range: range(projectile, material, model, config),
        sigma_E: energy_straggling(projectile, material, model, config, Ein, Eout),
        tof: time_of_flight(material, Ein, Eout),
    })
}

/// Walks `projectile` through every layer in order, threading its energy from one layer
/// into the next. Stops at the first layer that fails.
pub fn calculate_layers<M: StoppingPowerModel>(projectile: &mut Projectile, layers: &Layers, model: &M,
    config: &Config, options: &IntegrationOptions) -> Result<MultiResult> {

    let mut results = Vec::with_capacity(layers.num());
    for (layer_index, material) in layers.iter().enumerate() {
        let result = calculate_layer(projectile, material, model, config, options)
            .with_context(|| format!("Layer {} failed for {}: {}", layer_index, projectile, material))?;
        results.push(result);
    }
    Ok(MultiResult::new(results))
}

/// Walks `projectile` backwards from the exit of the last layer to the entry of the first.
/// On success `projectile.T` is the energy required in front of the stack; results are
/// reported in traversal order.
pub fn reverse_calculate_layers<M: StoppingPowerModel>(projectile: &mut Projectile, layers: &Layers, model: &M,
    config: &Config, options: &IntegrationOptions) -> Result<MultiResult> {

    let mut results = Vec::with_capacity(layers.num());
    for (layer_index, material) in layers.iter().enumerate().rev() {
        let result = reverse_calculate_layer(projectile, material, model, config, options)
            .with_context(|| format!("Layer {} failed for {}: {}", layer_index, projectile, material))?;
        results.push(result);
    }
    results.reverse();
    Ok(MultiResult::new(results))
}
