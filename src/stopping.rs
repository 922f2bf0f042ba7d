use super::*;

/// Knobs of the stopping power model. Forwarded unchanged to every oracle call.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_z_effective")]
    pub z_effective: ZEffective,
    #[serde(default = "default_electronic_stopping_mode")]
    pub electronic_stopping_mode: ElectronicStoppingMode,
    #[serde(default = "default_true")]
    pub nuclear_stopping: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            z_effective: default_z_effective(),
            electronic_stopping_mode: default_electronic_stopping_mode(),
            nuclear_stopping: true,
        }
    }
}

///This helper function is a workaround to issue #368 in serde
fn default_z_effective() -> ZEffective {
    ZEffective::PIERCE_BLANN
}

///This helper function is a workaround to issue #368 in serde
fn default_electronic_stopping_mode() -> ElectronicStoppingMode {
    ElectronicStoppingMode::INTERPOLATED
}

///This helper function is a workaround to issue #368 in serde
fn default_true() -> bool {
    true
}

/// The stopping power oracle consumed by the integrators.
///
/// `dedx` returns the energy loss rate per nucleon, in MeV/u per g/cm^2, for the
/// projectile at its current energy. It must be deterministic and continuous in the
/// projectile energy; it is never called with `projectile.T <= 0`.
pub trait StoppingPowerModel {
    fn dedx(&self, projectile: &Projectile, material: &Material, config: &Config) -> f64;

    /// Energy-loss straggling rate per nucleon, in (MeV/u)^2 per g/cm^2. Models without
    /// a straggling term report none.
    fn dedx_variance(&self, _projectile: &Projectile, _material: &Material, _config: &Config) -> f64 {
        0.
    }
}

impl<F> StoppingPowerModel for F
where F: Fn(&Projectile, &Material, &Config) -> f64 {
    fn dedx(&self, projectile: &Projectile, material: &Material, config: &Config) -> f64 {
        self(projectile, material, config)
    }
}

/// A stopping medium: total (not per nucleon) stopping power in MeV cm^2/g.
pub trait Target {
    fn stopping_power(&self, projectile: &Projectile, config: &Config) -> f64;

    /// Growth of the variance of the total energy loss, in MeV^2 per g/cm^2.
    fn energy_loss_variance(&self, projectile: &Projectile, config: &Config) -> f64;
}

impl Target for Element {
    fn stopping_power(&self, projectile: &Projectile, config: &Config) -> f64 {
        element_stopping_power(projectile, self, mean_excitation_potential_element(self.Z), config)
    }

    fn energy_loss_variance(&self, projectile: &Projectile, config: &Config) -> f64 {
        bohr_straggling(projectile, self, config)
    }
}

impl Target for Material {
    /// Bragg additivity over the components, weighted by mass fraction. An explicit
    /// material mean excitation potential replaces the per-element values.
    fn stopping_power(&self, projectile: &Projectile, config: &Config) -> f64 {
        self.elements().iter().zip(self.mass_fractions()).map(|(element, w)| {
            let I = if self.I() > 0. {self.I()} else {mean_excitation_potential_element(element.Z)};
            w*element_stopping_power(projectile, element, I, config)
        }).sum()
    }

    fn energy_loss_variance(&self, projectile: &Projectile, config: &Config) -> f64 {
        self.elements().iter().zip(self.mass_fractions())
            .map(|(element, w)| w*bohr_straggling(projectile, element, config))
            .sum()
    }
}

/// Electronic plus (optionally) nuclear stopping of any `Target`, per nucleon.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardStopping;

impl StoppingPowerModel for StandardStopping {
    fn dedx(&self, projectile: &Projectile, material: &Material, config: &Config) -> f64 {
        material.stopping_power(projectile, config)/projectile.A
    }

    fn dedx_variance(&self, projectile: &Projectile, material: &Material, config: &Config) -> f64 {
        material.energy_loss_variance(projectile, config)/(projectile.A*projectile.A)
    }
}

/// Lorentz factor for kinetic energy `T` in MeV/u.
pub fn gamma_from_T(T: f64) -> f64 {
    (T + AMU)/AMU
}

/// Velocity beta = v/c for kinetic energy `T` in MeV/u.
pub fn beta_from_T(T: f64) -> f64 {
    //beta^2 = t(t + 2)/(1 + t)^2 keeps precision where gamma rounds to one
    let t = T/AMU;
    (t*(t + 2.)).sqrt()/(1. + t)
}

/// Momentum in MeV/c of a projectile of mass number `M` at `T` MeV/u.
pub fn p_from_T(T: f64, M: f64) -> f64 {
    M*(T*T + 2.*T*AMU).sqrt()
}

/// Empirical mean excitation potential of element `Z` in eV.
pub fn mean_excitation_potential_element(Z: i32) -> f64 {
    let Zb = Z as f64;
    //Empirical fit, see Biersack and Haggmark
    let I0 = match Zb < 13. {
        true => 12. + 7./Zb,
        false => 9.76 + 58.5*Zb.powf(-1.19),
    };
    Zb*I0
}

/// Mean excitation potential of a material in eV: the explicit value if set, otherwise
/// the Bragg rule ln(I) = sum(w Z/A ln(I_i)) / sum(w Z/A).
pub fn mean_excitation_potential(material: &Material) -> f64 {
    if material.I() > 0. {
        return material.I();
    }
    let mut electron_density = 0.;
    let mut log_sum = 0.;
    for (element, w) in material.elements().iter().zip(material.mass_fractions()) {
        let n = w*element.Z as f64/element.A;
        electron_density += n;
        log_sum += n*mean_excitation_potential_element(element.Z).ln();
    }
    (log_sum/electron_density).exp()
}

/// Pierce-Blann effective charge for nuclear charge `z` at velocity `beta`.
pub fn z_eff_pierce_blann(z: f64, beta: f64) -> f64 {
    -z*(-0.95*FINE_STRUCTURE_INV*beta/z.powf(2./3.)).exp_m1()
}

/// Effective projectile charge according to `config.z_effective`.
pub fn z_effective(projectile: &Projectile, config: &Config) -> f64 {
    let Z = projectile.Z as f64;
    match config.z_effective {
        ZEffective::NONE => Z,
        ZEffective::PIERCE_BLANN => z_eff_pierce_blann(Z, beta_from_T(projectile.T)),
        ZEffective::FIXED => if projectile.Q > 0. {projectile.Q} else {Z},
    }
}

/// Electronic stopping of a single element in MeV cm^2/g, with mean excitation potential `I` in eV.
pub fn electronic_stopping(projectile: &Projectile, element: &Element, I: f64, config: &Config) -> f64 {
    let T = projectile.T;
    let Za = projectile.Z as f64;
    let Zb = element.Z as f64;
    let Ab = element.A;

    let beta = beta_from_T(T);
    let gamma = gamma_from_T(T);
    let beta2 = beta*beta;

    //See Biersack and Haggmark - this looks like an empirical shell correction
    let B = match Zb < 3. {
        true => 100.*Za/Zb,
        false => 5.
    };

    //Bethe stopping modified by Biersack and Varelas
    let z_eff = z_effective(projectile, config);
    let prefactor = BETHE_BLOCH_PREFACTOR*z_eff*z_eff*Zb/Ab/beta2;
    let eb = 2.*ME*beta2*gamma*gamma/(I*EV);
    let S_high = prefactor*((1. + eb + B/eb).ln() - beta2);

    //Lindhard-Scharff electronic stopping, T/EV is the energy in eV/amu
    let S_low = LINDHARD_SCHARFF_PREFACTOR*Za.powf(7./6.)*Zb/(Za.powf(2./3.) + Zb.powf(2./3.)).powf(3./2.)
        *(T/EV).sqrt()*EV_ANGSTROM2_TO_MEV_CM2_MOL/Ab;

    match config.electronic_stopping_mode {
        ElectronicStoppingMode::INTERPOLATED => 1./(1./S_high + 1./S_low),
        ElectronicStoppingMode::BETHE => S_high,
        ElectronicStoppingMode::LINDHARD_SCHARFF => S_low,
    }
}

/// ZBL universal nuclear stopping of a single element in MeV cm^2/g.
pub fn nuclear_stopping(projectile: &Projectile, element: &Element) -> f64 {
    let Z1 = projectile.Z as f64;
    let M1 = projectile.A;
    let Z2 = element.Z as f64;
    let M2 = element.A;

    if Z1 <= 0. || Z2 <= 0. {
        return 0.;
    }

    let E = projectile.T*projectile.A/KEV;
    let z_sum = Z1.powf(0.23) + Z2.powf(0.23);
    let reduced_energy = 32.53*M2*E/(Z1*Z2*(M1 + M2)*z_sum);

    let reduced_stopping = match reduced_energy <= 30. {
        true => (1. + 1.1383*reduced_energy).ln()
            /(2.*(reduced_energy + 0.01321*reduced_energy.powf(0.21226) + 0.19593*reduced_energy.sqrt())),
        false => reduced_energy.ln()/(2.*reduced_energy),
    };

    //ZBL reduced stopping to eV/(1E15 atoms/cm^2), then to MeV cm^2/g
    8.462*Z1*Z2*M1*reduced_stopping/((M1 + M2)*z_sum)*EV_1E15_TO_MEV_CM2_MOL/M2
}

/// Total stopping power of a single element in MeV cm^2/g.
pub fn element_stopping_power(projectile: &Projectile, element: &Element, I: f64, config: &Config) -> f64 {
    let electronic = electronic_stopping(projectile, element, I, config);
    match config.nuclear_stopping {
        true => electronic + nuclear_stopping(projectile, element),
        false => electronic,
    }
}

/// Bohr energy-loss straggling of a single element in MeV^2 per g/cm^2, with the
/// relativistic factor gamma^2 (1 - beta^2/2).
pub fn bohr_straggling(projectile: &Projectile, element: &Element, config: &Config) -> f64 {
    let gamma = gamma_from_T(projectile.T);
    let beta = beta_from_T(projectile.T);
    let z_eff = z_effective(projectile, config);

    BOHR_STRAGGLING_PREFACTOR*z_eff*z_eff*element.Z as f64/element.A*gamma*gamma*(1. - 0.5*beta*beta)
}
