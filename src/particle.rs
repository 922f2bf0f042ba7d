use super::*;
use rand_distr::{Normal, Distribution, Uniform};

/// RustELoss's internal representation of the projectile_parameters input.
#[derive(Deserialize, Clone)]
pub struct ProjectileParameters {
    #[serde(default = "default_energy_unit")]
    pub energy_unit: String,
    pub N: Vec<usize>,
    pub A: Vec<f64>,
    pub Z: Vec<i32>,
    #[serde(default)]
    pub Q: Vec<f64>,
    pub T: Vec<Distributions>,
}

///This helper function is a workaround to issue #368 in serde
fn default_energy_unit() -> String {
    "MEV_U".to_string()
}

/// Flat projectile description produced from the input file, one per simulated projectile.
#[derive(Clone, PartialEq, Debug, Copy)]
pub struct ProjectileInput {
    pub A: f64,
    pub Z: i32,
    pub Q: f64,
    pub T: f64,
}

/// A charged projectile. `T` is the kinetic energy per nucleon in MeV/u and is the only
/// field the integrators write to.
#[derive(Clone, Copy, Debug)]
pub struct Projectile {
    pub A: f64,
    pub Z: i32,
    pub Q: f64,
    pub T: f64,
}

impl Projectile {
    /// Projectile constructor from raw inputs.
    pub fn new(A: f64, Z: i32, Q: f64, T: f64) -> Projectile {
        Projectile {
            A,
            Z,
            Q,
            T
        }
    }

    /// Fully stripped projectile, i.e. `Q == Z`.
    pub fn bare(A: f64, Z: i32, T: f64) -> Projectile {
        Projectile::new(A, Z, Z as f64, T)
    }

    /// Construct a projectile from a flattened input entry.
    pub fn from_input(input: ProjectileInput) -> Projectile {
        assert!(input.A > 0., "Input error: projectile mass number {}; must be greater than zero.", input.A);
        Projectile::new(input.A, input.Z, input.Q, input.T)
    }

    /// Sets the kinetic energy per nucleon and returns self for chaining.
    pub fn set_T(&mut self, T: f64) -> &mut Self {
        self.T = T;
        self
    }

    /// Total kinetic energy in MeV.
    pub fn energy(&self) -> f64 {
        self.T*self.A
    }

    /// Rest mass in MeV/c^2, approximated as A atomic mass units.
    pub fn mass(&self) -> f64 {
        self.A*AMU
    }

    /// Relativistic velocity beta = v/c.
    pub fn beta(&self) -> f64 {
        stopping::beta_from_T(self.T)
    }
}

impl PartialEq for Projectile {
    fn eq(&self, other: &Self) -> bool {
        (self.A == other.A) && (self.Z == other.Z) && (self.Q == other.Q)
    }
}

impl fmt::Display for Projectile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Projectile A = {} Z = {} Q = {} at {} MeV/u", self.A, self.Z, self.Q, self.T)
    }
}

/// Sample a single energy value in the input energy unit.
pub fn sample_energy(distribution: &Distributions) -> Result<f64> {
    let energy = match *distribution {
        Distributions::NORMAL{mean, std} => {
            if !(std >= 0.) || !std.is_finite() || !mean.is_finite() {
                return Err(anyhow!("Input error: normal energy distribution requires finite mean and std >= 0; got ({}, {}).", mean, std));
            }
            let normal = Normal::new(mean, std)
                .map_err(|e| anyhow!("Input error: invalid normal energy distribution ({}, {}): {}", mean, std, e))?;
            normal.sample(&mut rand::thread_rng())
        },
        Distributions::UNIFORM{min, max} => {
            if !(min < max) {
                return Err(anyhow!("Input error: uniform energy distribution requires min < max; got [{}, {}).", min, max));
            }
            Uniform::from(min..max).sample(&mut rand::thread_rng())
        },
        Distributions::POINT(x) => x,
    };
    Ok(energy)
}

/// Flatten the projectile parameters into one `ProjectileInput` per simulated projectile,
/// converting energies to MeV/u.
pub fn projectile_inputs(projectile_parameters: &ProjectileParameters) -> Result<Vec<ProjectileInput>> {

    let num_species = projectile_parameters.Z.len();

    //Check that projectile arrays are equal length
    if projectile_parameters.A.len() != num_species || projectile_parameters.T.len() != num_species || projectile_parameters.N.len() != num_species {
        return Err(anyhow!("Input error: projectile input arrays of unequal length."));
    }
    if !projectile_parameters.Q.is_empty() && projectile_parameters.Q.len() != num_species {
        return Err(anyhow!("Input error: projectile charge array must be empty or match the other projectile arrays."));
    }

    let mut projectile_inputs = Vec::with_capacity(projectile_parameters.N.iter().sum());

    for (species_index, (&N, &A, &Z, T)) in izip!(&projectile_parameters.N, &projectile_parameters.A, &projectile_parameters.Z, &projectile_parameters.T).enumerate() {

        if A <= 0. {
            return Err(anyhow!("Input error: projectile mass number {}; must be greater than zero.", A));
        }

        let Q = match projectile_parameters.Q.get(species_index) {
            Some(&Q) => Q,
            None => Z as f64,
        };

        //Unit factor maps input energy to MeV/u
        let energy_unit = match projectile_parameters.energy_unit.as_str() {
            "MEV_U" => 1.,
            "KEV_U" => KEV,
            "MEV" => 1./A,
            "KEV" => KEV/A,
            _ => return Err(anyhow!("Input error: could not parse energy unit {}. Use one of MEV_U, KEV_U, MEV, KEV.",
                projectile_parameters.energy_unit)),
        };

        for _ in 0..N {
            let T = sample_energy(T)?*energy_unit;
            if !(T > 0.) {
                return Err(anyhow!("Input error: sampled projectile energy {} MeV/u; must be greater than zero.", T));
            }
            projectile_inputs.push(ProjectileInput {A, Z, Q, T});
        }
    }
    Ok(projectile_inputs)
}
