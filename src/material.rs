use super::*;

/// RustELoss's internal representation of a single `[[layers]]` input entry.
#[derive(Deserialize, Clone)]
pub struct MaterialParameters {
    /// Components as `[A, Z, stn]`; `A <= 0` selects the tabulated atomic weight.
    #[serde(default)]
    pub components: Vec<(f64, i32, f64)>,
    /// Shorthand for a pure element with the tabulated weight and density.
    pub element: Option<i32>,
    pub density: Option<f64>,
    pub thickness: f64,
    #[serde(default = "default_thickness_unit")]
    pub thickness_unit: String,
    #[serde(default)]
    pub i_potential: f64,
    #[serde(default)]
    pub molar_mass: f64,
}

///This helper function is a workaround to issue #368 in serde
fn default_thickness_unit() -> String {
    "G_CM2".to_string()
}

/// One element of a material: atomic weight `A` in g/mol, proton number `Z`, and
/// stoichiometric coefficient (or mass fraction, if below one) `stn`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    pub A: f64,
    pub Z: i32,
    pub stn: f64,
}

impl Element {
    pub fn new(A: f64, Z: i32, stn: f64) -> Element {
        Element {
            A,
            Z,
            stn
        }
    }
}

/// A homogeneous layer of matter. Thickness is stored as areal density in g/cm^2.
#[derive(Clone, Debug)]
pub struct Material {
    atoms: Vec<Element>,
    molar_mass: f64,
    rho: f64,
    th: f64,
    i_potential: f64,
}

impl Material {
    /// Material from `(A, Z, stn)` components. `mass == 0` derives the molar mass from
    /// the components.
    pub fn new(components: &[(f64, i32, f64)], density: f64, i_potential: f64, mass: f64) -> Material {
        assert!(!components.is_empty(), "Input error: material requires at least one component.");

        let mut material = Material {
            atoms: Vec::with_capacity(components.len()),
            molar_mass: 0.,
            rho: density,
            th: 0.,
            i_potential,
        };

        for &(A, Z, stn) in components {
            material.add_element(A, Z, stn);
        }

        if mass != 0. {
            material.molar_mass = mass;
        } else {
            material.calculate();
        }
        material
    }

    /// Single-element material of areal thickness `th` in g/cm^2.
    pub fn from_element(A: f64, Z: i32, density: f64, th: f64, i_potential: f64) -> Material {
        let mut material = Material {
            atoms: Vec::with_capacity(1),
            molar_mass: 0.,
            rho: density,
            th,
            i_potential,
        };
        material.add_element(A, Z, 1.);
        material
    }

    /// Construct a material from a `[[layers]]` input entry.
    pub fn from_parameters(material_parameters: &MaterialParameters) -> Result<Material> {

        let mut material = match (material_parameters.element, material_parameters.components.is_empty()) {
            (Some(Z), true) => {
                let mut material = nucdata::get_material(Z)?;
                material.i_potential = material_parameters.i_potential;
                material
            },
            (None, false) => Material::new(&material_parameters.components, 0., material_parameters.i_potential, material_parameters.molar_mass),
            (Some(_), false) => return Err(anyhow!("Input error: specify either element or components for a layer, not both.")),
            (None, true) => return Err(anyhow!("Input error: layer requires an element or at least one component.")),
        };

        if let Some(density) = material_parameters.density {
            material.set_density(density);
        }

        if !(material.rho > 0.) {
            return Err(anyhow!("Input error: layer density {} g/cm^3; must be greater than zero.", material.rho));
        }

        for element in &material.atoms {
            if !(element.A > 0.) {
                return Err(anyhow!("Input error: no atomic weight for component Z = {}; give A explicitly.", element.Z));
            }
        }

        match material_parameters.thickness_unit.as_str() {
            "G_CM2" => material.set_thickness(material_parameters.thickness*G_CM2),
            "MG_CM2" => material.set_thickness(material_parameters.thickness*MG_CM2),
            "UG_CM2" => material.set_thickness(material_parameters.thickness*UG_CM2),
            "CM" => material.set_thickness_cm(material_parameters.thickness*CM),
            "MM" => material.set_thickness_cm(material_parameters.thickness*MM),
            "MICRON" => material.set_thickness_cm(material_parameters.thickness*MICRON),
            "NM" => material.set_thickness_cm(material_parameters.thickness*NM),
            _ => return Err(anyhow!("Input error: could not parse thickness unit {}. Use one of G_CM2, MG_CM2, UG_CM2, CM, MM, MICRON, NM.",
                material_parameters.thickness_unit)),
        };

        if material.th < 0. {
            return Err(anyhow!("Input error: layer thickness {} g/cm^2; must not be negative.", material.th));
        }

        Ok(material)
    }

    /// Append a component. `A <= 0` selects the tabulated atomic weight of `Z`.
    pub fn add_element(&mut self, A: f64, Z: i32, stn: f64) {
        let A = if A > 0. {A} else {nucdata::element_atomic_weight(Z)};
        self.atoms.push(Element::new(A, Z, stn));
        self.molar_mass += stn*A;
    }

    /// If every coefficient is below one the coefficients are mass fractions and the
    /// molar mass is their weighted harmonic mean.
    fn calculate(&mut self) {
        if self.atoms.iter().all(|element| element.stn < 1.) {
            let sum: f64 = self.atoms.iter().map(|element| element.stn/element.A).sum();
            self.molar_mass = 1./sum;
        }
    }

    pub fn ncomponents(&self) -> usize {
        self.atoms.len()
    }

    pub fn get_element(&self, i: usize) -> &Element {
        &self.atoms[i]
    }

    pub fn elements(&self) -> &[Element] {
        &self.atoms
    }

    /// Molar mass in g/mol.
    pub fn M(&self) -> f64 {
        self.molar_mass
    }

    /// Explicit mean excitation potential in eV; zero if it is to be derived from the components.
    pub fn I(&self) -> f64 {
        self.i_potential
    }

    /// Density in g/cm^3.
    pub fn density(&self) -> f64 {
        self.rho
    }

    pub fn set_density(&mut self, rho: f64) -> &mut Self {
        self.rho = rho;
        self
    }

    /// Areal thickness in g/cm^2.
    pub fn thickness(&self) -> f64 {
        self.th
    }

    pub fn set_thickness(&mut self, th: f64) -> &mut Self {
        self.th = th;
        self
    }

    /// Geometric thickness in cm.
    pub fn thickness_cm(&self) -> f64 {
        self.th/self.rho
    }

    /// Set the thickness from a geometric length in cm at the current density.
    pub fn set_thickness_cm(&mut self, length: f64) -> &mut Self {
        self.th = length*self.rho;
        self
    }

    pub fn set_i_potential(&mut self, i_potential: f64) -> &mut Self {
        self.i_potential = i_potential;
        self
    }

    /// Mass fraction of each component, in component order.
    pub fn mass_fractions(&self) -> Vec<f64> {
        if self.atoms.iter().all(|element| element.stn < 1.) {
            let total: f64 = self.atoms.iter().map(|element| element.stn).sum();
            self.atoms.iter().map(|element| element.stn/total).collect()
        } else {
            let total: f64 = self.atoms.iter().map(|element| element.stn*element.A).sum();
            self.atoms.iter().map(|element| element.stn*element.A/total).collect()
        }
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        if (self.rho - other.rho).abs() > 1e-6 {return false;}
        if self.atoms.len() != other.atoms.len() {return false;}
        for (a, b) in self.atoms.iter().zip(&other.atoms) {
            if a.stn != b.stn {return false;}
            if a.A != b.A {return false;}
            if a.Z != b.Z {return false;}
        }
        self.molar_mass == other.molar_mass
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let components = self.atoms.iter()
            .map(|element| format!("({}, {}, {})", element.A, element.Z, element.stn))
            .join(" ");
        write!(f, "Material [{}] M = {} g/mol rho = {} g/cm3 thickness = {} g/cm2", components, self.molar_mass, self.rho, self.th)
    }
}

/// Ordered stack of materials; index order is traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layers {
    materials: Vec<Material>,
}

impl Layers {
    pub fn new() -> Layers {
        Layers {
            materials: vec![]
        }
    }

    /// Append a material behind the current last layer.
    pub fn push(&mut self, material: Material) {
        self.materials.push(material);
    }

    /// Append every material of `other`, in order; layers are flattened, not nested.
    pub fn push_layers(&mut self, other: &Layers) {
        for material in &other.materials {
            self.push(material.clone());
        }
    }

    pub fn num(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn get_materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.materials.iter()
    }

    /// Total areal thickness in g/cm^2.
    pub fn thickness(&self) -> f64 {
        self.materials.iter().map(|material| material.thickness()).sum()
    }

    /// Total geometric thickness in cm.
    pub fn thickness_cm(&self) -> f64 {
        self.materials.iter().map(|material| material.thickness_cm()).sum()
    }
}

impl std::ops::Index<usize> for Layers {
    type Output = Material;

    fn index(&self, i: usize) -> &Material {
        &self.materials[i]
    }
}

impl<'a> IntoIterator for &'a Layers {
    type Item = &'a Material;
    type IntoIter = std::slice::Iter<'a, Material>;

    fn into_iter(self) -> Self::IntoIter {
        self.materials.iter()
    }
}

impl From<Material> for Layers {
    fn from(material: Material) -> Layers {
        Layers {
            materials: vec![material]
        }
    }
}

impl std::ops::Add<Layers> for Layers {
    type Output = Layers;

    fn add(mut self, other: Layers) -> Layers {
        self.materials.extend(other.materials);
        self
    }
}

impl std::ops::Add<Material> for Layers {
    type Output = Layers;

    fn add(mut self, material: Material) -> Layers {
        self.materials.push(material);
        self
    }
}

impl std::ops::Add<&Layers> for &Layers {
    type Output = Layers;

    fn add(self, other: &Layers) -> Layers {
        let mut result = self.clone();
        result.push_layers(other);
        result
    }
}

impl std::ops::Add<&Material> for &Layers {
    type Output = Layers;

    fn add(self, material: &Material) -> Layers {
        let mut result = self.clone();
        result.push(material.clone());
        result
    }
}
