use super::*;

/// RustELoss's internal representation of an input file.
#[derive(Deserialize, Clone)]
pub struct Input {
    pub options: Options,
    pub projectile_parameters: particle::ProjectileParameters,
    pub layers: Vec<material::MaterialParameters>,
    #[serde(default)]
    pub integration: IntegrationOptions,
    #[serde(default)]
    pub stopping: Config,
}

impl Input {
    pub fn new(string: &str) -> Result<Input> {
        toml::from_str(string).context(
            "Could not parse TOML file. Be sure [options], [projectile_parameters] and at least one [[layers]] entry are present."
        )
    }
}

///This helper function is a workaround to issue #368 in serde
fn one_usize() -> usize {
    1
}

///This helper function is a workaround to issue #368 in serde
fn default_buffer_size() -> usize {
    8192
}

///This helper function is a workaround to issue #368 in serde
fn default_mode() -> IntegrationMode {
    IntegrationMode::FORWARD
}

/// RustELoss's internal representation of the simulation-level options.
#[derive(Deserialize, Clone, Debug)]
pub struct Options {
    pub name: String,
    #[serde(default = "default_mode")]
    pub mode: IntegrationMode,
    #[serde(default = "one_usize")]
    pub num_threads: usize,
    #[serde(default = "one_usize")]
    pub num_chunks: usize,
    #[serde(default = "default_buffer_size")]
    pub write_buffer_size: usize,
}

/// Everything a run needs, unpacked and validated from an input file.
#[derive(Debug)]
pub struct Run {
    pub projectiles: Vec<particle::ProjectileInput>,
    pub layers: Layers,
    pub options: Options,
    pub integration: IntegrationOptions,
    pub config: Config,
}

/// Parse and validate the contents of an input file.
pub fn parse_input(input_toml: &str) -> Result<Run> {

    let input = Input::new(input_toml)?;

    //Ensure nonsensical threads/chunks options fail on input
    if input.options.num_threads == 0 {
        return Err(anyhow!("Input error: num_threads must be greater than zero."));
    }
    if input.options.num_chunks == 0 {
        return Err(anyhow!("Input error: num_chunks must be greater than zero."));
    }

    if !(input.integration.max_fractional_step > 0.) {
        return Err(anyhow!("Input error: max_fractional_step {}; must be greater than zero.", input.integration.max_fractional_step));
    }

    if input.layers.is_empty() {
        return Err(anyhow!("Input error: at least one [[layers]] entry is required."));
    }

    let mut layers = Layers::new();
    for (layer_index, material_parameters) in input.layers.iter().enumerate() {
        let material = Material::from_parameters(material_parameters)
            .with_context(|| format!("Input error: could not construct layer {}.", layer_index))?;
        layers.push(material);
    }

    let projectiles = particle::projectile_inputs(&input.projectile_parameters)?;

    Ok(Run {
        projectiles,
        layers,
        options: input.options,
        integration: input.integration,
        config: input.stopping,
    })
}

/// Read, parse and validate an input file.
pub fn input(input_file: &str) -> Result<Run> {

    //Read input file, convert to string, and open with toml
    let mut input_toml = String::new();
    let mut file = OpenOptions::new()
        .read(true)
        .write(false)
        .create(false)
        .open(input_file)
        .with_context(|| format!("Input error: could not open input file {}.", input_file))?;
    file.read_to_string(&mut input_toml).context("Could not convert TOML file to string.")?;

    parse_input(&input_toml)
}
