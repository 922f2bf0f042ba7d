use super::*;

/// A projectile after a run through all layers, successful or not.
pub struct ProjectileOutcome {
    pub input: particle::ProjectileInput,
    pub projectile: Projectile,
    pub result: Result<MultiResult>,
}

/// Output file streams of a run.
pub struct OutputListStreams {
    layers: BufWriter<File>,
    failures: BufWriter<File>,
}

fn open_output_file(options: &Options, suffix: &str) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(format!("{}{}", options.name, suffix))
        .with_context(|| format!("Output error: could not open output file {}{}.", options.name, suffix))?;
    Ok(BufWriter::with_capacity(options.write_buffer_size, file))
}

/// Open the per-layer and failure list files.
pub fn open_output_lists(options: &Options) -> Result<OutputListStreams> {
    Ok(OutputListStreams {
        layers: open_output_file(options, "layers.output")?,
        failures: open_output_file(options, "failures.output")?,
    })
}

/// Write one line per layer for a successful projectile, or one failure line.
pub fn output_lists(streams: &mut OutputListStreams, projectile_index: usize, outcome: &ProjectileOutcome) -> Result<()> {
    let input = &outcome.input;
    match &outcome.result {
        Ok(multi_result) => {
            for (layer_index, result) in multi_result.results.iter().enumerate() {
                writeln!(streams.layers, "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
                    projectile_index, layer_index, input.A, input.Z,
                    result.Ein, result.Eout, result.Eloss, result.dEdxi, result.dEdxo, result.range, result.sigma_E, result.tof)
                    .context("Output error: could not write to layers.output.")?;
            }
        },
        Err(error) => {
            writeln!(streams.failures, "{}, {}, {}, {}, {}, \"{:#}\"",
                projectile_index, input.A, input.Z, input.T, outcome.projectile.T, error)
                .context("Output error: could not write to failures.output.")?;
        }
    }
    Ok(())
}

/// Flush all output streams.
pub fn output_list_flush(streams: &mut OutputListStreams) -> Result<()> {
    streams.layers.flush().context("Output error: could not flush layers.output.")?;
    streams.failures.flush().context("Output error: could not flush failures.output.")?;
    Ok(())
}

/// Tally of a run.
#[derive(Serialize, Default, Debug, Clone, PartialEq)]
pub struct Summary {
    pub num_projectiles: usize,
    pub num_converged: usize,
    pub num_not_converged: usize,
    pub num_non_physical: usize,
    /// Mean total energy loss over converged projectiles, in MeV.
    pub mean_energy_loss: f64,
    /// Mean energy per nucleon in front of the stack (reverse mode) or behind it (forward mode), in MeV/u.
    pub mean_final_energy: f64,
}

impl Summary {
    pub fn new() -> Summary {
        Summary::default()
    }

    pub fn update(&mut self, outcome: &ProjectileOutcome) {
        self.num_projectiles += 1;
        match &outcome.result {
            Ok(multi_result) => {
                self.num_converged += 1;
                let n = self.num_converged as f64;
                self.mean_energy_loss += (multi_result.total.Eloss - self.mean_energy_loss)/n;
                self.mean_final_energy += (outcome.projectile.T - self.mean_final_energy)/n;
            },
            Err(error) => match error.downcast_ref::<IntegrationError>() {
                Some(IntegrationError::NotConverged{..}) => self.num_not_converged += 1,
                Some(IntegrationError::NonPhysical{..}) => self.num_non_physical += 1,
                None => warn!("event=unclassified_failure error={:#}", error),
            }
        }
    }

    pub fn print(&self, options: &Options) -> Result<()> {
        println!("{} projectiles: {} converged, {} not converged, {} non-physical.",
            self.num_projectiles, self.num_converged, self.num_not_converged, self.num_non_physical);
        println!("Mean energy loss: {} MeV. Mean final energy: {} MeV/u.", self.mean_energy_loss, self.mean_final_energy);

        let mut summary_stream = open_output_file(options, "summary.toml")?;
        let toml = toml::to_string(&self).context("Output error: could not serialize summary.")?;
        writeln!(summary_stream, "{}", toml).context("Output error: could not write summary.")?;
        summary_stream.flush().context("Output error: could not flush summary.")?;
        Ok(())
    }
}
