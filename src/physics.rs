use super::*;

/// Run a single projectile through every layer in the direction given by `mode`.
pub fn single_projectile<M: StoppingPowerModel>(input: particle::ProjectileInput, layers: &Layers, model: &M,
    config: &Config, integration: &IntegrationOptions, mode: IntegrationMode) -> output::ProjectileOutcome {

    let mut projectile = Projectile::from_input(input);

    let result = match mode {
        IntegrationMode::FORWARD => calculate_layers(&mut projectile, layers, model, config, integration),
        IntegrationMode::REVERSE => reverse_calculate_layers(&mut projectile, layers, model, config, integration),
    };

    if let Err(error) = &result {
        warn!("event=projectile_failed A={} Z={} T={} error={:#}", input.A, input.Z, input.T, error);
    }

    output::ProjectileOutcome {
        input,
        projectile,
        result,
    }
}

/// Process every projectile of a run, in chunks and optionally in parallel, and write all output.
pub fn physics_loop<M: StoppingPowerModel + Sync>(run: Run, model: &M) -> Result<output::Summary> {

    let Run {projectiles, layers, options, integration, config} = run;

    println!("Processing {} projectiles through {} layers ({:.6e} g/cm2)...", projectiles.len(), layers.num(), layers.thickness());
    println!("{}. {}, {}.", options.mode, config.electronic_stopping_mode, config.z_effective);

    let total_count = projectiles.len();
    let chunk_size = (total_count/options.num_chunks).max(1);

    let mut output_list_streams = output::open_output_lists(&options)?;
    let mut summary = output::Summary::new();

    //Initialize threads with rayon
    println!("Initializing with {} threads...", options.num_threads);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.num_threads)
        .build()
        .context("Could not initialize thread pool.")?;

    //Create and configure progress bar
    let bar: ProgressBar = ProgressBar::new(total_count as u64);
    bar.set_style(ProgressStyle::default_bar()
        .template("[{elapsed_precise}][{bar:40.cyan/blue}][{eta_precise}] {percent}%")
        .progress_chars("#>-"));

    //Main loop
    for (chunk_index, projectile_chunk) in projectiles.chunks(chunk_size).enumerate() {

        let finished_projectiles: Vec<output::ProjectileOutcome> = if options.num_threads > 1 {
            pool.install(|| {
                projectile_chunk.par_iter()
                    .map(|&projectile_input| {
                        bar.inc(1);
                        single_projectile(projectile_input, &layers, model, &config, &integration, options.mode)
                    }).collect()
            })
        } else {
            projectile_chunk.iter()
                .map(|&projectile_input| {
                    bar.inc(1);
                    single_projectile(projectile_input, &layers, model, &config, &integration, options.mode)
                }).collect()
        };

        // Process this chunk of finished projectiles for output
        for (index_in_chunk, outcome) in finished_projectiles.iter().enumerate() {
            summary.update(outcome);
            output::output_lists(&mut output_list_streams, chunk_index*chunk_size + index_in_chunk, outcome)?;
        }

        //Flush all file streams before dropping to ensure all data is written
        output::output_list_flush(&mut output_list_streams)?;
    }

    bar.finish();
    summary.print(&options)?;
    info!("event=run_done name={} projectiles={} converged={}", options.name, summary.num_projectiles, summary.num_converged);
    println!("Finished!");

    Ok(summary)
}
