#![allow(non_snake_case)]

use std::env;

use anyhow::{Result, Context, anyhow};
use flexi_logger::Logger;

use libRustELoss::*;

fn main() -> Result<()> {

    //Log level from RUST_LOG, info otherwise
    let _logger = Logger::try_with_env_or_str("info")
        .context("Could not configure logger.")?
        .start()
        .context("Could not start logger.")?;

    let args: Vec<String> = env::args().collect();

    let input_file = match args.len() {
        1 => "input.toml".to_string(),
        2 => args[1].clone(),
        _ => return Err(anyhow!("Too many command line arguments. Usage: RustELoss [input.toml]")),
    };

    let run = input::input(&input_file)?;
    physics::physics_loop(run, &StandardStopping)?;

    Ok(())
}
