//! ORBIT Command Line Interface
//!
//! This crate contains the ORBIT CLI that verifies safety of discrete-time
//! affine dynamical systems by counterexample-guided abstraction refinement.
//! A system is either described on the command line (`check`) or picked from
//! the bundled demos (`demo`).

use ::config::Config;

use clap::Parser;
use human_panic::setup_panic;
use log::{debug, info};

use orbit_kernel::logic::Effort;

use crate::cli::{Cli, System, initialize_logger, run_system};

mod cli;
mod orbit_config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_panic!();

    let cli = Cli::parse();
    initialize_logger(cli.log_config)?;
    info!("Welcome to the ORBIT verifier!");

    match cli.command {
        cli::Commands::Check {
            root,
            initial,
            safe,
            scale,
            offset,
            max_nodes,
            effort,
            config_file,
        } => {
            // Check whether a configuration file was supplied
            let mut settings = Config::builder();
            if let Some(config_file) = config_file {
                if !config_file.exists() {
                    return Err(anyhow::anyhow!(
                        "Specified configuration file '{}' does not exist.",
                        config_file.display()
                    )
                    .into());
                }
                settings = settings.add_source(config::File::from(config_file));
            }

            // Parse configuration from environment variables
            settings = settings.add_source(config::Environment::with_prefix("ORBIT"));
            let mut config = settings
                .build()?
                .try_deserialize::<orbit_config::OrbitConfig>()?;

            // Command line flags override file and environment
            if let Some(effort) = effort {
                config.set_effort(effort);
            }
            if let Some(max_nodes) = max_nodes {
                config.set_max_nodes(max_nodes);
            }
            debug!("verification options: {config:?}");

            let system = System::from_descriptions(&root, &initial, &safe, &scale, &offset)?;
            run_system(
                system,
                Effort::new(config.effort()),
                config.max_nodes(),
            )?;

            info!("Finished verification. Goodbye!");
            Ok(())
        }

        cli::Commands::Demo { system, max_nodes } => {
            info!("Running the bundled {system:?} system");
            run_system(
                System::demo(system),
                Effort::default(),
                max_nodes.unwrap_or(orbit_config::DEFAULT_MAX_NODES),
            )?;
            Ok(())
        }
    }
}
