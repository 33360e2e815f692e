//! food-lookup CLI
#![deny(unsafe_code)]

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use food_lookup::{Cli, Commands, commands, observability};
use food_lookup_core::Engine;
use food_lookup_core::config::ConfigLoader;
use tracing::debug;

fn utf8(path: std::path::PathBuf, what: &str) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path).map_err(|e| {
        anyhow::anyhow!("{what} is not valid UTF-8: {}", e.into_path_buf().display())
    })
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to create async runtime")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    if cli.version_only {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // arg_required_else_help ensures we have --version-only or a subcommand
    let Some(command) = cli.command else {
        return Ok(());
    };

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = utf8(cwd, "current directory")?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        loader = loader.with_file(utf8(config_path.clone(), "config path")?);
    }
    let (mut config, config_sources) = loader.load().context("failed to load configuration")?;
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = Some(utf8(dir.clone(), "data directory")?);
    }

    let obs_config = observability::ObservabilityConfig::from_env_with_overrides(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging/tracing")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        data_dir = %config.data_dir(),
        "CLI initialized"
    );

    let result = match command {
        Commands::Info(args) => commands::info::cmd_info(args, cli.json, &config, &config_sources),
        Commands::Lookup(args) => {
            commands::lookup::cmd_lookup(args, cli.json, &Engine::from_config(&config))
        }
        Commands::Suggest(args) => {
            commands::suggest::cmd_suggest(args, cli.json, &Engine::from_config(&config))
        }
        Commands::Stats(args) => {
            commands::stats::cmd_stats(args, cli.json, &Engine::from_config(&config))
        }
        Commands::Serve(args) => {
            let engine = Engine::from_config(&config);
            runtime()?.block_on(commands::serve::cmd_serve(args, &config, engine))
        }
        #[cfg(feature = "mcp")]
        Commands::Mcp(args) => {
            let engine = Engine::from_config(&config);
            runtime()?.block_on(commands::mcp::cmd_mcp(args, engine))
        }
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
