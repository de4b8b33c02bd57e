//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::SimulationParams;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TreeNodeConvert;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see 'seqtree --help'".to_string(),
        ));
    };

    // Completions need no settings, so a broken config never blocks them.
    if let Commands::Completion { shell } = command {
        return _completion(*shell);
    }

    let project_dir = project_dir(cli)?;
    let settings = Settings::load(Some(&project_dir))?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Reconstruct { file, node } => _reconstruct(&container, file, node),
        Commands::Leaves { file } => _leaves(&container, file),
        Commands::Flatten { file, node } => _flatten(&container, file, node.as_deref()),
        Commands::Tree { file } => _tree(&container, file),
        Commands::Newick { file } => _newick(&container, file),
        Commands::Stats { file, node } => _stats(&container, file, node.as_deref()),
        Commands::Simulate {
            seed,
            depth,
            children,
            mutations,
            length,
            output,
        } => {
            let mut params = SimulationParams::from(&container.settings.simulation);
            params.depth = depth.unwrap_or(params.depth);
            params.children = children.unwrap_or(params.children);
            params.mutations = mutations.unwrap_or(params.mutations);
            params.root_length = length.unwrap_or(params.root_length);
            _simulate(&container, *seed, &params, output.as_deref())
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => _config_show(&container),
            ConfigCommands::Path => _config_path(&project_dir),
        },
        Commands::Completion { .. } => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) if dir.is_dir() => Ok(dir.clone()),
        Some(dir) => Err(CliError::InvalidArgs(format!(
            "-C {}: not a directory",
            dir.display()
        ))),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("determine current directory", e))),
    }
}

#[instrument(skip(container))]
fn _reconstruct(container: &ServiceContainer, file: &Path, node: &str) -> CliResult<()> {
    let tree = container.lineage.load(file)?;
    let sequence = container.lineage.reconstruct(&tree, node)?;
    debug!(length = sequence.len(), "reconstructed");
    output::fasta(node, &sequence);
    Ok(())
}

#[instrument(skip(container))]
fn _leaves(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = container.lineage.load(file)?;
    for (name, sequence) in container.lineage.reconstruct_leaves(&tree)? {
        output::fasta(&name, &sequence);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _flatten(container: &ServiceContainer, file: &Path, node: Option<&str>) -> CliResult<()> {
    let tree = container.lineage.load(file)?;
    let mutations = container.lineage.flatten(&tree, node)?;
    for mutation in &mutations {
        output::info(mutation);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = container.lineage.load(file)?;
    output::header(&file.display());
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn _newick(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = container.lineage.load(file)?;
    output::info(&tree.newick());
    Ok(())
}

#[instrument(skip(container))]
fn _stats(container: &ServiceContainer, file: &Path, node: Option<&str>) -> CliResult<()> {
    let tree = container.lineage.load(file)?;
    let stats = container.lineage.stats(&tree, node)?;
    output::info(&stats);
    Ok(())
}

#[instrument(skip(container))]
fn _simulate(
    container: &ServiceContainer,
    seed: Option<u64>,
    params: &SimulationParams,
    target: Option<&Path>,
) -> CliResult<()> {
    let mut generator = container.generator(seed)?;
    let tree = container.simulation.simulate(&mut generator, params)?;
    match target {
        Some(path) => {
            container.lineage.save(&tree, path)?;
            output::action(
                "Wrote",
                &format!("{} ({} nodes)", path.display(), tree.len()),
            );
        }
        None => print!("{}", container.lineage.render(&tree)?),
    }
    Ok(())
}

#[instrument(skip(container))]
fn _config_show(container: &ServiceContainer) -> CliResult<()> {
    print!("{}", container.settings.to_toml()?);
    Ok(())
}

#[instrument]
fn _config_path(project_dir: &Path) -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::info(&format!("global: {}", path.display())),
        None => output::info(&"global: <no home directory>"),
    }
    output::info(&format!(
        "local:  {}",
        local_config_path(project_dir).display()
    ));
    Ok(())
}

#[instrument]
fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
