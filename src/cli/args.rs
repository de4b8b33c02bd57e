//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Reconstruct sequences from a tree of mutations
#[derive(Parser, Debug)]
#[command(name = "seqtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .seqtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the sequence of one node as FASTA
    Reconstruct {
        /// Lineage document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node name
        node: String,
    },

    /// Print the sequences of all leaves as FASTA
    Leaves {
        /// Lineage document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print all mutations of a subtree in pre-order
    Flatten {
        /// Lineage document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Subtree root (default: tree root)
        node: Option<String>,
    },

    /// Show the tree structure
    Tree {
        /// Lineage document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the tree in Newick format
    Newick {
        /// Lineage document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show depth, edge, leaf and mutation counts of a node
    Stats {
        /// Lineage document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node name (default: tree root)
        node: Option<String>,
    },

    /// Generate a random lineage document
    Simulate {
        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Levels below the root
        #[arg(long)]
        depth: Option<usize>,
        /// Children per internal node
        #[arg(long)]
        children: Option<usize>,
        /// Mutations per branch
        #[arg(long)]
        mutations: Option<usize>,
        /// Length of the root sequence
        #[arg(long)]
        length: Option<usize>,
        /// Write the document to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
