use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use graphconf::{Document, Resolver, ResolverOptions, render};
use std::fs;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "graphconf")]
#[command(about = "Resolve layer/graph network descriptions into an execution plan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the execution plan as a table.
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Write the plan and dataset section as JSON.
    Resolve {
        #[command(flatten)]
        input: InputArgs,

        /// Output file; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Validate only.
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the merged document (overrides and links applied) as YAML.
    Dump {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Description files, merged in order (later files win).
    #[arg(short = 'c', long = "config", required = true)]
    configs: Vec<String>,

    /// `key.path=value` overrides, applied after merging.
    #[arg(short = 's', long = "set")]
    overrides: Vec<String>,

    /// Maximum module nesting depth.
    #[arg(long)]
    max_depth: Option<usize>,

    /// Separator between a module instance name and its internal names.
    #[arg(long)]
    separator: Option<String>,
}

impl InputArgs {
    /// Read and merge the files, then settle the options: defaults, then the
    /// document's `system.resolver`, then flags.
    fn load(&self) -> Result<(Resolver, Document)> {
        let mut texts = Vec::with_capacity(self.configs.len());
        for path in &self.configs {
            texts.push(
                fs::read_to_string(path).with_context(|| format!("read config file {}", path))?,
            );
        }

        let doc = Resolver::default()
            .load(
                texts.iter().map(String::as_str),
                self.overrides.iter().map(String::as_str),
            )
            .with_context(|| format!("load {}", self.configs.join(", ")))?;

        let mut options = ResolverOptions::from_document(&doc)?;
        if let Some(depth) = self.max_depth {
            options.max_depth = depth;
        }
        if let Some(sep) = &self.separator {
            options.separator = sep.clone();
        }
        tracing::debug!(?options, "resolver options");

        Ok((Resolver::new(options), doc))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Plan { input } => {
            let (resolver, doc) = input.load()?;
            let resolved = resolver.resolve(&doc).context("resolve model graph")?;
            println!("{}", render::render_plan_table(&resolved.plan));
        }
        Commands::Resolve { input, out } => {
            let (resolver, doc) = input.load()?;
            let resolved = resolver.resolve(&doc).context("resolve model graph")?;
            let json = serde_json::to_string_pretty(&resolved)?;
            match out {
                Some(out) => {
                    fs::write(&out, json).with_context(|| format!("write {}", out))?;
                    println!("Wrote {}", out);
                }
                None => println!("{}", json),
            }
        }
        Commands::Check { input } => {
            let (resolver, doc) = input.load()?;
            let resolved = resolver.resolve(&doc).context("resolve model graph")?;
            let dead = resolved.plan.dead_steps().len();
            println!("ok: {} steps, {} dead", resolved.plan.len(), dead);
        }
        Commands::Dump { input } => {
            let (_, doc) = input.load()?;
            print!("{}", doc.to_yaml()?);
        }
    }

    Ok(())
}
