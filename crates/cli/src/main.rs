use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::fmt::SubscriberBuilder;

use hilbert::prelude::*;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Hilbert basis runner (dual algorithm)")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compute the Hilbert basis of the cone cut out by a halfspace matrix
    Compute {
        /// Plain-text matrix: a "rows cols" header line, then integer rows
        #[arg(long)]
        input: String,
        /// Write the JSON report here instead of stdout
        #[arg(long)]
        out: Option<String>,
    },
    /// Emit a reproducible random halfspace matrix in the input format
    Random {
        #[arg(long)]
        dim: usize,
        #[arg(long, default_value_t = 3)]
        extra_rows: usize,
        #[arg(long, default_value_t = 4)]
        bound: i64,
        #[arg(long, default_value_t = 43)]
        seed: u64,
    },
}

#[derive(Serialize)]
struct Report {
    code_rev: &'static str,
    dim: usize,
    support_hyperplanes: Vec<Vec<i64>>,
    generators: Vec<Vec<i64>>,
    extreme_ray_flags: Vec<bool>,
    hilbert_basis: Vec<Vec<i64>>,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Compute { input, out } => compute(&input, out.as_deref()),
        Action::Random {
            dim,
            extra_rows,
            bound,
            seed,
        } => random(dim, extra_rows, bound, seed),
    }
}

fn compute(input: &str, out: Option<&str>) -> Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let normals = parse_matrix(&text)?;
    tracing::info!(
        rows = normals.nr_rows(),
        cols = normals.nr_cols(),
        input,
        "compute"
    );
    let mut cone = DualCone::from_inequalities(normals)?;
    cone.compute()?;
    let report = Report {
        code_rev: option_env!("GIT_COMMIT").unwrap_or("unknown"),
        dim: cone.dim(),
        support_hyperplanes: cone.support_hyperplanes().to_rows(),
        generators: cone.generators().to_rows(),
        extreme_ray_flags: cone.extreme_ray_flags().to_vec(),
        hilbert_basis: cone.hilbert_basis().to_rows(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            let out_path = Path::new(path);
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(out_path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn random(dim: usize, extra_rows: usize, bound: i64, seed: u64) -> Result<()> {
    if dim == 0 {
        bail!("dimension must be positive");
    }
    let cfg = RandConeCfg {
        dim,
        extra_rows,
        bound,
    };
    print!("{}", format_matrix(&draw_cone_matrix(&cfg, seed)));
    Ok(())
}

fn parse_matrix(text: &str) -> Result<IntMatrix> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().context("empty matrix file")?;
    let mut dims = header.split_whitespace();
    let rows: usize = dims.next().context("missing row count")?.parse()?;
    let cols: usize = dims.next().context("missing column count")?.parse()?;
    let mut data = Vec::with_capacity(rows);
    for _ in 0..rows {
        let line = lines
            .next()
            .context("fewer matrix rows than the header promises")?;
        let row: Vec<i64> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("bad integer in row {:?}", line))?;
        if row.len() != cols {
            bail!("row with {} entries, expected {cols}", row.len());
        }
        data.push(row);
    }
    Ok(IntMatrix::from_rows(data, cols)?)
}

fn format_matrix(m: &IntMatrix) -> String {
    let mut out = format!("{} {}\n", m.nr_rows(), m.nr_cols());
    for row in m.to_rows() {
        let line: Vec<String> = row.iter().map(i64::to_string).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
