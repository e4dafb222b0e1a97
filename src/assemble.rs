#![allow(non_snake_case)]

use std::path::PathBuf;
use anyhow::Context;
use ndarray as nd;
use sle_sim::{
    mkdir,
    write_npz,
    assembler::build,
    params::SleConfig,
};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path: PathBuf
        = args.next()
        .map(PathBuf::from)
        .context("usage: sle_assemble <config.toml> [out.npz]")?;
    let outfile: PathBuf
        = args.next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output/sle_matrix.npz"));
    if let Some(outdir) = outfile.parent().filter(|p| !p.as_os_str().is_empty()) {
        let outdir = outdir.to_path_buf();
        mkdir!(outdir);
    }

    let config = SleConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let (params, limits) = config.into_parts();

    println!("assemble");
    let matrix = build(&params, limits)?;
    println!("  {} rows", matrix.n_rows());
    println!(
        "  {} non-zero elements (capacity {})",
        matrix.len(),
        matrix.max_elements(),
    );

    let rows: nd::Array1<u64>
        = matrix.rows().iter().map(|&r| r as u64).collect();
    let cols: nd::Array1<u64>
        = matrix.cols().iter().map(|&c| c as u64).collect();
    let re: nd::Array1<f64> = matrix.values().iter().map(|v| v.re).collect();
    let im: nd::Array1<f64> = matrix.values().iter().map(|v| v.im).collect();
    let n_rows: nd::Array0<u64> = nd::arr0(matrix.n_rows() as u64);
    write_npz!(
        &outfile,
        arrays: {
            "rows" => &rows,
            "cols" => &cols,
            "re" => &re,
            "im" => &im,
            "n_rows" => &n_rows,
        }
    );
    println!("wrote {}", outfile.display());
    Ok(())
}
