use clap::CommandFactory;
use clap_complete::{generate_to, shells};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return Ok(());
    };

    generate_docs_for_binary(&out_dir, cli::GenerateArgs::command(), "yag-openapi")?;
    generate_docs_for_binary(&out_dir, cli::BuildArgs::command(), "yag-openapi-build")?;

    Ok(())
}

fn generate_docs_for_binary(out_dir: &Path, mut cmd: clap::Command, bin_name: &str) -> Result<()> {
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(cmd.clone());
    let mut man_buffer = Vec::new();
    man.render(&mut man_buffer)?;
    fs::write(man_dir.join(format!("{}.1", bin_name)), man_buffer)?;

    let comp_dir = out_dir.join("completions");
    fs::create_dir_all(&comp_dir)?;

    generate_to(shells::Bash, &mut cmd, bin_name, &comp_dir)?;
    generate_to(shells::Fish, &mut cmd, bin_name, &comp_dir)?;
    generate_to(shells::Zsh, &mut cmd, bin_name, &comp_dir)?;

    Ok(())
}
