use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::Cli;

const BIN_NAME: &str = "starscout";

fn completion_script(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut out = Vec::new();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut out);
    out
}

fn main_man_page() -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    clap_mangen::Man::new(Cli::command()).render(&mut out)?;
    Ok(out)
}

/// Print a completion script for `shell` to stdout.
pub(crate) fn handle_completions(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    io::stdout().write_all(&completion_script(shell))?;
    Ok(())
}

/// Write man pages for every subcommand into `output`, or the top-level page to stdout.
pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(dir) = output else {
        io::stdout().write_all(&main_man_page()?)?;
        return Ok(());
    };

    std::fs::create_dir_all(&dir)?;
    clap_mangen::generate_to(Cli::command(), &dir)?;
    println!("Generated man pages in: {}", dir.display());
    Ok(())
}
