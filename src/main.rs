//! RISC-V classifier CLI
//!
//! Command-line tool that classifies every instruction in a RISC-V ELF's
//! `.text` section against a JSON instruction description and reports
//! unknown instructions and unresolved system calls.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use riscv_classifier::{survey_bytes, IsaSpec, Tally};
use std::path::PathBuf;
use std::process::ExitCode;

/// Table-driven RISC-V machine-code classifier.
///
/// Extracts the .text section of a RISC-V ELF, names each 32-bit word via
/// the supplied instruction description, resolves ECALLs to syscall names,
/// and reports anything the description does not cover.
#[derive(Parser, Debug)]
#[command(name = "riscv-classify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RISC-V ELF binary to analyze
    elf: PathBuf,

    /// JSON instruction description (opcodes + syscalls)
    spec: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Verbose output (per-mnemonic counts, debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (exit code only)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("riscv_classifier=debug")
            .init();
    }

    match analyze(&args) {
        Ok(tally) => {
            if tally.unknown_instruction_total() > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            if !args.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn analyze(args: &Args) -> anyhow::Result<Tally> {
    let spec = IsaSpec::from_json_file(&args.spec)
        .with_context(|| format!("loading instruction description {}", args.spec.display()))?;
    tracing::debug!(
        opcodes = spec.decode.len(),
        syscalls = spec.syscalls.len(),
        "instruction description loaded"
    );

    let data = std::fs::read(&args.elf)
        .with_context(|| format!("reading {}", args.elf.display()))?;
    let tally = survey_bytes(&data, &spec)
        .with_context(|| format!("classifying {}", args.elf.display()))?;
    tracing::debug!(total = tally.total(), "classification finished");

    if !args.quiet {
        match args.format {
            OutputFormat::Human => print_human(&tally, args.verbose),
            OutputFormat::Json => print_json(&tally)?,
        }
    }

    Ok(tally)
}

fn print_human(tally: &Tally, verbose: bool) {
    if verbose {
        let mut counts: Vec<_> = tally.mnemonics().iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (mnemonic, count) in counts {
            println!("{mnemonic}: {count}");
        }
        println!();
    }

    let mut syscall_labels: Vec<_> = tally.unknown_syscalls().iter().collect();
    syscall_labels.sort();
    for (label, count) in syscall_labels {
        println!("There were {count} {label}.");
    }

    let unknown = tally.unknown_instruction_total();
    if unknown > 0 {
        println!("There were {unknown} unknown instructions.\n");
        let mut words: Vec<_> = tally.unknown_instructions().iter().collect();
        words.sort();
        for (word, count) in words {
            println!("Unknown instruction: {word:08X}: {count} times");
        }
    } else {
        println!("All instructions known.");
    }
}

fn print_json(tally: &Tally) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        total: u64,
        mnemonics: &'a std::collections::HashMap<String, u64>,
        unknown_instructions: std::collections::BTreeMap<String, u64>,
        unknown_syscalls: &'a std::collections::HashMap<String, u64>,
    }

    let output = JsonOutput {
        total: tally.total(),
        mnemonics: tally.mnemonics(),
        unknown_instructions: tally
            .unknown_instructions()
            .iter()
            .map(|(word, count)| (format!("{word:08X}"), *count))
            .collect(),
        unknown_syscalls: tally.unknown_syscalls(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["riscv-classify", "a.elf", "rv64.json"]).unwrap();
        assert_eq!(args.elf, PathBuf::from("a.elf"));
        assert_eq!(args.spec, PathBuf::from("rv64.json"));
        assert!(!args.verbose);
    }

    #[test]
    fn test_requires_both_paths() {
        assert!(Args::try_parse_from(["riscv-classify", "a.elf"]).is_err());
    }

    #[test]
    fn test_format_option() {
        let args =
            Args::try_parse_from(["riscv-classify", "-f", "json", "a.elf", "rv64.json"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Json));
    }
}
