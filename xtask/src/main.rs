//! Build automation tasks for bulkimport
//!
//! - Generating the CLI reference from the clap definitions
//! - Checking that the committed reference is current

use anyhow::{bail, Context};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for bulkimport", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,

        /// Fail instead of writing if the file on disk is out of date
        #[arg(long)]
        check: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir, check } => generate_cli_docs(&output_dir, check)?,
    }

    Ok(())
}

fn render_cli_docs() -> String {
    let markdown = clap_markdown::help_markdown::<bulkimport_cli::Cli>();

    format!(
        r#"# bulkimport CLI Reference

Streams newline-delimited JSON files to the batch import endpoint
(`https://<host>/v0/`) using a fixed pool of upload workers.

## Quick Start

```bash
# Import two files with the default 8 workers and 250 records per batch
bulkimport --key "$API_KEY" people.ndjson places.ndjson

# Smaller batches, more workers, verbose logging
bulkimport -k "$API_KEY" -w 16 --batch-size 100 -v events.ndjson
```

## Exit Status

- `0` - every file was imported completely
- `1` - invalid arguments, or a fatal error such as a failed read
- `2` - at least one file was skipped or not every record was accounted for

## Commands

{markdown}

## Environment Variables

- `BULKIMPORT_API_KEY`, `BULKIMPORT_WORKERS`, `BULKIMPORT_HOST`,
  `BULKIMPORT_ENDPOINT`, `BULKIMPORT_BATCH_SIZE` - defaults for the flags above
- `BULKIMPORT_QUEUE_CAPACITY`, `BULKIMPORT_RESPONSE_CAPACITY`,
  `BULKIMPORT_PIPE_CAPACITY`, `BULKIMPORT_READ_BUFFER_SIZE`,
  `BULKIMPORT_PROGRESS_INTERVAL` - pipeline tuning
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`, `LOG_FILE_PREFIX`,
  `LOG_FILTER` - logging

A `.env` file in the working directory is loaded at startup.

---

*Generated from the CLI source. To update, run `cargo xtask generate-cli-docs`.*
"#
    )
}

fn generate_cli_docs(output_dir: &Path, check: bool) -> anyhow::Result<()> {
    let content = render_cli_docs();
    let file_path = output_dir.join("cli-reference.md");

    if check {
        let current = fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        if current != content {
            bail!(
                "{} is out of date; run `cargo xtask generate-cli-docs`",
                file_path.display()
            );
        }
        println!("CLI documentation is up to date");
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());
    Ok(())
}
