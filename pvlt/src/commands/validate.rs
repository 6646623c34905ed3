//! The `validate` subcommand.
//!
//! For every input file and every strict dialect, two verdicts are
//! printed: whether the file loads under that dialect's grammar, and
//! whether the tree (read permissively with Omni) encodes under that
//! dialect's rules. Core errors never escape as failures here; they
//! become verdicts.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use pvl::{Dialect, Encoder, LoadOptions};

use crate::error::{PvltError, Result};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Labels to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run_validate(args: ValidateArgs, verbose: u8) -> Result<()> {
    for path in &args.paths {
        let bytes = fs::read(path).map_err(|source| PvltError::ReadInput {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "checking label");

        // The permissive tree is what gets re-encoded per dialect.
        let omni = pvl::load_bytes(&bytes);

        for dialect in Dialect::STRICT {
            let load_result = pvl::load_bytes_with(&bytes, &LoadOptions::new().dialect(dialect));
            let encode_result = match (&omni, Encoder::for_dialect(dialect)) {
                (Ok(module), Some(encoder)) => {
                    encoder.encode(module).map(|_| ()).map_err(|e| e.to_string())
                }
                (Err(e), _) => Err(format!("nothing to encode, the label does not load: {e}")),
                (_, None) => Err("dialect has no encoder".to_string()),
            };

            println!(
                "{} {:>4} | {:13} | {}",
                path.display(),
                dialect.to_string(),
                if load_result.is_ok() {
                    "Loads"
                } else {
                    "does NOT load"
                },
                if encode_result.is_ok() {
                    "Encodes"
                } else {
                    "does NOT encode"
                },
            );
            if verbose > 0 {
                if let Err(e) = &load_result {
                    println!("    load:   {e}");
                }
                if let Err(e) = &encode_result {
                    println!("    encode: {e}");
                }
            }
        }
    }
    Ok(())
}
