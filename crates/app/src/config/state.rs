//! Local State Config

use std::path::PathBuf;

use clap::Args;

/// Where durable client state is kept.
#[derive(Debug, Args)]
pub struct StateConfig {
    /// Directory holding the local state file
    #[arg(long, env = "SABZI_STATE_DIR", default_value = ".sabzi")]
    pub state_dir: PathBuf,
}
