pub mod alloc;
pub mod show;

use clap::Subcommand;
use crate::command::alloc::AllocCmd;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Allocate a TUN interface
    Alloc(AllocCmd),
    /// Show the effective configuration
    Show
}
