//! Pure transformations behind the `catcher` subcommands: no IO, no clap.

pub mod diff;
pub mod terms;
pub mod tidy;
