// CLI subcommands

pub mod describe;
pub mod run;
pub mod status;
