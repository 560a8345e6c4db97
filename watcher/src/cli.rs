use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "volume-watcher", version)]
pub struct Cli {
    /// Run a single volume check and exit
    #[clap(long)]
    pub once: bool,

    /// Skip the check at start-up and wait for the first daily trigger
    #[clap(long, conflicts_with = "once")]
    pub no_initial_run: bool,
}

impl Cli {
    pub fn runs_at_startup(&self) -> bool {
        !self.no_initial_run
    }
}
