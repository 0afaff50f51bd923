//! `fmf-discover show`: print the effective step data.

use anyhow::Result;
use clap::Args;

use super::common::StepArgs;
use crate::config::GlobalConfig;
use crate::config::step::HOW;
use crate::discover::DiscoverFmf;

/// Show the discover step as it would run, without running it.
#[derive(Args, Debug)]
pub struct ShowCommand {
    #[command(flatten)]
    pub step: StepArgs,
}

impl ShowCommand {
    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let step = self.step.step_data()?;
        let discover = DiscoverFmf::new(step, self.step.work_area(config), ".", config);

        for line in lines(&discover.show()) {
            println!("{line}");
        }
        Ok(())
    }
}

fn lines(pairs: &[(&'static str, String)]) -> Vec<String> {
    std::iter::once(("how", HOW.to_string()))
        .chain(pairs.iter().cloned())
        .map(|(key, value)| format!("{key:>6}: {value}"))
        .collect()
}
