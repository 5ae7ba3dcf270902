use std::path::Path;

use anyhow::{Context, Result};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use pagefx_core::PageFxConfig;

use crate::scenario::Scenario;
use crate::simulation::{Report, Simulator};

pub async fn run(config: PageFxConfig, path: &Path, realtime: bool, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)
        .with_context(|| format!("Failed to load scenario {}", path.display()))?;
    info!(
        path = %path.display(),
        elements = scenario.elements.len(),
        steps = scenario.steps.len(),
        "Replaying scenario"
    );

    let report = replay(&scenario, config, realtime).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

/// Replay every step, one frame after each; `realtime` paces frames on the wall clock
pub async fn replay(scenario: &Scenario, config: PageFxConfig, realtime: bool) -> Result<Report> {
    let mut sim = Simulator::new(scenario, config)?;
    let mut ticker = interval(sim.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for step in &scenario.steps {
        sim.apply(step)?;
        for _ in 0..sim.frames_for(step) {
            if realtime {
                ticker.tick().await;
            }
            sim.frame();
        }
    }

    // Let running animations and timers settle
    while sim.site().needs_frame() {
        if realtime {
            ticker.tick().await;
        }
        sim.frame();
    }

    Ok(sim.report())
}
