//! Runs a hand-built queue and prints its progress.
//!
//! Chain-backed queues come from `Workflows`; this example uses closure
//! steps so it runs without a node.

use std::time::Duration;

use tcrflow::prelude::*;
use tcrflow::{BestEffort, FnStep};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FlowConfig::from_toml_str(
        r#"
        log_level = "debug"
        "#,
    )?;
    tcrflow::logging::init(&config.log_level)?;

    let mut queue = StepQueue::new();
    queue
        .add_fn(StepMeta::custom("Fetch listing", "Read the listing"), || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(StepOutput::done())
        })
        .add(BestEffort::new(FnStep::new(
            StepMeta::custom("Refresh cache", "Optional cache refresh"),
            || async {
                Err::<StepOutput, _>(FlowError::Configuration("cache offline".to_string()))
            },
        )))
        .add_fn(StepMeta::custom("Report", "Print a summary"), || async {
            println!("All required steps done");
            Ok(StepOutput::done())
        });

    for meta in queue.steps() {
        println!("queued: {}", meta);
    }

    let mut progress = queue.progress();
    let observer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            println!("progress: {:?}", *progress.borrow_and_update());
        }
    });

    match queue.run().await {
        Ok(report) => {
            for settled in report.steps() {
                println!("{} -> {:?}", settled.meta, settled.output);
            }
        }
        Err(e) => eprintln!("Queue failed: {}", e),
    }
    observer.await?;

    Ok(())
}
