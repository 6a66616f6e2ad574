use anyhow::{Result, anyhow};

use roster::database::init_database;
use roster::scheduling::{DateRange, GenerationOutcome, RetryCoordinator};
use roster::{Config, RosterService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    let range = config
        .range
        .ok_or_else(|| anyhow!("Set ROSTER_MONTH or ROSTER_START/ROSTER_END to pick a range"))?;

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let service = RosterService::new(pool);

    if config.validate_only {
        return validate_stored(&service, &config, &range).await;
    }

    let coordinator = match config.seed {
        Some(seed) => RetryCoordinator::with_seed(seed),
        None => RetryCoordinator::new(),
    };

    if let Some(shift_id) = &config.night_allocation_shift {
        let blocks = service
            .allocate_nights(&range, shift_id, coordinator.seed_for(0))
            .await?;
        log::info!("Pre-allocated {} night blocks of {}", blocks.len(), shift_id);
    }

    let outcome = service
        .generate_with_validation(&range, &config.constraints, &coordinator, &config.operator)
        .await?;

    let roster = outcome.roster();
    log::info!(
        "Stored {} assignments ({} vacancies) for {} after {} attempt(s)",
        roster.assigned_count(),
        roster.vacancy_count(),
        outcome.range(),
        outcome.attempts()
    );
    if !roster.shortfalls.is_empty() {
        log::warn!("{} monthly minimum shortfall(s) in this roster", roster.shortfalls.len());
    }

    let on_call = service
        .assign_on_call(&range, &config.constraints, coordinator.seed_for(0))
        .await?;
    log::info!("Created {} on-call entries", on_call.len());

    match outcome {
        GenerationOutcome::Valid { .. } => Ok(()),
        GenerationOutcome::Invalid { report, attempts, .. } => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Err(anyhow!("Roster for {} failed validation after {} attempts", range, attempts))
        }
    }
}

async fn validate_stored(service: &RosterService, config: &Config, range: &DateRange) -> Result<()> {
    let report = service.validate_stored(range, &config.constraints).await?;
    let stats = service.weekly_stats(range).await?;
    log::info!("Read {} weekly stat rows for {}", stats.len(), range);

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.overall_passed {
        Ok(())
    } else {
        Err(anyhow!("Stored roster for {} failed validation", range))
    }
}
