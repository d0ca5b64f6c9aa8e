use helpdesk_db::{SeedDataset, SeedResult, VerificationResult};

use crate::commands::{connect_and_migrate, prepare, CommandResult, StepFailure};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;

        let seeded = SeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = SeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8));

        pool.close().await;
        check_verification(&verification?)?;
        Ok::<SeedResult, StepFailure>(seeded)
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "seeded {} customers and {} tickets",
                seeded.customers_seeded, seeded.tickets_seeded
            ),
        ),
        Err(failure) => CommandResult::from_step_failure("seed", failure),
    }
}

fn check_verification(verification: &VerificationResult) -> Result<(), StepFailure> {
    if verification.all_present {
        return Ok(());
    }
    let failed_checks = verification.failed_checks();
    let message = if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    };
    Err(("seed_verification", message, 6u8))
}
