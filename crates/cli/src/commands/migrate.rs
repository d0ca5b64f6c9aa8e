use crate::commands::{connect_and_migrate, prepare, CommandResult, StepFailure};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("migrate") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;
        pool.close().await;
        Ok::<(), StepFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => CommandResult::from_step_failure("migrate", failure),
    }
}
