// src/bin/seed.rs
//
// Loads the question bank from SEED_FILE (default data/questions.json) into the database.

use std::process::ExitCode;

use exam_workshop::{config::Config, seed, store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .with_target(false)
        .init();

    let pool = match store::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[seed] Failed to open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = store::migrate(&pool).await {
        tracing::error!("[seed] Failed to run migrations: {}", e);
        return ExitCode::FAILURE;
    }

    match seed::seed_from_file(&pool, &config.seed_file).await {
        Ok(report) => {
            let total = seed::question_count(&pool).await.unwrap_or_default();
            tracing::info!(
                "[seed] questions inserted: {}, updated: {}; options inserted: {}, updated: {}, removed: {}; {} questions stored",
                report.questions_inserted,
                report.questions_updated,
                report.options_inserted,
                report.options_updated,
                report.options_removed,
                total
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("[seed] {}", e);
            ExitCode::FAILURE
        }
    }
}
