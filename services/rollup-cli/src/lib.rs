mod cli;
mod commands;
mod infra;

use curriculum_rollup::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
