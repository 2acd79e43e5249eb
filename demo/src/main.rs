use std::process::ExitCode;

use demo::optimizers::{self, Optimizer};
use demo::schedule;
use selector::Session;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> selector::Result<()> {
    let mut session = Session::new("demo");
    let optimizer = session.scan::<Box<dyn Optimizer>>("optimizer", &optimizers::namespace())?;
    let schedule = session.bind("schedule", schedule::step_lr()?)?;
    let epochs = session.get::<u32>("epochs", Some(3))?.unwrap_or(3);
    let weight = session.get::<f64>("weight", Some(1.0))?.unwrap_or(1.0);

    if std::env::args().any(|arg| arg == "--help") {
        print!("{}", session.render_help());
        return Ok(());
    }

    let optimizer = optimizer.call()?;
    let schedule = schedule.call()?;
    tracing::info!(optimizer = optimizer.name(), ?schedule, "starting");

    let mut weight = weight;
    for epoch in 0..epochs {
        let lr = schedule.lr_at(optimizer.learning_rate(), epoch);
        // minimizes weight^2
        weight = optimizer.step(weight, 2.0 * weight, lr);
        println!("epoch {epoch}: lr={lr:.6} weight={weight:.6}");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
