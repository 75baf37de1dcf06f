use habit_app::app::{log_filter, run, DashboardConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
    let config = DashboardConfig::from_env().unwrap_or_default();
    if let Err(err) = run(config) {
        eprintln!("Failed to render habit dashboard: {err:#}");
        std::process::exit(1);
    }
}
