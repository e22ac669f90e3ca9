//src/main.rs

use crm_admin::{config::AppState, services::DashboardService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão é info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()?;

    let dashboard = DashboardService::new(app_state.client.clone());
    let overview = dashboard.overview().await;

    tracing::info!(
        "Painel carregado: {}/{} recursos responderam",
        overview.loaded(),
        overview.cards.len()
    );

    for card in &overview.cards {
        match card.total {
            Some(total) => println!("{:<16} {:>8}", card.label, total),
            None => println!("{:<16} {:>8}", card.label, "-"),
        }
    }

    for toast in app_state.notifier.drain() {
        eprintln!("{}", toast.message);
    }

    Ok(())
}
