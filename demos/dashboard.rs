use colored::*;
use std::sync::Once;
use zestra::{
    chart::{ChartSurface, RenderPlan, Timeframe},
    client::DashboardClient,
    config::{DashboardConfig, LlmQueryKind},
    dashboard::{Dashboard, LoadOutcome},
    models::LlmPrompt,
    registry::DashboardRegistry,
};

fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    });
}

/// Prints each render plan instead of drawing it.
struct TerminalSurface;

impl ChartSurface for TerminalSurface {
    fn draw(&mut self, plan: &RenderPlan) -> zestra::Result<()> {
        println!(
            "{} {} | window {} | y {:.2}..{:.2}",
            "chart".bright_cyan().bold(),
            plan.title.bold(),
            plan.timeframe.label().yellow(),
            plan.y_range.min,
            plan.y_range.max
        );
        for dataset in &plan.datasets {
            let last = dataset.data.last().map(|p| p.value).unwrap_or(f64::NAN);
            println!(
                "  {} {} ({} points, last {:.2})",
                format!("[{}]", dataset.border_color).dimmed(),
                dataset.label.green(),
                dataset.data.len(),
                last
            );
        }
        Ok(())
    }

    fn clear(&mut self) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    dotenv::dotenv().ok();

    println!("{}", "Zestra dashboard demo".bright_green().bold());

    // ZC_DMT_CONFIG holds the JSON object the plugin page emits.
    let raw = std::env::var("ZC_DMT_CONFIG").unwrap_or_else(|_| {
        r#"{
            "ajaxUrl": "http://localhost:8080/wp-admin/admin-ajax.php",
            "indicators": [{"name": "US GDP", "slug": "us-gdp"}],
            "defaultIndicator": "us-gdp",
            "llmConfig": {"enabled": true, "showAnalysis": true}
        }"#
        .to_string()
    });
    let config = DashboardConfig::from_json(&raw)?;
    let client = DashboardClient::from_config(&config)?;

    let registry = DashboardRegistry::new();
    let dashboard = registry.get_or_create(None, |id| {
        Dashboard::new(id, config.clone(), client, TerminalSurface)
    });

    match dashboard.load_default_indicator().await? {
        LoadOutcome::Loaded { slug, .. } => println!("{} {}", "loaded".green(), slug),
        LoadOutcome::Empty => {
            println!("{}", "no indicator has data".red());
            return Ok(());
        }
        LoadOutcome::Superseded => return Ok(()),
    }

    let now = chrono::Utc::now();
    let changes = dashboard.historical_changes(now).await;
    println!(
        "3M {} | 6M {} | 1Y {}",
        changes.three_months, changes.six_months, changes.one_year
    );
    if let Some(label) = dashboard.last_update_label(now).await {
        println!("{}", label.dimmed());
    }

    dashboard.set_timeframe(Timeframe::Years(1.0)).await?;

    if config.llm.analysis_available() {
        let snapshot = dashboard.snapshot().await;
        let title = snapshot.primary.map(|p| p.title).unwrap_or_default();
        let prompt = LlmPrompt::builder()
            .system_prompt("You are a concise macroeconomic analyst.")
            .user_query(format!("Summarize the recent trend of {title}."))
            .build();
        match dashboard.run_llm_query(LlmQueryKind::Analysis, &prompt).await {
            Ok(text) => println!("{}\n{}", "analysis".bright_magenta().bold(), text),
            Err(e) => println!("{} {}", "analysis failed:".red(), e),
        }
    }

    registry.destroy(dashboard.id()).await;
    println!("{}", "Done!".bright_green().bold());
    Ok(())
}
