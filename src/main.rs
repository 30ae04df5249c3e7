use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emini::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emini")]
#[command(about = "Intraday e-mini strategy scenarios and risk statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run every scenario in a configuration file
    Run {
        //path to scenario configuration json
        #[arg(long)]
        config: PathBuf,

        //rebuild roll-free synthetic prices for every instrument
        #[arg(long)]
        synthetic: bool,

        //output path for trades csv
        #[arg(long)]
        trades_csv: Option<PathBuf>,

        //output path for the scenario pnl csv
        #[arg(long)]
        pnl_csv: Option<PathBuf>,

        //directory for one pnl csv per strategy
        #[arg(long)]
        strategy_pnl_dir: Option<PathBuf>,
    },

    //write the default scenario configuration
    InitConfig {
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            synthetic,
            trades_csv,
            pnl_csv,
            strategy_pnl_dir,
        } => run(config, synthetic, trades_csv, pnl_csv, strategy_pnl_dir)?,
        Commands::InitConfig { output } => {
            ScenarioConfiguration::default()
                .to_json_file(&output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Default configuration written to {:?}", output);
        }
    }

    Ok(())
}

fn run(
    config_path: PathBuf,
    synthetic: bool,
    trades_csv: Option<PathBuf>,
    pnl_csv: Option<PathBuf>,
    strategy_pnl_dir: Option<PathBuf>,
) -> Result<()> {
    println!("E-mini Scenario Runner");
    println!("======================\n");

    let config = ScenarioConfiguration::from_json_file(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    let scenarios = config.build_scenarios()?;

    println!("Loading {} instrument(s)...", config.instruments.len());
    let data = config
        .load_market_data(synthetic)
        .context("Failed to load market data")?;

    for (name, series) in &data {
        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            println!("{}: {} bars, {} to {}", name, series.len(), first, last);
        }
    }
    println!();

    println!("Running {} scenario(s)...\n", scenarios.len());
    let report = run_scenarios(&data, &scenarios)?;

    println!("Scenario Results");
    println!("================\n");
    report.scenario_stats_table().printstd();

    for strategy in report.strategy_stats.keys() {
        if let Some(table) = report.strategy_stats_table(strategy) {
            println!("\nStrategy {}", strategy);
            table.printstd();
        }
    }

    println!("\nTotal trades: {}", report.total_trades());

    //save outputs if requested
    if let Some(path) = trades_csv {
        write_trades_csv(&report.trades, &path)?;
        println!("\nTrades saved to {:?}", path);
    }

    if let Some(path) = pnl_csv {
        report.scenario_pnl.write_csv(&path)?;
        println!("Scenario pnl saved to {:?}", path);
    }

    if let Some(dir) = strategy_pnl_dir {
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
        for (strategy, table) in &report.strategy_pnl {
            let path = dir.join(format!("strategy_{}.csv", strategy.replace(' ', "_")));
            table.write_csv(&path)?;
        }
        println!("Strategy pnl saved under {:?}", dir);
    }

    Ok(())
}
