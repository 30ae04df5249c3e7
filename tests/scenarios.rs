mod common;

use common::*;
use emini::config::{InstrumentConfig, RuleSpec, ScenarioConfiguration, StrategySpec};
use emini::prelude::*;
use indexmap::IndexMap;
use std::io::Write;
use std::path::Path;

fn write_bars(path: &Path, bars: &[Bar]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume,contract").unwrap();
    for b in bars {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            b.timestamp.to_rfc3339(),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume,
            b.contract
        )
        .unwrap();
    }
}

fn sample_bars() -> Vec<Bar> {
    let mut rising = vec![100.0, 101.0, 102.0, 103.0];
    rising.extend(std::iter::repeat(104.0).take(24));
    rising.push(105.0);

    let mut falling = vec![106.0, 105.0, 104.0, 103.0];
    falling.extend(std::iter::repeat(102.5).take(24));
    falling.push(101.0);

    let mut bars = day_bars(d(8), &[100.0, 99.0, 101.0, 100.0]);
    bars.extend(day_bars(d(9), &rising));
    bars.extend(day_bars(d(10), &falling));
    bars
}

fn config(path: &Path) -> ScenarioConfiguration {
    let mut instruments = IndexMap::new();
    instruments.insert(
        ES.to_string(),
        InstrumentConfig {
            path: path.to_path_buf(),
            synthetic: false,
        },
    );

    let rise_fall = StrategySpec::new("1", ES, StopPolicy::None, RuleSpec::RiseFall)
        .current("09:00, 09:15, 09:30, 09:45");
    let overnight = StrategySpec::new("4", ES, StopPolicy::None, RuleSpec::Overnight)
        .current("16:00")
        .unwind("09:30");

    let mut scenarios = IndexMap::new();
    scenarios.insert("both".to_string(), vec![rise_fall.clone(), overnight]);
    scenarios.insert("solo".to_string(), vec![rise_fall]);

    ScenarioConfiguration {
        timezone: "America/New_York".to_string(),
        bar_minutes: 15,
        instruments,
        scenarios,
    }
}

fn run() -> ScenarioReport {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("es.csv");
    write_bars(&path, &sample_bars());

    let config = config(&path);
    let data = config.load_market_data(false).unwrap();
    let scenarios = config.build_scenarios().unwrap();
    run_scenarios(&data, &scenarios).unwrap()
}

#[test]
fn test_scenario_pnl_is_sum_of_strategy_pnl() {
    let report = run();

    let scenario = report.scenario_pnl.column("both").unwrap();
    let one = report.strategy_pnl["1"].column("both").unwrap();
    let four = report.strategy_pnl["4"].column("both").unwrap();

    assert_eq!(scenario.len(), 3);
    for (date, total) in scenario {
        assert!((total - (one[date] + four[date])).abs() < 1e-12);
    }
}

#[test]
fn test_scenario_stats_match_concatenated_trades() {
    let report = run();
    let trades = &report.trades["both"];

    //long on the 9th, short on the 10th, three overnights
    assert_eq!(trades.len(), 5);
    assert!(trades.windows(2).all(|w| w[0].trade_date <= w[1].trade_date));

    let dates = vec![d(8), d(9), d(10)];
    let returns: Vec<f64> = dates
        .iter()
        .map(|date| {
            trades
                .iter()
                .filter(|t| t.trade_date == *date)
                .map(|t| t.log_ret)
                .sum()
        })
        .collect();
    let direct = RiskSummary::from_log_returns(&dates, &returns, Frequency::BusinessDay);

    let stats = &report.scenario_stats["both"].summary;
    assert!((stats.annual_return - direct.annual_return).abs() < 1e-12);
    assert!((stats.volatility - direct.volatility).abs() < 1e-12);
    assert_eq!(stats.trades, Some(5));
}

#[test]
fn test_same_strategy_compares_across_scenarios() {
    let report = run();
    let per_scenario = &report.strategy_stats["1"];

    assert_eq!(per_scenario.len(), 2);
    assert_eq!(per_scenario["both"].summary, per_scenario["solo"].summary);
    assert_eq!(per_scenario["both"].description["Stop"], "none");
    assert!(report.strategy_stats_table("1").is_some());
    assert!(report.strategy_stats_table("9").is_none());
}

#[test]
fn test_reports_write_to_disk() {
    let report = run();
    let dir = tempfile::tempdir().unwrap();

    let pnl = dir.path().join("pnl.csv");
    report.scenario_pnl.write_csv(&pnl).unwrap();
    let text = std::fs::read_to_string(&pnl).unwrap();
    assert_eq!(text.lines().next(), Some("date,both,solo"));
    assert_eq!(text.lines().count(), 4);

    let trades = dir.path().join("trades.csv");
    write_trades_csv(&report.trades, &trades).unwrap();
    let rows = std::fs::read_to_string(&trades).unwrap().lines().count();
    assert_eq!(rows, 1 + report.total_trades());
}

#[test]
fn test_missing_data_file_aborts() {
    let config = config(Path::new("/no/such/file.csv"));
    let err = config.load_market_data(false).unwrap_err();
    assert!(matches!(err, DataError::Unavailable { .. }));
}

#[test]
fn test_scenarios_share_the_first_scenario_dates() {
    const GC: &str = "COMEX Gold 100oz";

    let mut data = market(series(ES, sample_bars()));
    let mut gold = day_bars(d(9), &[2000.0, 2001.0]);
    gold.extend(day_bars(d(10), &[2002.0, 2003.0]));
    data.insert(GC.to_string(), series(GC, gold));

    let overnight = |name: &str, instrument: &str| -> Box<dyn Strategy> {
        let mut params = rise_fall_params(name, StopPolicy::None);
        params.instrument = instrument.into();
        params.current = vec![t(16, 0)];
        params.unwind = t(9, 30);
        Box::new(Overnight::new(params))
    };

    let mut scenarios = Scenarios::new();
    scenarios.insert("es".to_string(), vec![overnight("4", ES)]);
    scenarios.insert("gold".to_string(), vec![overnight("5", GC)]);

    let report = run_scenarios(&data, &scenarios).unwrap();
    let es_dates: Vec<_> = report.scenario_pnl.column("es").unwrap().keys().copied().collect();
    let gold_dates: Vec<_> = report.scenario_pnl.column("gold").unwrap().keys().copied().collect();

    assert_eq!(es_dates, vec![d(8), d(9), d(10)]);
    assert_eq!(gold_dates, es_dates);
    assert_eq!(report.scenario_pnl.column("gold").unwrap()[&d(8)], 0.0);
}
