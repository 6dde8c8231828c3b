//! appraise: headless front-end for the valuation engine.
//!
//! Usage:
//!   appraise --record data/records/fixer_upper.json
//!   appraise --record house.json --simulate
//!   appraise --record house.json --plan "Add Fireplace"
//!   appraise --record house.json --plans "Install Central Air,Add Fireplace" --discount 15
//!   cat house.json | appraise --simulate --json
//!
//! The record is a flat JSON object of feature name → value. Anything not
//! supplied is imputed from the bundle's defaults.

use anyhow::{Context, Result};
use appraisal_core::{
    comparator::{Roi, SimulationResult},
    deal::DealAnalysis,
    engine::{AppraisalEngine, Valuation},
    types::PropertyRecord,
};
use serde::Serialize;
use std::env;
use std::io::{self, Read};

const KNOWN_FLAGS: &[&str] = &[
    "--data-dir", "--record", "--plan", "--plans", "--discount", "--simulate", "--json",
];

#[derive(Serialize)]
struct Report<T: Serialize> {
    generated_at:     String,
    pipeline_version: String,
    mode:             &'static str,
    result:           T,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let record_path = flag_value(&args, "--record");
    let plan = flag_value(&args, "--plan");
    let plans = flag_value(&args, "--plans");
    let discount = parse_arg(&args, "--discount", 0.0f64);
    let simulate = args.iter().any(|a| a == "--simulate");
    let json = args.iter().any(|a| a == "--json");
    for flag in args.iter().skip(1).filter(|a| a.starts_with("--")) {
        if !KNOWN_FLAGS.contains(&flag.as_str()) {
            log::warn!("Unknown flag: {}", flag);
        }
    }

    let engine = AppraisalEngine::build(data_dir)
        .with_context(|| format!("failed to initialize from {data_dir}"))?;
    let record = read_record(record_path)?;
    let version = engine.pipeline().config().version.clone();

    if let Some(list) = plans {
        let names: Vec<&str> = list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        let deal = engine.analyze_deal(&record, &names, discount)?;
        if json {
            emit(&version, "deal", &deal)?;
        } else {
            print_deal(&deal);
        }
    } else if let Some(name) = plan {
        let result = engine.simulate_named(&record, name)?;
        if json {
            emit(&version, "simulate", &result)?;
        } else {
            print_results(std::slice::from_ref(&result));
        }
    } else if simulate {
        let results = engine.simulate_configured_catalog(&record)?;
        if json {
            emit(&version, "catalog", &results)?;
        } else {
            print_results(&results);
        }
    } else {
        let valuation = engine.value_detailed(&record)?;
        if json {
            emit(&version, "value", &valuation)?;
        } else {
            print_valuation(&valuation);
        }
    }

    Ok(())
}

fn read_record(path: Option<&str>) -> Result<PropertyRecord> {
    let content = match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("Cannot read {p}"))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let record: PropertyRecord =
        serde_json::from_str(&content).context("record must be a flat JSON object")?;
    Ok(record)
}

fn emit<T: Serialize>(version: &str, mode: &'static str, result: T) -> Result<()> {
    let report = Report {
        generated_at: chrono::Utc::now().to_rfc3339(),
        pipeline_version: version.to_string(),
        mode,
        result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_valuation(v: &Valuation) {
    println!("=== VALUATION ===");
    println!("  estimated price: ${:.2}", v.price);
    println!("  estimator:       {}", v.estimator);
    println!("  pipeline:        {}", v.pipeline_version);
    println!("  imputed fields:  {}", v.trace.imputed.len());
    for c in &v.trace.clamped {
        println!("  guardrail:       {} capped {} -> {}", c.feature, c.raw, c.clamped);
    }
    if !v.trace.pruned.is_empty() {
        println!("  pruned:          {}", v.trace.pruned.join(", "));
    }
}

fn print_results(results: &[SimulationResult]) {
    let Some(first) = results.first() else {
        println!("  (No renovation plans configured)");
        return;
    };
    println!("=== RENOVATION ROI ===");
    println!("  base house price: ${:.2}", first.baseline_price);
    println!();
    println!("  {:<30} {:>10} {:>14} {:>10}", "Renovation", "Cost", "Value Lift", "ROI");
    for r in results {
        println!(
            "  {:<30} {:>10} {:>14} {:>10}",
            r.plan,
            format!("${:.0}", r.cost),
            format!("${:.2}", r.lift),
            format_roi(r.roi)
        );
    }
}

fn print_deal(d: &DealAnalysis) {
    let plans = if d.plans.is_empty() { "(none)".to_string() } else { d.plans.join(", ") };
    println!("=== DEAL ECONOMICS ===");
    println!("  renovations:      {plans}");
    println!("  fair market:      ${:.0}", d.fair_market_value);
    println!("  purchase price:   ${:.0} ({:.0}% discount)", d.purchase_price, d.purchase_discount_pct);
    println!("  renovation cost:  ${:.0}", d.renovation_cost);
    println!("  total invested:   ${:.0}", d.total_investment);
    println!("  est. sale price:  ${:.0}", d.sale_price);
    println!("  net profit:       ${:.0}", d.net_profit);
    println!("  return:           {}", format_roi(d.roi));
}

fn format_roi(roi: Roi) -> String {
    match roi {
        Roi::Defined(p) => format!("{p:.1}%"),
        Roi::Undefined => "n/a".to_string(),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
