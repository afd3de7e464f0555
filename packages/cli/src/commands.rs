//! Subcommand implementations shared by the flag-driven and interactive
//! front ends.

use std::error::Error;
use std::time::Instant;

use chrono::Timelike;
use serde::Serialize;
use taxi_profit_analytics::recommend::RecommendationEngine;
use taxi_profit_analytics::{ProfitTable, compute_table, demand, insights};
use taxi_profit_analytics_models::{
    BestCell, BestHour, Decision, DemandSummary, Efficiency, HourProfit, PickupHotspots,
    ProfitSummary, RecommendationResult, ZoneProfit,
};
use taxi_profit_cli_utils::{IndicatifProgress, MultiProgress};
use taxi_profit_config::AppConfig;
use taxi_profit_ingest::{SampleOptions, TripFilter, load_trips, sample_directory};
use taxi_profit_trip_models::Trip;
use taxi_profit_zones::ZoneDirectory;

use crate::output::{hour_label, money, percent, print_json, zone_label};

/// Zone names from the configured lookup file, or the built-in set.
#[must_use]
pub fn load_zones(config: &AppConfig) -> ZoneDirectory {
    ZoneDirectory::load_or_builtin(config.paths.zone_lookup.as_deref())
}

/// Everything a query needs: config, zone names, cleaned trips, and the
/// profit table built from them.
pub struct Session {
    pub config: AppConfig,
    pub zones: ZoneDirectory,
    pub trips: Vec<Trip>,
    pub table: ProfitTable,
}

impl Session {
    /// Loads the configured trip file and builds the profit table.
    pub fn load(config: AppConfig) -> Result<Self, Box<dyn Error>> {
        let start = Instant::now();
        let zones = load_zones(&config);

        let filter = TripFilter {
            max_trip_distance: config.model.max_trip_distance,
            target_year: config.model.target_year,
        };
        let (trips, report) = load_trips(&config.paths.trips_file, &filter)?;
        if report.kept == 0 {
            log::warn!("No trips left in {} after cleaning", report.file);
        }

        let table = compute_table(
            &trips,
            config.model.fuel_cost_per_distance,
            config.model.zone_count,
        );
        log::info!(
            "Profit table ready: {} trips, {} observed cells ({:.1}s)",
            table.total_trips(),
            table.observed_cells(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            config,
            zones,
            trips,
            table,
        })
    }

    /// Recommendation engine configured from the session settings.
    #[must_use]
    pub fn engine(&self) -> RecommendationEngine<'_> {
        RecommendationEngine::new(&self.table)
            .with_radius(self.config.model.neighbor_radius)
            .with_move_threshold(self.config.model.move_threshold)
            .with_top_candidates(self.config.model.top_candidates)
            .with_zone_names(&self.zones)
    }
}

/// Samples every raw file in the configured raw directory.
pub fn sample(config: &AppConfig, multi: &MultiProgress, json: bool) -> Result<(), Box<dyn Error>> {
    let options = SampleOptions {
        fraction: config.sampling.fraction,
        seed: config.sampling.seed,
    };
    let start = Instant::now();
    let progress = IndicatifProgress::files_bar(multi, "Finding raw files");

    let report = sample_directory(
        &config.paths.raw_dir,
        &config.paths.sampled_dir,
        &config.sampling.raw_file_prefix,
        &options,
        progress.as_ref(),
    )?;

    if json {
        return print_json(&report);
    }

    for file in &report.files {
        println!(
            "{}: kept {} of {} rows ({} in {} undersized strata skipped) -> {}",
            file.month_tag,
            file.sampled_rows,
            file.rows_read,
            file.excluded_rows,
            file.excluded_strata,
            file.output.display()
        );
    }
    println!(
        "Combined {} rows -> {} ({:.1}s)",
        report.combined_rows,
        report.combined.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupOutput {
    zone: i64,
    zone_name: String,
    hour: i64,
    expected_profit: f64,
    trip_count: u64,
    observed: bool,
}

/// Prints the expected profit for one cell. An unobserved cell is a
/// warning, not an error.
pub fn lookup(session: &Session, zone: i64, hour: i64, json: bool) -> Result<(), Box<dyn Error>> {
    let cell = session.table.cell(zone, hour)?;
    let out = LookupOutput {
        zone,
        zone_name: session.zones.display_name(zone),
        hour,
        expected_profit: cell.profit(),
        trip_count: cell.trip_count(),
        observed: cell.is_observed(),
    };

    if json {
        return print_json(&out);
    }

    let label = zone_label(&session.zones, zone);
    if out.observed {
        println!(
            "{label} at {}: {} per trip ({} trips)",
            hour_label(hour),
            money(out.expected_profit),
            out.trip_count
        );
    } else {
        println!(
            "Warning: no trips recorded for {label} at {}; expected profit shown as {}",
            hour_label(hour),
            money(out.expected_profit)
        );
    }

    Ok(())
}

fn print_recommendation(zones: &ZoneDirectory, result: &RecommendationResult) {
    println!(
        "{} at {}, looking ahead to {}",
        zone_label(zones, result.current_zone),
        hour_label(result.current_hour),
        hour_label(result.next_hour)
    );
    println!(
        "Staying put: {} expected per trip",
        money(result.current_next_profit)
    );

    if !result.candidates.is_empty() {
        println!("Nearby zones:");
        for (rank, candidate) in result.candidates.iter().enumerate() {
            println!(
                "  {}. {:<32} {:>9}{}",
                rank + 1,
                zone_label(zones, candidate.zone),
                money(candidate.expected_profit),
                if candidate.observed { "" } else { "  (no data)" }
            );
        }
    }

    match &result.decision {
        Decision::Stay => println!("Recommendation: stay in the current zone"),
        Decision::Move {
            zone_name,
            expected_profit,
            improvement_pct,
            ..
        } => match improvement_pct {
            Some(pct) => println!(
                "Recommendation: move to {zone_name} ({} expected, {})",
                money(*expected_profit),
                percent(*pct)
            ),
            None => println!(
                "Recommendation: move to {zone_name} ({} expected)",
                money(*expected_profit)
            ),
        },
        Decision::Unavailable => println!("No recommendation available"),
    }

    if result.limited_data {
        println!("Warning: limited data for nearby zones at this hour");
    }
}

/// Prints the stay/move recommendation for the next hour.
pub fn recommend(session: &Session, zone: i64, hour: i64, json: bool) -> Result<(), Box<dyn Error>> {
    let result = session.engine().recommend(zone, hour)?;

    if json {
        return print_json(&result);
    }

    print_recommendation(&session.zones, &result);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZoneInsights {
    zone: i64,
    zone_name: String,
    best_hour: BestHour,
    efficiency: Option<Efficiency>,
    hourly_profile: Vec<HourProfit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsightsOutput {
    summary: ProfitSummary,
    best_cell: Option<BestCell>,
    hour: i64,
    comparison: Vec<ZoneProfit>,
    zone: Option<ZoneInsights>,
    demand: DemandSummary,
    hotspots: PickupHotspots,
}

/// Current local hour of day.
pub fn current_hour() -> i64 {
    i64::from(chrono::Local::now().hour())
}

fn collect_insights(
    session: &Session,
    zone: Option<i64>,
    hour: i64,
) -> Result<InsightsOutput, Box<dyn Error>> {
    let table = &session.table;

    let zone = match zone {
        Some(zone) => Some(ZoneInsights {
            zone,
            zone_name: session.zones.display_name(zone),
            best_hour: table.best_hour_for(zone)?,
            efficiency: insights::efficiency(table, zone, hour)?,
            hourly_profile: insights::hourly_profile(table, zone)?,
        }),
        None => None,
    };

    Ok(InsightsOutput {
        summary: insights::summary(table),
        best_cell: table.argmax(),
        hour,
        comparison: insights::compare_zones(table, hour, &session.zones)?,
        zone,
        demand: demand::demand_summary(&session.trips),
        hotspots: demand::pickup_hotspots(
            &session.trips,
            &session.zones,
            demand::TOP_PICKUP_ZONES,
            demand::TOP_PICKUP_BOROUGHS,
        ),
    })
}

fn print_insights(session: &Session, out: &InsightsOutput) {
    let zones = &session.zones;

    println!("Trips analysed: {}", out.summary.total_trips);
    match out.summary.average_profit {
        Some(avg) => println!("Average profit per trip: {}", money(avg)),
        None => println!("Average profit per trip: no data"),
    }
    println!(
        "Observed zone/hour cells: {} of {}",
        out.summary.observed_cells,
        out.summary.zone_count * 24
    );

    if let Some(best) = &out.best_cell {
        println!(
            "Best overall: {} at {} ({})",
            zone_label(zones, best.zone),
            hour_label(best.hour),
            money(best.profit)
        );
    }

    if let Some(zone) = &out.zone {
        println!();
        println!("{}", zone_label(zones, zone.zone));
        println!(
            "  Best hour: {} ({})",
            hour_label(zone.best_hour.hour),
            money(zone.best_hour.profit)
        );
        match &zone.efficiency {
            Some(eff) => println!(
                "  At {}: {:.0}% of best ({} vs best)",
                hour_label(out.hour),
                eff.percent,
                money(eff.delta)
            ),
            None => println!("  At {}: no profitable hour to compare against", hour_label(out.hour)),
        }
        println!("  Hourly profile:");
        for point in &zone.hourly_profile {
            println!(
                "    {} {:>9}{}",
                hour_label(point.hour),
                money(point.expected_profit),
                if point.observed { "" } else { "  (no data)" }
            );
        }
    }

    println!();
    println!("Zones at {}:", hour_label(out.hour));
    for entry in out.comparison.iter().take(15) {
        println!(
            "  {:<32} {:>9}",
            zone_label(zones, entry.zone),
            money(entry.expected_profit)
        );
    }

    println!();
    if let Some(peak) = out.demand.peak_hour() {
        println!(
            "Busiest pickup hour: {} ({} rides)",
            hour_label(peak),
            out.demand.by_hour[peak as usize]
        );
    }
    println!("Rides by hour (weekday / weekend):");
    for hour in 0..out.demand.by_hour.len() {
        println!(
            "  {:02}:00 {:>8} {:>8}",
            hour, out.demand.weekday_by_hour[hour], out.demand.weekend_by_hour[hour]
        );
    }
    if !out.demand.by_month.is_empty() {
        println!("Rides by month:");
        for month in &out.demand.by_month {
            println!("  {}-{:02} {:>8}", month.year, month.month, month.count);
        }
    }
    if !out.demand.by_week.is_empty() {
        println!("Rides by week (week ending):");
        for week in &out.demand.by_week {
            println!("  {} {:>8}", week.week_ending, week.count);
        }
    }

    println!("Rides by trip distance:");
    for bin in &out.demand.distance_bins {
        println!("  {:<8} {:>8}", bin.label, bin.count);
    }
    if out.demand.unbinned_distance > 0 {
        println!("  {:<8} {:>8}", "other", out.demand.unbinned_distance);
    }

    if !out.hotspots.boroughs.is_empty() {
        println!();
        println!("Most popular pickup boroughs:");
        for borough in &out.hotspots.boroughs {
            println!("  {:<16} {:>8}", borough.borough, borough.count);
        }
        println!("Most popular pickup zones:");
        for zone in &out.hotspots.zones {
            println!("  {:<32} {:>8}", zone_label(zones, zone.zone), zone.count);
        }
    }
}

/// Prints dataset and zone insights. `hour` defaults to the current local
/// hour.
pub fn insights(
    session: &Session,
    zone: Option<i64>,
    hour: Option<i64>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let out = collect_insights(session, zone, hour.unwrap_or_else(current_hour))?;

    if json {
        return print_json(&out);
    }

    print_insights(session, &out);
    Ok(())
}

#[derive(Serialize)]
struct ZoneRow<'a> {
    zone: i64,
    name: &'a str,
    borough: Option<&'a str>,
}

/// Prints the named zones.
pub fn list_zones(zones: &ZoneDirectory, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let rows: Vec<ZoneRow<'_>> = zones
            .iter()
            .map(|(zone, info)| ZoneRow {
                zone,
                name: &info.name,
                borough: info.borough.as_deref(),
            })
            .collect();
        return print_json(&rows);
    }

    println!("{:<6} {:<15} NAME", "ID", "BOROUGH");
    println!("{}", "-".repeat(50));
    for (zone, info) in zones.iter() {
        println!(
            "{zone:<6} {:<15} {}",
            info.borough.as_deref().unwrap_or("-"),
            info.name
        );
    }

    Ok(())
}
