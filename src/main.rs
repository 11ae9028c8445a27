// Entry point and interactive CLI flow.
//
// - Option [1] loads the inspection export, runs the pipeline against the
//   saved trade mapping and prints diagnostics.
// - Option [2] writes every table plus a JSON metrics snapshot and prints
//   markdown previews.
// - Option [3] lists the open defects of a single unit.
//
// Arguments: [export.csv] [config.json]. A `user_priorities.json` in the
// working directory selects the urgent categories.
use inspection_pipeline::config::{PipelineConfig, DEFAULT_CONFIG_FILE};
use inspection_pipeline::loader::load_inspection_export;
use inspection_pipeline::metrics::lookup_unit_defects;
use inspection_pipeline::output;
use inspection_pipeline::store::{FileStore, InspectionStore};
use inspection_pipeline::util::{format_int, format_number};
use inspection_pipeline::{Pipeline, ProcessedInspection, Result, UserPriorityConfig};

use chrono::Local;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

const DEFAULT_EXPORT_FILE: &str = "inspection_export.csv";
const PRIORITIES_FILE: &str = "user_priorities.json";
const STORE_DIR: &str = "inspection_data";
const REPORT_DIR: &str = "reports";

// Processed data is kept for the session so reports and lookups can be
// repeated without reprocessing the export.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<ProcessedInspection>,
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu. `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_priorities() -> Result<UserPriorityConfig> {
    if !Path::new(PRIORITIES_FILE).exists() {
        return Ok(UserPriorityConfig::new());
    }
    let text = std::fs::read_to_string(PRIORITIES_FILE)?;
    Ok(serde_json::from_str(&text)?)
}

fn run_pipeline(export_path: &str, config: &PipelineConfig) -> Result<ProcessedInspection> {
    let (raw, load_report) = load_inspection_export(export_path)?;
    println!(
        "Loaded {} rows with {} columns.",
        format_int(load_report.total_rows),
        format_int(load_report.total_columns)
    );

    let store = FileStore::new(STORE_DIR)?;
    let mapping = store.load_trade_mapping()?;
    let priorities = load_priorities()?;
    let processed =
        Pipeline::new(config).run(&raw, &mapping, &priorities, Local::now().naive_local());
    store.save_run(&processed.items, &processed.metrics)?;
    Ok(processed)
}

/// Option [1]: load and process the export, then keep the result in
/// `APP_STATE`.
fn handle_load(export_path: &str, config: &PipelineConfig) {
    match run_pipeline(export_path, config) {
        Ok(processed) => {
            let m = &processed.metrics;
            println!(
                "Processing complete: {} inspection items, {} apartment defects across {} units.",
                format_int(processed.items.len()),
                format_int(m.total_defects),
                format_int(m.total_units)
            );
            println!(
                "Checklist columns: {} ({:?} discovery), {} items without a trade mapping.",
                processed.report.inspection_columns,
                processed.report.discovery,
                format_int(processed.report.unmapped_items)
            );
            println!("");
            let mut state = APP_STATE.lock().expect("app state lock");
            state.data = Some(processed);
        }
        Err(e) => {
            eprintln!("Failed to process {}: {}\n", export_path, e);
        }
    }
}

fn print_summary(processed: &ProcessedInspection) {
    let m = &processed.metrics;
    println!("{} - {}", m.building_name, m.address);
    println!("Inspected {} | Unit types: {}\n", m.inspection_date, m.unit_types_str);
    println!(
        "Units: {} | Defects: {} | Defect rate: {}% | Avg per unit: {}",
        format_int(m.total_units),
        format_int(m.total_defects),
        format_number(m.defect_rate, 1),
        format_number(m.avg_defects_per_unit, 1)
    );
    println!(
        "Ready: {} ({}%) | Minor: {} ({}%) | Major: {} ({}%) | Extensive: {} ({}%)",
        m.ready_units,
        format_number(m.ready_pct, 1),
        m.minor_work_units,
        format_number(m.minor_pct, 1),
        m.major_work_units,
        format_number(m.major_pct, 1),
        m.extensive_work_units,
        format_number(m.extensive_pct, 1)
    );
    println!(
        "Urgent: {} | High priority: {} | Common-area defects: {} in {} areas\n",
        m.urgent_defects, m.high_priority_defects, m.common_total_defects, m.common_areas_count
    );
}

/// Option [2]: export every table and print previews.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().expect("app state lock");
        state.data.clone()
    };
    let Some(processed) = data else {
        println!("Error: No data loaded. Please load the inspection export first (option 1).\n");
        return;
    };

    print_summary(&processed);

    let items_file = Path::new(REPORT_DIR).join("inspection_items.csv");
    let result = output::export_metric_tables(REPORT_DIR, &processed.metrics)
        .and_then(|_| output::write_csv(&items_file, &processed.items))
        .and_then(|_| output::write_json(Path::new(REPORT_DIR).join("metrics.json"), &processed.metrics));
    if let Err(e) = result {
        eprintln!("Write error: {}", e);
    }
    println!("Outputs saved to {}/\n", REPORT_DIR);

    let m = &processed.metrics;
    output::preview_table("Defects by Trade", &m.summary_trade, 5);
    output::preview_table("Defects by Unit", &m.summary_unit, 5);
    output::preview_table("Defects by Room", &m.summary_room, 5);
    output::preview_table("Urgent Defects", &m.urgent_defects_table, 5);
    output::preview_table("Planned Work (next 2 weeks)", &m.planned_work_2weeks_table, 5);
    output::preview_table("Planned Work (2 weeks to 1 month)", &m.planned_work_month_table, 5);
    output::preview_table("Common Area Defects by Room", &m.common_summary_room, 5);
}

/// Option [3]: open defects of one unit.
fn handle_lookup() {
    let data = {
        let state = APP_STATE.lock().expect("app state lock");
        state.data.clone()
    };
    let Some(processed) = data else {
        println!("Error: No data loaded. Please load the inspection export first (option 1).\n");
        return;
    };
    let unit = read_line("Unit number: ");
    let rows = lookup_unit_defects(&processed.items, &unit);
    println!("");
    output::preview_table(&format!("Open defects for unit {}", unit), &rows, rows.len());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let export_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_EXPORT_FILE);
    let config_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_CONFIG_FILE);
    let config = PipelineConfig::load(config_path).unwrap_or_else(|e| {
        log::warn!("Unreadable configuration ({}), using defaults", e);
        PipelineConfig::default()
    });

    loop {
        println!("Inspection Report Processor");
        println!("[1] Load the inspection export");
        println!("[2] Generate Reports");
        println!("[3] Look up a unit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(export_path, &config),
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_lookup(),
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
