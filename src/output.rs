use crate::error::Result;
use crate::types::Metrics;
use csv::WriterBuilder;
use serde::Serialize;
use std::io;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Write rows as CSV. The header comes from the row type, so an empty table
/// still gets its full column set.
pub fn write_csv_to<W, T>(writer: W, rows: &[T]) -> Result<()>
where
    W: io::Write,
    T: Serialize + Tabled,
{
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    let headers = T::headers();
    wtr.write_record(headers.iter().map(|h| h.as_bytes()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<P, T>(path: P, rows: &[T]) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize + Tabled,
{
    let file = std::fs::File::create(path)?;
    write_csv_to(file, rows)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every metrics table as its own CSV file under `dir`; returns the
/// file names written.
pub fn export_metric_tables<P: AsRef<Path>>(dir: P, m: &Metrics) -> Result<Vec<&'static str>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    macro_rules! export {
        ($file:literal, $rows:expr) => {
            write_csv(dir.join($file), $rows)?;
            written.push($file);
        };
    }
    export!("summary_trade.csv", &m.summary_trade);
    export!("summary_unit.csv", &m.summary_unit);
    export!("summary_room.csv", &m.summary_room);
    export!("summary_unit_trade.csv", &m.summary_unit_trade);
    export!("summary_room_component.csv", &m.summary_room_comp);
    export!("urgent_defects.csv", &m.urgent_defects_table);
    export!("planned_work_2weeks.csv", &m.planned_work_2weeks_table);
    export!("planned_work_month.csv", &m.planned_work_month_table);
    export!("component_details.csv", &m.component_details_summary);
    export!("common_summary_trade.csv", &m.common_summary_trade);
    export!("common_summary_room.csv", &m.common_summary_room);
    export!("common_urgent_defects.csv", &m.common_urgent_defects_table);
    Ok(written)
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows\n", rows.len() - max_rows);
    }
}
