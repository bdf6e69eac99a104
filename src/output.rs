//! Terminal output helpers.

use hdcat_catalog::{Drive, FileKind, FileRecord};
use hdcat_library::{DriveUsage, PAGE_SIZE, paginate};
use std::collections::BTreeMap;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte size: 1024 steps, two decimals, trailing zeros
/// trimmed (`1536` → `"1.5 KB"`).
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = (bytes.ilog2() / 10).min(UNITS.len() as u32 - 1);
    let value = bytes as f64 / f64::powi(1024.0, exponent as i32);
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent as usize])
}

pub fn print_drives(drives: &[Drive]) {
    if drives.is_empty() {
        println!("No drives cataloged yet.");
        return;
    }
    println!("{:>4}  {:<28}  {:>9}  {:>10}  scanned", "id", "name", "files", "size");
    for drive in drives {
        println!(
            "{:>4}  {:<28}  {:>9}  {:>10}  {}",
            drive.id,
            drive.name,
            drive.total_files,
            human_size(drive.total_size),
            drive.scanned_at.date(),
        );
    }
}

pub fn print_page(records: &[FileRecord], page: usize) {
    let total = records.len();
    let pages = total.div_ceil(PAGE_SIZE).max(1);
    let slice = paginate(records, page);
    println!("{total} file(s) found");
    for record in slice {
        println!(
            "{:>10}  {:<10}  {:<20}  {}",
            human_size(record.size),
            record.kind,
            record.drive_name,
            record.path,
        );
    }
    if slice.is_empty() && total > 0 {
        println!("(page {page} is past the end)");
    }
    println!("Page {page} of {pages}");
}

pub fn print_kind_usage(usage: &BTreeMap<FileKind, u64>) {
    println!("Usage by kind:");
    // Largest first, the way the dashboard chart sorts its slices.
    let mut rows: Vec<(&FileKind, &u64)> = usage.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));
    for (kind, bytes) in rows {
        println!("  {:<10}  {:>10}", kind.as_str(), human_size(*bytes));
    }
}

pub fn print_drive_usage(usage: &[DriveUsage]) {
    println!("Usage by drive:");
    for row in usage {
        println!("  {:<28}  {:>8.2} GB  {:>9} files", row.name, row.size_gb, row.files);
    }
}
