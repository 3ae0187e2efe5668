//! Helpers for reporting sizes and batch results on the console.
use crate::batch::BatchReport;
use crate::constants::SIZE_PREFIX;

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Size reduction as a percentage; negative when the output grew.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

pub fn print_batch_summary(report: &BatchReport) {
    let (total_before, total_after) = report.size_totals();

    crate::info!("\n{} Batch Summary:", SIZE_PREFIX);
    crate::info!("  🗜️  Compressed: {}", report.compressed_count());
    crate::info!("  ⏭️  Already optimized: {}", report.skipped_count());
    if report.failed_count() > 0 {
        crate::info!("  ❌ Failed: {}", report.failed_count());
    }
    if report.compressed_count() > 0 {
        crate::info!(
            "  📦 Size: {} → {} ({:.1}% smaller)",
            format_file_size(total_before),
            format_file_size(total_after),
            calculate_compression_ratio(total_before, total_after)
        );
    }
    if let Some(count) = report.compression_count {
        crate::info!("  🔢 Compressions this month: {}", count);
    }
    crate::info!("  ⏱️  Total time: {:.2?}", report.elapsed);
}
