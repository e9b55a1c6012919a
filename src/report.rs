use crate::dataset::Lookup;
use crate::error::{LookupError, Severity};
use crate::models::{Score, Subject, INFO_COLUMNS};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const NO_GROUP_MESSAGE: &str = "Không có mã khối phù hợp";

pub fn render_lookup(lookup: &Lookup) -> String {
    let record = &lookup.record;
    let mut content = String::new();

    content.push_str("👤 Thông tin học sinh\n");
    for column in INFO_COLUMNS {
        if let Some(value) = record.field(column) {
            content.push_str(&format!("   {}: {}\n", column, value));
        }
    }

    let labels: Vec<_> = Subject::ALL
        .iter()
        .map(|subject| format!("{:<6}", subject.label()))
        .collect();
    let scores: Vec<_> = Subject::ALL
        .iter()
        .map(|subject| format!("{:<6}", record.score(*subject).to_string()))
        .collect();

    content.push_str("\n📊 Kết quả điểm\n");
    content.push_str(&format!("   {}\n", labels.concat()));
    content.push_str(&format!("   {}\n", scores.concat()));
    content.push_str(&format!("   Tổng điểm: {:.2}\n", record.total_score()));

    content.push_str("\n🎯 Mã khối phù hợp\n");
    if lookup.groups.is_empty() {
        content.push_str(&format!("   ❌ {}\n", NO_GROUP_MESSAGE));
        return content;
    }

    for group in &lookup.groups.groups {
        let subjects: Vec<_> = group.subjects.iter().map(|s| format!("{:<6}", s.label())).collect();
        let scores: Vec<_> = group
            .scores
            .iter()
            .map(|score| format!("{:<6}", Score::Present(*score).to_string()))
            .collect();

        content.push_str(&format!("   {:<5}{}  Điểm tổng\n", group.code, subjects.concat()));
        content.push_str(&format!("   {:<5}{}  {:.2}\n", "", scores.concat(), group.sum));
    }

    content
}

/// One line for a failed lookup; the prefix tells the severities apart.
pub fn render_error(err: &LookupError) -> String {
    let prefix = match err.severity() {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
        Severity::Info => "🔍",
    };
    format!("{} {}", prefix, err)
}

/// Write the group report of a lookup to `<output_dir>/<SBD>_khoi.csv`.
pub fn export_group_csv(lookup: &Lookup, output_dir: &Path) -> Result<PathBuf> {
    use csv::Writer;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let sbd = lookup.record.sbd().unwrap_or("unknown");
    let safe_name = sbd.replace(['/', '\\', ' '], "_");
    let csv_path = output_dir.join(format!("{}_khoi.csv", safe_name));
    let mut writer = Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create file: {}", csv_path.display()))?;

    writer.write_record([
        "Mã khối",
        "Môn 1",
        "Môn 2",
        "Môn 3",
        "Điểm 1",
        "Điểm 2",
        "Điểm 3",
        "Điểm tổng",
    ])?;

    for group in &lookup.groups.groups {
        let [s1, s2, s3] = group.subjects;
        let [v1, v2, v3] = group.scores;
        writer.write_record([
            group.code.to_string(),
            s1.label().to_string(),
            s2.label().to_string(),
            s3.label().to_string(),
            v1.to_string(),
            v2.to_string(),
            v3.to_string(),
            format!("{:.2}", group.sum),
        ])?;
    }

    writer.flush()?;
    Ok(csv_path)
}
