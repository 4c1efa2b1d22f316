use crate::domain::model::Table;
use crate::utils::error::{RecommendError, Result};
use std::path::Path;

/// 依副檔名決定分隔符號 (.tsv 使用 tab)
pub fn delimiter_for(path: &str) -> u8 {
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

/// 解析含標題列的 CSV/TSV 內容
pub fn parse_table(data: &[u8], delimiter: u8) -> Result<Table> {
    // Excel 匯出的 CSV 常帶 BOM
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(RecommendError::ProcessingError {
            message: "Input table has no header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(headers, rows))
}

/// 將表格寫成 CSV/TSV 位元組
pub fn write_table(headers: &[String], rows: &[Vec<String>], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| RecommendError::IoError(e.into_error()))
}
