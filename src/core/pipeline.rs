use crate::core::batch::{BatchProgress, BatchRunner};
use crate::core::binding::{CatalogLoad, CustomerBinding, OdpBinding};
use crate::core::matcher::Matcher;
use crate::core::table::{delimiter_for, parse_table, write_table};
use crate::core::{BatchInput, BatchOutput, ConfigProvider, Pipeline, Storage};
use crate::domain::model::{CustomerRecord, RecommendationResult, StatusSummary, Table};
use crate::utils::error::{RecommendError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Result columns appended to every customer row.
pub const RESULT_COLUMNS: [&str; 12] = [
    "ODP_TERDEKAT",
    "JARAK_METER",
    "ODP_AVAI",
    "ODP_USED",
    "ODP_IDLE",
    "ODP_RSV",
    "ODP_RSK",
    "ODP_IS_TOTAL",
    "ODP_TERDEKAT_FALLBACK",
    "JARAK_FALLBACK_METER",
    "STATUS_REKOMENDASI",
    "KETERANGAN",
];

pub struct RecommendationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> RecommendationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_table(&self, path: &str) -> Result<Table> {
        tracing::debug!("Reading table from: {}", path);
        let data = self.storage.read_file(path).await?;
        parse_table(&data, delimiter_for(path))
    }

    /// Reads and binds both input tables without matching.
    pub async fn inspect(&self) -> Result<InputReport> {
        // ODP 欄位先驗證，缺欄位時不讀取客戶資料
        let odp_names = self.config.odp_columns();
        let odp_table = self.read_table(self.config.odp_file()).await?;
        let odp_binding = OdpBinding::resolve(&odp_table, &odp_names)?;
        let catalog = odp_binding.load_catalog(&odp_table);

        if self.config.match_config().group_filter_enabled && !odp_binding.has_group() {
            tracing::warn!("Group filter enabled but the ODP table has no group column");
        }

        let customer_table = self.read_table(self.config.customer_file()).await?;
        let customer_binding = CustomerBinding::resolve(
            &customer_table,
            &self.config.customer_columns(),
            &odp_names.group,
        )?;
        let customers = customer_binding.load_customers(&customer_table);

        Ok(InputReport {
            odp_table,
            customer_table,
            catalog,
            customers,
        })
    }
}

/// Bound inputs, including the catalog rows that were rejected.
#[derive(Debug, Clone)]
pub struct InputReport {
    pub odp_table: Table,
    pub customer_table: Table,
    pub catalog: CatalogLoad,
    pub customers: Vec<CustomerRecord>,
}

impl InputReport {
    pub fn invalid_customers(&self) -> usize {
        self.customers.iter().filter(|c| c.location.is_none()).count()
    }

    /// Customer/ODP distance computations a full run would perform.
    pub fn distance_evaluations(&self) -> usize {
        (self.customers.len() - self.invalid_customers()) * self.catalog.nodes.len()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for RecommendationPipeline<S, C> {
    async fn extract(&self) -> Result<BatchInput> {
        let report = self.inspect().await?;

        if !report.catalog.rejected.is_empty() {
            tracing::warn!(
                "{} of {} ODP rows excluded from the catalog",
                report.catalog.rejected.len(),
                report.odp_table.len()
            );
        }

        Ok(BatchInput {
            odp_table: report.odp_table,
            customer_table: report.customer_table,
            catalog: report.catalog.nodes,
            customers: report.customers,
        })
    }

    async fn transform(&self, input: BatchInput) -> Result<BatchOutput> {
        let matcher = Matcher::new(self.config.match_config());
        let runner = BatchRunner::new(
            matcher,
            self.config.worker_threads(),
            self.config.progress_interval(),
        )?;

        tracing::info!(
            "Matching {} customers against {} ODP on {} threads",
            input.customers.len(),
            input.catalog.len(),
            runner.threads()
        );

        // CPU 密集工作不佔用 async runtime
        let BatchInput {
            odp_table,
            customer_table,
            catalog,
            customers,
        } = input;
        let results = tokio::task::spawn_blocking(move || {
            runner.run(&customers, &catalog, |progress: BatchProgress| {
                tracing::info!(
                    "Progress: {}/{} customers ({:.1}%)",
                    progress.processed,
                    progress.total,
                    progress.percent()
                );
            })
        })
        .await
        .map_err(|e| RecommendError::ProcessingError {
            message: format!("Matching task failed: {}", e),
        })?;

        let summary = StatusSummary::from_results(&results);

        Ok(BatchOutput {
            odp_table,
            customer_table,
            results,
            summary,
        })
    }

    async fn load(&self, output: BatchOutput) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for format in self.config.output_formats() {
                let (file_name, content) = match format.as_str() {
                    "csv" => ("recommendations.csv", recommendation_sheet(&output, b',')?),
                    "tsv" => ("recommendations.tsv", recommendation_sheet(&output, b'\t')?),
                    "json" => ("recommendations.json", recommendation_json(&output)?),
                    other => {
                        return Err(RecommendError::InvalidConfigValueError {
                            field: "output_formats".to_string(),
                            value: other.to_string(),
                            reason: "Unsupported format".to_string(),
                        })
                    }
                };
                tracing::debug!("Adding {} ({} bytes)", file_name, content.len());
                zip.start_file::<_, ()>(file_name, FileOptions::default())?;
                zip.write_all(&content)?;
            }

            zip.start_file::<_, ()>("summary.csv", FileOptions::default())?;
            zip.write_all(&summary_sheet(&output.summary)?)?;

            zip.start_file::<_, ()>("odp_catalog.csv", FileOptions::default())?;
            zip.write_all(&write_table(
                &output.odp_table.headers,
                &output.odp_table.rows,
                b',',
            )?)?;

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing archive ({} bytes) to {}", zip_data.len(), output_path);
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}

/// 原始客戶欄位 + 推薦結果欄位
fn recommendation_sheet(output: &BatchOutput, delimiter: u8) -> Result<Vec<u8>> {
    let width = output.customer_table.headers.len();
    let mut headers = output.customer_table.headers.clone();
    headers.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));

    let rows: Vec<Vec<String>> = output
        .customer_table
        .rows
        .iter()
        .zip(&output.results)
        .map(|(row, result)| {
            let mut cells = row.clone();
            cells.resize(width, String::new());
            cells.extend(result_cells(result));
            cells
        })
        .collect();

    write_table(&headers, &rows, delimiter)
}

fn result_cells(result: &RecommendationResult) -> [String; 12] {
    fn text<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }
    fn meters(value: Option<f64>) -> String {
        value.map(|d| format!("{:.2}", d)).unwrap_or_default()
    }

    [
        text(&result.odp_name),
        meters(result.distance_meters),
        text(&result.capacity),
        text(&result.utilization),
        text(&result.idle),
        text(&result.rsv),
        text(&result.rsk),
        text(&result.is_total),
        text(&result.nearest_odp_name),
        meters(result.nearest_distance_meters),
        result.status.to_string(),
        result.explanation.clone(),
    ]
}

fn recommendation_json(output: &BatchOutput) -> Result<Vec<u8>> {
    let records: Vec<serde_json::Value> = output
        .customer_table
        .rows
        .iter()
        .zip(&output.results)
        .map(|(row, result)| {
            let customer: serde_json::Map<String, serde_json::Value> = output
                .customer_table
                .headers
                .iter()
                .zip(row.iter().map(String::as_str).chain(std::iter::repeat("")))
                .map(|(header, value)| (header.clone(), serde_json::Value::from(value)))
                .collect();

            serde_json::json!({
                "customer": customer,
                "recommendation": result,
            })
        })
        .collect();

    let document = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "summary": output.summary,
        "records": records,
    });

    Ok(serde_json::to_vec_pretty(&document)?)
}

fn summary_sheet(summary: &StatusSummary) -> Result<Vec<u8>> {
    let headers = vec!["KATEGORI".to_string(), "JUMLAH".to_string()];
    let rows: Vec<Vec<String>> = summary
        .rows()
        .into_iter()
        .map(|(status, count)| vec![status.to_string(), count.to_string()])
        .collect();

    write_table(&headers, &rows, b',')
}
