use crate::domain::model::{BatchInput, BatchOutput, MatchConfig};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// ODP 目錄欄位名稱
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdpColumnNames {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub capacity: String,
    pub utilization: String,
    pub group: String,
    pub rsv: String,
    pub rsk: String,
    pub is_total: String,
}

impl Default for OdpColumnNames {
    fn default() -> Self {
        Self {
            name: "ODP_NAME".to_string(),
            latitude: "LATITUDE".to_string(),
            longitude: "LONGITUDE".to_string(),
            capacity: "AVAI".to_string(),
            utilization: "USED".to_string(),
            group: "STO".to_string(),
            rsv: "RSV".to_string(),
            rsk: "RSK".to_string(),
            is_total: "IS_TOTAL".to_string(),
        }
    }
}

/// 客戶欄位名稱，經緯度未指定時自動偵測
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerColumnNames {
    pub id: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub group: Option<String>,
}

pub trait ConfigProvider: Send + Sync {
    fn odp_file(&self) -> &str;
    fn customer_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn match_config(&self) -> MatchConfig;
    fn odp_columns(&self) -> OdpColumnNames;
    fn customer_columns(&self) -> CustomerColumnNames;
    /// 0 means one worker per available core.
    fn worker_threads(&self) -> usize;
    fn progress_interval(&self) -> usize;
    fn output_formats(&self) -> Vec<String>;
    fn archive_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<BatchInput>;
    async fn transform(&self, input: BatchInput) -> Result<BatchOutput>;
    async fn load(&self, output: BatchOutput) -> Result<String>;
}
