//! reqwest による REST ゲートウェイ実装
//!
//! 除外対象の CRUD バックエンドのうち、同期コアが必要とする 3 つの
//! エンドポイントだけを叩きます:
//!
//! - `GET  /api/notifications/unread-count`
//! - `POST /api/availability/generate-from-working-hours`
//! - `POST /api/availability/blocks`

use async_trait::async_trait;

use crate::domain::{
    AvailabilityBlock, AvailabilityGateway, GatewayError, NotificationGateway, WeeklySchedule,
};
use crate::infrastructure::dto::http::{
    AvailabilityBlockDto, BulkGenerateResponse, UnreadCountResponse, WeeklyScheduleDto,
};

/// HTTP バックエンドゲートウェイ
pub struct HttpBackendGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackendGateway {
    /// ベース URL（例: `http://127.0.0.1:3000`）を指定して作成
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl NotificationGateway for HttpBackendGateway {
    async fn fetch_unread_count(&self) -> Result<u32, GatewayError> {
        let response = self
            .client
            .get(self.url("/api/notifications/unread-count"))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let body: UnreadCountResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(body.unread_count)
    }
}

#[async_trait]
impl AvailabilityGateway for HttpBackendGateway {
    async fn generate_from_working_hours(
        &self,
        schedule: &WeeklySchedule,
    ) -> Result<usize, GatewayError> {
        let response = self
            .client
            .post(self.url("/api/availability/generate-from-working-hours"))
            .json(&WeeklyScheduleDto::from(schedule))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let body: BulkGenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(body.created)
    }

    async fn create_block(&self, block: &AvailabilityBlock) -> Result<(), GatewayError> {
        self.client
            .post(self.url("/api/availability/blocks"))
            .json(&AvailabilityBlockDto::from(block))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        Ok(())
    }
}
