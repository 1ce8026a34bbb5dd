//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// 未読通知数エンドポイントのレスポンス
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u32,
}

/// 一括生成エンドポイントのレスポンス
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkGenerateResponse {
    pub created: usize,
}

/// 1 日分の営業時間の DTO
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayHoursDto {
    pub is_working: bool,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// 週間営業時間テンプレートの DTO
///
/// 未設定（欠落）の曜日は非営業日として扱われます。
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WeeklyScheduleDto {
    pub monday: Option<DayHoursDto>,
    pub tuesday: Option<DayHoursDto>,
    pub wednesday: Option<DayHoursDto>,
    pub thursday: Option<DayHoursDto>,
    pub friday: Option<DayHoursDto>,
    pub saturday: Option<DayHoursDto>,
    pub sunday: Option<DayHoursDto>,
}

/// 空き枠ブロックの DTO
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBlockDto {
    pub start_date_time: String,
    pub end_date_time: String,
    pub is_available: bool,
    pub recurring: bool,
    pub recurring_days: Vec<String>,
}
