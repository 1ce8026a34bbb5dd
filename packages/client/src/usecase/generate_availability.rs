//! UseCase: 空き枠ブロックの生成
//!
//! まずバックエンドの一括生成 API を試し、それが丸ごと失敗した場合のみ
//! ローカルでテンプレートを展開してブロック単位で作成するフォールバック
//! パスに切り替えます。ブロックごとの作成は独立しており、一部の失敗は
//! ログに残してスキップします（部分的な成功を許容するベストエフォート）。

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{AvailabilityGateway, WeeklySchedule, generate_recurring_blocks};

/// 生成結果（ベストエフォートの完了報告）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub created: usize,
    pub failed: usize,
}

/// 空き枠ブロック生成のユースケース
pub struct GenerateAvailabilityUseCase {
    /// AvailabilityGateway（ブロック作成先の抽象化）
    gateway: Arc<dyn AvailabilityGateway>,
}

impl GenerateAvailabilityUseCase {
    pub fn new(gateway: Arc<dyn AvailabilityGateway>) -> Self {
        Self { gateway }
    }

    /// 週間テンプレートから今後 `weeks` 週分のブロックを生成
    ///
    /// # Arguments
    ///
    /// * `schedule` - 週間営業時間テンプレート
    /// * `weeks` - 展開する週数
    /// * `today` - 展開の起点（これより前の日付はスキップ）
    pub async fn execute(
        &self,
        schedule: &WeeklySchedule,
        weeks: u32,
        today: NaiveDate,
    ) -> GenerationReport {
        match self.gateway.generate_from_working_hours(schedule).await {
            Ok(created) => {
                tracing::info!("Bulk availability generation created {} blocks", created);
                GenerationReport { created, failed: 0 }
            }
            Err(e) => {
                tracing::warn!(
                    "Bulk availability generation failed, falling back to per-block creation: {}",
                    e
                );
                self.create_blocks_individually(schedule, weeks, today).await
            }
        }
    }

    async fn create_blocks_individually(
        &self,
        schedule: &WeeklySchedule,
        weeks: u32,
        today: NaiveDate,
    ) -> GenerationReport {
        let mut report = GenerationReport::default();

        for block in generate_recurring_blocks(schedule, weeks, today) {
            match self.gateway.create_block(&block).await {
                Ok(()) => report.created += 1,
                Err(e) => {
                    // ブロック単位の失敗は許容し、残りの作成を続行する
                    tracing::warn!(
                        "Failed to create availability block starting at {}: {}",
                        block.start_at,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Per-block availability generation finished: {} created, {} failed",
            report.created,
            report.failed
        );
        report
    }
}
