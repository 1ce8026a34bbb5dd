//! 営業時間・空き枠生成の純粋関数
//!
//! 週間の営業時間テンプレート（working-hours template）から、
//!
//! - 2 つの時刻間の「営業時間内に限定した経過分数」の計算
//! - 今日以降の具体的な予約可能ブロックの展開
//!
//! を行います。いずれも副作用のない純粋関数で、タイムゾーンの解釈は
//! 呼び出し側（バックエンド）の責務です（ここでは素朴な暦計算のみ）。

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use super::error::DomainError;

/// 不正入力でも走査コストを抑えるための日数上限
const MAX_WALK_DAYS: u32 = 30;

/// 月曜始まりの曜日一覧（WeeklySchedule の内部インデックス順）
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// 1 日分の営業時間枠
///
/// 不変条件: `start < end`。営業していない日は `WeeklySchedule` 上で
/// `None` として表現されるため、この型は常に有効な枠を表します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkWindow {
    /// 新しい営業時間枠を作成（`start < end` を検証）
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidWorkWindow {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// `"HH:MM"` 形式の文字列ペアから作成
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let start_t = parse_time_of_day(start)?;
        let end_t = parse_time_of_day(end)?;
        Self::new(start_t, end_t)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

/// `"HH:MM"` をパース
fn parse_time_of_day(value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| DomainError::InvalidTimeOfDay(value.to_string()))
}

/// 週間営業時間テンプレート
///
/// 曜日ごとに営業時間枠を持ちます。未設定の曜日は非営業日として扱います。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [Option<WorkWindow>; 7],
}

impl WeeklySchedule {
    /// すべての曜日が非営業のテンプレートを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定曜日に営業時間枠を設定（ビルダー形式）
    pub fn with_day(mut self, weekday: Weekday, window: WorkWindow) -> Self {
        self.days[weekday.num_days_from_monday() as usize] = Some(window);
        self
    }

    /// 指定曜日の営業時間枠を設定・解除
    pub fn set_day(&mut self, weekday: Weekday, window: Option<WorkWindow>) {
        self.days[weekday.num_days_from_monday() as usize] = window;
    }

    /// 指定曜日の営業時間枠（非営業日は None）
    pub fn day(&self, weekday: Weekday) -> Option<&WorkWindow> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// 営業日の一覧（月曜始まり）
    pub fn working_days(&self) -> impl Iterator<Item = (Weekday, &WorkWindow)> {
        WEEKDAYS
            .iter()
            .filter_map(|weekday| self.day(*weekday).map(|window| (*weekday, window)))
    }
}

/// 予約可能な具体的ブロック
///
/// テンプレートから生成されるだけで、この層で手動編集されることは
/// ありません。永続化は除外対象のバックエンドが担います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityBlock {
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub is_available: bool,
    pub recurring: bool,
    pub recurring_days: Vec<Weekday>,
}

/// 営業時間内に限定した経過分数を計算
///
/// - `schedule` が `None` の場合は素の経過分数を返す（フォールバック）
/// - `end <= start` の場合は 0
/// - `start` の暦日から `end` の暦日まで日単位で走査し（最大 30 日で
///   打ち切り、それまでの累積値を返す）、営業日ごとに営業時間枠と
///   `[start, end]` の正の重なり分数を加算する
pub fn elapsed_business_minutes(
    start: NaiveDateTime,
    end: NaiveDateTime,
    schedule: Option<&WeeklySchedule>,
) -> i64 {
    if end <= start {
        return 0;
    }

    let Some(schedule) = schedule else {
        return (end - start).num_minutes();
    };

    let mut total = 0;
    let mut day = start.date();
    let last_day = end.date();
    let mut walked = 0;

    while day <= last_day && walked < MAX_WALK_DAYS {
        if let Some(window) = schedule.day(day.weekday()) {
            let open = day.and_time(window.start());
            let close = day.and_time(window.end());
            let overlap_start = open.max(start);
            let overlap_end = close.min(end);
            if overlap_end > overlap_start {
                total += (overlap_end - overlap_start).num_minutes();
            }
        }

        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
        walked += 1;
    }

    total
}

/// 週間テンプレートから繰り返しの予約可能ブロックを展開
///
/// 営業日ごとに、`today` 以降に訪れるその曜日の直近 `weeks` 回分の
/// ブロックを生成します（`today` より厳密に前の日付はスキップ）。
/// 結果は開始日時順にソートされます。
pub fn generate_recurring_blocks(
    schedule: &WeeklySchedule,
    weeks: u32,
    today: NaiveDate,
) -> Vec<AvailabilityBlock> {
    let mut blocks = Vec::new();

    for (weekday, window) in schedule.working_days() {
        let offset = (weekday.num_days_from_monday() + 7 - today.weekday().num_days_from_monday())
            % 7;
        let first = today + Duration::days(i64::from(offset));

        for week in 0..weeks {
            let date = first + Duration::days(i64::from(week) * 7);
            blocks.push(AvailabilityBlock {
                start_at: date.and_time(window.start()),
                end_at: date.and_time(window.end()),
                is_available: true,
                recurring: true,
                recurring_days: vec![weekday],
            });
        }
    }

    blocks.sort_by_key(|block| block.start_at);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekdays_nine_to_five() -> WeeklySchedule {
        let window = WorkWindow::parse("09:00", "17:00").unwrap();
        WeeklySchedule::new()
            .with_day(Weekday::Mon, window)
            .with_day(Weekday::Tue, window)
            .with_day(Weekday::Wed, window)
            .with_day(Weekday::Thu, window)
            .with_day(Weekday::Fri, window)
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_work_window_rejects_inverted_range() {
        // テスト項目: start >= end の営業時間枠は拒否される
        // given (前提条件):
        let start = "17:00";
        let end = "09:00";

        // when (操作):
        let result = WorkWindow::parse(start, end);

        // then (期待する結果):
        assert!(matches!(result, Err(DomainError::InvalidWorkWindow { .. })));
    }

    #[test]
    fn test_work_window_rejects_malformed_time() {
        // テスト項目: HH:MM 形式でない時刻文字列は拒否される
        // given (前提条件):
        let start = "9 o'clock";
        let end = "17:00";

        // when (操作):
        let result = WorkWindow::parse(start, end);

        // then (期待する結果):
        assert!(matches!(result, Err(DomainError::InvalidTimeOfDay(_))));
    }

    #[test]
    fn test_elapsed_is_zero_when_end_not_after_start() {
        // テスト項目: end <= start の場合は 0 が返される
        // given (前提条件):
        let schedule = weekdays_nine_to_five();
        let start = datetime(2024, 1, 5, 10, 0);
        let end = datetime(2024, 1, 5, 10, 0);

        // when (操作):
        let same = elapsed_business_minutes(start, end, Some(&schedule));
        let reversed = elapsed_business_minutes(end, datetime(2024, 1, 4, 10, 0), Some(&schedule));

        // then (期待する結果):
        assert_eq!(same, 0);
        assert_eq!(reversed, 0);
    }

    #[test]
    fn test_elapsed_without_schedule_is_raw_difference() {
        // テスト項目: スケジュールが無い場合は素の経過分数が返される
        // given (前提条件):
        let start = datetime(2024, 1, 5, 10, 0);
        let end = datetime(2024, 1, 6, 11, 30);

        // when (操作):
        let elapsed = elapsed_business_minutes(start, end, None);

        // then (期待する結果):
        assert_eq!(elapsed, 24 * 60 + 90);
    }

    #[test]
    fn test_elapsed_within_single_working_day() {
        // テスト項目: 同一営業日内の経過分数が計算される
        // given (前提条件):
        let schedule = weekdays_nine_to_five();
        // 2024-01-05 is a Friday
        let start = datetime(2024, 1, 5, 10, 0);
        let end = datetime(2024, 1, 5, 12, 0);

        // when (操作):
        let elapsed = elapsed_business_minutes(start, end, Some(&schedule));

        // then (期待する結果):
        assert_eq!(elapsed, 120);
    }

    #[test]
    fn test_elapsed_clips_time_before_opening() {
        // テスト項目: 開店前の時間は経過分数に含まれない
        // given (前提条件):
        let schedule = weekdays_nine_to_five();
        let start = datetime(2024, 1, 5, 8, 0);
        let end = datetime(2024, 1, 5, 10, 0);

        // when (操作):
        let elapsed = elapsed_business_minutes(start, end, Some(&schedule));

        // then (期待する結果):
        assert_eq!(elapsed, 60);
    }

    #[test]
    fn test_elapsed_across_weekend_matches_worked_example() {
        // テスト項目: 金曜 16:30 〜 月曜 09:30 の経過は 60 分（金曜 30 分 + 月曜 30 分）
        // given (前提条件):
        let schedule = weekdays_nine_to_five();
        // 2024-01-05 is a Friday, 2024-01-08 is the following Monday
        let start = datetime(2024, 1, 5, 16, 30);
        let end = datetime(2024, 1, 8, 9, 30);

        // when (操作):
        let elapsed = elapsed_business_minutes(start, end, Some(&schedule));

        // then (期待する結果):
        assert_eq!(elapsed, 60);
    }

    #[test]
    fn test_elapsed_skips_non_working_days() {
        // テスト項目: 非営業日（週末）は 0 分として扱われる
        // given (前提条件):
        let schedule = weekdays_nine_to_five();
        // 2024-01-06 (Sat) to 2024-01-07 (Sun)
        let start = datetime(2024, 1, 6, 9, 0);
        let end = datetime(2024, 1, 7, 17, 0);

        // when (操作):
        let elapsed = elapsed_business_minutes(start, end, Some(&schedule));

        // then (期待する結果):
        assert_eq!(elapsed, 0);
    }

    #[test]
    fn test_elapsed_is_monotone_in_end() {
        // テスト項目: start とスケジュールを固定したとき end の増加に対して単調非減少
        // given (前提条件):
        let schedule = weekdays_nine_to_five();
        let start = datetime(2024, 1, 5, 10, 0);

        // when (操作):
        let mut previous = 0;
        for hour in 11..24 {
            let end = datetime(2024, 1, 5, hour, 0);
            let elapsed = elapsed_business_minutes(start, end, Some(&schedule));

            // then (期待する結果):
            assert!(elapsed >= previous);
            previous = elapsed;
        }
    }

    #[test]
    fn test_elapsed_walk_is_capped_at_thirty_days() {
        // テスト項目: 30 日を超える期間は打ち切られ、それまでの累積値が返される
        // given (前提条件):
        let window = WorkWindow::parse("09:00", "17:00").unwrap();
        let mut schedule = WeeklySchedule::new();
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            schedule.set_day(weekday, Some(window));
        }
        let start = datetime(2024, 1, 1, 0, 0);
        let end = datetime(2024, 6, 1, 0, 0);

        // when (操作):
        let elapsed = elapsed_business_minutes(start, end, Some(&schedule));

        // then (期待する結果):
        // 8 時間 × 30 日で打ち切り
        assert_eq!(elapsed, 8 * 60 * 30);
    }

    #[test]
    fn test_generate_four_weeks_of_single_working_day() {
        // テスト項目: 営業日 1 日・weeks=4 でちょうど 4 ブロックが正しい曜日に生成される
        // given (前提条件):
        let window = WorkWindow::parse("09:00", "17:00").unwrap();
        let schedule = WeeklySchedule::new().with_day(Weekday::Wed, window);
        // 2024-01-01 is a Monday
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        // when (操作):
        let blocks = generate_recurring_blocks(&schedule, 4, today);

        // then (期待する結果):
        assert_eq!(blocks.len(), 4);
        for block in &blocks {
            assert_eq!(block.start_at.weekday(), Weekday::Wed);
            assert!(block.start_at < block.end_at);
            assert!(block.is_available);
            assert!(block.recurring);
            assert_eq!(block.recurring_days, vec![Weekday::Wed]);
        }
        assert_eq!(
            blocks[0].start_at,
            datetime(2024, 1, 3, 9, 0) // first Wednesday on or after today
        );
        assert_eq!(blocks[3].start_at, datetime(2024, 1, 24, 9, 0));
    }

    #[test]
    fn test_generate_includes_today_when_today_is_working_day() {
        // テスト項目: today 自身が営業曜日の場合は today のブロックが含まれる
        // given (前提条件):
        let window = WorkWindow::parse("10:00", "18:00").unwrap();
        let schedule = WeeklySchedule::new().with_day(Weekday::Mon, window);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(); // Monday

        // when (操作):
        let blocks = generate_recurring_blocks(&schedule, 2, today);

        // then (期待する結果):
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start_at, datetime(2024, 1, 1, 10, 0));
        assert_eq!(blocks[1].start_at, datetime(2024, 1, 8, 10, 0));
    }

    #[test]
    fn test_generate_sorts_blocks_across_working_days() {
        // テスト項目: 複数営業日のブロックが開始日時順に並ぶ
        // given (前提条件):
        let window = WorkWindow::parse("09:00", "12:00").unwrap();
        let schedule = WeeklySchedule::new()
            .with_day(Weekday::Fri, window)
            .with_day(Weekday::Tue, window);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(); // Monday

        // when (操作):
        let blocks = generate_recurring_blocks(&schedule, 2, today);

        // then (期待する結果):
        assert_eq!(blocks.len(), 4);
        for pair in blocks.windows(2) {
            assert!(pair[0].start_at < pair[1].start_at);
        }
        assert_eq!(blocks[0].start_at.weekday(), Weekday::Tue);
        assert_eq!(blocks[1].start_at.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_generate_with_no_working_days_is_empty() {
        // テスト項目: 営業日が無いテンプレートからは何も生成されない
        // given (前提条件):
        let schedule = WeeklySchedule::new();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        // when (操作):
        let blocks = generate_recurring_blocks(&schedule, 4, today);

        // then (期待する結果):
        assert!(blocks.is_empty());
    }
}
