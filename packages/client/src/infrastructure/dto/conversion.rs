//! Conversion logic between DTOs and domain types.
//!
//! 受信ワイヤデータは信頼できないため、変換は `TryFrom` で検証しながら
//! 行い、検証に失敗したフレームは警告ログとともに破棄します。

use chrono::Weekday;

use crate::domain::{
    AvailabilityBlock, Booking, BookingId, BookingStatus, DomainError, InboundEvent,
    PaymentStatus, ServerEvent, Timestamp, UserId, WeeklySchedule, WorkWindow,
    event::{BookingStatusChanged, NotificationRef, PaymentStatusChanged},
    port::OutboundFrame,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::BookingDto> for Booking {
    type Error = DomainError;

    fn try_from(dto: dto::BookingDto) -> Result<Self, Self::Error> {
        let payment_status = dto
            .payment_status
            .as_deref()
            .map(PaymentStatus::from_wire)
            .transpose()?;
        Ok(Self {
            id: BookingId::new(dto.id)?,
            status: BookingStatus::from_wire(&dto.status)?,
            payment_status,
            customer_id: UserId::new(dto.customer_id)?,
            specialist_id: UserId::new(dto.specialist_id)?,
            created_at: Timestamp::new(dto.created_at),
            updated_at: Timestamp::new(dto.updated_at),
        })
    }
}

impl TryFrom<dto::WireEvent> for ServerEvent {
    type Error = DomainError;

    fn try_from(event: dto::WireEvent) -> Result<Self, Self::Error> {
        match event {
            dto::WireEvent::BookingStatusChanged(payload) => {
                Ok(ServerEvent::BookingStatusChanged(BookingStatusChanged {
                    booking_id: BookingId::new(payload.booking_id)?,
                    status: BookingStatus::from_wire(&payload.status)?,
                    booking: payload.booking.map(Booking::try_from).transpose()?,
                }))
            }
            dto::WireEvent::BookingCreated(payload) => {
                Ok(ServerEvent::BookingCreated(payload.booking.try_into()?))
            }
            dto::WireEvent::BookingUpdated(payload) => {
                Ok(ServerEvent::BookingUpdated(payload.booking.try_into()?))
            }
            dto::WireEvent::NotificationCreated(payload) => {
                Ok(ServerEvent::NotificationCreated(NotificationRef {
                    notification_id: payload.notification_id,
                }))
            }
            dto::WireEvent::NotificationRead(payload) => {
                Ok(ServerEvent::NotificationRead(NotificationRef {
                    notification_id: payload.notification_id,
                }))
            }
            dto::WireEvent::NotificationDeleted(payload) => {
                Ok(ServerEvent::NotificationDeleted(NotificationRef {
                    notification_id: payload.notification_id,
                }))
            }
            dto::WireEvent::NotificationsMarkedAllRead {} => {
                Ok(ServerEvent::NotificationsMarkedAllRead)
            }
            dto::WireEvent::UnreadCountSnapshot(payload) => Ok(ServerEvent::UnreadCountSnapshot {
                unread_count: payload.unread_count,
            }),
            dto::WireEvent::PaymentStatusChanged(payload) => {
                Ok(ServerEvent::PaymentStatusChanged(PaymentStatusChanged {
                    booking_id: BookingId::new(payload.booking_id)?,
                    payment_status: PaymentStatus::from_wire(&payload.payment_status)?,
                }))
            }
        }
    }
}

impl TryFrom<http::WeeklyScheduleDto> for WeeklySchedule {
    type Error = DomainError;

    fn try_from(dto: http::WeeklyScheduleDto) -> Result<Self, Self::Error> {
        let mut schedule = WeeklySchedule::new();
        let days = [
            (Weekday::Mon, dto.monday),
            (Weekday::Tue, dto.tuesday),
            (Weekday::Wed, dto.wednesday),
            (Weekday::Thu, dto.thursday),
            (Weekday::Fri, dto.friday),
            (Weekday::Sat, dto.saturday),
            (Weekday::Sun, dto.sunday),
        ];
        for (weekday, day) in days {
            let Some(day) = day else { continue };
            if !day.is_working {
                continue;
            }
            let start = day
                .start
                .ok_or_else(|| DomainError::InvalidTimeOfDay("(missing start)".to_string()))?;
            let end = day
                .end
                .ok_or_else(|| DomainError::InvalidTimeOfDay("(missing end)".to_string()))?;
            schedule.set_day(weekday, Some(WorkWindow::parse(&start, &end)?));
        }
        Ok(schedule)
    }
}

/// 受信テキストフレームをパースしてドメインイベントへ変換
///
/// - 未知のイベント種別・JSON でないフレーム: 前方互換のため黙って捨てる
///   （debug ログのみ）
/// - 既知の種別だが検証に失敗したペイロード: 相手側のバグの可能性が
///   高いため warn ログを残して捨てる
pub fn parse_inbound(text: &str, received_at: Timestamp) -> Option<InboundEvent> {
    let wire: dto::WireEvent = match serde_json::from_str(text) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::debug!("Dropping unrecognized frame: {}", e);
            return None;
        }
    };

    match ServerEvent::try_from(wire) {
        Ok(event) => Some(InboundEvent::new(event, received_at)),
        Err(e) => {
            tracing::warn!("Dropping invalid event payload: {}", e);
            None
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

impl From<&AvailabilityBlock> for http::AvailabilityBlockDto {
    fn from(block: &AvailabilityBlock) -> Self {
        Self {
            start_date_time: block.start_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end_date_time: block.end_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            is_available: block.is_available,
            recurring: block.recurring,
            recurring_days: block
                .recurring_days
                .iter()
                .map(|weekday| weekday_name(*weekday).to_string())
                .collect(),
        }
    }
}

impl From<&WeeklySchedule> for http::WeeklyScheduleDto {
    fn from(schedule: &WeeklySchedule) -> Self {
        let day_dto = |weekday: Weekday| {
            schedule.day(weekday).map(|window| http::DayHoursDto {
                is_working: true,
                start: Some(window.start().format("%H:%M").to_string()),
                end: Some(window.end().format("%H:%M").to_string()),
            })
        };
        Self {
            monday: day_dto(Weekday::Mon),
            tuesday: day_dto(Weekday::Tue),
            wednesday: day_dto(Weekday::Wed),
            thursday: day_dto(Weekday::Thu),
            friday: day_dto(Weekday::Fri),
            saturday: day_dto(Weekday::Sat),
            sunday: day_dto(Weekday::Sun),
        }
    }
}

impl From<&OutboundFrame> for dto::WireCommand {
    fn from(frame: &OutboundFrame) -> Self {
        match frame {
            OutboundFrame::JoinRoom(room) => dto::WireCommand::JoinRoom {
                room: room.to_string(),
            },
            OutboundFrame::LeaveRoom(room) => dto::WireCommand::LeaveRoom {
                room: room.to_string(),
            },
        }
    }
}
