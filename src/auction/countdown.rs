use crate::auction::status::is_auction_ended;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 경매 종료까지 남은 시간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub ended: bool,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    /// 종료 판정은 상태 판별과 같은 기준(종료일 < 현재)을 쓴다
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if is_auction_ended(end, now) {
            return TimeRemaining {
                ended: true,
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
            };
        }

        let total_seconds = (end - now).num_seconds();
        TimeRemaining {
            ended: false,
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
        }
    }

    /// "1일 2시간 3분 4초" 형식. 0인 단위는 생략하고 초는 항상 표시
    pub fn format(&self) -> String {
        if self.ended {
            return "경매 종료".to_string();
        }

        let mut parts = Vec::with_capacity(4);
        if self.days > 0 {
            parts.push(format!("{}일", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{}시간", self.hours));
        }
        if self.minutes > 0 {
            parts.push(format!("{}분", self.minutes));
        }
        parts.push(format!("{}초", self.seconds));
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::status::AuctionStatus;
    use chrono::Duration;

    #[test]
    fn formats_without_zero_units() {
        let now = Utc::now();
        let end = now + Duration::days(1) + Duration::minutes(5) + Duration::seconds(7);
        let remaining = TimeRemaining::until(end, now);
        assert_eq!(remaining.days, 1);
        assert_eq!(remaining.hours, 0);
        assert_eq!(remaining.format(), "1일 5분 7초");
    }

    #[test]
    fn seconds_always_shown() {
        let now = Utc::now();
        let remaining = TimeRemaining::until(now + Duration::hours(2), now);
        assert_eq!(remaining.format(), "2시간 0초");
    }

    #[test]
    fn ends_together_with_status() {
        let now = Utc::now();
        // 종료 시각 그 순간은 아직 진행중, 0초 표시
        let at_end = TimeRemaining::until(now, now);
        assert!(!at_end.ended);
        assert_eq!(at_end.format(), "0초");
        assert_eq!(
            AuctionStatus::from_dates(now + Duration::days(1), now, now, now),
            AuctionStatus::Active
        );

        let past = now + Duration::milliseconds(1);
        assert!(TimeRemaining::until(now, past).ended);
        assert_eq!(
            AuctionStatus::from_dates(now + Duration::days(1), now - Duration::hours(1), now, past),
            AuctionStatus::Ended
        );
    }

    #[test]
    fn past_end_is_ended() {
        let now = Utc::now();
        assert_eq!(
            TimeRemaining::until(now - Duration::seconds(1), now).format(),
            "경매 종료"
        );
    }
}
