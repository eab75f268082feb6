// src/common/period.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::error::AppError;

// Filtro ?month=&year= usado pelos relatórios
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Janela mensal [start, end) resolvida a partir de mês/ano.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Mês/ano ausentes usam o mês corrente (UTC).
    pub fn resolve(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<Self, AppError> {
        let month = month.unwrap_or(today.month());
        let year = year.unwrap_or(today.year());

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(AppError::InvalidPeriod)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(AppError::InvalidPeriod)?;

        Ok(Self { start, end })
    }

    pub fn from_query(query: PeriodQuery) -> Result<Self, AppError> {
        Self::resolve(query.month, query.year, Utc::now().date_naive())
    }

    /// O ano inteiro, para séries mensais.
    pub fn year(year: i32) -> Result<Self, AppError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(AppError::InvalidPeriod)?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or(AppError::InvalidPeriod)?;
        Ok(Self { start, end })
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_explicit_month() {
        let p = Period::resolve(Some(2), Some(2024), date(2025, 7, 10)).unwrap();
        assert_eq!(p.start, date(2024, 2, 1));
        assert_eq!(p.end, date(2024, 3, 1));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let p = Period::resolve(Some(12), Some(2024), date(2025, 1, 1)).unwrap();
        assert_eq!(p.end, date(2025, 1, 1));
    }

    #[test]
    fn test_defaults_to_current_month() {
        let p = Period::resolve(None, None, date(2025, 7, 10)).unwrap();
        assert_eq!(p.start, date(2025, 7, 1));
        assert_eq!(p.end, date(2025, 8, 1));
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        assert!(matches!(
            Period::resolve(Some(13), Some(2024), date(2025, 1, 1)),
            Err(AppError::InvalidPeriod)
        ));
        assert!(Period::resolve(Some(0), None, date(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_utc_bounds() {
        let p = Period::resolve(Some(3), Some(2025), date(2025, 1, 1)).unwrap();
        assert_eq!(p.start_utc().to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!(p.end_utc().to_rfc3339(), "2025-04-01T00:00:00+00:00");
    }
}
