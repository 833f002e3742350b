use chrono::NaiveDate;
use tracing::info;

use crate::domain::errors::ServiceError;
use crate::domain::models::statistics::format_day;
use crate::domain::models::{StatusTotals, TimeWindow};
use crate::infrastructure::persistence::repositories::StatisticsRepository;

/// Daily rollup job
#[derive(Clone, Debug)]
pub struct StatisticsService {
    statistics_repository: StatisticsRepository,
}

impl StatisticsService {
    pub fn new(statistics_repository: StatisticsRepository) -> Self {
        Self {
            statistics_repository,
        }
    }

    /// Compute and persist the rollup for one UTC day.
    /// Returns `None` when the day was already rolled up.
    pub async fn compute_daily_rollup(
        &self,
        date: NaiveDate,
    ) -> Result<Option<StatusTotals>, ServiceError> {
        let window = TimeWindow::day(date)?;
        if !self.statistics_repository.needs_rollup(&window).await? {
            info!("Rollup for {} already computed", format_day(date));
            return Ok(None);
        }

        let totals = self.statistics_repository.window_totals(&window).await?;
        let written = self
            .statistics_repository
            .record_daily(date, totals.totals, totals.total_data_size)
            .await?;
        if !written {
            // another job got there between the guard and the insert
            return Ok(None);
        }

        info!(
            "Rolled up {}: {} orders, {} bytes",
            format_day(date),
            totals.totals,
            totals.total_data_size
        );
        Ok(Some(totals))
    }
}
