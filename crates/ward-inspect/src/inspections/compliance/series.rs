use super::super::domain::InspectionReport;
use super::{ComplianceAggregator, DailyBucket, FormResolver, FORECAST_TAIL_DAYS, MAX_WINDOW_DAYS};
use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Centre of the jitter distribution; `u - JITTER_BIAS` leans slightly upward.
const JITTER_BIAS: f64 = 0.45;
const JITTER_SPREAD: f64 = 0.05;

impl<'a, R> ComplianceAggregator<'a, R>
where
    R: FormResolver + ?Sized,
{
    /// Daily averages for the `window_days` days ending at `reference`,
    /// oldest first, without any forecast values.
    ///
    /// The window is clamped to [`MAX_WINDOW_DAYS`]; days that fall before the
    /// earliest representable date are left out.
    pub fn daily_buckets(
        &self,
        reports: &[InspectionReport],
        reference: NaiveDate,
        window_days: u32,
    ) -> Vec<DailyBucket> {
        let window_days = window_days.min(MAX_WINDOW_DAYS);
        let window = i64::from(window_days);
        let mut sums = vec![(0.0_f64, 0usize); window_days as usize];

        for report in reports {
            let days_back = (reference - report.date.date_naive()).num_days();
            if !(0..window).contains(&days_back) {
                continue;
            }
            let slot = &mut sums[(window - 1 - days_back) as usize];
            slot.0 += self.score(report);
            slot.1 += 1;
        }

        sums.into_iter()
            .enumerate()
            .filter_map(|(index, (total, count))| {
                let date =
                    reference.checked_sub_signed(Duration::days(window - 1 - index as i64))?;
                Some(DailyBucket {
                    date,
                    label: date.format("%b %-d").to_string(),
                    avg_score: (count > 0).then(|| total / count as f64),
                    report_count: count,
                    predicted: None,
                })
            })
            .collect()
    }

    /// Daily series with an illustrative forecast on the trailing week.
    ///
    /// The forecast is the most recent observed daily average (or the current
    /// month's average when the window is empty) scaled by a small random
    /// jitter drawn from `rng`. Seed the generator to pin the output.
    pub fn daily_series<G>(
        &self,
        reports: &[InspectionReport],
        reference: NaiveDate,
        window_days: u32,
        rng: &mut G,
    ) -> Vec<DailyBucket>
    where
        G: Rng + ?Sized,
    {
        let mut buckets = self.daily_buckets(reports, reference, window_days);
        let fallback = self.monthly_compliance(reports, reference).current;
        project_forecast(&mut buckets, fallback, rng);
        buckets
    }
}

/// Fills `predicted` on the last [`FORECAST_TAIL_DAYS`] buckets.
pub fn project_forecast<G>(buckets: &mut [DailyBucket], fallback: f64, rng: &mut G)
where
    G: Rng + ?Sized,
{
    let last_known = buckets
        .iter()
        .rev()
        .find_map(|bucket| bucket.avg_score)
        .unwrap_or(fallback);

    let tail_start = buckets.len().saturating_sub(FORECAST_TAIL_DAYS);
    for bucket in &mut buckets[tail_start..] {
        let jitter = (rng.gen::<f64>() - JITTER_BIAS) * JITTER_SPREAD;
        bucket.predicted = Some(last_known * (1.0 + jitter));
    }
}
