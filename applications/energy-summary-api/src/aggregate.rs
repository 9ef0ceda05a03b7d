use crate::error::Result;
use crate::models::{AggregateResult, HomeSelection, MetricRecord, Resolution};
use crate::query::{query_for, QueryRequest};
use crate::tibber::{normalize, EnergyDataSource};
use axum::http::StatusCode;
use chrono::{DateTime, Local, TimeZone};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches every resolution and folds the results into one total
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn EnergyDataSource>,
    selection: HomeSelection,
}

impl Aggregator {
    pub fn new(source: Arc<dyn EnergyDataSource>, selection: HomeSelection) -> Self {
        Self { source, selection }
    }

    /// Summarize with windows anchored in the process local time zone
    pub async fn summarize(&self) -> Result<AggregateResult> {
        let now = Local::now();
        self.summarize_at(&now).await
    }

    /// Summarize with windows anchored at `now`.
    ///
    /// The four fetches run concurrently. The first failure aborts the whole
    /// summary and drops the fetches still in flight.
    pub async fn summarize_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<AggregateResult> {
        let requests: Vec<(Resolution, QueryRequest)> = Resolution::ALL
            .iter()
            .map(|&resolution| (resolution, query_for(resolution, now)))
            .collect();

        let records = try_join_all(
            requests
                .into_iter()
                .map(|(resolution, request)| self.fetch_resolution(resolution, request)),
        )
        .await?;

        let totals: MetricRecord = records.into_iter().sum();
        info!(
            consumption = totals.consumption,
            production = totals.production,
            "Energy summary computed"
        );

        Ok(AggregateResult {
            status: StatusCode::OK,
            totals,
        })
    }

    async fn fetch_resolution(
        &self,
        resolution: Resolution,
        request: QueryRequest,
    ) -> Result<MetricRecord> {
        debug!(%resolution, "Fetching resolution");

        let raw = self
            .source
            .fetch(&request)
            .await
            .inspect_err(|e| debug!(%resolution, error = %e, "Fetch failed"))?;
        let record = normalize(raw, self.selection)
            .inspect_err(|e| debug!(%resolution, error = %e, "Normalization failed"))?;

        debug!(
            %resolution,
            consumption = record.consumption,
            production = record.production,
            "Resolution fetched"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use chrono::FixedOffset;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Reply {
        Record(f64, f64),
        Fail,
        Hang,
    }

    struct StubSource {
        replies: HashMap<Resolution, Reply>,
        seen: Mutex<Vec<Resolution>>,
    }

    impl StubSource {
        fn new(replies: Vec<(Resolution, Reply)>) -> Self {
            Self {
                replies: replies.into_iter().collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    fn resolution_of(request: &QueryRequest) -> Resolution {
        Resolution::ALL
            .into_iter()
            .find(|r| request.query.contains(&format!("resolution: {},", r)))
            .expect("query names a resolution")
    }

    fn body(consumption: f64, production: f64) -> Value {
        json!({"data": {"viewer": {"homes": [{
            "consumption": {"nodes": [{"consumption": consumption}]},
            "production": {"nodes": [{"production": production}]}
        }]}}})
    }

    #[async_trait]
    impl EnergyDataSource for StubSource {
        async fn fetch(&self, request: &QueryRequest) -> Result<Value> {
            let resolution = resolution_of(request);
            self.seen.lock().unwrap().push(resolution);

            match self.replies.get(&resolution) {
                Some(Reply::Record(c, p)) => Ok(body(*c, *p)),
                Some(Reply::Fail) => Err(AppError::Transport("connection reset".to_string())),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(body(0.0, 0.0))
                }
                None => Ok(body(0.0, 0.0)),
            }
        }
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, 14, 30, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_sums_all_four_resolutions() {
        let source = Arc::new(StubSource::new(vec![
            (Resolution::Annual, Reply::Record(1.0, 2.0)),
            (Resolution::Monthly, Reply::Record(3.0, 4.0)),
            (Resolution::Daily, Reply::Record(5.0, 6.0)),
            (Resolution::Hourly, Reply::Record(7.0, 8.0)),
        ]));
        let aggregator = Aggregator::new(source.clone(), HomeSelection::First);

        let result = aggregator.summarize_at(&now()).await.unwrap();

        assert_eq!(result.status, StatusCode::OK);
        assert_eq!(result.totals, MetricRecord::new(16.0, 20.0));

        let mut seen = source.seen.lock().unwrap().clone();
        seen.sort_by_key(|r| r.node_count());
        assert_eq!(
            seen,
            vec![
                Resolution::Monthly,
                Resolution::Hourly,
                Resolution::Daily,
                Resolution::Annual
            ]
        );
    }

    #[tokio::test]
    async fn test_hourly_failure_fails_whole_summary() {
        let source = Arc::new(StubSource::new(vec![
            (Resolution::Annual, Reply::Record(1.0, 2.0)),
            (Resolution::Monthly, Reply::Record(3.0, 4.0)),
            (Resolution::Daily, Reply::Record(5.0, 6.0)),
            (Resolution::Hourly, Reply::Fail),
        ]));
        let aggregator = Aggregator::new(source, HomeSelection::First);

        let result = aggregator.summarize_at(&now()).await;

        assert!(matches!(result, Err(AppError::Transport(_))));
    }

    #[tokio::test]
    async fn test_failure_cancels_pending_fetches() {
        let source = Arc::new(StubSource::new(vec![
            (Resolution::Annual, Reply::Hang),
            (Resolution::Monthly, Reply::Hang),
            (Resolution::Daily, Reply::Hang),
            (Resolution::Hourly, Reply::Fail),
        ]));
        let aggregator = Aggregator::new(source, HomeSelection::First);

        let result = tokio::time::timeout(Duration::from_secs(5), aggregator.summarize_at(&now()))
            .await
            .expect("summary should fail fast instead of waiting on hung fetches");

        assert!(matches!(result, Err(AppError::Transport(_))));
    }

    #[tokio::test]
    async fn test_malformed_resolution_fails_whole_summary() {
        struct NoHomes;

        #[async_trait]
        impl EnergyDataSource for NoHomes {
            async fn fetch(&self, _request: &QueryRequest) -> Result<Value> {
                Ok(json!({"data": {"viewer": {"homes": null}}}))
            }
        }

        let aggregator = Aggregator::new(Arc::new(NoHomes), HomeSelection::First);
        let result = aggregator.summarize_at(&now()).await;

        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_summarize_uses_local_clock() {
        let aggregator = Aggregator::new(
            Arc::new(StubSource::new(vec![(Resolution::Daily, Reply::Record(2.0, 1.0))])),
            HomeSelection::First,
        );

        let result = aggregator.summarize().await.unwrap();
        assert_eq!(result.totals, MetricRecord::new(2.0, 1.0));
    }
}
