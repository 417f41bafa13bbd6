//! Delivery of canonical records to the ingestion endpoint.
//!
//! Records are POSTed one at a time in their aggregated order; a failure
//! for one record is collected in the report and never blocks delivery
//! of the records after it.

use std::time::Duration;

use pricelens_core::ProductRecord;
use reqwest::StatusCode;

use crate::error::DeliveryError;

/// Outcome of delivering one batch of records.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<RecordDeliveryError>,
}

/// A single record's delivery failure, keyed by its position in the
/// delivered slice.
#[derive(Debug)]
pub struct RecordDeliveryError {
    pub index: usize,
    pub error: DeliveryError,
}

/// HTTP client for the downstream ingestion endpoint.
pub struct SinkClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SinkClient {
    /// Creates a sink client with the given endpoint and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Network`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Delivers `records` in order, one POST per record.
    ///
    /// The sink accepts a record with 200 or 201; any other status, a
    /// timeout, or a transport error is recorded as that record's
    /// failure and delivery continues with the next record.
    pub async fn deliver(&self, records: &[ProductRecord]) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for (index, record) in records.iter().enumerate() {
            match self.send_one(record).await {
                Ok(()) => report.sent += 1,
                Err(error) => {
                    tracing::warn!(
                        index,
                        platform = %record.platform,
                        product = %record.product_name,
                        error = %error,
                        "record delivery failed"
                    );
                    report.failed += 1;
                    report.errors.push(RecordDeliveryError { index, error });
                }
            }
        }

        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            "delivery complete"
        );
        report
    }

    async fn send_one(&self, record: &ProductRecord) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&record.to_payload())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            Ok(())
        } else {
            Err(DeliveryError::HttpStatus {
                status: status.as_u16(),
            })
        }
    }
}
