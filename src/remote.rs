//! HTTP record/rate source for a Zoho-Books-style accounting API.
//! Available behind the `remote` feature.

use crate::error::{CashFlowError, Result};
use crate::record::{FinancialRecord, WireBill, WireExpense, WireInvoice};
use crate::source::{RateSource, RecordSource};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://books.zoho.eu/api/v3";

pub struct RemoteBooksClient {
    client: Client,
    base_url: String,
    access_token: String,
    organization_id: String,
}

impl RemoteBooksClient {
    pub fn new(access_token: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            organization_id: organization_id.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[("organization_id", self.organization_id.as_str())])
            .query(query)
            .header(
                "Authorization",
                format!("Zoho-oauthtoken {}", self.access_token),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CashFlowError::SourceError(format!(
                "GET {path} failed with status {status}"
            )));
        }
        Ok(response.json().await?)
    }
}

fn array(body: &Value, key: &str) -> Result<Vec<Value>> {
    body.get(key)
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| CashFlowError::SourceError(format!("response missing '{key}' array")))
}

#[async_trait]
impl RecordSource for RemoteBooksClient {
    async fn fetch_invoices(&self) -> Result<Vec<FinancialRecord>> {
        let body = self.get("invoices", &[("sort_column", "due_date")]).await?;
        array(&body, "invoices")?
            .into_iter()
            .map(|v| Ok(serde_json::from_value::<WireInvoice>(v)?.into()))
            .collect()
    }

    async fn fetch_expenses(&self) -> Result<Vec<FinancialRecord>> {
        let body = self.get("expenses", &[]).await?;
        array(&body, "expenses")?
            .into_iter()
            .map(|v| Ok(serde_json::from_value::<WireExpense>(v)?.into_record(false)))
            .collect()
    }

    async fn fetch_recurring_expenses(&self) -> Result<Vec<FinancialRecord>> {
        let body = self.get("recurringexpenses", &[]).await?;
        array(&body, "recurring_expenses")?
            .into_iter()
            .map(|v| Ok(serde_json::from_value::<WireExpense>(v)?.into_record(true)))
            .collect()
    }

    async fn fetch_bills(&self) -> Result<Vec<FinancialRecord>> {
        let body = self.get("bills", &[]).await?;
        array(&body, "bills")?
            .into_iter()
            .map(|v| Ok(serde_json::from_value::<WireBill>(v)?.into_record(false)))
            .collect()
    }

    async fn fetch_recurring_bills(&self) -> Result<Vec<FinancialRecord>> {
        let body = self.get("recurringbills", &[]).await?;
        array(&body, "recurring_bills")?
            .into_iter()
            .map(|v| Ok(serde_json::from_value::<WireBill>(v)?.into_record(true)))
            .collect()
    }
}

#[async_trait]
impl RateSource for RemoteBooksClient {
    async fn fetch_supported_currencies(&self) -> Result<Vec<String>> {
        let body = self
            .get(
                "settings/currencies",
                &[("filter_by", "Currencies.ExcludeBaseCurrency")],
            )
            .await?;
        Ok(array(&body, "currencies")?
            .iter()
            .filter_map(|c| c.get("currency_id").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn fetch_exchange_rate(&self, currency: &str) -> Result<(String, f64)> {
        let path = format!("settings/currencies/{currency}/exchangerates");
        let body = self.get(&path, &[]).await?;
        let rates = array(&body, "exchange_rates")?;
        let latest = rates.first().ok_or_else(|| {
            CashFlowError::SourceError(format!("no exchange rate returned for '{currency}'"))
        })?;

        let code = latest
            .get("currency_code")
            .and_then(Value::as_str)
            .unwrap_or(currency)
            .to_string();
        let rate = latest
            .get("rate")
            .and_then(Value::as_f64)
            .ok_or_else(|| CashFlowError::SourceError("exchange rate is not a number".into()))?;
        Ok((code, rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_extraction() {
        let body = json!({"invoices": [{"invoice_number": "INV-1"}]});
        assert_eq!(array(&body, "invoices").unwrap().len(), 1);
        assert!(array(&body, "bills").is_err());
    }
}
