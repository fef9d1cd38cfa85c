use crate::error::Result;
use crate::gate::PairMember;
use crate::record::FinancialRecord;
use crate::session::Session;
use async_trait::async_trait;
use futures::future::join_all;
use log::warn;

/// Collaborator delivering parsed record lists. A failing fetch delivers
/// nothing; the corresponding arrival gate then simply never completes.
#[async_trait]
pub trait RecordSource {
    async fn fetch_invoices(&self) -> Result<Vec<FinancialRecord>>;
    async fn fetch_expenses(&self) -> Result<Vec<FinancialRecord>>;
    async fn fetch_recurring_expenses(&self) -> Result<Vec<FinancialRecord>>;
    async fn fetch_bills(&self) -> Result<Vec<FinancialRecord>>;
    async fn fetch_recurring_bills(&self) -> Result<Vec<FinancialRecord>>;
}

/// Collaborator delivering exchange rates. Rates are requested per
/// supported currency; each response names the currency code it is for.
#[async_trait]
pub trait RateSource {
    async fn fetch_supported_currencies(&self) -> Result<Vec<String>>;
    async fn fetch_exchange_rate(&self, currency: &str) -> Result<(String, f64)>;
}

/// Fetches all supported rates into the session's rate table. Individual
/// rate failures are logged and skipped, which leaves the counting gate
/// short of its expected cardinality.
pub async fn refresh_rates<S>(session: &mut Session, source: &S) -> Result<()>
where
    S: RateSource + Sync,
{
    let currencies = source.fetch_supported_currencies().await?;
    let fetches = currencies.iter().map(|c| source.fetch_exchange_rate(c));
    for outcome in join_all(fetches).await {
        match outcome {
            Ok((code, rate)) => {
                session.add_rate(code, rate);
            }
            Err(e) => warn!("exchange rate fetch failed: {e}"),
        }
    }
    Ok(())
}

/// Runs one full fetch cycle against a record source. Each response feeds
/// the session as it lands; a failed fetch is logged and skipped so the
/// affected gate stays incomplete rather than aborting the cycle.
///
/// Exchange rates must be in place first (see [`refresh_rates`]): amounts
/// are converted at ingest, so a rate table completed afterwards does not
/// rewrite batches already buffered.
pub async fn refresh_session<S>(session: &mut Session, source: &S) -> Result<()>
where
    S: RecordSource + Sync,
{
    session.begin_cycle();

    match source.fetch_invoices().await {
        Ok(batch) => session.ingest_invoices(batch),
        Err(e) => warn!("invoice fetch failed: {e}"),
    }
    match source.fetch_expenses().await {
        Ok(batch) => {
            session.ingest_expenses(batch, PairMember::Normal);
        }
        Err(e) => warn!("expense fetch failed: {e}"),
    }
    match source.fetch_recurring_expenses().await {
        Ok(batch) => {
            session.ingest_expenses(batch, PairMember::Recurrent);
        }
        Err(e) => warn!("recurring expense fetch failed: {e}"),
    }
    match source.fetch_bills().await {
        Ok(batch) => {
            session.ingest_bills(batch, PairMember::Normal);
        }
        Err(e) => warn!("bill fetch failed: {e}"),
    }
    match source.fetch_recurring_bills().await {
        Ok(batch) => {
            session.ingest_bills(batch, PairMember::Recurrent);
        }
        Err(e) => warn!("recurring bill fetch failed: {e}"),
    }

    Ok(())
}
