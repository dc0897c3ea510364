use crate::errors::{AppError, ValidationError};
use crate::models::{Account, DailyStatsRow, Transaction, Trip};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

/// Location of one traveller's documents under the data directory.
pub fn traveller_dir(data_dir: &Path, band: u64, number: u64) -> PathBuf {
    data_dir
        .join("travellers")
        .join(band.to_string())
        .join(number.to_string())
}

pub async fn load_daily_stats(data_dir: &Path) -> Result<Vec<DailyStatsRow>, AppError> {
    Ok(read_json(&data_dir.join("dailystats.json")).await?.unwrap_or_default())
}

pub async fn load_account(data_dir: &Path, band: u64, number: u64) -> Result<Account, AppError> {
    let path = traveller_dir(data_dir, band, number).join("account.json");
    read_json(&path)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no account for traveller {band}/{number}")))
}

pub async fn load_trips(data_dir: &Path, band: u64, number: u64) -> Result<Vec<Trip>, AppError> {
    let path = traveller_dir(data_dir, band, number).join("flighthistory.json");
    Ok(read_json(&path).await?.unwrap_or_default())
}

pub async fn load_transactions(
    data_dir: &Path,
    band: u64,
    number: u64,
) -> Result<Vec<Transaction>, AppError> {
    let path = traveller_dir(data_dir, band, number).join("transactions.json");
    Ok(read_json(&path).await?.unwrap_or_default())
}

/// `None` when the document does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(document) => {
                debug!("loaded {}", path.display());
                Ok(Some(document))
            }
            Err(err) => {
                error!("failed to parse {}: {err}", path.display());
                Err(ValidationError::MalformedDocument {
                    document: path.display().to_string(),
                    reason: err.to_string(),
                }
                .into())
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found", path.display());
            Ok(None)
        }
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            Err(err.into())
        }
    }
}
