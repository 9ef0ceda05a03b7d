use crate::error::{AppError, Result};
use crate::models::{HomeSelection, MetricRecord};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseData {
    pub viewer: Option<Viewer>,
}

#[derive(Debug, Deserialize)]
pub struct Viewer {
    pub homes: Option<Vec<Home>>,
}

#[derive(Debug, Deserialize)]
pub struct Home {
    pub consumption: Option<Connection<ConsumptionNode>>,
    pub production: Option<Connection<ProductionNode>>,
}

#[derive(Debug, Deserialize)]
pub struct Connection<N> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<N>,
}

#[derive(Debug, Deserialize)]
pub struct ConsumptionNode {
    pub consumption: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ProductionNode {
    pub production: Option<f64>,
}

/// Sum the consumption and production nodes of the selected home in `raw`
pub fn normalize(raw: Value, selection: HomeSelection) -> Result<MetricRecord> {
    let response: GraphQlResponse = serde_json::from_value(raw)
        .map_err(|e| AppError::MalformedResponse(format!("unexpected response shape: {}", e)))?;

    let remote_errors = || {
        response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };

    let homes = response
        .data
        .as_ref()
        .and_then(|data| data.viewer.as_ref())
        .and_then(|viewer| viewer.homes.as_ref())
        .ok_or_else(|| {
            if response.errors.is_empty() {
                AppError::MalformedResponse("response has no viewer.homes".to_string())
            } else {
                AppError::MalformedResponse(format!("remote errors: {}", remote_errors()))
            }
        })?;

    let home = select_home(homes, selection)?;

    let consumption = home
        .consumption
        .as_ref()
        .ok_or_else(|| AppError::MalformedResponse("home has no consumption".to_string()))?
        .nodes
        .iter()
        .filter_map(|node| node.consumption)
        .sum();

    let production = home
        .production
        .as_ref()
        .ok_or_else(|| AppError::MalformedResponse("home has no production".to_string()))?
        .nodes
        .iter()
        .filter_map(|node| node.production)
        .sum();

    Ok(MetricRecord::new(consumption, production))
}

fn select_home(homes: &[Home], selection: HomeSelection) -> Result<&Home> {
    match (homes, selection) {
        ([], _) => Err(AppError::MalformedResponse(
            "response contains no homes".to_string(),
        )),
        ([home], _) => Ok(home),
        ([first, ..], HomeSelection::First) => {
            warn!("{} homes returned, summarizing the first", homes.len());
            Ok(first)
        }
        (_, HomeSelection::Single) => Err(AppError::MultipleAccountsUnsupported(homes.len())),
    }
}
