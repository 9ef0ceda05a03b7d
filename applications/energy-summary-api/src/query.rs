use crate::models::Resolution;
use crate::window;
use chrono::{DateTime, TimeZone};
use serde::Serialize;

/// Body POSTed to the Tibber GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Selection arguments shared by the consumption and production connections
fn connection_args(resolution: Resolution, cursor: Option<&str>) -> String {
    match cursor {
        Some(after) => format!(
            "resolution: {}, first: {}, after: \"{}\", filterEmptyNodes: true",
            resolution,
            resolution.node_count(),
            after
        ),
        None => format!(
            "resolution: {}, last: {}, filterEmptyNodes: true",
            resolution,
            resolution.node_count()
        ),
    }
}

pub fn build_query(resolution: Resolution, cursor: Option<&str>) -> QueryRequest {
    let args = connection_args(resolution, cursor);
    let query = format!(
        r#"{{
  viewer {{
    homes {{
      consumption({args}) {{
        nodes {{
          consumption
        }}
      }}
      production({args}) {{
        nodes {{
          production
        }}
      }}
    }}
  }}
}}"#
    );

    QueryRequest { query }
}

/// Query for `resolution` with its window anchored relative to `now`
pub fn query_for<Tz: TimeZone>(resolution: Resolution, now: &DateTime<Tz>) -> QueryRequest {
    let cursor = window::cursor_for(resolution, now);
    build_query(resolution, cursor.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, 14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_annual_query_uses_last_without_cursor() {
        let request = query_for(Resolution::Annual, &now());

        assert!(request
            .query
            .contains("consumption(resolution: ANNUAL, last: 100, filterEmptyNodes: true)"));
        assert!(request
            .query
            .contains("production(resolution: ANNUAL, last: 100, filterEmptyNodes: true)"));
        assert!(!request.query.contains("after:"));
        assert!(!request.query.contains("first:"));
    }

    #[test]
    fn test_windowed_queries_use_first_and_cursor() {
        for (resolution, count) in [
            (Resolution::Monthly, 12),
            (Resolution::Daily, 31),
            (Resolution::Hourly, 24),
        ] {
            let cursor = window::cursor_for(resolution, &now()).unwrap();
            let request = query_for(resolution, &now());
            let expected = format!(
                "resolution: {}, first: {}, after: \"{}\", filterEmptyNodes: true",
                resolution, count, cursor
            );

            assert_eq!(request.query.matches(expected.as_str()).count(), 2);
        }
    }

    #[test]
    fn test_query_selects_node_values() {
        let request = build_query(Resolution::Hourly, Some("abc="));

        assert!(request.query.starts_with("{\n  viewer {\n    homes {"));
        assert!(request.query.contains("nodes {\n          consumption\n        }"));
        assert!(request.query.contains("nodes {\n          production\n        }"));
    }

    #[test]
    fn test_request_body_serialization() {
        let request = build_query(Resolution::Annual, None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["query"].as_str().unwrap(), request.query);
    }
}
