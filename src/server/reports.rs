//! In-memory store for broken-link reports
//!
//! Reports are never written to disk. Only flat primitive fields survive,
//! each stringified and truncated, and the oldest reports are dropped once
//! the store is over capacity.

use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Longest stored field value (characters)
pub const MAX_FIELD_CHARS: usize = 500;

pub type Report = Map<String, Value>;

pub struct ReportStore {
    capacity: usize,
    reports: Mutex<VecDeque<Report>>,
}

impl ReportStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            reports: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Stores a report and returns how many are held afterwards
    pub fn add(&self, payload: &Map<String, Value>) -> usize {
        let report = flatten(payload);
        match self.reports.lock() {
            Ok(mut reports) => {
                reports.push_back(report);
                while reports.len() > self.capacity {
                    reports.pop_front();
                }
                debug!("Stored broken-link report ({} held)", reports.len());
                reports.len()
            }
            Err(_) => {
                warn!("Report store lock poisoned; report dropped");
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of the held reports, oldest first
    pub fn snapshot(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Keeps string, number and boolean fields as truncated strings plus `ts`
fn flatten(payload: &Map<String, Value>) -> Report {
    let mut report = Map::new();
    for (key, value) in payload {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let text: String = text.chars().take(MAX_FIELD_CHARS).collect();
        report.insert(key.clone(), Value::String(text));
    }
    report.insert("ts".to_string(), Value::from(chrono::Utc::now().timestamp()));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_only_primitive_fields_kept() {
        let store = ReportStore::new(10);
        store.add(&payload(json!({
            "url": "https://coptic-treasures.com/files/x.pdf",
            "status": 404,
            "retry": true,
            "nested": {"a": 1},
            "list": [1, 2],
            "missing": null
        })));

        let report = &store.snapshot()[0];
        assert_eq!(report["url"], "https://coptic-treasures.com/files/x.pdf");
        assert_eq!(report["status"], "404");
        assert_eq!(report["retry"], "true");
        assert!(report.get("nested").is_none());
        assert!(report.get("list").is_none());
        assert!(report.get("missing").is_none());
        assert!(report["ts"].is_i64());
    }

    #[test]
    fn test_fields_truncated() {
        let store = ReportStore::new(10);
        let long = "ب".repeat(800);
        store.add(&payload(json!({ "note": long })));

        let report = &store.snapshot()[0];
        assert_eq!(report["note"].as_str().unwrap().chars().count(), MAX_FIELD_CHARS);
    }

    #[test]
    fn test_oldest_dropped_over_capacity() {
        let store = ReportStore::new(3);
        for i in 0..5 {
            let count = store.add(&payload(json!({ "n": i })));
            assert!(count <= 3);
        }

        let numbers: Vec<String> = store
            .snapshot()
            .iter()
            .map(|r| r["n"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(numbers, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_empty_payload_still_stored() {
        let store = ReportStore::new(2);
        assert_eq!(store.add(&Map::new()), 1);
        assert!(!store.is_empty());
    }
}
