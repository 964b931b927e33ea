//! Persisted form of the task collection.
//!
//! Writing is plain serde. Reading is lenient: records written by older
//! versions (numeric or missing ids, `""` for "no due date", local
//! `YYYY-MM-DDTHH:MM` due dates, missing `createdAt`) are normalized, and
//! each normalization is reported as a [`Repair`] so the caller can write the
//! corrected collection back.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::model::task::{Priority, Task};

/// The stored value is not a JSON array at all
#[derive(Debug, thiserror::Error)]
#[error("task data is not a JSON array: {0}")]
pub struct MalformedTasks(#[from] serde_json::Error);

/// One normalization applied while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Record had no usable id; a fresh one was assigned
    AssignedId { index: usize, id: String },
    /// Record reused an id already taken by an earlier record
    ReplacedDuplicateId { old: String, new: String },
    /// Record had no title (or a blank one) and was dropped
    DroppedUntitled { index: usize },
    /// Record was not an object of the expected shape and was dropped
    DroppedInvalid { index: usize },
    /// `createdAt` was missing or unreadable and was set to load time
    ResetCreatedAt { id: String },
    /// A field was rewritten into canonical form (due date, priority, notes)
    Normalized { id: String, field: &'static str },
}

/// Result of decoding the persisted collection
#[derive(Debug, Default)]
pub struct Decoded {
    pub tasks: Vec<Task>,
    pub repairs: Vec<Repair>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Serialize the collection for storage
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tasks)
}

/// Decode stored task data, repairing what can be repaired.
///
/// `new_id` is called once per record that needs an id; `now` stands in for
/// missing creation times.
pub fn decode_tasks(
    raw: &str,
    now: DateTime<Utc>,
    mut new_id: impl FnMut() -> String,
) -> Result<Decoded, MalformedTasks> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    let mut decoded = Decoded::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, value) in records.into_iter().enumerate() {
        let stored: StoredTask = match serde_json::from_value(value) {
            Ok(s) => s,
            Err(_) => {
                decoded.repairs.push(Repair::DroppedInvalid { index });
                continue;
            }
        };

        let title = match stored.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                decoded.repairs.push(Repair::DroppedUntitled { index });
                continue;
            }
        };

        let mut id = match stored.id {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => {
                let id = n.to_string();
                decoded.repairs.push(Repair::Normalized {
                    id: id.clone(),
                    field: "id",
                });
                id
            }
            _ => {
                let id = new_id();
                decoded.repairs.push(Repair::AssignedId {
                    index,
                    id: id.clone(),
                });
                id
            }
        };
        if seen.contains(&id) {
            let fresh = new_id();
            decoded.repairs.push(Repair::ReplacedDuplicateId {
                old: id,
                new: fresh.clone(),
            });
            id = fresh;
        }
        seen.insert(id.clone());

        let created_at = match stored.created_at.as_deref().and_then(parse_timestamp) {
            Some(t) => t,
            None => {
                decoded
                    .repairs
                    .push(Repair::ResetCreatedAt { id: id.clone() });
                now
            }
        };

        let due_date = match stored.due_date.as_deref() {
            None => None,
            Some(s) => {
                if DateTime::parse_from_rfc3339(s).is_err() {
                    decoded.repairs.push(Repair::Normalized {
                        id: id.clone(),
                        field: "dueDate",
                    });
                }
                parse_due_date(s)
            }
        };

        let priority = match stored.priority.as_deref() {
            Some(p) => match p.parse::<Priority>() {
                Ok(parsed) if parsed.as_str() == p => parsed,
                parsed => {
                    decoded.repairs.push(Repair::Normalized {
                        id: id.clone(),
                        field: "priority",
                    });
                    parsed.unwrap_or_default()
                }
            },
            None => {
                decoded.repairs.push(Repair::Normalized {
                    id: id.clone(),
                    field: "priority",
                });
                Priority::default()
            }
        };

        let notes = match stored.notes {
            Some(n) if n.trim().is_empty() => {
                decoded.repairs.push(Repair::Normalized {
                    id: id.clone(),
                    field: "notes",
                });
                None
            }
            other => other,
        };

        decoded.tasks.push(Task {
            id,
            title,
            notes,
            due_date,
            priority,
            completed: stored.completed.unwrap_or(false),
            created_at,
        });
    }

    Ok(decoded)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Parse a due date as typed by a user or stored by an older version.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM` (local
/// time) and `YYYY-MM-DD` (local midnight). Blank input means "no due date"
/// and yields `None`, as does anything unparseable.
pub fn parse_due_date(input: &str) -> Option<DateTime<Utc>> {
    parse_due_date_in(input, &Local)
}

/// [`parse_due_date`] with naive forms interpreted in `tz`
pub fn parse_due_date_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(t) = parse_timestamp(s) {
        return Some(t);
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn counter_ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("gen-{}", n)
        }
    }

    #[test]
    fn canonical_records_need_no_repair() {
        let raw = r#"[{"id":"a","title":"Buy milk","priority":"low","completed":true,
            "createdAt":"2025-05-01T10:00:00Z","dueDate":"2025-05-02T09:00:00Z"}]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.repairs, vec![]);
        assert_eq!(decoded.tasks.len(), 1);
        let task = &decoded.tasks[0];
        assert_eq!(task.id, "a");
        assert!(task.completed);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(
            task.due_date,
            Some(Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_id_gets_fresh_one() {
        let raw = r#"[{"title":"Legacy","priority":"high","createdAt":"2025-05-01T10:00:00Z"}]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.tasks[0].id, "gen-1");
        assert_eq!(
            decoded.repairs,
            vec![Repair::AssignedId {
                index: 0,
                id: "gen-1".into()
            }]
        );
    }

    #[test]
    fn duplicate_ids_are_replaced() {
        let raw = r#"[
            {"id":"x","title":"One","priority":"low","createdAt":"2025-05-01T10:00:00Z"},
            {"id":"x","title":"Two","priority":"low","createdAt":"2025-05-01T10:00:00Z"}
        ]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.tasks[0].id, "x");
        assert_eq!(decoded.tasks[1].id, "gen-1");
    }

    #[test]
    fn numeric_id_becomes_string() {
        let raw = r#"[{"id":1717686537151,"title":"Old","priority":"medium","createdAt":"2025-05-01T10:00:00Z"}]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.tasks[0].id, "1717686537151");
        assert_eq!(decoded.repairs.len(), 1);
    }

    #[test]
    fn untitled_and_invalid_records_are_dropped() {
        let raw = r#"[{"id":"a","title":"   "}, 42, {"id":"b","title":"Keep","priority":"low","createdAt":"2025-05-01T10:00:00Z"}]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.tasks.len(), 1);
        assert_eq!(decoded.tasks[0].id, "b");
        assert_eq!(
            decoded.repairs,
            vec![
                Repair::DroppedUntitled { index: 0 },
                Repair::DroppedInvalid { index: 1 }
            ]
        );
    }

    #[test]
    fn empty_due_and_notes_strings_mean_absent() {
        let raw = r#"[{"id":"a","title":"T","dueDate":"","notes":"","priority":"low","createdAt":"2025-05-01T10:00:00Z"}]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.tasks[0].due_date, None);
        assert_eq!(decoded.tasks[0].notes, None);
        assert_eq!(decoded.repairs.len(), 2);
    }

    #[test]
    fn missing_created_at_uses_now() {
        let raw = r#"[{"id":"a","title":"T","priority":"low"}]"#;
        let decoded = decode_tasks(raw, now(), counter_ids()).unwrap();
        assert_eq!(decoded.tasks[0].created_at, now());
        assert_eq!(
            decoded.repairs,
            vec![Repair::ResetCreatedAt { id: "a".into() }]
        );
    }

    #[test]
    fn non_array_is_malformed() {
        assert!(decode_tasks("not json {{{", now(), counter_ids()).is_err());
        assert!(decode_tasks(r#"{"tasks":[]}"#, now(), counter_ids()).is_err());
    }

    #[test]
    fn due_date_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 14, 14, 30, 0).unwrap();
        assert_eq!(parse_due_date_in("2025-05-14T14:30", &Utc), Some(expected));
        assert_eq!(parse_due_date_in("2025-05-14 14:30", &Utc), Some(expected));
        assert_eq!(
            parse_due_date_in("2025-05-14T14:30:00Z", &Utc),
            Some(expected)
        );
        assert_eq!(
            parse_due_date_in("2025-05-14", &Utc),
            Some(Utc.with_ymd_and_hms(2025, 5, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_due_date_in("  ", &Utc), None);
        assert_eq!(parse_due_date_in("next tuesday", &Utc), None);
    }

    #[test]
    fn encode_then_decode_keeps_tasks() {
        let raw = r#"[{"id":"a","title":"T","notes":"n","priority":"high","completed":true,"createdAt":"2025-05-01T10:00:00Z"}]"#;
        let first = decode_tasks(raw, now(), counter_ids()).unwrap();
        let encoded = encode_tasks(&first.tasks).unwrap();
        let second = decode_tasks(&encoded, now(), counter_ids()).unwrap();
        assert_eq!(second.tasks, first.tasks);
        assert!(second.repairs.is_empty());
    }
}
