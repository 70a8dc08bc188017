//! Filter dialect shared by both store backends.
//!
//! The hosted store speaks a REST-style query string: `field=eq.value` for
//! exact matches, `or=(a.ilike.*q*,b.ilike.*q*)` for free-text search,
//! `order=field.desc`, `limit` and `offset` for pagination. [`ListQuery`]
//! models the subset this system uses and renders it with
//! [`ListQuery::to_query_string`]; the in-memory store evaluates the same
//! query directly against JSON rows.
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub exact: Vec<(String, String)>,
    pub search: Option<Search>,
    pub order_desc: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Case-insensitive substring match, OR'd across `fields`.
#[derive(Debug, Clone)]
pub struct Search {
    pub fields: Vec<String>,
    pub needle: String,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, field: &str, value: &str) -> Self {
        self.exact.push((field.to_string(), value.to_string()));
        self
    }

    pub fn search(mut self, fields: &[&str], needle: &str) -> Self {
        self.search = Some(Search {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.to_string(),
        });
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_desc = Some(field.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn to_query_string(&self) -> String {
        let mut parts = vec!["select=*".to_string()];

        if let Some(field) = &self.order_desc {
            parts.push(format!("order={field}.desc"));
        }

        for (field, value) in &self.exact {
            parts.push(format!("{field}=eq.{value}"));
        }

        if let Some(search) = &self.search {
            let group = search
                .fields
                .iter()
                .map(|f| format!("{f}.ilike.*{}*", search.needle))
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("or=({group})"));
        }

        if let Some(limit) = self.limit {
            parts.push(format!("limit={limit}"));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("offset={offset}"));
        }

        parts.join("&")
    }

    /// Whether a JSON row passes the exact and search filters. Ordering and
    /// pagination are applied by the caller.
    pub fn matches(&self, row: &Value) -> bool {
        for (field, value) in &self.exact {
            if row.get(field).and_then(Value::as_str) != Some(value.as_str()) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.needle.to_lowercase();
            let hit = search.fields.iter().any(|field| {
                row.get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            });
            if !hit {
                return false;
            }
        }

        true
    }
}
