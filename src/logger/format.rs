//! Access log format module
//!
//! Two formats: `combined` (Apache/Nginx combined log format) and `json`.
//! Anything else configured falls back to combined.

use chrono::Local;

/// One completed request, as it appears in the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub status: u16,
    pub body_bytes: usize,
    pub user_agent: Option<String>,
}

impl AccessLogEntry {
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            status: 200,
            body_bytes: 0,
            user_agent: None,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $bytes "-" "$ua"`
    fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}{}\" {} {} \"-\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.status,
            self.body_bytes,
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "user_agent": self.user_agent,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AccessLogEntry {
        let mut e = AccessLogEntry::new(
            "127.0.0.1".to_string(),
            "GET".to_string(),
            "/user".to_string(),
        );
        e.query = Some("name=Alice".to_string());
        e.status = 200;
        e.body_bytes = 42;
        e
    }

    #[test]
    fn test_format_combined() {
        let log = entry().format("combined");
        assert!(log.contains("127.0.0.1"));
        assert!(log.contains("GET /user?name=Alice"));
        assert!(log.contains("200 42"));
    }

    #[test]
    fn test_format_json() {
        let log = entry().format("json");
        assert!(log.contains(r#""method":"GET""#));
        assert!(log.contains(r#""status":200"#));
        assert!(log.contains(r#""query":"name=Alice""#));
    }

    #[test]
    fn test_unknown_format_falls_back_to_combined() {
        let e = entry();
        assert_eq!(e.format("bogus"), e.format("combined"));
    }
}
