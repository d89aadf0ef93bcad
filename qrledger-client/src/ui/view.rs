use chrono::{DateTime, Utc};
use qrledger_model::{QrRecord, RegistryStats};
use std::fmt::{self, Write as _};

use crate::scanner::CameraError;

/// Tabs of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Scan,
    Add,
    List,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Scan => "scan",
            Tab::Add => "add",
            Tab::List => "list",
        }
    }
}

/// Areas of the page a view can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    ScanResult,
    RecordList,
    Stats,
    Scanner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the manager can put on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    ScanFound(QrRecord),
    ScanNotFound { content: String },
    Records(Vec<QrRecord>),
    RecordsError,
    Stats(RegistryStats),
    StatsError,
    ScannerIdle,
    CameraFailure(CameraError),
}

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_LIST_TEXT: &str = "No QR codes registered yet";
pub const LIST_ERROR_TEXT: &str = "Failed to load QR codes";
pub const STATS_ERROR_TEXT: &str = "Failed to load statistics";
pub const FOUND_TITLE: &str = "QR code found";
pub const NOT_FOUND_TITLE: &str = "QR code not found";
pub const NOT_REGISTERED_TEXT: &str = "This code is not registered in the system";

/// `D Month YYYY HH:MM`, e.g. `5 March 2024 14:07`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %B %Y %H:%M").to_string()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

impl View {
    /// HTML fragment for the region this view is shown in. User supplied
    /// text is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut html);
        html
    }

    fn write_html(&self, out: &mut String) -> fmt::Result {
        match self {
            View::Loading => {
                write!(out, r#"<div class="loading">{LOADING_TEXT}</div>"#)
            }
            View::ScanFound(record) => {
                write!(
                    out,
                    r#"<div class="scan-result success"><h4>{FOUND_TITLE}</h4><div class="qr-details">"#
                )?;
                write!(
                    out,
                    "<p><strong>Number:</strong> {}</p>",
                    escape(&record.number)
                )?;
                if let Some(name) = record.display_name() {
                    write!(out, "<p><strong>Name:</strong> {}</p>", escape(name))?;
                }
                if let Some(description) = record.display_description() {
                    write!(
                        out,
                        "<p><strong>Description:</strong> {}</p>",
                        escape(description)
                    )?;
                }
                write!(
                    out,
                    "<p><strong>Created:</strong> {}</p></div></div>",
                    format_date(&record.created_at)
                )
            }
            View::ScanNotFound { content } => write!(
                out,
                r#"<div class="scan-result error"><h4>{NOT_FOUND_TITLE}</h4><p>Scanned content: <code>{}</code></p><p>{NOT_REGISTERED_TEXT}</p></div>"#,
                escape(content)
            ),
            View::Records(records) if records.is_empty() => {
                write!(out, r#"<div class="empty">{EMPTY_LIST_TEXT}</div>"#)
            }
            View::Records(records) => {
                for record in records {
                    write_record_item(out, record)?;
                }
                Ok(())
            }
            View::RecordsError => {
                write!(out, r#"<div class="error">{LIST_ERROR_TEXT}</div>"#)
            }
            View::Stats(stats) => {
                for (value, label) in stat_rows(stats) {
                    write!(
                        out,
                        r#"<div class="stat-item"><span class="stat-value">{value}</span><span class="stat-label">{label}</span></div>"#
                    )?;
                }
                Ok(())
            }
            View::StatsError => {
                write!(out, r#"<div class="error">{STATS_ERROR_TEXT}</div>"#)
            }
            View::ScannerIdle => write!(
                out,
                r#"<div class="scanner-placeholder"><p>Press "Start scanning" to turn on the camera</p><small>Make sure the camera permission is granted</small></div>"#
            ),
            View::CameraFailure(error) => {
                write!(
                    out,
                    r#"<div class="scanner-error"><h3>Camera access problem</h3><p class="error-message">{}</p><div class="error-suggestions"><h4>Suggested fixes:</h4><ul>"#,
                    escape(error.message())
                )?;
                for step in error.remediation() {
                    write!(out, "<li>{}</li>", escape(step))?;
                }
                write!(out, "</ul></div></div>")
            }
        }
    }
}

fn write_record_item(out: &mut String, record: &QrRecord) -> fmt::Result {
    write!(
        out,
        r#"<div class="qr-item" data-id="{id}"><div class="qr-item-header"><div class="qr-item-number">{number}</div><div class="qr-item-actions"><button class="btn btn-small btn-secondary" data-action="delete" data-id="{id}">Delete</button></div></div>"#,
        id = record.id,
        number = escape(&record.number)
    )?;
    if let Some(name) = record.display_name() {
        write!(out, r#"<div class="qr-item-name">{}</div>"#, escape(name))?;
    }
    if let Some(description) = record.display_description() {
        write!(
            out,
            r#"<div class="qr-item-description">{}</div>"#,
            escape(description)
        )?;
    }
    write!(
        out,
        r#"<div class="qr-item-date">Created: {}</div></div>"#,
        format_date(&record.created_at)
    )
}

fn stat_rows(stats: &RegistryStats) -> [(u64, &'static str); 4] {
    [
        (stats.total_qr_codes, "Total QR codes"),
        (stats.created_today, "Today"),
        (stats.created_this_week, "This week"),
        (stats.created_this_month, "This month"),
    ]
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading => write!(f, "{LOADING_TEXT}"),
            View::ScanFound(record) => {
                writeln!(f, "✔ {FOUND_TITLE}")?;
                writeln!(f, "  Number:      {}", record.number)?;
                if let Some(name) = record.display_name() {
                    writeln!(f, "  Name:        {name}")?;
                }
                if let Some(description) = record.display_description() {
                    writeln!(f, "  Description: {description}")?;
                }
                write!(f, "  Created:     {}", format_date(&record.created_at))
            }
            View::ScanNotFound { content } => {
                writeln!(f, "✘ {NOT_FOUND_TITLE}")?;
                writeln!(f, "  Scanned content: {content}")?;
                write!(f, "  {NOT_REGISTERED_TEXT}")
            }
            View::Records(records) if records.is_empty() => {
                write!(f, "{EMPTY_LIST_TEXT}")
            }
            View::Records(records) => {
                for (index, record) in records.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "[{}] {}", record.id, record.number)?;
                    if let Some(name) = record.display_name() {
                        write!(f, " | {name}")?;
                    }
                    if let Some(description) = record.display_description() {
                        write!(f, " | {description}")?;
                    }
                    write!(f, " | Created: {}", format_date(&record.created_at))?;
                }
                Ok(())
            }
            View::RecordsError => write!(f, "{LIST_ERROR_TEXT}"),
            View::Stats(stats) => {
                let rows = stat_rows(stats);
                for (index, (value, label)) in rows.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{label:<15} {value}")?;
                }
                Ok(())
            }
            View::StatsError => write!(f, "{STATS_ERROR_TEXT}"),
            View::ScannerIdle => write!(f, "Scanner idle"),
            View::CameraFailure(error) => {
                writeln!(f, "Camera access problem: {}", error.message())?;
                write!(f, "Suggested fixes:")?;
                for step in error.remediation() {
                    write!(f, "\n  - {step}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qrledger_model::QrRecordId;

    fn record(name: Option<&str>, description: Option<&str>) -> QrRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        QrRecord {
            id: QrRecordId(3),
            number: "1001".into(),
            name: name.map(str::to_string),
            description: description.map(str::to_string),
            raw_content: "1001".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn dates_render_day_month_year_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_date(&at), "5 March 2024 14:07");
    }

    #[test]
    fn found_view_omits_absent_optional_blocks() {
        let html = View::ScanFound(record(None, Some("  "))).to_html();
        assert!(html.contains("scan-result success"));
        assert!(html.contains("1001"));
        assert!(html.contains("5 March 2024 14:07"));
        assert!(!html.contains("Name:"));
        assert!(!html.contains("Description:"));
    }

    #[test]
    fn found_view_includes_present_optional_blocks() {
        let text =
            View::ScanFound(record(Some("Gate"), Some("North entrance")))
                .to_string();
        assert!(text.contains("Name:        Gate"));
        assert!(text.contains("Description: North entrance"));
    }

    #[test]
    fn user_content_is_escaped_in_html() {
        let html = View::ScanNotFound {
            content: "<script>alert(1)</script>".into(),
        }
        .to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_list_renders_empty_state() {
        assert_eq!(View::Records(vec![]).to_string(), EMPTY_LIST_TEXT);
        assert!(View::Records(vec![]).to_html().contains("class=\"empty\""));
    }

    #[test]
    fn list_items_carry_delete_actions() {
        let view = View::Records(vec![record(Some("Gate"), None)]);
        assert!(view.to_html().contains(r#"data-action="delete" data-id="3""#));
    }
}
