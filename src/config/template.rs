//! Log filename templating
//!
//! | token | value |
//! |---|---|
//! | `{date}` | `YYYY-MM-DD` |
//! | `{time}` | `HH-MM-SS` |
//! | `{datetime}` | `YYYY-MM-DD_HH-MM-SS` |
//! | `{app_name}`, `{app_version}` | application identity |
//! | `{pid}`, `{hostname}` | process identity |
//!
//! Dates and times are UTC.

use super::{AppInfo, BaseFields};
use chrono::{DateTime, Utc};

pub fn render_filename(
    template: &str,
    app: &AppInfo,
    base: &BaseFields,
    now: DateTime<Utc>,
) -> String {
    if !template.contains('{') {
        return template.to_string();
    }

    template
        .replace("{datetime}", &now.format("%Y-%m-%d_%H-%M-%S").to_string())
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
        .replace("{time}", &now.format("%H-%M-%S").to_string())
        .replace("{app_name}", &app.name)
        .replace("{app_version}", &app.version)
        .replace("{pid}", &base.pid.to_string())
        .replace("{hostname}", &base.hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, 8, 5, 9).single().unwrap()
    }

    #[test]
    fn test_all_tokens() {
        let app = AppInfo {
            name: "billing".to_string(),
            version: "1.4.0".to_string(),
        };
        let base = BaseFields {
            pid: 4242,
            hostname: "node-1".to_string(),
        };
        let rendered = render_filename(
            "{app_name}-{app_version}/{date}/{time}-{datetime}-{pid}@{hostname}.log",
            &app,
            &base,
            now(),
        );
        assert_eq!(
            rendered,
            "billing-1.4.0/2025-06-12/08-05-09-2025-06-12_08-05-09-4242@node-1.log"
        );
    }

    #[test]
    fn test_plain_name_untouched() {
        let rendered = render_filename(
            "app.log",
            &AppInfo::default(),
            &BaseFields::default(),
            now(),
        );
        assert_eq!(rendered, "app.log");
    }

    #[test]
    fn test_unknown_token_is_literal() {
        let rendered = render_filename(
            "{user}-{date}.log",
            &AppInfo::default(),
            &BaseFields::default(),
            now(),
        );
        assert_eq!(rendered, "{user}-2025-06-12.log");
    }
}
