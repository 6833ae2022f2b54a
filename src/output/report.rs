//! Console reports for crawl and download runs

use crate::crawler::{CrawlReport, CrawlStatus};
use crate::download::DownloadReport;

/// Renders the summary printed after a crawl
pub fn render_crawl_report(report: &CrawlReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Crawl Summary: {} ===\n\n", report.collection));

    let status = match report.status {
        CrawlStatus::Completed(_) => "Completed",
        CrawlStatus::Interrupted => "Interrupted",
    };
    out.push_str(&format!("Status: {}\n", status));
    if let CrawlStatus::Completed(reason) = report.status {
        out.push_str(&format!("Stopped because {}\n", reason));
    }

    out.push_str(&format!(
        "Pages: {} fetched starting at page {}\n",
        report.pages_fetched, report.first_page
    ));
    out.push_str(&format!(
        "Records: {} total ({} before, {} added)\n",
        report.records_after,
        report.records_before,
        report.records_added()
    ));
    out.push_str(&format!(
        "Started: {}\nFinished: {} ({}s)\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed().num_seconds()
    ));
    out
}

/// Renders the summary printed after a download run
pub fn render_download_report(report: &DownloadReport) -> String {
    let mut out = String::new();
    out.push_str("=== Download Summary ===\n\n");
    out.push_str(&format!(
        "Downloaded: {} / {}\n",
        report.success_count(),
        report.total()
    ));
    out.push_str(&format!("Failed: {}\n", report.failure_count()));

    if report.failure_count() > 0 {
        out.push_str("\nFailures:\n");
        for (record, reason) in report.failures() {
            let label = record.label().or(record.id()).unwrap_or("<unnamed>");
            out.push_str(&format!("  - {} ({}): {}\n", label, record.asset_url(), reason));
        }
    }
    out
}

pub fn print_crawl_report(report: &CrawlReport) {
    print!("{}", render_crawl_report(report));
}

pub fn print_download_report(report: &DownloadReport) {
    print!("{}", render_download_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::StopReason;
    use crate::download::{DownloadError, Outcome};
    use crate::state::Record;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;

    #[test]
    fn test_render_completed_crawl() {
        let started = Utc::now();
        let report = CrawlReport {
            collection: "seller 'acme'".into(),
            status: CrawlStatus::Completed(StopReason::EmptyPage { page: 6 }),
            records_before: 40,
            records_after: 52,
            first_page: 4,
            pages_fetched: 3,
            started_at: started,
            finished_at: started + Duration::seconds(9),
        };

        let text = render_crawl_report(&report);
        assert!(text.contains("Status: Completed"));
        assert!(text.contains("Stopped because page 6 was empty"));
        assert!(text.contains("Pages: 3 fetched starting at page 4"));
        assert!(text.contains("Records: 52 total (40 before, 12 added)"));
        assert!(text.contains("(9s)"));
    }

    #[test]
    fn test_render_interrupted_crawl() {
        let now = Utc::now();
        let report = CrawlReport {
            collection: "keyword 'lamp'".into(),
            status: CrawlStatus::Interrupted,
            records_before: 0,
            records_after: 5,
            first_page: 1,
            pages_fetched: 1,
            started_at: now,
            finished_at: now,
        };

        let text = render_crawl_report(&report);
        assert!(text.contains("Status: Interrupted"));
        assert!(!text.contains("Stopped because"));
    }

    #[test]
    fn test_render_download_failures() {
        let ok = Record::new(Some("1".into()), "https://img/1.jpg", Some("Lamp".into()), 1);
        let bad = Record::new(Some("2".into()), "https://img/2.jpg", None, 1);
        let report = DownloadReport::new(vec![
            Outcome::Success {
                record: ok,
                path: PathBuf::from("acme/Lamp.jpg"),
            },
            Outcome::Failure {
                record: bad,
                reason: DownloadError::HttpStatus { status: 500 },
            },
        ]);

        let text = render_download_report(&report);
        assert!(text.contains("Downloaded: 1 / 2"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("  - 2 (https://img/2.jpg): HTTP status 500"));
    }
}
