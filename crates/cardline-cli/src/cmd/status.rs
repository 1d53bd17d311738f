//! `cardline status` - local card database state

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::HumanBytes;

use cardline_scryfall::Mirror;

use super::print_summary;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also query the remote listing and report whether an update is available
    #[arg(long)]
    pub remote: bool,
}

/// Human-readable age of an RFC 3339 snapshot timestamp
fn snapshot_age(marker: &str, now: DateTime<Utc>) -> Option<String> {
    let taken = DateTime::parse_from_rfc3339(marker).ok()?;
    let age = now.signed_duration_since(taken.with_timezone(&Utc));
    let text = match (age.num_days(), age.num_hours()) {
        (d, _) if d >= 1 => format!("{d} days ago"),
        (_, h) if h >= 1 => format!("{h} hours ago"),
        _ => "less than an hour ago".to_string(),
    };
    Some(text)
}

pub fn run(args: StatusArgs, mirror: &Mirror) -> Result<()> {
    let status = mirror.status();
    let mut rows = vec![
        ("Location", status.payload_path.display().to_string()),
        (
            "Card database",
            status
                .payload_bytes
                .map(|b| HumanBytes(b).to_string())
                .unwrap_or_else(|| "missing".to_string()),
        ),
        (
            "Snapshot",
            status.marker.clone().unwrap_or_else(|| "none".to_string()),
        ),
    ];
    if let Some(age) = status
        .marker
        .as_deref()
        .and_then(|m| snapshot_age(m, Utc::now()))
    {
        rows.push(("Age", age));
    }

    if args.remote {
        let remote = mirror.check_freshness()?;
        let state = if mirror.is_stale(&remote.updated_at) {
            "update available"
        } else {
            "up-to-date"
        };
        rows.push(("Remote snapshot", remote.updated_at));
        rows.push(("State", state.to_string()));
    }

    print_summary("Card database", &rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn age_in_days() {
        let now = at("2025-01-18T12:00:00+00:00");
        assert_eq!(
            snapshot_age("2025-01-15T10:04:50.117+00:00", now).as_deref(),
            Some("3 days ago")
        );
    }

    #[test]
    fn age_in_hours() {
        let now = at("2025-01-15T15:00:00+00:00");
        assert_eq!(
            snapshot_age("2025-01-15T10:04:50.117+00:00", now).as_deref(),
            Some("4 hours ago")
        );
    }

    #[test]
    fn unparsable_marker_has_no_age() {
        assert!(snapshot_age("yesterday", Utc::now()).is_none());
    }
}
