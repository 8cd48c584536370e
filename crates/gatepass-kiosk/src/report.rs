//! CSV reports and pass file naming.

use std::io;

use chrono::{DateTime, Local, TimeZone, Utc};
use gatepass_store::Visitor;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const VISITOR_HEADER: [&str; 11] = [
    "PassID", "Name", "Mobile", "Type", "Host", "Student", "Class", "Section", "InTime",
    "OutTime", "Status",
];

const SUMMARY_HEADER: [&str; 5] = ["PassID", "Name", "Type", "Host", "Time"];

/// Full visitor report with times in the kiosk's local zone.
pub fn visitors_csv(visitors: &[Visitor]) -> csv::Result<String> {
    visitors_csv_with_tz(visitors, &Local)
}

pub fn visitors_csv_with_tz<Tz: TimeZone>(visitors: &[Visitor], tz: &Tz) -> csv::Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut wtr = writer();
    wtr.write_record(VISITOR_HEADER)?;

    for v in visitors {
        let in_time = format_time(v.check_in_time, tz);
        let out_time = match v.check_out_time {
            Some(t) => format_time(t, tz),
            None => "Active".to_string(),
        };
        wtr.write_record([
            v.pass_id.as_str(),
            v.name.as_str(),
            v.mobile.as_str(),
            v.visitor_type.as_str(),
            v.host_name.as_str(),
            or_na(&v.student_name),
            or_na(&v.student_class),
            or_na(&v.student_section),
            in_time.as_str(),
            out_time.as_str(),
            v.status.as_str(),
        ])?;
    }
    finish(wtr)
}

/// Index of the day's passes, shipped alongside the pass images.
pub fn daily_summary_csv(visitors: &[Visitor]) -> csv::Result<String> {
    daily_summary_csv_with_tz(visitors, &Local)
}

pub fn daily_summary_csv_with_tz<Tz: TimeZone>(
    visitors: &[Visitor],
    tz: &Tz,
) -> csv::Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut wtr = writer();
    wtr.write_record(SUMMARY_HEADER)?;
    for v in visitors {
        let time = format_time(v.check_in_time, tz);
        wtr.write_record([
            v.pass_id.as_str(),
            v.name.as_str(),
            v.visitor_type.as_str(),
            v.host_name.as_str(),
            time.as_str(),
        ])?;
    }
    finish(wtr)
}

/// `BPS-48213_Jane_Doe.png`
pub fn pass_file_name(visitor: &Visitor) -> String {
    let name = visitor.name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_{}.png", visitor.pass_id, name)
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> csv::Result<String> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

fn format_time<Tz: TimeZone>(t: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.with_timezone(tz).format(TIME_FORMAT).to_string()
}

fn or_na(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}
