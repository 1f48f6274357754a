use anyhow::{Context, Result, bail};
use mailrisk_lib::lists::{FileStatus, ListCounts};
use mailrisk_lib::{Category, ClassificationVerdict, DmarcEvidence, MxEvidence};
use serde::Serialize;

use crate::args::Cli;

/// Data directory overview printed by `status`.
#[derive(Serialize)]
pub struct StatusReport {
    pub data_dir: String,
    pub files: FileStatus,
    pub counts: ListCounts,
}

pub fn write_reports(rows: &[ClassificationVerdict], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => emit(&serde_json::to_string_pretty(rows)?, cli),
        "ndjson" => {
            let mut buf = String::new();
            for row in rows {
                buf.push_str(&serde_json::to_string(row)?);
                buf.push('\n');
            }
            emit(buf.trim_end(), cli)
        }
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn write_status(report: &StatusReport, cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            println!("data dir: {}", report.data_dir);
            let files = &report.files;
            let counts = &report.counts;
            let rows = [
                ("disposable.txt", files.disposable, Some(counts.disposable)),
                ("privacy.txt", files.privacy, Some(counts.privacy)),
                ("free_provider.txt", files.free, Some(counts.free)),
                ("universities.txt", files.university, Some(counts.university)),
                ("newlyadded.txt", files.newly_added, Some(counts.newly_added)),
                ("verifymail_api.txt", files.api_keys, None),
            ];
            for (name, found, count) in rows {
                let state = if found { "loaded" } else { "missing" };
                match count {
                    Some(n) => println!("  {name:<20} {state:<8} {n} entries"),
                    None => println!("  {name:<20} {state}"),
                }
            }
            Ok(())
        }
        "json" => emit(&serde_json::to_string_pretty(report)?, cli),
        "ndjson" => emit(&serde_json::to_string(report)?, cli),
        other => bail!("format '{other}' is not available for status, use: human|json|ndjson"),
    }
}

pub fn any_disposable(rows: &[ClassificationVerdict]) -> bool {
    rows.iter().any(ClassificationVerdict::is_disposable)
}

fn emit(text: &str, cli: &Cli) -> Result<()> {
    match &cli.out {
        Some(path) => {
            let mut bytes = text.as_bytes().to_vec();
            bytes.push(b'\n');
            write_all_atomically(path, &bytes)
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_human(rows: &[ClassificationVerdict]) -> Result<()> {
    for row in rows {
        let tag = format!("[{}]", row.category.as_str().to_uppercase());
        match &row.source {
            Some(source) => println!("{tag:<28} {} :: {source}", row.email),
            None => println!("{tag:<28} {}", row.email),
        }
        println!("        mx: {}", mx_summary(&row.mx));
        if row.mx.has_mx {
            println!("        dmarc: {}", dmarc_summary(&row.dmarc));
        }
        if let Some(provider) = &row.email_provider {
            println!("        provider: {provider}");
        }
        if row.api_checked {
            println!("        api: checked");
        }
        if row.category == Category::MailboxOrgSpecialCase {
            println!("        note: mailbox.org trial accounts are frequently abused");
        }
    }
    Ok(())
}

fn mx_summary(mx: &MxEvidence) -> String {
    if let Some(err) = &mx.error {
        return format!("error ({err})");
    }
    if !mx.has_mx {
        return "none".to_string();
    }
    mx.records
        .iter()
        .map(|host| format!("{} ({}, {})", host.hostname, host.priority, host.address))
        .collect::<Vec<_>>()
        .join("; ")
}

fn dmarc_summary(dmarc: &DmarcEvidence) -> String {
    if let Some(err) = &dmarc.error {
        return format!("error ({err})");
    }
    if !dmarc.has_dmarc {
        return "none".to_string();
    }
    if dmarc.is_known_disposable_signature {
        format!("{} [known disposable signature]", dmarc.record)
    } else {
        dmarc.record.clone()
    }
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[ClassificationVerdict], cli: &Cli) -> Result<()> {
    const HEADER: [&str; 9] = [
        "email",
        "domain",
        "category",
        "source",
        "university_name",
        "email_provider",
        "has_mx",
        "has_dmarc",
        "api_checked",
    ];
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[ClassificationVerdict], _: &Cli) -> Result<()> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &ClassificationVerdict) -> [String; 9] {
    [
        row.email.clone(),
        row.domain.clone(),
        row.category.as_str().to_string(),
        row.source.clone().unwrap_or_default(),
        row.university_name.clone().unwrap_or_default(),
        row.email_provider.clone().unwrap_or_default(),
        row.mx.has_mx.to_string(),
        row.dmarc.has_dmarc.to_string(),
        row.api_checked.to_string(),
    ]
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
