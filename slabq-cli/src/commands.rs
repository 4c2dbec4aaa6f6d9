//! One-shot command implementations.

use slabq_log::{repair_topic, verify_topic, ReadOutcome, Reader, Writer};
use std::error::Error;
use std::io::{BufRead, Write as _};
use std::path::Path;
use std::time::Duration;

type CommandResult = Result<(), Box<dyn Error>>;

/// Appends payloads, printing the absolute address of each record.
pub fn append(topic: &Path, payloads: &[String], slab_size: u64, sync: bool) -> CommandResult {
    let writer = Writer::open(topic, slab_size)?;

    if payloads.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            println!("{}", writer.write(line.as_bytes())?);
        }
    } else {
        for payload in payloads {
            println!("{}", writer.write(payload.as_bytes())?);
        }
    }

    if sync {
        writer.sync()?;
    }
    writer.close()?;
    Ok(())
}

/// Prints records one per line, optionally polling at end of log.
pub fn cat(topic: &Path, from: u64, follow: bool, poll_ms: u64) -> CommandResult {
    let (mut reader, _) = Reader::open(topic, from)?;
    let mut out = std::io::stdout().lock();

    loop {
        match reader.read()? {
            ReadOutcome::Record { payload, .. } => {
                out.write_all(&payload)?;
                out.write_all(b"\n")?;
            }
            ReadOutcome::EndOfLog if follow => {
                out.flush()?;
                std::thread::sleep(Duration::from_millis(poll_ms));
            }
            ReadOutcome::EndOfLog => break,
        }
    }

    reader.close()?;
    Ok(())
}

/// Prints the writer-side status snapshot as JSON.
pub fn status(topic: &Path) -> CommandResult {
    let writer = Writer::open(topic, slabq_log::DEFAULT_SLAB_SIZE)?;
    let status = writer.status()?;
    writer.close()?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Runs an integrity scan, optionally repairing the trailing partial write.
pub fn verify(topic: &Path, repair: bool) -> CommandResult {
    let report = if repair {
        repair_topic(topic)?
    } else {
        verify_topic(topic)?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.corrupt_records > 0 || report.trailing_bytes > 0 {
        return Err("topic has corrupt or incomplete records".into());
    }
    Ok(())
}
