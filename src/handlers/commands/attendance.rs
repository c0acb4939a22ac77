//! Attendance command handlers

use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::ScanArgs;
use crate::config::Settings;
use crate::handlers::output::{presence_line, print_json, print_report, settle};
use crate::handlers::HandlerResult;
use crate::models::EventId;
use crate::services::{ParticipantService, ServiceFactory, ServiceFailure, ServiceResponse};
use crate::state::{AttendanceScanner, ScanOutcome};
use crate::utils::errors::{ErrorCategory, EventSphereError};
use crate::utils::helpers::normalize_whitespace;

/// Handle `qr`
pub async fn handle_qr(services: &ServiceFactory, event: EventId, json: bool) -> HandlerResult {
    let qr = settle(services.participant_service.generate_qr_code(event).await)?;
    if json {
        print_json(&qr);
        return Ok(());
    }

    if let Some(name) = &qr.event_name {
        println!("{}", name);
    }
    match &qr.qr_code_text {
        Some(text) => println!("Presence token: {}", text),
        None => println!("No presence token issued yet"),
    }
    if qr.qr_code_image.is_some() {
        println!("Use --json to get the QR image data");
    }
    Ok(())
}

/// Handle `report`
pub async fn handle_report(services: &ServiceFactory, event: EventId, json: bool) -> HandlerResult {
    let report = settle(services.participant_service.attendance_report(event).await)?;
    if json {
        print_json(&report);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Handle `scan`.
///
/// Tokens given as arguments are submitted like manual entries. With
/// `--stdin` every line is treated as a fresh decode, so lines arriving
/// during the cooldown are dropped the way a camera frame would be.
pub async fn handle_scan(services: &ServiceFactory, settings: &Settings, args: ScanArgs) -> HandlerResult {
    let mut scanner = AttendanceScanner::new(services.participant_service.clone(), &settings.scanner);

    if let Some(event) = args.event {
        match services.participant_service.present_participants(event).await {
            ServiceResponse::Success { data, .. } => {
                println!("{} participants already present", data.len());
                scanner.preload(data);
            }
            ServiceResponse::Failure(failure) if failure.should_redirect => return Err(failure),
            ServiceResponse::Failure(failure) => warn!(reason = %failure, "Could not preload present participants"),
        }
    }

    let mut tally = ScanTally::default();
    if args.stdin {
        scan_stdin(&mut scanner, &mut tally).await?;
    } else {
        for token in &args.tokens {
            if let Some(outcome) = scanner.submit_manual(token, Instant::now()).await {
                tally.record(&outcome);
            }
        }
    }

    println!("{} participants present", scanner.scanned().len());
    tally.into_result()
}

async fn scan_stdin(
    scanner: &mut AttendanceScanner<ParticipantService>,
    tally: &mut ScanTally,
) -> Result<(), ServiceFailure> {
    scanner.start();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => normalize_whitespace(&line),
            Ok(None) => break,
            Err(e) => {
                scanner.stop();
                return Err(ServiceFailure::from_error(&EventSphereError::from(e), "scan_stdin"));
            }
        };
        if line.is_empty() {
            continue;
        }

        match scanner.on_decoded(&line, Instant::now()).await {
            Some(outcome) => tally.record(&outcome),
            None => debug!("Decode dropped during cooldown"),
        }
    }
    scanner.stop();
    Ok(())
}

#[derive(Debug, Default)]
struct ScanTally {
    scans: usize,
    failed: usize,
}

impl ScanTally {
    fn record(&mut self, outcome: &ScanOutcome) {
        self.scans += 1;
        match outcome {
            ScanOutcome::Marked(record) => println!("✓ {}", presence_line(record)),
            ScanOutcome::InvalidToken | ScanOutcome::Failed(_) => {
                self.failed += 1;
                println!("✗ {}", outcome.message());
            }
            _ => println!("• {}", outcome.message()),
        }
    }

    fn into_result(self) -> Result<(), ServiceFailure> {
        if self.failed == 0 {
            return Ok(());
        }
        Err(ServiceFailure {
            category: ErrorCategory::Validation,
            message: format!("{} of {} scans failed", self.failed, self.scans),
            should_redirect: false,
        })
    }
}
