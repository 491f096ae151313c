//! Reconciliation loop
//!
//! One tick authenticates, lists the account's devices, works out which ones
//! are not on the allowlist and either reports them (dry-run) or deletes them
//! one at a time. The first unexpected delete response ends the run.

use crate::allowlist::Allowlist;
use crate::api::AccountApi;
use crate::device::{RemovalCandidate, format_inventory_line, removal_set};
use crate::error::{CleanerError, Result};
use std::time::Duration;

/// Whether removal candidates are only reported or actually deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Apply,
}

impl Mode {
    pub fn from_apply_flag(apply: bool) -> Self {
        if apply { Mode::Apply } else { Mode::DryRun }
    }
}

/// Suspends the loop between ticks
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Plain `thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// What a single tick saw and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub device_count: usize,
    pub to_remove: Vec<RemovalCandidate>,
    pub deleted: usize,
    pub mode: Mode,
}

impl TickReport {
    pub fn nothing_to_do(&self) -> bool {
        self.to_remove.is_empty()
    }
}

pub struct Cleaner<'a, A: AccountApi> {
    api: &'a A,
    account_number: &'a str,
    allowlist: &'a Allowlist,
    mode: Mode,
}

impl<'a, A: AccountApi> Cleaner<'a, A> {
    pub fn new(api: &'a A, account_number: &'a str, allowlist: &'a Allowlist, mode: Mode) -> Self {
        Self {
            api,
            account_number,
            allowlist,
            mode,
        }
    }

    /// Run one authenticate, list, diff and act cycle
    pub fn run_tick(&self) -> Result<TickReport> {
        // Tokens are short-lived, so every tick gets a fresh one
        let token = self.api.authenticate(self.account_number)?;
        let devices = self.api.list_devices(&token)?;

        println!();
        println!("{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("Current devices on account:");
        for device in &devices {
            println!("{}", format_inventory_line(device));
        }

        let to_remove = removal_set(&devices, self.allowlist);
        let mut report = TickReport {
            device_count: devices.len(),
            to_remove,
            deleted: 0,
            mode: self.mode,
        };

        if report.nothing_to_do() {
            println!("No devices to remove (all devices are allowlisted).");
            return Ok(report);
        }

        println!("Devices NOT in allowlist:");
        for candidate in &report.to_remove {
            println!("  - {}  (id={})", candidate.name, candidate.id);
        }

        match self.mode {
            Mode::DryRun => {
                println!("Dry-run: no deletions performed. Re-run with --apply to remove.");
            }
            Mode::Apply => {
                for candidate in &report.to_remove {
                    println!("Deleting {} (id={})...", candidate.name, candidate.id);
                    let outcome = self.api.delete_device(&token, &candidate.id)?;
                    if !outcome.is_deleted() {
                        // Fail closed: nothing else is deleted after an unexpected status
                        return Err(CleanerError::DeleteFailed {
                            name: candidate.name.clone(),
                            id: candidate.id.clone(),
                            status: outcome.status,
                            body: outcome.body,
                        });
                    }
                    println!("  -> deleted");
                    report.deleted += 1;
                }
            }
        }

        tracing::info!(
            devices = report.device_count,
            candidates = report.to_remove.len(),
            deleted = report.deleted,
            "Tick finished"
        );
        Ok(report)
    }

    /// Run ticks until an error occurs. With no interval a single tick is run.
    pub fn run<S: Sleeper>(&self, interval: Option<Duration>, sleeper: &mut S) -> Result<()> {
        loop {
            self.run_tick()?;

            let Some(interval) = interval else {
                return Ok(());
            };
            tracing::debug!(seconds = interval.as_secs(), "Sleeping until next tick");
            sleeper.sleep(interval);
        }
    }
}

/// Convert the `--interval` value into a sleep period. Zero or negative means run once.
pub fn interval_from_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
