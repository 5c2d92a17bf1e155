//! Output formatting utilities.

use crate::scenario::{Outcome, StepReport, Summary};
use colored::Colorize;
use ledgerflow_dao::DaoEvent;
use tabled::{Table, Tabled};

/// Print success message.
pub fn print_success(msg: &str) {
    println!("{}", format!("✓ {}", msg).green());
}

/// Print error message.
pub fn print_error(msg: &str) {
    eprintln!("{}", format!("✗ {}", msg).red());
}

/// Print info message.
pub fn print_info(msg: &str) {
    println!("{}", format!("ℹ {}", msg).blue());
}

/// One-line description of an engine event.
pub fn format_event(event: &DaoEvent) -> String {
    match event {
        DaoEvent::Contributed { total_contribution, .. } => {
            format!("contribution now {}", total_contribution)
        }
        DaoEvent::ProposalCreated { proposal_id, ends_at, .. } => {
            format!("proposal #{} open until {}", proposal_id, ends_at)
        }
        DaoEvent::VoteCast { total_votes, .. } => format!("votes now {}", total_votes),
        DaoEvent::ProposalExecuted { amount, recipient, .. } => {
            format!("paid {} to {}", amount, recipient.short())
        }
        DaoEvent::Withdrawn { amount, recipient, .. } => {
            format!("withdrew {} to {}", amount, recipient.short())
        }
    }
}

pub fn format_step(report: &StepReport) -> String {
    match &report.outcome {
        Outcome::Applied(Some(event)) => format!(
            "{:>3}. {} {} ({})",
            report.step,
            "ok".green(),
            report.description,
            format_event(event)
        ),
        Outcome::Applied(None) => format!("{:>3}. {} {}", report.step, "ok".green(), report.description),
        Outcome::Rejected(kind) => format!(
            "{:>3}. {} {} ({})",
            report.step,
            "rejected".yellow(),
            report.description,
            kind
        ),
    }
}

pub fn print_step(report: &StepReport) {
    println!("{}", format_step(report));
}

#[derive(Tabled)]
struct BalanceRow {
    account: String,
    amount: String,
}

#[derive(Tabled)]
struct ProposalRow {
    id: u64,
    name: String,
    amount: String,
    recipient: String,
    votes: String,
    executed: bool,
}

fn balance_table(rows: &[(String, ledgerflow_types::Amount)]) -> Table {
    Table::new(rows.iter().map(|(account, amount)| BalanceRow {
        account: account.clone(),
        amount: amount.to_string(),
    }))
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &Summary) {
    println!();
    let title = if summary.name.is_empty() {
        "Scenario Summary".to_string()
    } else {
        format!("Scenario Summary: {}", summary.name)
    };
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
    println!("Clock:               {}", summary.now.to_string().bright_cyan());
    println!("Total contributions: {}", summary.ledger.total_contributions().to_string().bright_green());
    println!("Disbursed:           {}", summary.ledger.total_disbursed().to_string().bright_yellow());
    println!("Withdrawn:           {}", summary.ledger.total_withdrawn().to_string().bright_yellow());
    println!("Available:           {}", summary.ledger.available().to_string().bright_green());
    println!("Quorum threshold:    {}", summary.quorum_threshold.to_string().bright_magenta());

    if !summary.investors.is_empty() {
        println!("\n{}", "Investors".bold());
        println!("{}", balance_table(&summary.investors));
    }

    if !summary.proposals.is_empty() {
        let rows = summary.proposals.iter().map(|p| ProposalRow {
            id: p.id,
            name: p.name.clone(),
            amount: p.amount.to_string(),
            recipient: p.recipient.clone(),
            votes: p.votes.to_string(),
            executed: p.executed,
        });
        println!("\n{}", "Proposals".bold());
        println!("{}", Table::new(rows));
    }

    if !summary.payouts.is_empty() {
        println!("\n{}", "Payouts".bold());
        println!("{}", balance_table(&summary.payouts));
    }
}
