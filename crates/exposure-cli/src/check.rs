use std::io::Read;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use color_eyre::eyre::{bail, Report, Result};
use exposure_engine::{
    BreachRecord, Credential, ExposureClient, ExposureReport, ExposureSummary, Outcome,
    ReportView, RiskTier,
};
use inquire::{Password, Text};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::render::{CommandOutput, CommandResult};

#[derive(Subcommand, Clone)]
pub(crate) enum CheckCommand {
    #[command(long_about = "Check an email address.")]
    Email {
        #[arg(help = "The email address to check. Prompted for when omitted.")]
        address: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    #[command(long_about = "Check a password. It is never accepted as an argument.")]
    Password {
        #[arg(long, help = "Read the password from stdin instead of prompting.")]
        stdin: bool,

        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args, Clone)]
pub(crate) struct ViewArgs {
    #[arg(long, help = "List every breach instead of only the summary.")]
    details: bool,
}

impl CheckCommand {
    pub(crate) async fn run(self, client: &ExposureClient, nointeraction: bool) -> CommandResult {
        let (credential, view_args) = match self {
            CheckCommand::Email { address, view } => {
                let address = match address {
                    Some(address) => address,
                    None if nointeraction => bail!("An email address is required"),
                    None => Text::new("Email address").prompt()?,
                };
                (Credential::email(address), view)
            }
            CheckCommand::Password { stdin, view } => {
                (Credential::Password(read_password(stdin, nointeraction)?), view)
            }
        };

        let mut view = ReportView::default();
        view.begin()?;
        view.complete(client.resolve_exposure(credential, None).await)?;

        if view_args.details
            && matches!(
                view,
                ReportView::Resolved {
                    outcome: Outcome::Breached,
                    ..
                }
            )
        {
            view.toggle_details()?;
        }

        render_view(view)
    }
}

fn read_password(stdin: bool, nointeraction: bool) -> Result<Zeroizing<String>> {
    if stdin {
        let mut input = Zeroizing::new(String::new());
        std::io::stdin().read_to_string(&mut input)?;
        strip_line_ending(&mut input);
        return Ok(input);
    }
    if nointeraction {
        bail!("A password is required. Use --stdin to provide it non-interactively");
    }

    Ok(Zeroizing::new(
        Password::new("Password").without_confirmation().prompt()?,
    ))
}

/// Only the line terminator is stripped; surrounding spaces are part of the password.
fn strip_line_ending(input: &mut String) {
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutput {
    query: String,
    outcome: Outcome,
    risk_tier: RiskTier,
    total_exposures: usize,
    resolved_at: DateTime<Utc>,
    summary: ExposureSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<BreachRecord>>,
}

impl CheckOutput {
    fn new(outcome: Outcome, report: ExposureReport, details: bool) -> Self {
        Self {
            query: report.query_key.to_string(),
            outcome,
            risk_tier: report.risk_tier,
            total_exposures: report.total_exposures,
            resolved_at: report.resolved_at,
            summary: report.summary,
            records: details.then_some(report.records),
        }
    }
}

fn render_view(view: ReportView) -> CommandResult {
    let output = match view {
        ReportView::Resolved { outcome, report } => CheckOutput::new(outcome, report, false),
        ReportView::DetailsExpanded { report } => {
            CheckOutput::new(Outcome::Breached, report, true)
        }
        ReportView::Failed { error } => {
            return Err(Report::new(error).wrap_err("Could not check the credential"));
        }
        ReportView::Idle | ReportView::Resolving => bail!("The check did not complete"),
    };

    Ok(CommandOutput::Object(Box::new(output)))
}
