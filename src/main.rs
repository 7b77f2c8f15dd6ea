use clap::Parser;
use leadflow::adapters::{ConsolePresenter, ConsoleResendDisplay};
use leadflow::core::flow::{FlowSettings, ResendOutcome, SubmitOutcome, VerifyOutcome};
use leadflow::domain::model::ContactInput;
use leadflow::utils::{logger, validation::Validate};
use leadflow::{CliArgs, HttpLeadGateway, LeadConfig, SubmissionFlow};
use std::io::{self, Write};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting leadflow CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match LeadConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load {}: {}", args.config, e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = FlowSettings::from(&config);
    let gateway = HttpLeadGateway::new(config);
    let flow = SubmissionFlow::new(
        gateway,
        ConsolePresenter,
        Arc::new(ConsoleResendDisplay),
        settings,
    );

    let input = ContactInput {
        name: args.name.unwrap_or_else(|| prompt("Name: ")),
        phone: args.phone.unwrap_or_else(|| prompt("Phone: ")),
        city: args.city.unwrap_or_else(|| prompt("City: ")),
    };

    match flow.submit(input).await {
        SubmitOutcome::OtpSent => {}
        SubmitOutcome::FallbackSaved => {
            println!("✅ Lead captured without OTP verification.");
            return Ok(());
        }
        SubmitOutcome::FallbackFailed | SubmitOutcome::Rejected(_) | SubmitOutcome::Superseded => {
            std::process::exit(1);
        }
    }

    loop {
        let entry = prompt("Enter OTP ('resend' to resend, 'quit' to abort): ");
        match entry.as_str() {
            "quit" => {
                flow.cancel();
                std::process::exit(1);
            }
            "resend" => {
                if flow.resend().await == ResendOutcome::NotReady {
                    println!("Resend is not available until the countdown ends.");
                }
            }
            otp => match flow.confirm_otp(otp).await {
                VerifyOutcome::Saved | VerifyOutcome::DuplicateSaved => {
                    println!("✅ Lead verified and saved.");
                    break;
                }
                VerifyOutcome::PartialFailure | VerifyOutcome::NoPending => {
                    std::process::exit(1);
                }
                // Format rejections and wrong OTPs loop back for another try.
                VerifyOutcome::OtpRejected | VerifyOutcome::Rejected(_) => {}
            },
        }
    }

    Ok(())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok();
    line.trim().to_string()
}
