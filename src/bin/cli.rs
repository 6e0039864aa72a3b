use bounce_parser::{BounceRecord, classify, parse_email};
use clap::Parser;
use env_logger::Env;

#[derive(Parser)]
struct Cli {
    /// Path(s) to bounce .eml files
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<String>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

fn classify_file(path: &str) -> anyhow::Result<BounceRecord> {
    let raw = std::fs::read(path)?;
    let parsed = parse_email(&raw)?;
    Ok(classify(&parsed))
}

fn print_record(path: &str, record: &BounceRecord) {
    println!("{}:", path);
    println!("  Handling server: {}", record.handling_server());
    println!("  Outcome: {}", record.outcome());
    println!("  Status: {}", record.status().unwrap_or("None"));
    println!(
        "  Original Message-ID: {}",
        record.original_message_id().unwrap_or("None")
    );
    println!(
        "  Original recipient: {}",
        record.original_recipient().unwrap_or("None")
    );
    println!(
        "  Original subject: {}",
        record.original_subject().unwrap_or("None")
    );

    let mut fields: Vec<_> = record.status_fields().iter().collect();
    fields.sort();
    for (key, value) in fields {
        println!("    {}: {}", key, value);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut failed = 0;

    for path in &cli.input {
        let record = match classify_file(path) {
            Ok(record) => record,
            Err(e) => {
                log::error!("{}: {:#}", path, e);
                failed += 1;
                continue;
            }
        };

        if cli.json {
            let output = serde_json::json!({
                "file": path,
                "bounce": record,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_record(path, &record);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) could not be classified", failed, cli.input.len());
    }

    Ok(())
}
