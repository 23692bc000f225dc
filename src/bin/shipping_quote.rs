use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use storefront_shipping::config::toml_config::TomlConfig;
use storefront_shipping::config::validate_fee_schedule;
use storefront_shipping::utils::logger;
use storefront_shipping::{
    CheckoutTotals, CityDistance, FeeSchedule, ReferenceTable, ShippingQuote, ShippingResolver,
    DEFAULT_TABLE_PATH,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "shipping-quote")]
#[command(about = "Quote delivery fees from the shipping reference table")]
struct Args {
    /// City or town to quote
    city: Option<String>,

    /// Reference table file; the embedded table is used when it does not exist
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    table: String,

    /// TOML config whose [fees] section overrides the fee schedule
    #[arg(short, long)]
    config: Option<String>,

    /// Cart subtotal; prints checkout totals for the city
    #[arg(long)]
    subtotal: Option<u64>,

    /// Print every city with its fee
    #[arg(long)]
    all: bool,

    /// Print cities whose name contains this text
    #[arg(long)]
    search: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct QuoteRow<'a> {
    city: &'a str,
    distance_km: u32,
    fee: u64,
}

#[derive(Serialize)]
struct CityQuote<'a> {
    city: &'a str,
    known: bool,
    #[serde(flatten)]
    quote: ShippingQuote,
}

fn load_resolver(args: &Args) -> anyhow::Result<ShippingResolver> {
    let table = ReferenceTable::load_or_builtin(&args.table)
        .with_context(|| format!("failed to load reference table '{}'", args.table))?;

    let schedule = match &args.config {
        Some(path) => {
            let config = TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config '{}'", path))?;
            let schedule = config.fee_schedule();
            validate_fee_schedule(&schedule)?;
            schedule
        }
        None => FeeSchedule::default(),
    };

    Ok(ShippingResolver::new(table, schedule))
}

fn print_rows(cities: &[&CityDistance], schedule: &FeeSchedule, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<QuoteRow> = cities
        .iter()
        .map(|city| QuoteRow {
            city: &city.name,
            distance_km: city.distance_km,
            fee: schedule.fee_for(city.distance_km),
        })
        .collect();

    match format {
        OutputFormat::Text => {
            for row in &rows {
                println!("{:<20} {:>5} km   KES {}", row.city, row.distance_km, row.fee);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let resolver = load_resolver(&args)?;
    let schedule = *resolver.schedule();

    if args.all || args.search.is_some() {
        let query = args.search.as_deref().unwrap_or("");
        let cities = resolver.table().search(query);
        tracing::debug!("{} cities match '{}'", cities.len(), query);
        return print_rows(&cities, &schedule, args.format);
    }

    let Some(city) = args.city.as_deref() else {
        bail!("give a city to quote, or use --all / --search");
    };

    if let Some(subtotal) = args.subtotal {
        let totals = CheckoutTotals::compute(subtotal, city, &resolver);
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&totals)?),
            _ => {
                println!("Subtotal  KES {}", totals.subtotal);
                match totals.shipping {
                    Some(quote) => println!(
                        "Shipping  KES {} (~{} km from Nairobi)",
                        quote.fee, quote.distance_km
                    ),
                    None => println!("Shipping  select a city"),
                }
                println!("Total     KES {}", totals.total);
            }
        }
        return Ok(());
    }

    let quote = resolver.resolve(city);
    let known = resolver.table().find(city).is_some();
    if !known {
        tracing::warn!(
            "'{}' is not in the reference table, using the default distance",
            city.trim()
        );
    }

    match args.format {
        OutputFormat::Text => println!(
            "{}: ~{} km from Nairobi · KES {} delivery",
            city.trim(),
            quote.distance_km,
            quote.fee
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&CityQuote {
                city: city.trim(),
                known,
                quote,
            })?
        ),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.serialize(QuoteRow {
                city: city.trim(),
                distance_km: quote.distance_km,
                fee: quote.fee,
            })?;
            writer.flush()?;
        }
    }

    Ok(())
}
