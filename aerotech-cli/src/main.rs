use aerotech_lib::{
    AeroTechError,
    aerotech_data::{AeroTechData, Markers},
    append_record,
    parser::{bytes_from_hex, bytes_to_hex},
    read_records,
    reading::{SensorReading, WaterLevelThresholds},
};
use anyhow::{Result, anyhow, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use indoc::printdoc;
use log::{debug, warn};
use std::path::PathBuf;

const NAIVE_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Record log file
    #[arg(long, global = true, env = "AEROTECH_DATA_FILE", default_value = "aerotech.bin")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Parses a byte given as decimal or `0x`-prefixed hex.
fn parse_byte(s: &str) -> Result<u8> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    value.map_err(|_| anyhow!("'{}' is not a byte value", s))
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long, value_parser = parse_byte, default_value = "0")]
    header: u8,
    #[arg(long, default_value_t = 0)]
    hh: u8,
    #[arg(long, default_value_t = 0)]
    mm: u8,
    #[arg(long, default_value_t = 0)]
    ss: u8,
    /// Use the local clock time instead of --hh/--mm/--ss
    #[arg(long)]
    now: bool,
    #[arg(long, default_value_t = 0.0)]
    ph: f32,
    #[arg(long, default_value_t = 0.0)]
    tds: f32,
    #[arg(long, default_value_t = 0.0)]
    water_level: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    temperature: f32,
    #[arg(long, value_parser = parse_byte, default_value = "0")]
    footer: u8,
}

impl RecordArgs {
    fn to_record(&self) -> AeroTechData {
        let mut record = AeroTechData {
            header: self.header,
            time_hh: self.hh,
            time_mm: self.mm,
            time_ss: self.ss,
            ph: self.ph,
            tds: self.tds,
            water_level: self.water_level,
            temperature: self.temperature,
            footer: self.footer,
        };
        if self.now {
            record.set_sample_time(Local::now().time());
        }
        record
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a record's packed bytes as hex
    Encode(RecordArgs),
    /// Append a record to the log
    Append(RecordArgs),
    /// Decode one record from hex
    Decode {
        #[arg(index = 1, num_args = 1.., required = true)]
        hex: Vec<String>,
    },
    /// Print every record in the log
    Status,
    /// Check marker bytes and time fields of every record in the log
    Validate {
        #[arg(long, value_parser = parse_byte, default_value = "0")]
        header: u8,
        #[arg(long, value_parser = parse_byte, default_value = "0")]
        footer: u8,
    },
    /// Print one ingest-reading JSON body per record in the log
    IngestJson {
        #[arg(long)]
        device_id: String,
        #[arg(long, default_value_t = WaterLevelThresholds::default().low_below)]
        low_below: f32,
        #[arg(long, default_value_t = WaterLevelThresholds::default().high_above)]
        high_above: f32,
    },
}

fn format_time(record: &AeroTechData) -> String {
    match record.sample_time() {
        Ok(time) => time.format(NAIVE_TIME_FORMAT).to_string(),
        Err(_) => format!(
            "{:02}:{:02}:{:02} (out of range)",
            record.time_hh, record.time_mm, record.time_ss
        ),
    }
}

fn print_record(index: usize, record: &AeroTechData) {
    let level_code = WaterLevelThresholds::default().classify(record.water_level);
    printdoc!(
        r#"
        Record {}:
          - header:       {:#04X}
          - time:         {}
          - pH:           {:.2}
          - TDS:          {:.1} ppm
          - water level:  {:.2} L ({})
          - temperature:  {:.1} °C
          - footer:       {:#04X}
        "#,
        index,
        record.header,
        format_time(record),
        record.ph,
        record.tds,
        record.water_level,
        level_code,
        record.temperature,
        record.footer,
    );
}

/// Prints every record that fails validation and returns how many did.
fn count_validation_failures(records: &[AeroTechData], markers: Markers) -> usize {
    let mut failures = 0;
    for (index, record) in records.iter().enumerate() {
        if let Err(e) = record.validate(markers) {
            warn!("record {} failed validation", index);
            println!("Record {}: {}", index, e);
            failures += 1;
        }
    }
    failures
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("using record log {}", cli.file.display());

    match cli.command {
        Commands::Encode(args) => {
            let record = args.to_record();
            println!("{}", bytes_to_hex(&record.serialize_to_bytes()));
        }
        Commands::Append(args) => {
            let record = args.to_record();
            append_record(&cli.file, &record)
                .map_err(|e| anyhow!("Failed to append record: {}", e))?;
        }
        Commands::Decode { hex } => {
            let bytes = bytes_from_hex(&hex.join(""))?;
            let record = AeroTechData::deserialize_from_bytes(&bytes)?;
            print_record(0, &record);
        }
        Commands::Status => {
            let records = read_records(&cli.file)
                .map_err(|e| anyhow!("Failed to read record log: {}", e))?;
            if records.is_empty() {
                println!("No records in {}", cli.file.display());
            }
            for (index, record) in records.iter().enumerate() {
                print_record(index, record);
            }
        }
        Commands::Validate { header, footer } => {
            let records = read_records(&cli.file)
                .map_err(|e| anyhow!("Failed to read record log: {}", e))?;
            let failures = count_validation_failures(&records, Markers { header, footer });
            if failures > 0 {
                bail!("{} of {} records failed validation", failures, records.len());
            }
            println!("{} records valid", records.len());
        }
        Commands::IngestJson {
            device_id,
            low_below,
            high_above,
        } => {
            if low_below > high_above {
                bail!("--low-below must not exceed --high-above");
            }
            let thresholds = WaterLevelThresholds {
                low_below,
                high_above,
            };
            let records = read_records(&cli.file)
                .map_err(|e| anyhow!("Failed to read record log: {}", e))?;
            for (index, record) in records.iter().enumerate() {
                debug!(
                    "water level {} L classified as {}",
                    record.water_level,
                    thresholds.classify(record.water_level)
                );
                let reading = SensorReading::from_record(device_id.as_str(), record, thresholds);
                match reading.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e @ AeroTechError::NonFiniteReading(_)) => {
                        warn!("skipping record {}: {}", index, e)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
    Ok(())
}
