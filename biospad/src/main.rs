use std::error::Error as _;
use std::path::Path;
use std::process::ExitCode;

use clap::{arg, ArgMatches, Command};
use libbiospad::{firmware, OversizePolicy, PadConfig, Padder, TARGET_SIZE};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn parse_size(value: &str) -> Result<usize, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse::<usize>(),
    };

    parsed.map_err(|e| format!("invalid size '{}': {}", value, e))
}

fn command() -> Command {
    Command::new("biospad")
        .version("0.0.1")
        .about("Left-pads a payload with zeroes into a fixed size BIOS image")
        .arg(arg!(--input <PATH> "Payload to pad").default_value("payload.bin"))
        .arg(arg!(--output <PATH> "Image to write").default_value("bios.bin"))
        .arg(
            arg!(--size <BYTES> "Total image size")
                .default_value(TARGET_SIZE.to_string())
                .value_parser(parse_size),
        )
        .arg(arg!(--"allow-oversized" "Write payloads larger than the image size unpadded"))
        .arg(
            arg!(--check <PATH> "Inspect an existing image instead of padding")
                .conflicts_with_all(["input", "output", "size", "allow-oversized"]),
        )
}

fn check(image: &Path) -> libbiospad::Result<String> {
    let (info, bytes) = firmware::read(image)?;
    let padding = bytes.iter().take_while(|&&b| b == 0).count();

    Ok(format!(
        "{}: {} bytes ({} leading zero bytes), loads at 0x{:08X}..=0x{:08X}",
        image.display(),
        info.size,
        padding,
        info.load_address,
        firmware::map::FIRMWARE.end()
    ))
}

fn run(arguments: &ArgMatches) -> libbiospad::Result<()> {
    if let Some(image) = arguments.get_one::<String>("check") {
        println!("{}", check(Path::new(image))?);
        return Ok(());
    }

    let config = PadConfig {
        target_size: *arguments.get_one::<usize>("size").unwrap_or(&TARGET_SIZE),
        oversize: if arguments.get_flag("allow-oversized") {
            OversizePolicy::Passthrough
        } else {
            OversizePolicy::Reject
        },
    };

    // Defaults are set above, so both are always present.
    let input = arguments.get_one::<String>("input").map_or("payload.bin", String::as_str);
    let output = arguments.get_one::<String>("output").map_or("bios.bin", String::as_str);

    Padder::new(config).pad_file(Path::new(input), Path::new(output))?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let arguments = command().get_matches();

    match run(&arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("error: {}", e);

            let mut cause = e.source();
            while let Some(inner) = cause {
                error!("cause: {}", inner);
                cause = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}
