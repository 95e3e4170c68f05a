use libraw_bridge::logger;

use tracing::{error, info};

const USAGE: &str = "usage: libraw_bridge <metadata|thumbnail|import|export> <input> [output]";

#[cfg(has_libraw)]
fn run(args: &[String]) -> anyhow::Result<()> {
    use anyhow::{Context, bail};
    use libraw_bridge::libraw::{OutputBits, ProcessingOptions, RawDecoder};

    let (command, input) = match args {
        [command, input, ..] => (command.as_str(), input.as_str()),
        _ => bail!(USAGE),
    };
    let output = args.get(2).map(String::as_str);

    let options = ProcessingOptions::builder()
        .output_bits(OutputBits::Eight)
        .build();
    let decoder = RawDecoder::new(options);

    match (command, output) {
        ("metadata", _) => {
            let metadata = decoder.extract_metadata(input)?;
            info!(
                camera = %format!("{} {}", metadata.camera.make, metadata.camera.model),
                lens = %metadata.lens.model,
                width = metadata.width,
                height = metadata.height,
                iso = metadata.iso,
                aperture = metadata.aperture,
                shutter = metadata.shutter,
                "Metadata"
            );
        }
        ("thumbnail", Some(output)) => {
            decoder
                .extract_thumbnail(input, output)
                .with_context(|| format!("thumbnail of {input}"))?;
            info!("Thumbnail written to {}", output);
        }
        ("import", _) => {
            let image = decoder.import_raw(input)?;
            info!(
                width = image.width(),
                height = image.height(),
                color = ?image.color(),
                "Decoded image"
            );
        }
        ("export", Some(output)) => {
            decoder
                .export_ppm(input, output)
                .with_context(|| format!("export of {input}"))?;
            info!("Image written to {}", output);
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

#[cfg(not(has_libraw))]
fn run(_args: &[String]) -> anyhow::Result<()> {
    anyhow::bail!("built without LibRaw; set LIBRAW_INCLUDE_DIR and rebuild")
}

fn main() {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
