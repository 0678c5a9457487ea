//! # Glider Profiles Application Entry Point
//!
//! This binary crate segments the depth record of one glider deployment into casts
//! and writes `profile_index`/`profile_direction` next to it. It supports a demo
//! mode on a synthetic yo-yo and an ASCII chart for checking the segmentation by eye.
//!
//! ```text
//! glider-profiles [INPUT] [--config PATH] [--range R] [--join] [--output PATH] [--ascii] [--demo]
//! ```

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;

use glider_profiles_lib::{
    config::Config, find_profiles, nav_data, renderer::draw_ascii, synthetic, OptionValue,
    SegmentOptions,
};

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Args {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    range: Option<String>,
    join: bool,
    ascii: bool,
    demo: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(args.next().context("--config needs a path")?.into()),
            "--output" => parsed.output = Some(args.next().context("--output needs a path")?.into()),
            "--range" => parsed.range = Some(args.next().context("--range needs a value")?),
            "--join" => parsed.join = true,
            "--ascii" | "--stdout" => parsed.ascii = true,
            "--demo" => parsed.demo = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path => {
                if parsed.input.is_some() {
                    bail!("more than one input file given");
                }
                parsed.input = Some(path.into());
            }
        }
    }

    if parsed.input.is_none() && !parsed.demo {
        bail!("no input file given (use --demo for a synthetic series)");
    }
    Ok(parsed)
}

/// Apply command line overrides on top of the configured options.
fn segment_options(config: &Config, args: &Args) -> anyhow::Result<SegmentOptions> {
    let mut pairs = vec![
        ("range", OptionValue::from(config.segmentation.range)),
        ("join", OptionValue::from(config.segmentation.join || args.join)),
    ];
    if let Some(raw) = &args.range {
        let range: f64 = raw
            .parse()
            .with_context(|| format!("--range expects a number, got {raw:?}"))?;
        pairs.push(("range", OptionValue::from(range)));
    }
    Ok(SegmentOptions::from_pairs(pairs)?)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(env::args().skip(1))?;

    // An explicit config file must be valid; the default one is optional
    let config = match &args.config {
        Some(path) => Config::try_load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load(),
    };
    let options = segment_options(&config, &args)?;

    let series = match &args.input {
        Some(path) => nav_data::load_series(path)
            .with_context(|| format!("loading series {}", path.display()))?,
        None => {
            log::info!("Demo mode: segmenting a synthetic yo-yo");
            synthetic::yo_yo(None, &synthetic::YoYo::default())
        }
    };

    if series.valid_count() < config.input.min_valid_samples {
        log::warn!(
            "Only {} valid {} samples, expected at least {}",
            series.valid_count(),
            config.input.depth_variable,
            config.input.min_valid_samples
        );
    }

    let depth = series.depths();
    let segmentation = find_profiles(&depth, &options);

    log::info!(
        "Deployment {:?}: {} casts in {} samples (range {}, join {})",
        series.deployment,
        segmentation.cast_count(),
        segmentation.len(),
        options.range,
        options.join
    );
    for cast in &segmentation.casts {
        log::debug!(
            "cast {}: samples {}..{} {} {:+.2}",
            cast.number,
            cast.span.start,
            cast.span.end,
            cast.direction,
            cast.excursion
        );
    }

    if args.ascii {
        draw_ascii(&depth, &segmentation, config.output.ascii_rows);
    }

    let output = args.output.clone().unwrap_or_else(|| {
        let name = if series.deployment.is_empty() {
            "profiles".to_string()
        } else {
            format!("{}_profiles", series.deployment)
        };
        config.output.directory.join(format!("{name}.json"))
    });
    nav_data::save_segmentation(&output, &series, &segmentation)
        .with_context(|| format!("writing {}", output.display()))?;

    Ok(())
}
