use clap::Parser;
use log::{error, info};
use std::collections::BTreeMap;
use std::process::ExitCode;

use img_toolbox::{
    build_dataset_structure, downscale_images, load_dataset, purge_elements, resize_images,
    standardize_background, Args, Command, PurgeOptions, ToolboxConfig,
};

fn run(args: Args) -> img_toolbox::Result<()> {
    match args.command {
        Command::Downscale {
            source,
            out,
            factor,
        } => {
            let written = downscale_images(&source, &out, factor)?;
            info!("Wrote {} downscaled images to {}", written.len(), out.display());
        }
        Command::Resize {
            source,
            target,
            size,
        } => {
            let written = resize_images(&source, &target, size)?;
            info!("Wrote {} resized images to {}", written.len(), target.display());
        }
        Command::StandardizeBackground { source, target } => {
            let written = standardize_background(&source, &target)?;
            info!("Wrote {} images to {}", written.len(), target.display());
        }
        Command::Purge {
            source,
            target_amount,
            seed,
        } => {
            let purged = purge_elements(&source, target_amount, PurgeOptions { seed })?;
            info!("Removed {} images from {}", purged.len(), source.display());
        }
        Command::BuildStructure {
            root,
            healthy_categories,
        } => {
            let config = ToolboxConfig::new(root).with_healthy_categories(healthy_categories);
            build_dataset_structure(config)?;
        }
        Command::Summarize { root } => {
            let samples = load_dataset(&root)?;
            let class_names = samples.class_names();

            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for sample in samples {
                let sample = sample?;
                *counts.entry(sample.label).or_default() += 1;
            }

            for (label, name) in class_names.iter().enumerate() {
                info!("    {}: {} ({} images)", label, name, counts.get(&label).copied().unwrap_or(0));
            }
            info!("Total: {} images", counts.values().sum::<usize>());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
