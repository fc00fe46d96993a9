use anyhow::{anyhow, Result};
use parto_import::{config::Config, import::InputFiles};

pub async fn check_input(config: Config) -> Result<()> {
    let files = InputFiles::from_config(&config.input);
    println!("Input directory: {}", files.base_path().display());

    let missing = files.missing_files();
    for path in &missing {
        println!("  missing: {}", path.display());
    }

    let hotel_shards = files.hotel_shards()?;
    let facility_shards = files.facility_shards()?;

    println!("\nHotel shards ({}):", hotel_shards.len());
    for shard in &hotel_shards {
        println!("  {}", shard.display());
    }
    println!("\nFacility shards ({}):", facility_shards.len());
    for shard in &facility_shards {
        println!("  {}", shard.display());
    }

    if !missing.is_empty() {
        return Err(anyhow!("{} required input files are missing", missing.len()));
    }
    if hotel_shards.is_empty() {
        return Err(anyhow!(
            "No hotel shards matching '{}' found",
            config.input.hotel_shard_filter
        ));
    }

    println!("\nInput directory looks complete.");
    Ok(())
}
