use battle_logic::{run, CliOptions};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--battle battle.json] [--battles N] [--seed SEED] \
[--max-turns T] [--output record.json] [--echo]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut battle_path = PathBuf::from("battle.json");
    let mut battles = 1usize;
    let mut seed = 0u64;
    let mut max_turns = 500u32;
    let mut output_path = None;
    let mut echo = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--battle" => {
                battle_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--battle requires a path (e.g. --battle battle.json)")
                })?;
            }
            "--battles" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--battles requires a number"))?;
                battles = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--max-turns" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-turns requires a number"))?;
                max_turns = val.parse()?;
            }
            "--output" => {
                output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output record.json)")
                })?);
            }
            "--echo" => echo = true,
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        battle_path,
        battles,
        seed,
        max_turns,
        output_path,
        echo,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let opts = parse_args()?;
    run(opts)
}
