use mp4hls::{open_file, playlist_for_file, segment_for_file, HlsConfig, HlsResult, SplitOptions};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

const USAGE: &str = "Usage: mp4_hls [--config file.json] <command> <file.mp4> [args]

Commands:
  boxes <file.mp4>                       list top-level boxes and tracks
  m3u8 <file.mp4> [query]                print the media playlist
  ts <file.mp4> <ordinal> <out.ts>       write the segment starting at keyframe <ordinal>
  range <file.mp4> <start> <end> <out.ts> write the segment covering start..end seconds";

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let config = match take_config(&mut args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config: {}", e);
            process::exit(2);
        }
    };
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        process::exit(2);
    }

    let path = Path::new(&args[1]);
    let result = match (args[0].as_str(), &args[2..]) {
        ("boxes", []) => boxes(path, &config),
        ("m3u8", rest) if rest.len() <= 1 => {
            m3u8(path, &config, rest.first().map(String::as_str).unwrap_or(""))
        }
        ("ts", [ordinal, out]) => {
            let options = SplitOptions::from_query(&format!("video={}", ordinal));
            segment(path, &config, &options, Path::new(out))
        }
        ("range", [start, end, out]) => {
            let options = SplitOptions::from_query(&format!("start={}&end={}", start, end));
            segment(path, &config, &options, Path::new(out))
        }
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", path.display(), e);
        process::exit(1);
    }
}

fn take_config(args: &mut Vec<String>) -> HlsResult<HlsConfig> {
    match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let file = args.remove(i + 1);
            args.remove(i);
            HlsConfig::load(Path::new(&file))
        }
        _ => Ok(HlsConfig::default()),
    }
}

fn boxes(path: &Path, config: &HlsConfig) -> HlsResult<()> {
    let mut ctx = open_file(path, config)?;
    println!("File: {} ({} bytes)", path.display(), ctx.reader.length());
    if let Some(ftyp) = &ctx.ftyp {
        println!("Brand: {}", ftyp.describe());
    }
    for b in &ctx.boxes {
        println!("  {:<4} at {:>10}  size {:>10}", b.kind.name(), b.pos, b.size);
    }

    if !ctx.moofs.is_empty() {
        println!("Movie fragments: {}", ctx.moofs.len());
    }

    ctx.build_index()?;
    println!("Timescale: {}", ctx.moov.timescale());
    for (i, trak) in ctx.moov.traks.iter().enumerate() {
        println!(
            "  track {} (id {}): {} {} samples, {} keyframes, timescale {}",
            i,
            trak.tkhd.track_id,
            trak.handler_name(),
            trak.samples_size(),
            trak.keyframes(false).count(),
            trak.timescale()
        );
    }
    Ok(())
}

fn m3u8(path: &Path, config: &HlsConfig, query: &str) -> HlsResult<()> {
    let options = SplitOptions::from_query(query);
    print!("{}", playlist_for_file(path, config, &options, query)?);
    Ok(())
}

fn segment(path: &Path, config: &HlsConfig, options: &SplitOptions, out: &Path) -> HlsResult<()> {
    let ts = segment_for_file(path, config, options)?;
    fs::write(out, &ts)?;
    println!("wrote {} packets to {}", ts.len() / 188, out.display());
    Ok(())
}
