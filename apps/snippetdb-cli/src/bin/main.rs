use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use snippetdb_core::config::Config;
use snippetdb_embed::get_default_embedder;
use snippetdb_hybrid::Retriever;
use snippetdb_vector::IndexStats;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { eprintln!("Usage: {} <index|stats|query> [args...]", prog); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn print_stats(stats: &IndexStats) {
    println!("generation  {}", stats.generation);
    println!("documents   {}", stats.documents);
    println!("chunks      {}", stats.chunks);
    println!("dim         {}", stats.dim);
    println!("fingerprint {}", stats.fingerprint);
    println!("built_at    {}", stats.built_at.to_rfc3339());
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();
    let base = env::current_dir()?;
    let default_dir = settings.data.resolve_dir(&base);

    match cmd.as_str() {
        "index" | "stats" => {
            let data_dir = args.first().map(PathBuf::from).unwrap_or(default_dir);
            let retriever = Retriever::new(get_default_embedder(&settings.embedding)?, &settings)?;
            let stats = retriever.rebuild(&data_dir)?;
            tracing::info!(dir = %data_dir.display(), "indexed");
            print_stats(&stats);
        }
        "query" => {
            let query_text = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: snippetdb query \"<query>\" [k]"); std::process::exit(1)
            });
            let k = match args.get(1) {
                Some(v) => v.parse::<usize>().map_err(|e| anyhow::anyhow!("invalid k '{}': {}", v, e))?,
                None => settings.retrieval.top_k,
            };
            let retriever = Retriever::new(get_default_embedder(&settings.embedding)?, &settings)?;
            retriever.rebuild(&default_dir)?;
            let retrieval = retriever.retrieve(&query_text, k)?;
            println!("{}", serde_json::to_string_pretty(&retrieval)?);
        }
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}
