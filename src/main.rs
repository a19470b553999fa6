use breakeven::cli::{
    handle_catalog, handle_compare, handle_completions, handle_config_init, handle_convert,
    handle_serverless, handle_vm, load_config, Cli, Commands, CommonArgs, ConfigCommands, Context,
};
use breakeven::logging::init_tracing;
use clap::Parser;

/// Resolve configuration, install logging, then load the catalog so its
/// load is logged.
fn context(common: &CommonArgs) -> Result<Context, Box<dyn std::error::Error>> {
    let config = load_config(common)?;
    init_tracing(&config.logging)?;
    Context::from_config(config)
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serverless(args) => {
            context(&args.common).and_then(|ctx| handle_serverless(&args, &ctx))
        }
        Commands::Vm(args) => context(&args.common).and_then(|ctx| handle_vm(&args, &ctx)),
        Commands::Compare(args) => {
            context(&args.common).and_then(|ctx| handle_compare(&args, &ctx))
        }
        Commands::Catalog(args) => {
            context(&args.common).and_then(|ctx| handle_catalog(&args, &ctx))
        }
        Commands::Convert(args) => handle_convert(&args),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args, &mut std::io::stdout());
            Ok(String::new())
        }
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
