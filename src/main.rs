use clap::Parser;
use upkeep::cli::{
    handle_classify, handle_completions, handle_config_init, handle_strategies, handle_urgency,
    Cli, Commands, ConfigCommands,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn print_output(result: CliResult<String>) -> CliResult<()> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: CliResult<()> = match cli.command {
        Commands::Serve(args) => upkeep::cli::serve::run_serve(args).await.map_err(Into::into),
        Commands::Classify(args) => print_output(handle_classify(&args)),
        Commands::Urgency(args) => print_output(handle_urgency(&args)),
        Commands::Strategies(args) => print_output(handle_strategies(&args)),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
